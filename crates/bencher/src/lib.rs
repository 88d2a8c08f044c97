//! Fixtures shared by the benchmarks.

/// A route table and the request paths resolved against it.
#[derive(Debug, Clone)]
pub struct RouteCase {
    name: &'static str,
    routes: Vec<String>,
    paths: Vec<String>,
}

impl RouteCase {
    /// `count` routes of the shape `/api/v1/resource{i}/:id/:name`, resolved
    /// at the first, middle and last position and once without a match.
    pub fn api(name: &'static str, count: usize) -> Self {
        let routes = (0..count).map(|i| format!("/api/v1/resource{i}/:id/:name")).collect();
        let paths = [0, count / 2, count.saturating_sub(1)]
            .into_iter()
            .map(|i| format!("/api/v1/resource{i}/42/bob"))
            .chain(std::iter::once("/api/v1/unknown/42/bob".to_owned()))
            .collect();
        Self { name, routes, paths }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn routes(&self) -> &[String] {
        &self.routes
    }

    pub fn paths(&self) -> &[String] {
        &self.paths
    }
}

/// A raw HTTP/1.1 request as it arrives on the wire.
#[derive(Debug, Copy, Clone)]
pub struct RequestFixture {
    name: &'static str,
    content: &'static str,
}

impl RequestFixture {
    pub const fn new(name: &'static str, content: &'static str) -> Self {
        Self { name, content }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn content(&self) -> &'static str {
        self.content
    }
}

pub const SMALL_GET: RequestFixture =
    RequestFixture::new("small_get", "GET /api/data/42 HTTP/1.1\r\nHost: 127.0.0.1:8080\r\nAccept: */*\r\n\r\n");

pub const JSON_POST: RequestFixture = RequestFixture::new(
    "json_post",
    "POST /users HTTP/1.1\r\n\
     Host: 127.0.0.1:8080\r\n\
     User-Agent: curl/8.7.1\r\n\
     Accept: */*\r\n\
     Accept-Encoding: gzip, deflate, br\r\n\
     Accept-Language: en-US,en;q=0.9\r\n\
     Connection: keep-alive\r\n\
     Content-Type: application/json\r\n\
     Content-Length: 30\r\n\
     \r\n\
     {\"name\":\"hello\",\"zip\":\"world\"}",
);
