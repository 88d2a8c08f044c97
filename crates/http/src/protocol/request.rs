//! The decoded head of an incoming request.

use http::request::Parts;
use http::{HeaderMap, Method, Request, Uri, Version};

/// Request line plus header fields, before a body is attached.
#[derive(Debug)]
pub struct RequestHeader {
    inner: Request<()>,
}

impl RequestHeader {
    pub fn into_inner(self) -> Request<()> {
        self.inner
    }

    /// Attaches `body`, producing the request a handler receives.
    pub fn body<T>(self, body: T) -> Request<T> {
        self.inner.map(|_| body)
    }

    pub fn method(&self) -> &Method {
        self.inner.method()
    }

    pub fn uri(&self) -> &Uri {
        self.inner.uri()
    }

    pub fn version(&self) -> Version {
        self.inner.version()
    }

    pub fn headers(&self) -> &HeaderMap {
        self.inner.headers()
    }

    /// Whether a body may follow even without framing headers.
    ///
    /// GET, HEAD, DELETE, OPTIONS and CONNECT never carry an implicit body.
    pub fn need_body(&self) -> bool {
        !matches!(self.method(), &Method::GET | &Method::HEAD | &Method::DELETE | &Method::OPTIONS | &Method::CONNECT)
    }
}

impl From<Parts> for RequestHeader {
    #[inline]
    fn from(parts: Parts) -> Self {
        Self { inner: Request::from_parts(parts, ()) }
    }
}

impl From<Request<()>> for RequestHeader {
    #[inline]
    fn from(inner: Request<()>) -> Self {
        Self { inner }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_attaches_without_touching_head() {
        let header: RequestHeader =
            Request::builder().method(Method::POST).uri("/api/data/42?x=1").body(()).unwrap().into();

        assert!(header.need_body());
        let request = header.body("payload");
        assert_eq!(request.method(), Method::POST);
        assert_eq!(request.uri().path(), "/api/data/42");
        assert_eq!(request.uri().query(), Some("x=1"));
        assert_eq!(*request.body(), "payload");
    }

    #[test]
    fn bodiless_methods() {
        for method in [Method::GET, Method::HEAD, Method::DELETE, Method::OPTIONS, Method::CONNECT] {
            let header: RequestHeader = Request::builder().method(method).body(()).unwrap().into();
            assert!(!header.need_body());
        }
        let header: RequestHeader = Request::builder().method(Method::PUT).body(()).unwrap().into();
        assert!(header.need_body());
    }
}
