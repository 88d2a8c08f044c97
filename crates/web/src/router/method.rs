use std::fmt;

use http::Method;

/// The method a route answers to.
///
/// [`RouteMethod::Any`] matches every request method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
    Any,
}

impl RouteMethod {
    /// Whether a request made with `method` may be served by this route.
    #[inline]
    pub fn matches(self, method: &Method) -> bool {
        match self {
            RouteMethod::Get => *method == Method::GET,
            RouteMethod::Post => *method == Method::POST,
            RouteMethod::Put => *method == Method::PUT,
            RouteMethod::Delete => *method == Method::DELETE,
            RouteMethod::Patch => *method == Method::PATCH,
            RouteMethod::Head => *method == Method::HEAD,
            RouteMethod::Options => *method == Method::OPTIONS,
            RouteMethod::Any => true,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RouteMethod::Get => "GET",
            RouteMethod::Post => "POST",
            RouteMethod::Put => "PUT",
            RouteMethod::Delete => "DELETE",
            RouteMethod::Patch => "PATCH",
            RouteMethod::Head => "HEAD",
            RouteMethod::Options => "OPTIONS",
            RouteMethod::Any => "ANY",
        }
    }
}

impl fmt::Display for RouteMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
