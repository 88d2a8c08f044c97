use std::fmt;

use http::Method;
use tracing::debug;

use crate::error::ConfigurationError;
use crate::middleware::BoxMiddleware;
use crate::params::PathParams;
use crate::router::method::RouteMethod;
use crate::router::pattern::PathPattern;

/// A registered route: method, compiled path and the handlers that serve it.
pub struct Route {
    method: RouteMethod,
    pattern: PathPattern,
    handlers: Vec<BoxMiddleware>,
}

impl Route {
    pub fn method(&self) -> RouteMethod {
        self.method
    }

    pub fn pattern(&self) -> &PathPattern {
        &self.pattern
    }

    pub fn handlers(&self) -> &[BoxMiddleware] {
        &self.handlers
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("method", &self.method)
            .field("path", &self.pattern.source())
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

/// Result of a successful lookup.
#[derive(Debug)]
pub struct RouteMatch<'router> {
    pub route: &'router Route,
    pub params: PathParams,
}

/// Routes in registration order.
///
/// Lookup scans the routes from the first registered one and stops at the
/// first whose method and path both match, so earlier registrations shadow
/// later ones.
#[derive(Debug, Default)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    pub fn register(
        &mut self,
        method: RouteMethod,
        path: &str,
        handlers: Vec<BoxMiddleware>,
    ) -> Result<(), ConfigurationError> {
        if handlers.is_empty() {
            return Err(ConfigurationError::EmptyHandlers { path: path.to_owned() });
        }

        let pattern = PathPattern::compile(path)?;
        debug!(%method, path, handlers = handlers.len(), "register route");
        self.routes.push(Route { method, pattern, handlers });
        Ok(())
    }

    pub fn resolve(&self, method: &Method, path: &str) -> Option<RouteMatch<'_>> {
        self.routes
            .iter()
            .filter(|route| route.method.matches(method))
            .find_map(|route| route.pattern.extract(path).map(|params| RouteMatch { route, params }))
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
