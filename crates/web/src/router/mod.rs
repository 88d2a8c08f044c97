//! Route registration and lookup.

mod method;
mod pattern;
mod table;

pub use method::RouteMethod;
pub use pattern::PathPattern;
pub use table::{Route, RouteMatch, RouteTable};

use std::fmt;

use http::Method;

use crate::error::ConfigurationError;
use crate::middleware::{BoxMiddleware, IntoHandlers};

/// Routes, global middleware and the optional fallback chain of one application.
///
/// A router is immutable once built and is shared by every connection.
pub struct Router {
    pub(crate) table: RouteTable,
    pub(crate) middlewares: Vec<BoxMiddleware>,
    pub(crate) fallback: Option<Vec<BoxMiddleware>>,
}

impl Router {
    pub fn builder() -> RouterBuilder {
        RouterBuilder::new()
    }

    /// Finds the route serving `method` and `path`, see [`RouteTable::resolve`].
    pub fn resolve(&self, method: &Method, path: &str) -> Option<RouteMatch<'_>> {
        self.table.resolve(method, path)
    }

    pub fn routes(&self) -> &[Route] {
        self.table.routes()
    }

    pub fn middlewares(&self) -> &[BoxMiddleware] {
        &self.middlewares
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("table", &self.table)
            .field("middlewares", &self.middlewares.len())
            .field("fallback", &self.fallback.as_ref().map(Vec::len))
            .finish()
    }
}

/// Collects routes and middleware before the router starts serving.
///
/// Global middleware runs before the handlers of every route, whether it was
/// added before or after the route, in the order it was added.
pub struct RouterBuilder {
    table: RouteTable,
    middlewares: Vec<BoxMiddleware>,
    fallback: Option<Vec<BoxMiddleware>>,
}

impl RouterBuilder {
    fn new() -> Self {
        Self { table: RouteTable::new(), middlewares: vec![], fallback: None }
    }

    pub fn route(
        mut self,
        method: RouteMethod,
        path: &str,
        handlers: impl IntoHandlers,
    ) -> Result<Self, ConfigurationError> {
        self.table.register(method, path, handlers.into_handlers())?;
        Ok(self)
    }

    pub fn get(self, path: &str, handlers: impl IntoHandlers) -> Result<Self, ConfigurationError> {
        self.route(RouteMethod::Get, path, handlers)
    }

    pub fn post(self, path: &str, handlers: impl IntoHandlers) -> Result<Self, ConfigurationError> {
        self.route(RouteMethod::Post, path, handlers)
    }

    pub fn put(self, path: &str, handlers: impl IntoHandlers) -> Result<Self, ConfigurationError> {
        self.route(RouteMethod::Put, path, handlers)
    }

    pub fn delete(self, path: &str, handlers: impl IntoHandlers) -> Result<Self, ConfigurationError> {
        self.route(RouteMethod::Delete, path, handlers)
    }

    pub fn patch(self, path: &str, handlers: impl IntoHandlers) -> Result<Self, ConfigurationError> {
        self.route(RouteMethod::Patch, path, handlers)
    }

    /// Registers a route answering to every method.
    pub fn any(self, path: &str, handlers: impl IntoHandlers) -> Result<Self, ConfigurationError> {
        self.route(RouteMethod::Any, path, handlers)
    }

    /// Appends global middleware.
    pub fn use_middleware(mut self, middleware: impl IntoHandlers) -> Self {
        self.middlewares.extend(middleware.into_handlers());
        self
    }

    /// Handlers to run, after the global middleware, when no route matches.
    /// Without one the router answers `404 Not Found`.
    pub fn fallback(mut self, handlers: impl IntoHandlers) -> Self {
        let handlers = handlers.into_handlers();
        self.fallback = (!handlers.is_empty()).then_some(handlers);
        self
    }

    pub fn build(self) -> Router {
        Router { table: self.table, middlewares: self.middlewares, fallback: self.fallback }
    }
}

impl fmt::Debug for RouterBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouterBuilder")
            .field("table", &self.table)
            .field("middlewares", &self.middlewares.len())
            .finish_non_exhaustive()
    }
}
