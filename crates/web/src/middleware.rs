//! The unit of work in a request chain.
//!
//! Global middleware and route handlers share one shape: an async function of
//! the request, the response and the [`Next`] cursor. Whether an entry acts
//! as middleware or as the terminal handler is only a matter of whether it
//! advances.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;

use crate::chain::Next;
use crate::error::HandlerResult;
use crate::request::Request;
use crate::response::Response;

#[async_trait]
pub trait Middleware: Send + Sync + 'static {
    /// Handles the request. Calling [`Next::advance`] hands control to the
    /// following entry; returning without it ends the chain.
    async fn handle(&self, req: &mut Request, res: &mut Response, next: Next<'_>) -> HandlerResult;
}

/// A type-erased middleware as stored by the router.
pub type BoxMiddleware = Arc<dyn Middleware>;

#[async_trait]
impl<M: Middleware + ?Sized> Middleware for Arc<M> {
    async fn handle(&self, req: &mut Request, res: &mut Response, next: Next<'_>) -> HandlerResult {
        (**self).handle(req, res, next).await
    }
}

/// A closure adapted into [`Middleware`], see [`middleware_fn`].
pub struct MiddlewareFn<F> {
    f: F,
}

impl<F> fmt::Debug for MiddlewareFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MiddlewareFn").finish_non_exhaustive()
    }
}

/// Adapts a closure receiving `(req, res, next)` into a middleware.
///
/// ```no_run
/// use syvex::{middleware_fn, Next, Request, Response};
///
/// let logger = middleware_fn(|req: &mut Request, res: &mut Response, next: Next<'_>| {
///     Box::pin(async move {
///         tracing::info!(method = %req.method(), path = req.path(), "incoming");
///         next.advance(req, res).await
///     })
/// });
/// ```
pub fn middleware_fn<F>(f: F) -> MiddlewareFn<F>
where
    F: for<'a> Fn(&'a mut Request, &'a mut Response, Next<'a>) -> BoxFuture<'a, HandlerResult> + Send + Sync + 'static,
{
    MiddlewareFn { f }
}

#[async_trait]
impl<F> Middleware for MiddlewareFn<F>
where
    F: for<'a> Fn(&'a mut Request, &'a mut Response, Next<'a>) -> BoxFuture<'a, HandlerResult> + Send + Sync + 'static,
{
    async fn handle(&self, req: &mut Request, res: &mut Response, next: Next<'_>) -> HandlerResult {
        (self.f)(req, res, next).await
    }
}

/// A terminal closure adapted into [`Middleware`], see [`handler_fn`].
pub struct HandlerFn<F> {
    f: F,
}

impl<F> fmt::Debug for HandlerFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerFn").finish_non_exhaustive()
    }
}

/// Adapts a closure receiving `(req, res)` into a chain entry that never advances.
pub fn handler_fn<F>(f: F) -> HandlerFn<F>
where
    F: for<'a> Fn(&'a mut Request, &'a mut Response) -> BoxFuture<'a, HandlerResult> + Send + Sync + 'static,
{
    HandlerFn { f }
}

#[async_trait]
impl<F> Middleware for HandlerFn<F>
where
    F: for<'a> Fn(&'a mut Request, &'a mut Response) -> BoxFuture<'a, HandlerResult> + Send + Sync + 'static,
{
    async fn handle(&self, req: &mut Request, res: &mut Response, _next: Next<'_>) -> HandlerResult {
        (self.f)(req, res).await
    }
}

/// Anything that can be registered as the handler list of a route.
///
/// Implemented for a single middleware, for tuples of up to eight
/// middlewares and for a `Vec` of already boxed ones.
pub trait IntoHandlers {
    fn into_handlers(self) -> Vec<BoxMiddleware>;
}

impl<M: Middleware> IntoHandlers for M {
    fn into_handlers(self) -> Vec<BoxMiddleware> {
        vec![Arc::new(self)]
    }
}

impl IntoHandlers for Vec<BoxMiddleware> {
    fn into_handlers(self) -> Vec<BoxMiddleware> {
        self
    }
}

/// impl `IntoHandlers` for tuples, in the order the elements are written
///
/// for example, it will impl (A, B) like this:
///```ignore
/// impl<A: Middleware, B: Middleware> IntoHandlers for (A, B) {
///     fn into_handlers(self) -> Vec<BoxMiddleware> {
///         let (A, B) = self;
///         vec![Arc::new(A), Arc::new(B)]
///     }
/// }
///```
macro_rules! impl_into_handlers_for_tuple ({ $($param:ident)* } => {
    impl<$($param: Middleware,)*> IntoHandlers for ($($param,)*) {
        #[inline]
        #[allow(non_snake_case, reason = "type parameters double as bindings")]
        fn into_handlers(self) -> Vec<BoxMiddleware> {
            let ($($param,)*) = self;
            vec![$(Arc::new($param) as BoxMiddleware,)*]
        }
    }
});

impl_into_handlers_for_tuple! { A B }
impl_into_handlers_for_tuple! { A B C }
impl_into_handlers_for_tuple! { A B C D }
impl_into_handlers_for_tuple! { A B C D E }
impl_into_handlers_for_tuple! { A B C D E F }
impl_into_handlers_for_tuple! { A B C D E F G }
impl_into_handlers_for_tuple! { A B C D E F G H }
