//! An embeddable HTTP router with ordered middleware chains.
//!
//! Routes are declared with `/literal/:name` paths and matched in
//! registration order. Every request runs through the global middleware and
//! then the handlers of the first matching route; each entry decides whether
//! to hand control on through [`Next::advance`].
//!
//! # Example
//!
//! ```no_run
//! use syvex::{handler_fn, json_body, BoxError, Request, Response, Router};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let router = Router::builder()
//!         .get(
//!             "/hello/:name",
//!             handler_fn(|req: &mut Request, res: &mut Response| {
//!                 Box::pin(async move {
//!                     let message = format!("Hello {}!", req.param("name").unwrap_or("world"));
//!                     res.send(message)?;
//!                     Ok::<_, BoxError>(())
//!                 })
//!             }),
//!         )?
//!         .post(
//!             "/echo",
//!             (
//!                 json_body(),
//!                 handler_fn(|req: &mut Request, res: &mut Response| {
//!                     Box::pin(async move {
//!                         match req.body() {
//!                             Some(body) => res.json(body)?,
//!                             None => res.send("expected json")?,
//!                         }
//!                         Ok::<_, BoxError>(())
//!                     })
//!                 }),
//!             ),
//!         )?
//!         .build();
//!
//!     router.listen("127.0.0.1:8080", |addr| println!("listening on {addr}")).await?;
//!     Ok(())
//! }
//! ```

mod body;
mod body_decoder;
mod chain;
mod dispatch;
mod error;
mod middleware;
mod params;
mod request;
mod response;
mod server;

pub mod router;

pub use body::{BodyEvent, RawBody, ResponseBody};
pub use body_decoder::{DEFAULT_JSON_LIMIT, JsonBody, json_body};
pub use chain::Next;
pub use error::{BoxError, ConfigurationError, HandlerResult, ResponseError};
pub use middleware::{BoxMiddleware, HandlerFn, IntoHandlers, Middleware, MiddlewareFn, handler_fn, middleware_fn};
pub use params::PathParams;
pub use request::{QueryMap, QueryValue, Request};
pub use response::{Payload, Response};
pub use router::{RouteMethod, Router, RouterBuilder};
pub use server::{Server, ServerBuildError, ServerBuilder};
