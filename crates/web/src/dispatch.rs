//! Turning one inbound request into one response.

use std::panic::AssertUnwindSafe;

use bytes::Bytes;
use futures::FutureExt;
use http::StatusCode;
use http_body::Body as HttpBody;
use tracing::{debug, error, warn};

use crate::body::{RawBody, ResponseBody};
use crate::chain;
use crate::error::BoxError;
use crate::middleware::BoxMiddleware;
use crate::params::PathParams;
use crate::request::Request;
use crate::response::Response;
use crate::router::Router;

impl Router {
    /// Serves one request.
    ///
    /// The chain is the global middleware followed by the handlers of the
    /// first matching route. A handler error, a panic or a second finalizing
    /// write all turn into `500 Internal Server Error`. When no route matches
    /// the fallback chain runs if there is one, otherwise the answer is
    /// `404 Not Found`.
    ///
    /// A chain that returns without finalizing the response never completes:
    /// the request is left waiting until the connection serving it goes away.
    pub async fn dispatch<B>(&self, req: http::Request<B>) -> http::Response<ResponseBody>
    where
        B: HttpBody<Data = Bytes> + Send + 'static,
        B::Error: Into<BoxError>,
    {
        let (parts, body) = req.into_parts();
        let method = parts.method.clone();
        let path = parts.uri.path().to_owned();

        let (route_handlers, params) = match self.table.resolve(&method, &path) {
            Some(matched) => (matched.route.handlers(), matched.params),
            None => match &self.fallback {
                Some(fallback) => {
                    debug!(%method, path, "no route matched, running fallback");
                    (fallback.as_slice(), PathParams::empty())
                }
                None => {
                    debug!(%method, path, "no route matched");
                    return Response::plain(StatusCode::NOT_FOUND, "Not Found");
                }
            },
        };

        let chain: Vec<BoxMiddleware> = self.middlewares.iter().chain(route_handlers).cloned().collect();

        let mut request = Request::new(parts, params, RawBody::new(body));
        let mut response = Response::new();

        let outcome = AssertUnwindSafe(chain::run(&chain, &mut request, &mut response)).catch_unwind().await;
        match outcome {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                error!(%method, path, cause = %e, "handler failed");
                return internal_server_error();
            }
            Err(panic) => {
                error!(%method, path, cause = panic_message(panic.as_ref()), "handler panicked");
                return internal_server_error();
            }
        }

        if response.has_rejected_writes() {
            error!(%method, path, "response was sent more than once");
            return internal_server_error();
        }

        if !response.is_finalized() {
            warn!(%method, path, "chain returned without sending a response, request left pending");
            return std::future::pending().await;
        }

        debug!(%method, path, status = response.status_code().as_u16(), "request served");
        response.into_http()
    }
}

fn internal_server_error() -> http::Response<ResponseBody> {
    Response::plain(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&'static str>() {
        *message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.as_str()
    } else {
        "unknown panic"
    }
}
