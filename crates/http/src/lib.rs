//! The HTTP/1.1 transport used by `syvex`.
//!
//! This crate accepts raw bytes from a tokio stream, decodes them into
//! [`http::Request`]s whose body is a [`protocol::body::ReqBody`], hands each
//! request to a [`handler::Handler`] and writes back the produced
//! [`http::Response`]. It knows nothing about routing: it only delivers a
//! request/response pair to whoever implements [`handler::Handler`].
//!
//! # Example
//!
//! ```no_run
//! use bytes::Bytes;
//! use http::{Request, Response, StatusCode};
//! use http_body_util::{BodyExt, Full};
//! use std::error::Error;
//! use std::sync::Arc;
//! use syvex_http::connection::HttpConnection;
//! use syvex_http::handler::make_handler;
//! use syvex_http::protocol::body::ReqBody;
//! use tokio::net::TcpListener;
//! use tracing::{error, info, warn};
//!
//! #[tokio::main]
//! async fn main() {
//!     let tcp_listener = match TcpListener::bind("127.0.0.1:8080").await {
//!         Ok(tcp_listener) => tcp_listener,
//!         Err(e) => {
//!             error!(cause = %e, "bind server error");
//!             return;
//!         }
//!     };
//!
//!     let handler = Arc::new(make_handler(echo));
//!
//!     loop {
//!         let (tcp_stream, _remote_addr) = match tcp_listener.accept().await {
//!             Ok(stream_and_addr) => stream_and_addr,
//!             Err(e) => {
//!                 warn!(cause = %e, "failed to accept");
//!                 continue;
//!             }
//!         };
//!
//!         let handler = handler.clone();
//!         tokio::spawn(async move {
//!             let (reader, writer) = tcp_stream.into_split();
//!             if let Err(e) = HttpConnection::new(reader, writer).process(handler).await {
//!                 error!("connection shutdown with error: {}", e);
//!             }
//!         });
//!     }
//! }
//!
//! async fn echo(request: Request<ReqBody>) -> Result<Response<Full<Bytes>>, Box<dyn Error + Send + Sync>> {
//!     info!(path = request.uri().path(), "echo request");
//!     let body = request.into_body().collect().await?.to_bytes();
//!     Ok(Response::builder().status(StatusCode::OK).body(Full::new(body))?)
//! }
//! ```
//!
//! # Limitations
//!
//! - HTTP/1.0 and HTTP/1.1 only
//! - No TLS support (use a reverse proxy for HTTPS)
//! - Maximum request head size: 8KB
//! - Maximum number of headers: 64

pub mod codec;
pub mod connection;
pub mod handler;
pub mod protocol;

mod utils;
pub(crate) use utils::ensure;
