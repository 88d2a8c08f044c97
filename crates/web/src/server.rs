use std::convert::Infallible;
use std::io;
use std::net::{SocketAddr, ToSocketAddrs};
use std::sync::Arc;

use async_trait::async_trait;
use http::{Request, Response};
use syvex_http::connection::HttpConnection;
use syvex_http::handler::Handler;
use syvex_http::protocol::body::ReqBody;
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use crate::body::ResponseBody;
use crate::router::Router;

pub struct ServerBuilder {
    router: Option<Router>,
    address: Option<Result<Vec<SocketAddr>, String>>,
}

impl ServerBuilder {
    fn new() -> Self {
        Self { router: None, address: None }
    }

    pub fn address<A: ToSocketAddrs>(mut self, address: A) -> Self {
        self.address = Some(address.to_socket_addrs().map(Iterator::collect).map_err(|e| e.to_string()));
        self
    }

    pub fn router(mut self, router: Router) -> Self {
        self.router = Some(router);
        self
    }

    pub fn build(self) -> Result<Server, ServerBuildError> {
        let router = self.router.ok_or(ServerBuildError::MissingRouter)?;
        let address = self.address.ok_or(ServerBuildError::MissingAddress)?.map_err(ServerBuildError::InvalidAddress)?;
        if address.is_empty() {
            return Err(ServerBuildError::InvalidAddress("address resolved to nothing".to_owned()));
        }
        Ok(Server { router, address })
    }
}

impl std::fmt::Debug for ServerBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerBuilder").field("router", &self.router).field("address", &self.address).finish()
    }
}

/// Serves a [`Router`] over HTTP/1.1.
#[derive(Debug)]
pub struct Server {
    router: Router,
    address: Vec<SocketAddr>,
}

#[derive(Error, Debug)]
pub enum ServerBuildError {
    #[error("router must be set")]
    MissingRouter,
    #[error("address must be set")]
    MissingAddress,
    #[error("address is invalid: {0}")]
    InvalidAddress(String),
}

impl Server {
    pub fn builder() -> ServerBuilder {
        ServerBuilder::new()
    }

    /// Installs a `tracing` subscriber at `INFO` unless one is already set,
    /// then serves until the process stops. A failure to bind is logged.
    pub async fn start(self) {
        let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).finish();
        if tracing::subscriber::set_global_default(subscriber).is_err() {
            debug!("a global tracing subscriber is already installed");
        }

        let result = self.listen(|local_addr| info!(%local_addr, "start listening")).await;
        if let Err(e) = result {
            error!(cause = %e, "bind server error");
        }
    }

    /// Binds the configured address, calls `on_bound` with the bound address
    /// and accepts connections until the process stops.
    ///
    /// Only binding can fail; accept errors are logged and skipped.
    pub async fn listen<F>(self, on_bound: F) -> io::Result<()>
    where
        F: FnOnce(SocketAddr),
    {
        let tcp_listener = TcpListener::bind(self.address.as_slice()).await?;
        on_bound(tcp_listener.local_addr()?);

        let handler = Arc::new(self);
        loop {
            let (tcp_stream, remote_addr) = match tcp_listener.accept().await {
                Ok(stream_and_addr) => stream_and_addr,
                Err(e) => {
                    warn!(cause = %e, "failed to accept");
                    continue;
                }
            };

            let handler = Arc::clone(&handler);

            tokio::spawn(async move {
                let (reader, writer) = tcp_stream.into_split();
                let connection = HttpConnection::new(reader, writer);
                match connection.process(handler).await {
                    Ok(_) => {
                        debug!(%remote_addr, "finished process, connection shutdown");
                    }
                    Err(e) => {
                        error!(%remote_addr, "service has error, cause {}, connection shutdown", e);
                    }
                }
            });
        }
    }
}

#[async_trait]
impl Handler for Server {
    type RespBody = ResponseBody;
    type Error = Infallible;

    async fn call(&self, req: Request<ReqBody>) -> Result<Response<Self::RespBody>, Self::Error> {
        Ok(self.router.dispatch(req).await)
    }
}

impl Router {
    /// Serves this router on `address`, calling `on_bound` once the socket is bound.
    pub async fn listen<A, F>(self, address: A, on_bound: F) -> io::Result<()>
    where
        A: ToSocketAddrs,
        F: FnOnce(SocketAddr),
    {
        let server = Server::builder()
            .router(self)
            .address(address)
            .build()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        server.listen(on_bound).await
    }
}
