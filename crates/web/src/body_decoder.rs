//! Built-in middleware that buffers the request body and decodes it as JSON.

use async_trait::async_trait;
use bytes::BytesMut;
use tracing::{debug, warn};

use crate::body::BodyEvent;
use crate::chain::Next;
use crate::error::HandlerResult;
use crate::middleware::Middleware;
use crate::request::Request;
use crate::response::Response;

/// Bodies larger than this are left undecoded unless configured otherwise.
pub const DEFAULT_JSON_LIMIT: usize = 1024 * 1024;

/// Reads the whole request body and, when it parses as JSON, stores the value
/// as [`Request::body`].
///
/// A body that is empty, too large, not UTF-8 or not JSON leaves
/// `Request::body` unset. The chain advances in every case.
#[derive(Debug, Clone, Copy)]
pub struct JsonBody {
    limit: usize,
}

/// A [`JsonBody`] with the default size limit.
pub fn json_body() -> JsonBody {
    JsonBody::default()
}

impl JsonBody {
    pub fn with_limit(limit: usize) -> Self {
        Self { limit }
    }

    async fn decode(&self, req: &mut Request) {
        let Some(mut raw_body) = req.take_raw_body() else {
            debug!("request body already taken, nothing to decode");
            return;
        };

        let mut buffer = BytesMut::new();
        loop {
            match raw_body.next_event().await {
                Ok(BodyEvent::Data(bytes)) => {
                    if buffer.len() + bytes.len() > self.limit {
                        warn!(limit = self.limit, "request body exceeds the json limit, left undecoded");
                        return;
                    }
                    buffer.extend_from_slice(&bytes);
                }
                Ok(BodyEvent::End) => break,
                Err(e) => {
                    warn!(cause = %e, "failed to read request body");
                    return;
                }
            }
        }

        if buffer.is_empty() {
            return;
        }

        let text = match std::str::from_utf8(&buffer) {
            Ok(text) => text,
            Err(e) => {
                debug!(cause = %e, "request body is not utf-8, left undecoded");
                return;
            }
        };

        match serde_json::from_str(text) {
            Ok(value) => req.set_body(value),
            Err(e) => debug!(cause = %e, "request body is not json, left undecoded"),
        }
    }
}

impl Default for JsonBody {
    fn default() -> Self {
        Self::with_limit(DEFAULT_JSON_LIMIT)
    }
}

#[async_trait]
impl Middleware for JsonBody {
    async fn handle(&self, req: &mut Request, res: &mut Response, next: Next<'_>) -> HandlerResult {
        self.decode(req).await;
        next.advance(req, res).await
    }
}
