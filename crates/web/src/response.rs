//! The response side of the facade: a builder that is finalized exactly once.

use bytes::Bytes;
use http::header::{CONTENT_TYPE, HeaderName, HeaderValue};
use http::{HeaderMap, StatusCode};
use serde::Serialize;
use tracing::{error, warn};

use crate::body::ResponseBody;
use crate::error::ResponseError;

fn text_plain_utf_8() -> HeaderValue {
    HeaderValue::from_static("text/plain; charset=utf-8")
}

fn application_json() -> HeaderValue {
    HeaderValue::from_static("application/json")
}

/// Bytes written by a finalizing call, as is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Payload(Bytes);

impl From<&str> for Payload {
    fn from(value: &str) -> Self {
        Self(Bytes::copy_from_slice(value.as_bytes()))
    }
}

impl From<String> for Payload {
    fn from(value: String) -> Self {
        Self(Bytes::from(value))
    }
}

impl From<Bytes> for Payload {
    fn from(value: Bytes) -> Self {
        Self(value)
    }
}

impl From<Vec<u8>> for Payload {
    fn from(value: Vec<u8>) -> Self {
        Self(Bytes::from(value))
    }
}

impl From<()> for Payload {
    fn from(_: ()) -> Self {
        Self::default()
    }
}

/// Outbound status, headers and body of one request.
///
/// `send`, `json` and `end` finalize the response. Only the first finalizing
/// call takes effect; later ones fail with [`ResponseError::AlreadySent`]
/// and are remembered, so the dispatcher can answer `500` instead.
#[derive(Debug)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
    finalized: bool,
    rejected_writes: usize,
}

impl Response {
    pub(crate) fn new() -> Self {
        Self { status: StatusCode::OK, headers: HeaderMap::new(), body: Bytes::new(), finalized: false, rejected_writes: 0 }
    }

    /// Sets the status code. The last call before finalizing wins.
    pub fn status(&mut self, status: StatusCode) -> &mut Self {
        if self.finalized {
            warn!(%status, "status change after the response was sent is ignored");
        } else {
            self.status = status;
        }
        self
    }

    pub fn status_code(&self) -> StatusCode {
        self.status
    }

    pub fn set_header<K, V>(&mut self, name: K, value: V) -> Result<&mut Self, ResponseError>
    where
        K: TryInto<HeaderName>,
        K::Error: std::fmt::Display,
        V: TryInto<HeaderValue>,
        V::Error: std::fmt::Display,
    {
        if self.finalized {
            return Err(ResponseError::AlreadySent);
        }
        let name = name.try_into().map_err(ResponseError::invalid_header)?;
        let value = value.try_into().map_err(ResponseError::invalid_header)?;
        self.headers.insert(name, value);
        Ok(self)
    }

    pub fn header(&self, name: impl http::header::AsHeaderName) -> Option<&HeaderValue> {
        self.headers.get(name)
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Writes `payload` and finalizes, defaulting the content type to plain text.
    pub fn send(&mut self, payload: impl Into<Payload>) -> Result<(), ResponseError> {
        self.ensure_writable()?;
        if !self.headers.contains_key(CONTENT_TYPE) {
            self.headers.insert(CONTENT_TYPE, text_plain_utf_8());
        }
        self.finalize(payload.into());
        Ok(())
    }

    /// Serializes `value` as JSON and finalizes with an `application/json` content type.
    ///
    /// A serialization failure leaves the response untouched.
    pub fn json<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), ResponseError> {
        self.ensure_writable()?;
        let bytes = serde_json::to_vec(value)?;
        self.headers.insert(CONTENT_TYPE, application_json());
        self.finalize(Payload::from(bytes));
        Ok(())
    }

    /// Sets the status and adds `headers` without finalizing; pair with [`Response::end`].
    pub fn write_head(&mut self, status: StatusCode, headers: HeaderMap) -> Result<&mut Self, ResponseError> {
        self.ensure_writable()?;
        self.status = status;
        self.headers.extend(headers);
        Ok(self)
    }

    /// Writes `payload` and finalizes without touching any header.
    pub fn end(&mut self, payload: impl Into<Payload>) -> Result<(), ResponseError> {
        self.ensure_writable()?;
        self.finalize(payload.into());
        Ok(())
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    fn ensure_writable(&mut self) -> Result<(), ResponseError> {
        if self.finalized {
            self.rejected_writes += 1;
            error!(status = %self.status, "response has already been sent");
            return Err(ResponseError::AlreadySent);
        }
        Ok(())
    }

    fn finalize(&mut self, Payload(bytes): Payload) {
        self.body = bytes;
        self.finalized = true;
    }

    pub(crate) fn has_rejected_writes(&self) -> bool {
        self.rejected_writes > 0
    }

    pub(crate) fn into_http(self) -> http::Response<ResponseBody> {
        let mut response = http::Response::new(ResponseBody::once(self.body));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }

    /// A finalized plain text response, used for the answers the router gives on its own.
    pub(crate) fn plain(status: StatusCode, text: &'static str) -> http::Response<ResponseBody> {
        let mut response = Response::new();
        response.status = status;
        response.headers.insert(CONTENT_TYPE, text_plain_utf_8());
        response.finalize(Payload(Bytes::from_static(text.as_bytes())));
        response.into_http()
    }
}
