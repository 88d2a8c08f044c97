//! Error types surfaced by the router.
//!
//! Registration problems are [`ConfigurationError`]s and stop the router from
//! being built. Per-request failures never leave the request that caused them:
//! handler errors travel as [`BoxError`] and become `500` responses, misuse of
//! the response builder is reported as [`ResponseError`].

use std::error::Error;

use thiserror::Error;

/// Type-erased error a handler may return, the same shape the transport uses.
pub type BoxError = Box<dyn Error + Send + Sync>;

/// What every middleware and handler returns.
pub type HandlerResult = Result<(), BoxError>;

/// A route could not be registered.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("route `{path}` has no handlers")]
    EmptyHandlers { path: String },

    #[error("route path `{path}` must start with '/'")]
    MissingLeadingSlash { path: String },

    #[error("route path `{path}` has a ':' without a parameter name in segment {segment}")]
    EmptyParamName { path: String, segment: usize },

    #[error("route path `{path}` has a ':' that does not start segment {segment}")]
    MisplacedParam { path: String, segment: usize },

    #[error("route path `{path}` has an invalid parameter name `{name}`")]
    InvalidParamName { path: String, name: String },

    #[error("route path `{path}` declares the parameter `{name}` more than once")]
    DuplicateParamName { path: String, name: String },

    #[error("route path `{path}` could not be compiled: {reason}")]
    InvalidPattern { path: String, reason: String },
}

/// The response builder was used in a way that cannot be honoured.
#[derive(Debug, Error)]
pub enum ResponseError {
    #[error("response has already been sent")]
    AlreadySent,

    #[error("failed to serialize json payload: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("invalid header: {reason}")]
    InvalidHeader { reason: String },
}

impl ResponseError {
    pub(crate) fn invalid_header<S: ToString>(str: S) -> Self {
        Self::InvalidHeader { reason: str.to_string() }
    }
}
