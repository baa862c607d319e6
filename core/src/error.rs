//! Error types for the task tracker client.
//!
//! # Design
//! Client construction never fails, so nothing here is produced by the
//! factory. Errors appear only when an operation is issued: validation
//! against the format registry, the transport round-trip, then status and
//! body interpretation. `NotFound` keeps its own variant because callers
//! routinely branch on it.

use thiserror::Error;

/// Errors returned by `TasksClient` operations.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server returned 404.
    #[error("resource not found")]
    NotFound,

    /// The server returned a status other than the expected one or 404.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    #[error("serialization failed: {0}")]
    SerializationError(String),

    /// The payload was rejected before a request was built.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// A field failed a constraint or a format check.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: {reason}")]
    Constraint { field: String, reason: String },

    #[error("{field}: {value:?} is not a valid {format}")]
    InvalidFormat {
        field: String,
        format: String,
        value: String,
    },

    #[error("{field}: format {format} is not registered")]
    UnknownFormat { field: String, format: String },
}

/// Failures raised by a `ClientTransport` while executing a request.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("{method} {url} failed: {message}")]
    Request {
        method: &'static str,
        url: String,
        message: String,
    },

    #[error("reading response body failed: {0}")]
    Body(String),
}
