//! Error types for the todo API client.
//!
//! # Design
//! The service answers failures with `{message}` or `{message, error}` and a
//! handful of status codes. Each status the API documents gets a variant;
//! anything else lands in `HttpError` with the raw status and body.

use thiserror::Error;

/// Errors returned by `TodoClient` methods.
#[derive(Debug, Error)]
pub enum ApiError {
    /// 404: no todo carries the requested id.
    #[error("todo not found")]
    NotFound,

    /// 400: the id or payload was rejected.
    #[error("bad request: {message}")]
    BadRequest { message: String },

    /// 422: validation on update failed, or the store failed. `error` holds
    /// the store's cause when there is one.
    #[error("unprocessable: {message}")]
    Unprocessable {
        message: String,
        error: Option<String>,
    },

    /// Any other unexpected status.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    #[error("serialization failed: {0}")]
    SerializationError(String),
}
