//! Error types for the Mesto client.
//!
//! # Design
//! `ApiError` covers a single request/response exchange: the transport could
//! fail, the server could answer with a non-2xx status, or a payload could
//! fail to (de)serialize. `StoreError` covers the token store and `AppError`
//! is what the application façade hands back to its caller.

use thiserror::Error;

/// Errors produced while building, executing or parsing a request.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request could not be sent or the response could not be read.
    #[error("network error: {0}")]
    NetworkError(String),

    /// The server answered with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::HttpError { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Transient failures: the same request may succeed later.
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::NetworkError(_) => true,
            ApiError::HttpError { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }

    /// Terminal 4xx answers: the server understood and refused the request.
    pub fn is_rejection(&self) -> bool {
        matches!(self, ApiError::HttpError { status, .. } if (400..500).contains(status) && *status != 429)
    }
}

/// Errors from a `TokenStore`.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("token store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("token store is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Errors surfaced by `App` operations.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("current user is not loaded")]
    NoCurrentUser,

    #[error("card {0} is not in the gallery")]
    UnknownCard(String),
}
