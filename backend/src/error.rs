//! Error types for the Connect API.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use connect_common::ErrorBody;

use crate::store::StoreError;

/// Failures surfaced by the services and mapped to HTTP by the router.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Referenced user or connection does not exist.
    #[error("{0}")]
    NotFound(String),

    /// Duplicate connection or an already-accepted connection.
    #[error("{0}")]
    Conflict(String),

    /// The caller lacks the role the operation requires.
    #[error("{0}")]
    Forbidden(String),

    /// Operation that can never succeed, e.g. connecting with yourself.
    #[error("{0}")]
    InvalidOperation(String),

    /// Malformed or incomplete input.
    #[error("{0}")]
    InvalidRequest(String),

    #[error("{0}")]
    Unauthenticated(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    pub fn status(&self) -> StatusCode {
        match self {
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            // Duplicates and repeated accepts share 400 with validation errors.
            Error::Conflict(_) => StatusCode::BAD_REQUEST,
            Error::Forbidden(_) => StatusCode::FORBIDDEN,
            Error::InvalidOperation(_) => StatusCode::BAD_REQUEST,
            Error::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Error::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for Error {
    fn from(err: StoreError) -> Self {
        Error::Internal(err.to_string())
    }
}

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Error::InvalidRequest(rejection.body_text())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            Error::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

pub type Result<T> = std::result::Result<T, Error>;
