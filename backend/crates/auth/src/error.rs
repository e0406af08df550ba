//! Auth Error Types
//!
//! This module provides auth-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.

use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use query::QueryError;
use thiserror::Error;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Auth-specific error variants
#[derive(Debug, Error)]
pub enum AuthError {
    /// Input rejected before touching the store
    #[error("Validation failed: {0}")]
    Validation(String),

    /// User name already exists
    #[error("User name already exists")]
    DuplicateUsername,

    /// Unknown user or wrong password. The two are never distinguished.
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// Lookup miss. Never leaves the crate as a login outcome.
    #[error("Not found")]
    NotFound,

    /// Backing store unavailable
    #[error("Storage unavailable: {0}")]
    Connection(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::Validation(_) => ErrorKind::BadRequest,
            AuthError::DuplicateUsername => ErrorKind::Conflict,
            AuthError::InvalidCredentials => ErrorKind::Unauthorized,
            AuthError::NotFound => ErrorKind::NotFound,
            AuthError::Connection(_) => ErrorKind::ServiceUnavailable,
            AuthError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Convert to AppError. Server-side details stay in the logs.
    pub fn to_app_error(&self) -> AppError {
        match self {
            AuthError::Connection(_) => AppError::service_unavailable("Service temporarily unavailable")
                .with_action("Please try again later"),
            AuthError::Internal(_) => AppError::internal("Internal error"),
            _ => AppError::new(self.kind(), self.to_string()),
        }
    }

    /// Log the error with appropriate level
    pub fn log(&self) {
        match self {
            AuthError::Connection(msg) => {
                tracing::error!(message = %msg, "Auth storage unavailable");
            }
            AuthError::Internal(msg) => {
                tracing::error!(message = %msg, "Auth internal error");
            }
            AuthError::InvalidCredentials => {
                tracing::warn!("Invalid login attempt");
            }
            _ => {
                tracing::debug!(error = %self, "Auth error");
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

impl From<QueryError> for AuthError {
    fn from(err: QueryError) -> Self {
        match err {
            QueryError::Connection(msg) => AuthError::Connection(msg),
            other => AuthError::Internal(other.to_string()),
        }
    }
}
