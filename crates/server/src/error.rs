//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers return `Result<T, AppError>`,
//! and every error reaches the client as a JSON body:
//!
//! ```json
//! {"error": "user not found", "kind": "not_found"}
//! ```

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::ShopError;
use crate::services::auth::AuthError;

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Store operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Cart, address, order or catalog operation failed.
    #[error("Shop error: {0}")]
    Shop(#[from] ShopError),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Endpoint exists but has no behavior yet.
    #[error("not implemented")]
    NotImplemented,
}

/// Machine-readable error category in the response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    Conflict,
    Auth,
    NotFound,
    NotImplemented,
    Internal,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    kind: ErrorKind,
}

const INTERNAL_MESSAGE: &str = "Internal server error";

impl AppError {
    /// Status, category and client-safe message for this error.
    fn classify(&self) -> (StatusCode, ErrorKind, String) {
        use ErrorKind as K;
        use StatusCode as S;

        let internal = (S::INTERNAL_SERVER_ERROR, K::Internal, INTERNAL_MESSAGE.to_owned());

        match self {
            Self::Database(_) => internal,
            Self::Auth(err) => match err {
                AuthError::Validation(_)
                | AuthError::InvalidEmail(_)
                | AuthError::InvalidPhone(_) => (S::BAD_REQUEST, K::Validation, err.to_string()),
                AuthError::DuplicateEmail | AuthError::DuplicatePhone => {
                    (S::BAD_REQUEST, K::Conflict, err.to_string())
                }
                AuthError::InvalidCredentials
                | AuthError::MissingToken
                | AuthError::InvalidToken
                | AuthError::TokenExpired
                | AuthError::WrongUser => (S::UNAUTHORIZED, K::Auth, err.to_string()),
                AuthError::TokenSigning | AuthError::PasswordHash | AuthError::Repository(_) => {
                    internal
                }
            },
            Self::Shop(err) => match err {
                ShopError::InvalidInput(_)
                | ShopError::InvalidAddress(_)
                | ShopError::InvalidProduct(_)
                | ShopError::EmptyCart => (S::BAD_REQUEST, K::Validation, err.to_string()),
                ShopError::UserNotFound
                | ShopError::ProductNotFound
                | ShopError::ItemNotInCart
                | ShopError::AddressNotFound
                | ShopError::NoProducts => (S::NOT_FOUND, K::NotFound, err.to_string()),
                ShopError::Repository(_) => internal,
            },
            Self::BadRequest(msg) => (S::BAD_REQUEST, K::Validation, msg.clone()),
            Self::NotImplemented => (S::NOT_IMPLEMENTED, K::NotImplemented, self.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, kind, message) = self.classify();

        // Capture server errors to Sentry
        if kind == ErrorKind::Internal {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "Request rejected");
        }

        (
            status,
            Json(ErrorBody {
                error: message,
                kind,
            }),
        )
            .into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            ..Default::default()
        }));
    });
}
