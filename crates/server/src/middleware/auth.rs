//! Authentication extractor.
//!
//! Protected routes take a [`RequireAuth`] argument. The access token is read
//! from the `token` header, falling back to `Authorization: Bearer <token>`.
//! Handlers that act on a user named in the query call
//! [`RequireAuth::authorize`] once they have parsed the id.

use axum::{extract::FromRequestParts, http::request::Parts};

use ecom_cart_core::UserId;

use crate::error::{AppError, set_sentry_user};
use crate::services::auth::{AuthError, Claims};
use crate::state::AppState;

/// Header carrying the raw access token.
pub const TOKEN_HEADER: &str = "token";

/// Extractor that requires a valid, unexpired access token.
///
/// Rejects with a 401 JSON error when the token is missing, malformed,
/// signed with another key, expired, or a refresh token.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(RequireAuth(claims): RequireAuth) -> String {
///     format!("Hello, {}!", claims.user_id)
/// }
/// ```
pub struct RequireAuth(pub Claims);

impl RequireAuth {
    /// Check that the token was issued to `user_id`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::WrongUser` for any other user.
    pub fn authorize(&self, user_id: UserId) -> Result<(), AuthError> {
        if self.0.user_id == user_id {
            Ok(())
        } else {
            tracing::debug!(
                token_user = %self.0.user_id,
                %user_id,
                "Token used for another user"
            );
            Err(AuthError::WrongUser)
        }
    }
}

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(AuthError::MissingToken)?;
        let claims = state.tokens().validate_access(token)?;

        set_sentry_user(&claims.user_id);
        Ok(Self(claims))
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    if let Some(token) = parts
        .headers
        .get(TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|t| !t.is_empty())
    {
        return Some(token);
    }

    parts
        .headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}
