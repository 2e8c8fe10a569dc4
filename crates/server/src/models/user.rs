//! User domain types.
//!
//! These types represent validated domain objects separate from database row types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use ecom_cart_core::{Email, Phone, UserId};

/// A shop user (domain type).
///
/// Holds the password hash, so it is never serialized directly. Use
/// [`UserProfile`] for anything that leaves the server.
#[derive(Debug, Clone)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    /// Login email, unique across users.
    pub email: Email,
    /// Contact phone, unique across users.
    pub phone: Phone,
    /// Argon2 PHC string.
    pub password_hash: String,
    /// Most recently issued access token.
    pub token: Option<String>,
    /// Most recently issued refresh token.
    pub refresh_token: Option<String>,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Public projection of a [`User`] returned by signup and login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserProfile {
    pub id: UserId,
    pub email: Email,
    pub first_name: String,
    pub last_name: String,
    pub token: String,
    pub refresh_token: String,
}

impl UserProfile {
    /// Build the projection for `user` with a freshly issued token pair.
    #[must_use]
    pub fn new(user: &User, token: String, refresh_token: String) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            token,
            refresh_token,
        }
    }
}
