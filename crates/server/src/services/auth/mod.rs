//! Authentication service.
//!
//! Provides signup and password login, issuing a fresh token pair on each.

mod error;
pub mod password;
pub mod tokens;

pub use error::AuthError;
pub use password::{burn_password_check, check_password, hash_password};
pub use tokens::{Claims, TokenKind, TokenPair, TokenService, TokenSubject};

use std::time::Duration;

use chrono::Utc;
use serde::Deserialize;

use ecom_cart_core::{Email, Phone, UserId};

use crate::db::{EMAIL_TAKEN, PHONE_TAKEN, RepositoryError, Store, with_deadline};
use crate::models::{User, UserProfile};

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 6;
/// Allowed name length, in characters.
const NAME_LENGTH: std::ops::RangeInclusive<usize> = 2..=100;

/// Signup form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SignUpRequest {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
}

/// Login form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Authentication service.
///
/// Handles user registration and login against any [`Store`].
pub struct AuthService<'a> {
    store: &'a dyn Store,
    tokens: &'a TokenService,
    timeout: Duration,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(store: &'a dyn Store, tokens: &'a TokenService, timeout: Duration) -> Self {
        Self {
            store,
            tokens,
            timeout,
        }
    }

    /// Register a new user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation`, `InvalidEmail` or `InvalidPhone` for bad input.
    /// Returns `AuthError::DuplicateEmail` or `DuplicatePhone` if either is taken.
    /// Returns `AuthError::Repository` if a store call fails or times out.
    #[tracing::instrument(skip(self, request), fields(email = %request.email))]
    pub async fn sign_up(&self, request: SignUpRequest) -> Result<UserProfile, AuthError> {
        let first_name = validate_name("first_name", &request.first_name)?;
        let last_name = validate_name("last_name", &request.last_name)?;
        validate_password(&request.password)?;
        let email = Email::parse(&request.email)?;
        let phone = Phone::parse(&request.phone)?;

        if with_deadline(self.timeout, self.store.email_exists(&email)).await? {
            return Err(AuthError::DuplicateEmail);
        }
        if with_deadline(self.timeout, self.store.phone_exists(&phone)).await? {
            return Err(AuthError::DuplicatePhone);
        }

        let password_hash = hash_password(&request.password)?;
        let now = Utc::now();
        let mut user = User {
            id: UserId::generate(),
            first_name,
            last_name,
            email,
            phone,
            password_hash,
            token: None,
            refresh_token: None,
            created_at: now,
            updated_at: now,
        };

        let pair = self.tokens.issue(subject(&user))?;
        user.token = Some(pair.access.clone());
        user.refresh_token = Some(pair.refresh.clone());

        // The pre-checks race with concurrent signups; the unique constraints decide.
        with_deadline(self.timeout, self.store.insert_user(&user))
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(field) if field == PHONE_TAKEN => {
                    AuthError::DuplicatePhone
                }
                RepositoryError::Conflict(field) if field == EMAIL_TAKEN => {
                    AuthError::DuplicateEmail
                }
                other => AuthError::Repository(other),
            })?;

        tracing::info!(user_id = %user.id, "User signed up");
        Ok(UserProfile::new(&user, pair.access, pair.refresh))
    }

    /// Log in with email and password, issuing and storing a new token pair.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email is malformed or unknown,
    /// or the password does not match.
    /// Returns `AuthError::Repository` if a store call fails or times out.
    #[tracing::instrument(skip(self, request), fields(email = %request.email))]
    pub async fn login(&self, request: LoginRequest) -> Result<UserProfile, AuthError> {
        let Ok(email) = Email::parse(&request.email) else {
            burn_password_check(&request.password);
            return Err(AuthError::InvalidCredentials);
        };

        let found = with_deadline(self.timeout, self.store.find_user_by_email(&email)).await?;
        let Some(user) = found else {
            burn_password_check(&request.password);
            return Err(AuthError::InvalidCredentials);
        };

        if !check_password(&request.password, &user.password_hash) {
            tracing::debug!(user_id = %user.id, "Password mismatch");
            return Err(AuthError::InvalidCredentials);
        }

        let pair = self.tokens.issue(subject(&user))?;
        with_deadline(
            self.timeout,
            self.store
                .update_tokens(user.id, &pair.access, &pair.refresh, Utc::now()),
        )
        .await
        .map_err(|e| match e {
            // Deleted between lookup and update.
            RepositoryError::NotFound => AuthError::InvalidCredentials,
            other => AuthError::Repository(other),
        })?;

        tracing::info!(user_id = %user.id, "User logged in");
        Ok(UserProfile::new(&user, pair.access, pair.refresh))
    }
}

fn subject(user: &User) -> TokenSubject<'_> {
    TokenSubject {
        user_id: user.id,
        email: &user.email,
        first_name: &user.first_name,
        last_name: &user.last_name,
    }
}

fn validate_name(field: &str, value: &str) -> Result<String, AuthError> {
    let value = value.trim();
    if !NAME_LENGTH.contains(&value.chars().count()) {
        return Err(AuthError::Validation(format!(
            "{field} must be between {} and {} characters",
            NAME_LENGTH.start(),
            NAME_LENGTH.end()
        )));
    }
    Ok(value.to_owned())
}

fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::Validation(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}
