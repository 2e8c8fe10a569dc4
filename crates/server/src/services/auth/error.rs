//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// A signup field failed validation.
    #[error("{0}")]
    Validation(String),

    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] ecom_cart_core::EmailError),

    /// Invalid phone format.
    #[error("invalid phone: {0}")]
    InvalidPhone(#[from] ecom_cart_core::PhoneError),

    /// Another user already has this email.
    #[error("this email already exists")]
    DuplicateEmail,

    /// Another user already has this phone number.
    #[error("this phone number is already in use")]
    DuplicatePhone,

    /// Invalid credentials (wrong password or user not found).
    #[error("login or password is incorrect")]
    InvalidCredentials,

    /// No token on a protected request.
    #[error("no authorization header provided")]
    MissingToken,

    #[error("invalid token")]
    InvalidToken,

    #[error("token expired")]
    TokenExpired,

    /// A valid token used on another user's resources.
    #[error("token does not belong to this user")]
    WrongUser,

    /// JWT encoding failed.
    #[error("token signing error")]
    TokenSigning,

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}
