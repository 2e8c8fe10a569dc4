//! Signed access and refresh tokens.
//!
//! Both tokens are HS256 JWTs signed with the same secret. The access token
//! carries the user's identity and lasts 24 hours; the refresh token carries
//! only the user id and lasts 7 days. A `typ` claim tells them apart, and only
//! access tokens open protected routes.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use ecom_cart_core::{Email, UserId};

use super::AuthError;

/// Lifetime of an access token, in hours.
pub const ACCESS_TOKEN_TTL_HOURS: i64 = 24;
/// Lifetime of a refresh token, in days.
pub const REFRESH_TOKEN_TTL_DAYS: i64 = 7;

/// Which of the pair a token is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// Token payload.
///
/// Refresh tokens leave the identity fields unset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: UserId,
    #[serde(rename = "typ")]
    pub kind: TokenKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    /// Expiry, seconds since the Unix epoch.
    pub exp: i64,
}

/// A freshly issued access/refresh pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// Identity embedded in an access token.
#[derive(Debug, Clone, Copy)]
pub struct TokenSubject<'a> {
    pub user_id: UserId,
    pub email: &'a Email,
    pub first_name: &'a str,
    pub last_name: &'a str,
}

/// Issues and validates tokens with one shared secret.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService").finish_non_exhaustive()
    }
}

impl TokenService {
    /// Create a service signing with `secret`.
    #[must_use]
    pub fn new(secret: &SecretString) -> Self {
        let bytes = secret.expose_secret().as_bytes();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            encoding_key: EncodingKey::from_secret(bytes),
            decoding_key: DecodingKey::from_secret(bytes),
            validation,
        }
    }

    /// Issue an access/refresh pair for `subject`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::TokenSigning` if encoding fails.
    pub fn issue(&self, subject: TokenSubject<'_>) -> Result<TokenPair, AuthError> {
        self.issue_at(subject, Utc::now())
    }

    pub(crate) fn issue_at(
        &self,
        subject: TokenSubject<'_>,
        now: DateTime<Utc>,
    ) -> Result<TokenPair, AuthError> {
        let access = Claims {
            user_id: subject.user_id,
            kind: TokenKind::Access,
            email: Some(subject.email.as_str().to_owned()),
            first_name: Some(subject.first_name.to_owned()),
            last_name: Some(subject.last_name.to_owned()),
            exp: (now + Duration::hours(ACCESS_TOKEN_TTL_HOURS)).timestamp(),
        };
        let refresh = Claims {
            user_id: subject.user_id,
            kind: TokenKind::Refresh,
            email: None,
            first_name: None,
            last_name: None,
            exp: (now + Duration::days(REFRESH_TOKEN_TTL_DAYS)).timestamp(),
        };

        Ok(TokenPair {
            access: self.sign(&access)?,
            refresh: self.sign(&refresh)?,
        })
    }

    fn sign(&self, claims: &Claims) -> Result<String, AuthError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key).map_err(|e| {
            tracing::error!(error = %e, "Failed to sign token");
            AuthError::TokenSigning
        })
    }

    /// Check the signature and expiry of `token` and return its claims.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::TokenExpired` for an expired token and
    /// `AuthError::InvalidToken` for anything else that fails to verify.
    pub fn validate(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken,
            })
    }

    /// Like [`validate`](Self::validate), but only accepts access tokens.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` for a refresh token, otherwise as
    /// [`validate`](Self::validate).
    pub fn validate_access(&self, token: &str) -> Result<Claims, AuthError> {
        let claims = self.validate(token)?;
        if claims.kind != TokenKind::Access {
            return Err(AuthError::InvalidToken);
        }
        Ok(claims)
    }
}
