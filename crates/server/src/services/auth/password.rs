//! Password hashing.

use std::sync::LazyLock;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use super::AuthError;

/// Hash a password with Argon2id and a random salt, returning the PHC string.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Check a password against a stored hash.
///
/// A malformed hash never matches.
#[must_use]
pub fn check_password(password: &str, hash: &str) -> bool {
    let Ok(parsed_hash) = PasswordHash::new(hash) else {
        return false;
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

/// Hash checked against when no account matched, so unknown emails cost as
/// much as wrong passwords.
static DUMMY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("no-account-matches-this").ok());

/// Run a full verification that cannot succeed.
pub fn burn_password_check(password: &str) {
    if let Some(hash) = DUMMY_HASH.as_deref() {
        let _ = check_password(password, hash);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_not_plaintext() {
        let hash = hash_password("secret1").unwrap();
        assert_ne!(hash, "secret1");
        assert!(hash.starts_with("$argon2id$"));
    }

    #[test]
    fn test_check_password() {
        let hash = hash_password("secret1").unwrap();
        assert!(check_password("secret1", &hash));
        assert!(!check_password("secret2", &hash));
        assert!(!check_password("", &hash));
    }

    #[test]
    fn test_same_password_gets_distinct_salts() {
        let a = hash_password("secret1").unwrap();
        let b = hash_password("secret1").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_malformed_hash_never_matches() {
        assert!(!check_password("secret1", "not-a-phc-string"));
        assert!(!check_password("secret1", ""));
    }

    #[test]
    fn test_dummy_hash_is_a_real_argon2_hash() {
        let hash = DUMMY_HASH.as_deref().unwrap();
        assert!(PasswordHash::new(hash).is_ok());
        assert!(!check_password("secret1", hash));
        burn_password_check("secret1");
    }
}
