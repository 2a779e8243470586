//! Password policy and Argon2id hashing.

use std::sync::LazyLock;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

/// Minimum password length, in characters.
pub const MIN_PASSWORD_LENGTH: usize = 6;
/// Maximum password length, in characters.
pub const MAX_PASSWORD_LENGTH: usize = 4096;

/// Errors from the password policy or hashing.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PasswordError {
    #[error("password must be at least {MIN_PASSWORD_LENGTH} characters")]
    TooShort,
    #[error("password must be at most {MAX_PASSWORD_LENGTH} characters")]
    TooLong,
    #[error("passwords do not match")]
    Mismatch,
    #[error("password hashing failed")]
    Hash,
    #[error("password does not match")]
    Invalid,
}

/// Check a new password against the policy.
///
/// # Errors
///
/// Returns `TooShort`/`TooLong` for length violations, checked first, and
/// `Mismatch` when the confirmation differs.
pub fn validate_new_password(password: &str, confirmation: &str) -> Result<(), PasswordError> {
    let len = password.chars().count();
    if len < MIN_PASSWORD_LENGTH {
        return Err(PasswordError::TooShort);
    }
    if len > MAX_PASSWORD_LENGTH {
        return Err(PasswordError::TooLong);
    }
    if password != confirmation {
        return Err(PasswordError::Mismatch);
    }
    Ok(())
}

/// Hash a password using Argon2id with a random salt.
///
/// # Errors
///
/// Returns `PasswordError::Hash` if Argon2 rejects the input.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| PasswordError::Hash)
}

/// Verify a password against a stored PHC hash.
///
/// # Errors
///
/// Returns `PasswordError::Invalid` if the hash is malformed or does not match.
pub fn verify_password(password: &str, hash: &str) -> Result<(), PasswordError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| PasswordError::Invalid)?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| PasswordError::Invalid)
}

/// Hash of a random secret nobody knows, made with the same parameters as
/// real hashes.
static DECOY_HASH: LazyLock<Option<String>> = LazyLock::new(|| {
    let secret: [u8; 16] = rand::random();
    hash_password(&hex::encode(secret)).ok()
});

/// Run a full Argon2 verification that always fails.
///
/// Call this when the account is unknown so the response takes as long as
/// a wrong password on a real account.
pub fn verify_decoy(password: &str) {
    if let Some(hash) = DECOY_HASH.as_deref() {
        let _ = verify_password(password, hash);
    }
}

/// A one-time password handed out by a back-office reset: 8 random bytes
/// as 16 lowercase hex characters.
#[must_use]
pub fn generate_temporary_password() -> String {
    let bytes: [u8; 8] = rand::random();
    hex::encode(bytes)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_bounds() {
        assert_eq!(validate_new_password("12345", "12345"), Err(PasswordError::TooShort));
        assert!(validate_new_password("123456", "123456").is_ok());
        let long = "x".repeat(MAX_PASSWORD_LENGTH + 1);
        assert_eq!(validate_new_password(&long, &long), Err(PasswordError::TooLong));
    }

    #[test]
    fn test_policy_counts_characters() {
        assert!(validate_new_password("éééééé", "éééééé").is_ok());
    }

    #[test]
    fn test_policy_requires_confirmation() {
        assert_eq!(
            validate_new_password("secret1", "secret2"),
            Err(PasswordError::Mismatch)
        );
    }

    #[test]
    fn test_hash_then_verify() {
        let hash = hash_password("correct horse").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("correct horse", &hash).is_ok());
        assert_eq!(verify_password("wrong horse", &hash), Err(PasswordError::Invalid));
    }

    #[test]
    fn test_decoy_hash_is_real_and_rejects() {
        let hash = DECOY_HASH.as_deref().unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert_eq!(verify_password("", hash), Err(PasswordError::Invalid));
        assert_eq!(verify_password("password", hash), Err(PasswordError::Invalid));
        verify_decoy("password");
    }

    #[test]
    fn test_verify_rejects_malformed_hash() {
        assert_eq!(verify_password("x", "not-a-hash"), Err(PasswordError::Invalid));
    }

    #[test]
    fn test_temporary_password_shape() {
        let pw = generate_temporary_password();
        assert_eq!(pw.len(), 16);
        assert!(pw.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert_ne!(pw, generate_temporary_password());
    }
}
