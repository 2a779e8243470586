//! Admin user management commands.
//!
//! # Usage
//!
//! ```bash
//! # Create a new admin with a generated temporary password
//! auxilia admin create -e admin@example.com -f Ada -l Lovelace
//!
//! # Promote an existing customer account, keeping its password
//! auxilia admin create -e customer@example.com
//!
//! # Set the password explicitly
//! auxilia admin create -e admin@example.com -p 'correct horse battery staple'
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` - `PostgreSQL` connection string

use auxilia_core::password::{generate_temporary_password, hash_password, validate_new_password};
use auxilia_core::{Email, FieldTooLong, PasswordError, ProfileFields, UserRole};
use sqlx::PgPool;
use thiserror::Error;

use super::{ConnectError, connect};

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    #[error(transparent)]
    Connect(#[from] ConnectError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Invalid email.
    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    /// A name is longer than the column allows.
    #[error("Invalid name: {0}")]
    InvalidName(#[from] FieldTooLong),

    /// Password rejected by the policy, or hashing failed.
    #[error("Invalid password: {0}")]
    Password(#[from] PasswordError),
}

/// Validated command input.
#[derive(Debug)]
struct AdminRequest {
    email: Email,
    profile: ProfileFields,
    password: Option<String>,
}

impl AdminRequest {
    fn new(
        email: &str,
        first_name: Option<&str>,
        last_name: Option<&str>,
        password: Option<&str>,
    ) -> Result<Self, AdminError> {
        let email = Email::parse(email).map_err(|e| AdminError::InvalidEmail(e.to_string()))?;

        let profile = ProfileFields {
            first_name: first_name.map(str::to_owned),
            last_name: last_name.map(str::to_owned),
            ..ProfileFields::default()
        }
        .normalized();
        profile.validate()?;

        if let Some(password) = password {
            validate_new_password(password, password)?;
        }

        Ok(Self {
            email,
            profile,
            password: password.map(str::to_owned),
        })
    }
}

/// Create an admin user, or promote the account that already owns the email.
///
/// A promoted account is reactivated. Its names and password change only
/// when given on the command line.
///
/// # Returns
///
/// The ID of the admin user.
pub async fn create_user(
    email: &str,
    first_name: Option<&str>,
    last_name: Option<&str>,
    password: Option<&str>,
) -> Result<i32, AdminError> {
    let request = AdminRequest::new(email, first_name, last_name, password)?;
    let pool = connect().await?;

    let existing: Option<i32> = sqlx::query_scalar("SELECT id FROM users WHERE email = $1")
        .bind(request.email.as_str())
        .fetch_optional(&pool)
        .await?;

    match existing {
        Some(id) => promote(&pool, id, &request).await,
        None => insert(&pool, &request).await,
    }
}

async fn promote(pool: &PgPool, id: i32, request: &AdminRequest) -> Result<i32, AdminError> {
    let password_hash = request
        .password
        .as_deref()
        .map(hash_password)
        .transpose()?;

    sqlx::query(
        r"
        UPDATE users
        SET role = $2,
            is_active = TRUE,
            first_name = COALESCE($3, first_name),
            last_name = COALESCE($4, last_name),
            password_hash = COALESCE($5, password_hash),
            updated_at = NOW()
        WHERE id = $1
        ",
    )
    .bind(id)
    .bind(UserRole::Admin)
    .bind(request.profile.first_name.as_deref())
    .bind(request.profile.last_name.as_deref())
    .bind(password_hash)
    .execute(pool)
    .await?;

    tracing::info!(
        "Existing account promoted to admin! ID: {}, Email: {}",
        id,
        request.email
    );
    if request.password.is_none() {
        tracing::info!("Password unchanged");
    }

    Ok(id)
}

async fn insert(pool: &PgPool, request: &AdminRequest) -> Result<i32, AdminError> {
    let (password, generated) = match &request.password {
        Some(password) => (password.clone(), false),
        None => (generate_temporary_password(), true),
    };
    let password_hash = hash_password(&password)?;

    let user_id: i32 = sqlx::query_scalar(
        r"
        INSERT INTO users (email, role, password_hash, first_name, last_name)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id
        ",
    )
    .bind(request.email.as_str())
    .bind(UserRole::Admin)
    .bind(password_hash)
    .bind(request.profile.first_name.as_deref())
    .bind(request.profile.last_name.as_deref())
    .fetch_one(pool)
    .await?;

    tracing::info!(
        "Admin user created successfully! ID: {}, Email: {}",
        user_id,
        request.email
    );
    if generated {
        tracing::warn!("Temporary password: {password}");
        tracing::warn!("Change it from the storefront profile page after the first login.");
    }

    Ok(user_id)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_request_normalizes_input() {
        let request =
            AdminRequest::new(" Ada@Example.COM ", Some("  Ada "), Some("   "), None).unwrap();
        assert_eq!(request.email.as_str(), "Ada@example.com");
        assert_eq!(request.profile.first_name.as_deref(), Some("Ada"));
        assert!(request.profile.last_name.is_none());
        assert!(request.password.is_none());
    }

    #[test]
    fn test_request_rejects_bad_email() {
        let err = AdminRequest::new("not-an-email", None, None, None).unwrap_err();
        assert!(matches!(err, AdminError::InvalidEmail(_)));
    }

    #[test]
    fn test_request_rejects_short_password() {
        let err = AdminRequest::new("ada@example.com", None, None, Some("123")).unwrap_err();
        assert!(matches!(err, AdminError::Password(PasswordError::TooShort)));
    }

    #[test]
    fn test_request_rejects_long_name() {
        let name = "a".repeat(ProfileFields::MAX_TEXT + 1);
        let err = AdminRequest::new("ada@example.com", Some(&name), None, None).unwrap_err();
        assert!(matches!(err, AdminError::InvalidName(_)));
    }
}
