//! Authentication service.
//!
//! Password registration and login, plus the account operations that need a
//! password check (profile edits, password changes).

mod error;

pub use error::AuthError;

use sqlx::PgPool;

use auxilia_core::password::{hash_password, validate_new_password, verify_decoy, verify_password};
use auxilia_core::{Email, ProfileFields, UserId};

use crate::db::RepositoryError;
use crate::db::users::UserRepository;
use crate::models::User;

/// Registration form input, already split from the HTTP layer.
#[derive(Debug, Clone)]
pub struct Registration<'r> {
    pub email: &'r str,
    pub password: &'r str,
    pub password_confirm: &'r str,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Authentication service.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }

    /// Register a new user with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::Password` if the password doesn't meet requirements.
    /// Returns `AuthError::UserAlreadyExists` if the email is already registered.
    pub async fn register(&self, form: Registration<'_>) -> Result<User, AuthError> {
        let email = Email::parse(form.email)?;
        validate_new_password(form.password, form.password_confirm)?;

        let profile = ProfileFields {
            first_name: form.first_name,
            last_name: form.last_name,
            ..ProfileFields::default()
        }
        .normalized();
        profile.validate()?;

        let password_hash = hash_password(form.password)?;

        self.users
            .create(&email, &password_hash, &profile)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })
    }

    /// Login with email and password.
    ///
    /// The password is checked before the account status so a disabled
    /// account is only revealed to someone who knows its password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    /// Returns `AuthError::AccountDisabled` if the account is deactivated.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let Ok(email) = Email::parse(email) else {
            verify_decoy(password);
            return Err(AuthError::InvalidCredentials);
        };

        // Unknown emails cost a hash check too
        let Some((user, password_hash)) = self.users.get_with_password_hash(&email).await? else {
            verify_decoy(password);
            return Err(AuthError::InvalidCredentials);
        };

        verify_password(password, &password_hash)?;

        if !user.is_active {
            return Err(AuthError::AccountDisabled);
        }

        Ok(user)
    }

    /// Change a user's password after checking the current one.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::CurrentPasswordIncorrect` if `current` is wrong.
    /// Returns `AuthError::Password` if the new password is rejected.
    pub async fn change_password(
        &self,
        user_id: UserId,
        current: &str,
        new_password: &str,
        confirmation: &str,
    ) -> Result<(), AuthError> {
        let hash = self
            .users
            .get_password_hash(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        verify_password(current, &hash).map_err(|_| AuthError::CurrentPasswordIncorrect)?;
        validate_new_password(new_password, confirmation)?;

        let new_hash = hash_password(new_password)?;
        self.users
            .update_password(user_id, &new_hash)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => AuthError::UserNotFound,
                other => AuthError::Repository(other),
            })
    }

    /// Update email and profile fields.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` or `AuthError::Profile` on bad input.
    /// Returns `AuthError::UserAlreadyExists` if the email belongs to someone else.
    pub async fn update_profile(
        &self,
        user_id: UserId,
        email: &str,
        profile: ProfileFields,
    ) -> Result<User, AuthError> {
        let email = Email::parse(email)?;
        let profile = profile.normalized();
        profile.validate()?;

        self.users
            .update_profile(user_id, &email, &profile)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                RepositoryError::NotFound => AuthError::UserNotFound,
                other => AuthError::Repository(other),
            })
    }

    /// Load a user by ID.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if the account no longer exists.
    pub async fn get_user(&self, user_id: UserId) -> Result<User, AuthError> {
        self.users
            .get_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }
}
