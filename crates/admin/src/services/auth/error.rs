//! Back-office authentication error types.

use thiserror::Error;

use auxilia_core::PasswordError;

use crate::db::RepositoryError;

/// Errors that can occur while signing in to the back-office.
#[derive(Debug, Error)]
pub enum AdminAuthError {
    /// Wrong email or password, or the account is not an administrator.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The administrator account has been deactivated.
    #[error("account disabled")]
    AccountDisabled,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}

impl From<PasswordError> for AdminAuthError {
    fn from(err: PasswordError) -> Self {
        match err {
            PasswordError::Hash => Self::PasswordHash,
            _ => Self::InvalidCredentials,
        }
    }
}

impl AdminAuthError {
    /// Message shown on the login form.
    #[must_use]
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::InvalidCredentials => "Identifiants invalides.",
            Self::AccountDisabled => "Ce compte administrateur est désactivé.",
            Self::Repository(_) | Self::PasswordHash => {
                "Une erreur est survenue, veuillez réessayer."
            }
        }
    }
}
