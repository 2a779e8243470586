//! Authentication error types.

use thiserror::Error;

use auxilia_core::{FieldTooLong, PasswordError};

use crate::db::RepositoryError;

/// Errors that can occur during authentication and account operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] auxilia_core::EmailError),

    /// Invalid credentials (wrong password or user not found).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The account has been deactivated from the back-office.
    #[error("account disabled")]
    AccountDisabled,

    /// User not found.
    #[error("user not found")]
    UserNotFound,

    /// User already exists.
    #[error("user already exists")]
    UserAlreadyExists,

    /// New password rejected by the policy.
    #[error("password validation failed: {0}")]
    Password(PasswordError),

    /// The current password given on a password change is wrong.
    #[error("current password incorrect")]
    CurrentPasswordIncorrect,

    /// A profile field failed validation.
    #[error("invalid profile: {0}")]
    Profile(#[from] FieldTooLong),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}

impl From<PasswordError> for AuthError {
    fn from(err: PasswordError) -> Self {
        match err {
            PasswordError::Hash => Self::PasswordHash,
            PasswordError::Invalid => Self::InvalidCredentials,
            policy => Self::Password(policy),
        }
    }
}

impl AuthError {
    /// Message safe to show to the visitor.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidCredentials | Self::UserNotFound => "Identifiants invalides.".to_owned(),
            Self::AccountDisabled => {
                "Votre compte a été désactivé. Contactez le support.".to_owned()
            }
            Self::UserAlreadyExists => "Un compte existe déjà avec cette adresse email.".to_owned(),
            Self::InvalidEmail(_) => "Adresse email invalide.".to_owned(),
            Self::Password(PasswordError::TooShort) => {
                "Le mot de passe doit contenir au moins 6 caractères.".to_owned()
            }
            Self::Password(PasswordError::TooLong) => "Le mot de passe est trop long.".to_owned(),
            Self::Password(PasswordError::Mismatch) => {
                "Les mots de passe ne correspondent pas.".to_owned()
            }
            Self::Password(_) => "Mot de passe invalide.".to_owned(),
            Self::CurrentPasswordIncorrect => "Le mot de passe actuel est incorrect.".to_owned(),
            Self::Profile(err) => format!("Champ invalide : {err}."),
            Self::Repository(_) | Self::PasswordHash => {
                "Une erreur est survenue, veuillez réessayer.".to_owned()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_error_mapping() {
        assert!(matches!(
            AuthError::from(PasswordError::Invalid),
            AuthError::InvalidCredentials
        ));
        assert!(matches!(
            AuthError::from(PasswordError::Hash),
            AuthError::PasswordHash
        ));
        assert!(matches!(
            AuthError::from(PasswordError::Mismatch),
            AuthError::Password(PasswordError::Mismatch)
        ));
    }

    #[test]
    fn test_disabled_message_differs_from_bad_credentials() {
        assert_ne!(
            AuthError::AccountDisabled.user_message(),
            AuthError::InvalidCredentials.user_message()
        );
    }
}
