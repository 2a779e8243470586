//! Account management rules for the back-office.
//!
//! An administrator can edit any account, but can neither delete nor
//! deactivate themselves, and administrator accounts are protected from
//! deletion and deactivation.

use sqlx::PgPool;
use thiserror::Error;

use auxilia_core::password::{generate_temporary_password, hash_password};
use auxilia_core::{Email, FieldTooLong, ProfileFields, UserId, UserRole};

use crate::db::{RepositoryError, UserRepository};
use crate::models::User;

/// Errors from account management actions.
#[derive(Debug, Error)]
pub enum UserAdminError {
    #[error("user not found")]
    NotFound,

    #[error("invalid email: {0}")]
    InvalidEmail(#[from] auxilia_core::EmailError),

    #[error("email already in use")]
    EmailTaken,

    #[error("invalid profile: {0}")]
    Profile(#[from] FieldTooLong),

    /// The administrator targeted their own account.
    #[error("cannot apply this action to your own account")]
    SelfAction,

    /// The target is an administrator account.
    #[error("administrator accounts are protected")]
    ProtectedAdmin,

    #[error("password hashing error")]
    PasswordHash,

    #[error("database error: {0}")]
    Repository(RepositoryError),
}

impl From<RepositoryError> for UserAdminError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => Self::NotFound,
            RepositoryError::Conflict(_) => Self::EmailTaken,
            other => Self::Repository(other),
        }
    }
}

impl UserAdminError {
    /// Flash text for the failed action; `None` for server faults.
    #[must_use]
    pub fn user_message(&self) -> Option<String> {
        let message = match self {
            Self::NotFound => "Utilisateur introuvable.".to_owned(),
            Self::InvalidEmail(_) => "Adresse email invalide.".to_owned(),
            Self::EmailTaken => "Cette adresse email est déjà utilisée.".to_owned(),
            Self::Profile(err) => format!("Champ invalide : {err}."),
            Self::SelfAction => "Impossible sur votre propre compte.".to_owned(),
            Self::ProtectedAdmin => "Les comptes administrateur sont protégés.".to_owned(),
            Self::PasswordHash | Self::Repository(_) => return None,
        };
        Some(message)
    }
}

/// Back-office edit of an account.
#[derive(Debug, Clone)]
pub struct UserUpdate<'r> {
    pub email: &'r str,
    pub role: UserRole,
    pub profile: ProfileFields,
}

/// Deletion is refused for the acting admin and for any admin account.
///
/// # Errors
///
/// Returns `SelfAction` or `ProtectedAdmin` when the guard applies.
pub fn check_deletable(actor: UserId, target: &User) -> Result<(), UserAdminError> {
    if target.id == actor {
        return Err(UserAdminError::SelfAction);
    }
    if target.is_admin() {
        return Err(UserAdminError::ProtectedAdmin);
    }
    Ok(())
}

/// Deactivation is refused for the acting admin and for an active admin.
/// Reactivating a disabled account is always allowed.
///
/// # Errors
///
/// Returns `SelfAction` or `ProtectedAdmin` when the guard applies.
pub fn check_toggleable(actor: UserId, target: &User) -> Result<(), UserAdminError> {
    if target.id == actor {
        return Err(UserAdminError::SelfAction);
    }
    if target.is_active && target.is_admin() {
        return Err(UserAdminError::ProtectedAdmin);
    }
    Ok(())
}

/// Account management service.
pub struct UserAdminService<'a> {
    users: UserRepository<'a>,
}

impl<'a> UserAdminService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }

    async fn load(&self, id: UserId) -> Result<User, UserAdminError> {
        self.users.get(id).await?.ok_or(UserAdminError::NotFound)
    }

    /// Save an edited account.
    ///
    /// # Errors
    ///
    /// Returns `InvalidEmail`, `EmailTaken` or `Profile` on bad input.
    pub async fn update(&self, id: UserId, update: UserUpdate<'_>) -> Result<User, UserAdminError> {
        let email = Email::parse(update.email)?;
        let profile = update.profile.normalized();
        profile.validate()?;

        Ok(self.users.update(id, &email, update.role, &profile).await?)
    }

    /// Replace the password with a random one and return it in clear.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the account does not exist.
    pub async fn reset_password(&self, id: UserId) -> Result<String, UserAdminError> {
        let password = generate_temporary_password();
        let hash = hash_password(&password).map_err(|_| UserAdminError::PasswordHash)?;
        self.users.set_password(id, &hash).await?;
        Ok(password)
    }

    /// Flip `is_active` and return the account as it now stands.
    ///
    /// # Errors
    ///
    /// Returns `SelfAction` or `ProtectedAdmin` when the guard applies.
    pub async fn toggle_active(&self, actor: UserId, id: UserId) -> Result<User, UserAdminError> {
        let mut user = self.load(id).await?;
        check_toggleable(actor, &user)?;

        user.is_active = !user.is_active;
        self.users.set_active(id, user.is_active).await?;
        Ok(user)
    }

    /// Delete an account and return what it was.
    ///
    /// # Errors
    ///
    /// Returns `SelfAction` or `ProtectedAdmin` when the guard applies.
    pub async fn delete(&self, actor: UserId, id: UserId) -> Result<User, UserAdminError> {
        let user = self.load(id).await?;
        check_deletable(actor, &user)?;

        self.users.delete(id).await?;
        Ok(user)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn user(id: i32, role: UserRole, is_active: bool) -> User {
        User {
            id: UserId::new(id),
            email: Email::parse("someone@example.com").unwrap(),
            role,
            profile: ProfileFields::default(),
            is_active,
            created_at: Utc::now(),
        }
    }

    const ACTOR: UserId = UserId::new(1);

    #[test]
    fn test_cannot_delete_self() {
        let me = user(1, UserRole::Admin, true);
        assert!(matches!(
            check_deletable(ACTOR, &me),
            Err(UserAdminError::SelfAction)
        ));
    }

    #[test]
    fn test_cannot_delete_admin() {
        let other = user(2, UserRole::Admin, false);
        assert!(matches!(
            check_deletable(ACTOR, &other),
            Err(UserAdminError::ProtectedAdmin)
        ));
        assert!(check_deletable(ACTOR, &user(3, UserRole::User, true)).is_ok());
    }

    #[test]
    fn test_toggle_guards() {
        assert!(matches!(
            check_toggleable(ACTOR, &user(1, UserRole::User, true)),
            Err(UserAdminError::SelfAction)
        ));
        assert!(matches!(
            check_toggleable(ACTOR, &user(2, UserRole::Admin, true)),
            Err(UserAdminError::ProtectedAdmin)
        ));
        // A disabled admin can be switched back on
        assert!(check_toggleable(ACTOR, &user(2, UserRole::Admin, false)).is_ok());
        assert!(check_toggleable(ACTOR, &user(3, UserRole::User, true)).is_ok());
    }

    #[test]
    fn test_repository_errors_map_to_actions() {
        assert!(matches!(
            UserAdminError::from(RepositoryError::NotFound),
            UserAdminError::NotFound
        ));
        assert!(matches!(
            UserAdminError::from(RepositoryError::Conflict("email".to_owned())),
            UserAdminError::EmailTaken
        ));
        assert!(UserAdminError::PasswordHash.user_message().is_none());
    }
}
