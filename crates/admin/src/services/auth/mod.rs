//! Back-office authentication service.
//!
//! Administrators sign in with the same email and password as on the
//! storefront. Only accounts with the `admin` role get in.

mod error;

pub use error::AdminAuthError;

use sqlx::PgPool;

use auxilia_core::Email;
use auxilia_core::password::{verify_decoy, verify_password};

use crate::db::UserRepository;
use crate::models::{CurrentAdmin, User};

/// Back-office authentication service.
pub struct AdminAuthService<'a> {
    users: UserRepository<'a>,
}

impl<'a> AdminAuthService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }

    /// Check credentials and return the session identity.
    ///
    /// Customers get the same answer as a wrong password, so the form does
    /// not reveal which emails exist.
    ///
    /// # Errors
    ///
    /// Returns `AdminAuthError::InvalidCredentials` for a bad email or
    /// password, or a non-admin account.
    /// Returns `AdminAuthError::AccountDisabled` if the admin is deactivated.
    pub async fn login(&self, email: &str, password: &str) -> Result<CurrentAdmin, AdminAuthError> {
        let Ok(email) = Email::parse(email) else {
            verify_decoy(password);
            return Err(AdminAuthError::InvalidCredentials);
        };

        let Some((user, password_hash)) = self.users.get_with_password_hash(&email).await? else {
            verify_decoy(password);
            return Err(AdminAuthError::InvalidCredentials);
        };

        verify_password(password, &password_hash)?;

        if !user.is_admin() {
            tracing::warn!(user_id = %user.id, "Non-admin account tried to sign in");
            return Err(AdminAuthError::InvalidCredentials);
        }
        if !user.is_active {
            return Err(AdminAuthError::AccountDisabled);
        }

        Ok(current_admin(&user))
    }
}

/// Session identity for an administrator.
#[must_use]
pub fn current_admin(user: &User) -> CurrentAdmin {
    CurrentAdmin {
        id: user.id,
        email: user.email.clone(),
        name: user.display_name(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;

    use auxilia_core::{PasswordError, ProfileFields, UserId, UserRole};

    use super::*;

    #[test]
    fn test_current_admin_uses_display_name() {
        let user = User {
            id: UserId::new(3),
            email: Email::parse("root@auxilia.test").unwrap(),
            role: UserRole::Admin,
            profile: ProfileFields {
                first_name: Some("Grace".to_owned()),
                last_name: Some("Hopper".to_owned()),
                ..ProfileFields::default()
            },
            is_active: true,
            created_at: Utc::now(),
        };

        let admin = current_admin(&user);
        assert_eq!(admin.id, UserId::new(3));
        assert_eq!(admin.name, "Grace Hopper");
    }

    #[test]
    fn test_policy_errors_read_as_bad_credentials() {
        assert!(matches!(
            AdminAuthError::from(PasswordError::Invalid),
            AdminAuthError::InvalidCredentials
        ));
        assert!(matches!(
            AdminAuthError::from(PasswordError::Hash),
            AdminAuthError::PasswordHash
        ));
    }
}
