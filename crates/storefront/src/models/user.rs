//! User domain types.
//!
//! These types represent validated domain objects separate from database row types.

use chrono::{DateTime, Utc};

use auxilia_core::{Cart, Email, ProfileFields, UserId, UserRole};

use super::CurrentUser;

/// A customer account.
#[derive(Debug, Clone)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// User's email address.
    pub email: Email,
    /// Account role.
    pub role: UserRole,
    /// Name, phone and postal address.
    pub profile: ProfileFields,
    /// Disabled accounts cannot sign in.
    pub is_active: bool,
    /// Cart saved on the account.
    pub cart: Cart,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Session identity for this user.
    #[must_use]
    pub fn to_current_user(&self) -> CurrentUser {
        CurrentUser {
            id: self.id,
            email: self.email.clone(),
            first_name: self.profile.first_name.clone(),
        }
    }
}
