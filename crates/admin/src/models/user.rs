//! Customer accounts as managed from the back-office.

use chrono::{DateTime, Utc};

use auxilia_core::{Email, ProfileFields, UserId, UserRole};

/// A user account.
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub email: Email,
    pub role: UserRole,
    pub profile: ProfileFields,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    /// "First Last", or the email when no name is set.
    #[must_use]
    pub fn display_name(&self) -> String {
        let name = [
            self.profile.first_name.as_deref(),
            self.profile.last_name.as_deref(),
        ]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ");

        if name.is_empty() {
            self.email.to_string()
        } else {
            name
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn user(first: Option<&str>, last: Option<&str>) -> User {
        User {
            id: UserId::new(1),
            email: Email::parse("ada@example.com").unwrap(),
            role: UserRole::User,
            profile: ProfileFields {
                first_name: first.map(str::to_owned),
                last_name: last.map(str::to_owned),
                ..ProfileFields::default()
            },
            is_active: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_display_name() {
        assert_eq!(user(Some("Ada"), Some("Lovelace")).display_name(), "Ada Lovelace");
        assert_eq!(user(None, Some("Lovelace")).display_name(), "Lovelace");
        assert_eq!(user(None, None).display_name(), "ada@example.com");
    }
}
