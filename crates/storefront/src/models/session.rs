//! Session-related types.
//!
//! Types stored in the session for authentication and cart state.

use serde::{Deserialize, Serialize};

use auxilia_core::{Email, UserId};

/// Session-stored user identity.
///
/// Minimal data stored in the session to identify the logged-in user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// User's database ID.
    pub id: UserId,
    /// User's email address.
    pub email: Email,
    /// First name, for the greeting in the header.
    pub first_name: Option<String>,
}

impl CurrentUser {
    /// Name to greet the user with.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.first_name
            .as_deref()
            .unwrap_or_else(|| self.email.local_part())
    }
}

/// Session keys.
pub mod keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for the visitor's cart.
    pub const CART: &str = "cart";

    /// Key for pending flash messages.
    pub const FLASHES: &str = "flashes";
}
