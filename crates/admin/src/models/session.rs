//! Session-related types for back-office authentication.

use serde::{Deserialize, Serialize};

use auxilia_core::{Email, UserId};

/// Session-stored admin identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentAdmin {
    /// Account ID in the shared `users` table.
    pub id: UserId,
    /// Admin's email address.
    pub email: Email,
    /// Display name for the header.
    pub name: String,
}

/// Session keys for back-office state.
pub mod keys {
    /// Key for storing the current logged-in admin.
    pub const CURRENT_ADMIN: &str = "current_admin";

    /// Key for pending flash messages.
    pub const FLASHES: &str = "flashes";
}
