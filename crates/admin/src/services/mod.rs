//! Business logic services for admin.
//!
//! # Services
//!
//! - `auth` - Password sign-in restricted to administrators
//! - `uploads` - Product image validation and storage
//! - `users` - Account edits, password resets, activation and deletion

pub mod auth;
pub mod uploads;
pub mod users;

pub use auth::{AdminAuthError, AdminAuthService};
pub use uploads::{ImageKind, UploadError};
pub use users::{UserAdminError, UserAdminService, UserUpdate};
