//! Business logic services for storefront.
//!
//! # Services
//!
//! - `auth` - Registration, login, profile and password changes
//! - `cart` - Session-backed cart mirrored onto the user account
//! - `checkout` - Turning the cart into a persisted order
//! - `email` - Contact form delivery over SMTP

pub mod auth;
pub mod cart;
pub mod checkout;
pub mod email;

pub use auth::{AuthError, AuthService};
pub use cart::{CartContents, CartError, CartService};
pub use checkout::{CheckoutError, CheckoutService};
pub use email::{ContactMailer, ContactMessage, EmailError};
