//! HTTP middleware stack for admin.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Security headers (strict CSP, no caching)
//! 4. Session layer (tower-sessions, `tower_sessions.admin_session` table)
//!
//! `RequireAdmin` and `AdminPage` guard every route except the login page.

pub mod auth;
pub mod flash;
pub mod page;
pub mod security_headers;
pub mod session;

pub use auth::{RequireAdmin, clear_current_admin, set_current_admin};
pub use flash::{Flash, FlashLevel};
pub use page::AdminPage;
pub use security_headers::security_headers_middleware;
pub use session::create_session_layer;
