//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. Security headers (CSP, frame denial, no-store on pages)
//! 5. Session layer (tower-sessions with `PostgreSQL` store)
//! 6. Rate limiting on login/registration (governor)
//!
//! Extractors (`RequireAuth`, `OptionalAuth`, `PageContext`) read the session
//! inserted by the session layer.

pub mod auth;
pub mod flash;
pub mod page;
pub mod rate_limit;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use auth::{
    OptionalAuth, RequireAuth, clear_current_user, refresh_current_user, set_current_user,
};
pub use flash::{Flash, FlashLevel};
pub use page::PageContext;
pub use rate_limit::auth_rate_limiter;
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
pub use session::create_session_layer;
