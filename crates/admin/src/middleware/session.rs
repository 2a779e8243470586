//! Session middleware configuration for admin.
//!
//! `PostgreSQL`-backed sessions in their own table, with stricter settings
//! than the storefront: SameSite=Strict and a 24 hour inactivity expiry.

use sqlx::PgPool;
use tower_sessions::service::SignedCookie;
use tower_sessions::{Expiry, SessionManagerLayer};
use tower_sessions_sqlx_store::PostgresStore;

use crate::config::{AdminConfig, ConfigError};

/// Session cookie name for admin.
pub const SESSION_COOKIE_NAME: &str = "auxilia_admin_session";

/// Session expiry time in seconds (24 hours).
const SESSION_EXPIRY_SECONDS: i64 = 24 * 60 * 60;

const SESSION_SCHEMA: &str = "tower_sessions";
const SESSION_TABLE: &str = "admin_session";

/// Session layer type used by the admin router.
pub type AdminSessionLayer = SessionManagerLayer<PostgresStore, SignedCookie>;

/// Create the session layer with `PostgreSQL` store.
///
/// Uses the `tower_sessions.admin_session` table created by the migrations,
/// so storefront and back-office sessions never mix.
///
/// # Errors
///
/// Returns `ConfigError` if the store names are rejected or the session
/// secret cannot be turned into a key.
pub fn create_session_layer(
    pool: &PgPool,
    config: &AdminConfig,
) -> Result<AdminSessionLayer, ConfigError> {
    let store = PostgresStore::new(pool.clone())
        .with_schema_name(SESSION_SCHEMA)
        .and_then(|store| store.with_table_name(SESSION_TABLE))
        .map_err(ConfigError::SessionStore)?;

    Ok(SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_https())
        .with_same_site(tower_sessions::cookie::SameSite::Strict)
        .with_http_only(true)
        .with_path("/")
        .with_signed(config.session_key()?))
}
