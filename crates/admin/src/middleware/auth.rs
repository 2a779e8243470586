//! Authentication extractors for admin.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{StatusCode, header::ACCEPT, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::db::UserRepository;
use crate::error::{clear_sentry_user, set_sentry_user};
use crate::models::{CurrentAdmin, User, session_keys};
use crate::services::auth::current_admin as session_identity;
use crate::state::AppState;

/// Extractor that requires a signed-in administrator.
///
/// The account is read again on every request, so a demoted or disabled
/// admin loses access at once and their session is dropped.
///
/// Browsers are redirected to the login page; API and JSON requests get a
/// bare 401 instead.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAdmin(admin): RequireAdmin,
/// ) -> impl IntoResponse {
///     format!("Bonjour, {}!", admin.name)
/// }
/// ```
pub struct RequireAdmin(pub CurrentAdmin);

/// Error returned when admin authentication is required but nobody is logged in.
#[derive(Debug)]
pub enum AdminAuthRejection {
    /// Redirect to login page (for HTML requests).
    RedirectToLogin,
    /// Unauthorized response (for API requests).
    Unauthorized,
    /// The account could not be read.
    Internal,
}

impl IntoResponse for AdminAuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to("/login").into_response(),
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        }
    }
}

/// API paths and `fetch` calls asking for JSON must not be redirected.
fn wants_json(parts: &Parts) -> bool {
    parts.uri.path().starts_with("/api/")
        || parts
            .headers
            .get(ACCEPT)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.contains("application/json"))
}

/// Read the signed-in administrator, if any.
pub async fn current_admin(session: &Session) -> Option<CurrentAdmin> {
    session
        .get::<CurrentAdmin>(session_keys::CURRENT_ADMIN)
        .await
        .ok()
        .flatten()
}

/// Whether the stored account may still use the back-office.
#[must_use]
pub fn still_authorized(user: &User) -> bool {
    user.is_admin() && user.is_active
}

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = AdminAuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        // Get the session from extensions (set by SessionManagerLayer)
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(AdminAuthRejection::Unauthorized)?;
        let rejection = if wants_json(parts) {
            AdminAuthRejection::Unauthorized
        } else {
            AdminAuthRejection::RedirectToLogin
        };

        let Some(admin) = current_admin(session).await else {
            return Err(rejection);
        };

        let state = AppState::from_ref(state);
        let user = UserRepository::new(state.pool())
            .get(admin.id)
            .await
            .map_err(|e| {
                tracing::error!(user_id = %admin.id, "Failed to reload admin account: {e}");
                AdminAuthRejection::Internal
            })?;

        match user {
            Some(user) if still_authorized(&user) => Ok(Self(session_identity(&user))),
            _ => {
                tracing::warn!(user_id = %admin.id, "Admin access revoked, closing session");
                if let Err(e) = clear_current_admin(session).await {
                    tracing::warn!("Failed to flush revoked admin session: {e}");
                }
                Err(rejection)
            }
        }
    }
}

/// Store the signed-in administrator, rotating the session ID first.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_admin(
    session: &Session,
    admin: &CurrentAdmin,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_ADMIN, admin).await?;
    set_sentry_user(admin.id.as_i32(), Some(admin.email.as_str()));
    Ok(())
}

/// Log out by dropping the whole session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_admin(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await?;
    clear_sentry_user();
    Ok(())
}
