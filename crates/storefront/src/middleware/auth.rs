//! Authentication middleware and extractors.
//!
//! Provides extractors for requiring a signed-in user in route handlers.
//!
//! Both extractors check the account is still active, so disabling a
//! customer ends their session on the next request.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use sqlx::PgPool;
use tower_sessions::Session;

use crate::db::{RepositoryError, UserRepository};
use crate::models::{CurrentUser, session_keys};
use crate::state::AppState;

/// Extractor that requires a signed-in user.
///
/// If nobody is logged in, or the account was disabled, returns a redirect
/// to the login page.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(user): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Bonjour, {}!", user.display_name())
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

/// Error returned when authentication is required but nobody is logged in.
pub enum AuthRejection {
    /// Redirect to login page (for HTML requests).
    RedirectToLogin,
    /// Unauthorized response (for API requests).
    Unauthorized,
    /// The account could not be read.
    Internal,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to("/login").into_response(),
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        }
    }
}

/// The session identity, if its account is still active.
///
/// A disabled or deleted account has its session flushed.
async fn active_user(
    session: &Session,
    pool: &PgPool,
) -> Result<Option<CurrentUser>, RepositoryError> {
    let Some(user) = session
        .get::<CurrentUser>(session_keys::CURRENT_USER)
        .await
        .ok()
        .flatten()
    else {
        return Ok(None);
    };

    if UserRepository::new(pool).is_active(user.id).await? {
        return Ok(Some(user));
    }

    tracing::warn!(user_id = %user.id, "Account disabled, closing session");
    if let Err(e) = clear_current_user(session).await {
        tracing::warn!("Failed to flush disabled account session: {e}");
    }
    Ok(None)
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        // Get the session from extensions (set by SessionManagerLayer)
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(AuthRejection::Unauthorized)?;

        let state = AppState::from_ref(state);
        let user = active_user(session, state.pool()).await.map_err(|e| {
            tracing::error!("Failed to check account status: {e}");
            AuthRejection::Internal
        })?;

        user.map(Self).ok_or_else(|| {
            if parts.uri.path().starts_with("/api/") {
                AuthRejection::Unauthorized
            } else {
                AuthRejection::RedirectToLogin
            }
        })
    }
}

/// Extractor that optionally gets the current user.
///
/// Unlike `RequireAuth`, this does not reject the request if nobody is logged
/// in. A disabled account reads as anonymous.
pub struct OptionalAuth(pub Option<CurrentUser>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Some(session) = parts.extensions.get::<Session>() else {
            return Ok(Self(None));
        };

        let state = AppState::from_ref(state);
        let user = active_user(session, state.pool())
            .await
            .unwrap_or_else(|e| {
                tracing::error!("Failed to check account status: {e}");
                None
            });

        Ok(Self(user))
    }
}

/// Store the signed-in user in the session.
///
/// The session ID is rotated first so a pre-login session cannot be fixed.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_USER, user).await
}

/// Replace the session identity without rotating the session, after a profile edit.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn refresh_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CURRENT_USER, user).await
}

/// Log out: drop the whole session, cart included.
///
/// The cart is already saved on the account, so it comes back on next login.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use axum::http::Request;
    use tower_sessions::MemoryStore;

    use auxilia_core::{Email, UserId};

    use super::*;

    fn user() -> CurrentUser {
        CurrentUser {
            id: UserId::new(7),
            email: Email::parse("lea@example.fr").unwrap(),
            first_name: Some("Léa".to_string()),
        }
    }

    fn parts_with(session: Session, path: &str) -> Parts {
        let (mut parts, ()) = Request::builder().uri(path).body(()).unwrap().into_parts();
        parts.extensions.insert(session);
        parts
    }

    #[tokio::test]
    async fn test_require_auth_redirects_anonymous() {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);
        let mut parts = parts_with(session, "/profile");

        let state = AppState::for_tests();
        let rejection = RequireAuth::from_request_parts(&mut parts, &state).await;
        let response = rejection.err().unwrap().into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()["location"], "/login");
    }

    #[tokio::test]
    async fn test_require_auth_api_is_unauthorized() {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);
        let mut parts = parts_with(session, "/api/anything");

        let state = AppState::for_tests();
        let rejection = RequireAuth::from_request_parts(&mut parts, &state).await;
        let response = rejection.err().unwrap().into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_optional_auth_anonymous_is_none() {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);
        let mut parts = parts_with(session, "/cart");

        let state = AppState::for_tests();
        let OptionalAuth(current) = OptionalAuth::from_request_parts(&mut parts, &state)
            .await
            .unwrap();
        assert!(current.is_none());
    }

    #[tokio::test]
    async fn test_set_then_clear() {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);
        set_current_user(&session, &user()).await.unwrap();
        let stored: CurrentUser = session
            .get(session_keys::CURRENT_USER)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.id, UserId::new(7));

        clear_current_user(&session).await.unwrap();
        let stored: Option<CurrentUser> = session.get(session_keys::CURRENT_USER).await.unwrap();
        assert!(stored.is_none());
    }
}
