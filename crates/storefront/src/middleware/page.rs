//! Per-page layout data: who is signed in, cart badge, pending notices.

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;

use super::flash::{self, Flash};
use crate::models::{CurrentUser, session_keys};
use crate::services::cart;

/// Everything `base.html` needs, extracted from the session.
///
/// Extracting this consumes pending flash messages, so only handlers that
/// render a full page should ask for it.
#[derive(Debug, Clone, Default)]
pub struct PageContext {
    pub user: Option<CurrentUser>,
    pub cart_count: u32,
    pub flashes: Vec<Flash>,
}

impl PageContext {
    /// Read the layout data from a session, consuming pending flashes.
    ///
    /// Handlers that may redirect with a flash call this after deciding to
    /// render, instead of taking the extractor up front.
    pub async fn from_session(session: &Session) -> Self {
        let user = session
            .get::<CurrentUser>(session_keys::CURRENT_USER)
            .await
            .ok()
            .flatten();

        Self {
            user,
            cart_count: cart::count(session).await,
            flashes: flash::take(session).await,
        }
    }

    /// Greeting name for the header, if signed in.
    #[must_use]
    pub fn user_name(&self) -> Option<&str> {
        self.user.as_ref().map(CurrentUser::display_name)
    }
}

impl<S> FromRequestParts<S> for PageContext
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<Session>() {
            Some(session) => Ok(Self::from_session(session).await),
            None => Ok(Self::default()),
        }
    }
}
