//! One-shot notices carried across a redirect in the session.

use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use crate::models::session_keys;

/// Severity of a flash message; doubles as the CSS modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Success,
    Info,
    Warning,
    Error,
}

impl FlashLevel {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

/// A message to show on the next rendered page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
}

/// Queue a flash message.
///
/// Failures are logged and swallowed: a lost notice must not fail the
/// action that produced it.
pub async fn push(session: &Session, level: FlashLevel, message: impl Into<String>) {
    let mut flashes: Vec<Flash> = session
        .get(session_keys::FLASHES)
        .await
        .ok()
        .flatten()
        .unwrap_or_default();
    flashes.push(Flash {
        level,
        message: message.into(),
    });

    if let Err(e) = session.insert(session_keys::FLASHES, flashes).await {
        tracing::warn!(error = %e, "Failed to store flash message");
    }
}

pub async fn success(session: &Session, message: impl Into<String>) {
    push(session, FlashLevel::Success, message).await;
}

pub async fn warning(session: &Session, message: impl Into<String>) {
    push(session, FlashLevel::Warning, message).await;
}

pub async fn error(session: &Session, message: impl Into<String>) {
    push(session, FlashLevel::Error, message).await;
}

/// Remove and return every queued message.
pub async fn take(session: &Session) -> Vec<Flash> {
    session
        .remove::<Vec<Flash>>(session_keys::FLASHES)
        .await
        .ok()
        .flatten()
        .unwrap_or_default()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use tower_sessions::MemoryStore;

    use super::*;

    #[tokio::test]
    async fn test_flashes_are_shown_once_in_order() {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);
        warning(&session, "Votre panier est vide.").await;
        success(&session, "Sélection supprimée.").await;

        let flashes = take(&session).await;
        assert_eq!(flashes.len(), 2);
        assert_eq!(flashes[0].level, FlashLevel::Warning);
        assert_eq!(flashes[1].message, "Sélection supprimée.");

        assert!(take(&session).await.is_empty());
    }

    #[test]
    fn test_level_css_names() {
        assert_eq!(FlashLevel::Error.as_str(), "error");
        assert_eq!(
            serde_json::to_string(&FlashLevel::Success).unwrap(),
            "\"success\""
        );
    }
}
