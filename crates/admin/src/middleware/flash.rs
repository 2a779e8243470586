//! One-shot notices carried across a redirect in the session.

use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use crate::models::session_keys;

/// Severity of a flash message; doubles as the CSS modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Success,
    Error,
}

impl FlashLevel {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
}

/// Queue a flash message. A failed write is logged, never surfaced.
async fn push(session: &Session, level: FlashLevel, message: impl Into<String>) {
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
    async fn test_temporary_password_notice_is_shown_once() {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);
        success(&session, "Mot de passe temporaire : 0a1b2c3d4e5f6a7b").await;

        let flashes = take(&session).await;
        assert_eq!(flashes.len(), 1);
        assert_eq!(flashes[0].level, FlashLevel::Success);
        assert!(take(&session).await.is_empty());
    }
}
