//! Application state shared across handlers.

use std::path::Path;
use std::sync::Arc;

use sqlx::PgPool;

use crate::config::AdminConfig;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    pool: PgPool,
}

impl AppState {
    #[must_use]
    pub fn new(config: AdminConfig, pool: PgPool) -> Self {
        Self {
            inner: Arc::new(AppStateInner { config, pool }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Directory holding product images, shared with the storefront.
    #[must_use]
    pub fn images_dir(&self) -> &Path {
        &self.inner.config.product_images_dir
    }
}

#[cfg(test)]
impl AppState {
    /// State whose pool never connects until a query runs.
    #[allow(clippy::unwrap_used)]
    pub(crate) fn for_tests() -> Self {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgres://localhost/auxilia")
            .unwrap();
        Self::new(AdminConfig::sample(), pool)
    }
}
