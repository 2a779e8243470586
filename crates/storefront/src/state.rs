//! Application state shared across handlers.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use sqlx::PgPool;
use tracing::debug;

use crate::config::StorefrontConfig;
use crate::db::{CategoryRepository, RepositoryError};
use crate::models::Category;
use crate::services::ContactMailer;

/// Category list changes rarely; the sidebar can lag by a few minutes.
const CATEGORY_CACHE_TTL: Duration = Duration::from_secs(300);

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: PgPool,
    categories: Cache<(), Arc<Vec<Category>>>,
    mailer: Option<ContactMailer>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// Contact delivery is disabled, with a warning, if the SMTP relay cannot
    /// be set up; the contact page still works.
    #[must_use]
    pub fn new(config: StorefrontConfig, pool: PgPool) -> Self {
        let categories = Cache::builder()
            .max_capacity(1)
            .time_to_live(CATEGORY_CACHE_TTL)
            .build();

        let mailer = config.contact.as_ref().and_then(|contact| {
            ContactMailer::new(contact)
                .inspect_err(|e| tracing::warn!(error = %e, "Contact mailer disabled"))
                .ok()
        });

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                categories,
                mailer,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Contact form mailer, when SMTP is configured.
    #[must_use]
    pub fn mailer(&self) -> Option<&ContactMailer> {
        self.inner.mailer.as_ref()
    }

    /// All categories, alphabetically, cached for five minutes.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the cache is cold and the query fails.
    pub async fn categories(&self) -> Result<Arc<Vec<Category>>, RepositoryError> {
        if let Some(categories) = self.inner.categories.get(&()).await {
            debug!("Cache hit for categories");
            return Ok(categories);
        }

        let categories = Arc::new(CategoryRepository::new(self.pool()).list().await?);
        self.inner
            .categories
            .insert((), Arc::clone(&categories))
            .await;
        Ok(categories)
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
        let config = StorefrontConfig {
            contact: None,
            ..StorefrontConfig::sample()
        };
        Self::new(config, pool)
    }
}
