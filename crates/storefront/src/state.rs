//! Application state shared across handlers.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use sqlx::PgPool;

use crate::config::StorefrontConfig;

/// Cache key for the hot read-mostly catalog payloads.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum CatalogCacheKey {
    /// The nested category tree (`GET /api/categories`).
    CategoryTree,
    /// The home page banner products (`GET /api/banners`).
    Banners,
}

/// How long cached catalog payloads stay fresh.
const CATALOG_CACHE_TTL: Duration = Duration::from_secs(60);

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
    catalog_cache: Cache<CatalogCacheKey, Arc<serde_json::Value>>,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: StorefrontConfig, pool: PgPool) -> Self {
        let catalog_cache = Cache::builder()
            .max_capacity(16)
            .time_to_live(CATALOG_CACHE_TTL)
            .build();

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                catalog_cache,
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

    /// Get a reference to the catalog payload cache.
    #[must_use]
    pub fn catalog_cache(&self) -> &Cache<CatalogCacheKey, Arc<serde_json::Value>> {
        &self.inner.catalog_cache
    }
}
