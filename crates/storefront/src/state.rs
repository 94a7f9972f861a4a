//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::{CatalogConfig, StorefrontConfig};
use crate::services::IdentityResolver;

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
    identity: IdentityResolver,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Storefront configuration
    /// * `pool` - `PostgreSQL` connection pool
    #[must_use]
    pub fn new(config: StorefrontConfig, pool: PgPool) -> Self {
        let identity = IdentityResolver::new(&config.jwt_secret);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                identity,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Product listing limits.
    #[must_use]
    pub fn catalog(&self) -> CatalogConfig {
        self.inner.config.catalog
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the bearer token resolver.
    #[must_use]
    pub fn identity(&self) -> &IdentityResolver {
        &self.inner.identity
    }
}
