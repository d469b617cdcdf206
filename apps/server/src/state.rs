//! Shared application state

use crate::{
    config::Config,
    db::{CatalogStore, PostgresCatalogStore},
    services::CatalogService,
    startup, Result,
};
use sqlx::PgPool;
use std::sync::Arc;

/// State cloned into every request handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub catalog: Arc<CatalogService>,
    /// Present when backed by PostgreSQL.
    pub db_pool: Option<PgPool>,
}

impl AppState {
    /// Connect to PostgreSQL, apply migrations, and build the services.
    pub async fn new(config: Config) -> Result<Self> {
        let pool = startup::connect_and_migrate(&config.database).await?;
        let store: Arc<dyn CatalogStore> = Arc::new(PostgresCatalogStore::new(pool.clone()));
        let mut state = Self::with_store(config, store);
        state.db_pool = Some(pool);
        Ok(state)
    }

    /// Build state over an existing store (in-memory backend, tests).
    pub fn with_store(config: Config, store: Arc<dyn CatalogStore>) -> Self {
        Self {
            config: Arc::new(config),
            catalog: Arc::new(CatalogService::new(store)),
            db_pool: None,
        }
    }

    pub fn store(&self) -> Arc<dyn CatalogStore> {
        self.catalog.store().clone()
    }
}
