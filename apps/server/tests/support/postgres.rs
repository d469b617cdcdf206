use super::shared::{self, TEST_DATABASE_URL_VAR};
use anyhow::Context as _;
use coverage_catalog::{config::DatabaseConfig, db::PostgresCatalogStore, startup};
use sqlx::Connection as _;
use url::Url;
use uuid::Uuid;

/// A migrated, throwaway schema inside the test database.
pub struct TestSchema {
    pub store: PostgresCatalogStore,
    schema: String,
    admin_database_url: String,
}

impl TestSchema {
    /// `None` when no test database is configured.
    pub async fn create() -> anyhow::Result<Option<Self>> {
        let shared = shared::shared().await?;
        let Some(admin_database_url) = shared.base_config.database.test_database_url.clone() else {
            eprintln!("{TEST_DATABASE_URL_VAR} not set, skipping PostgreSQL test");
            return Ok(None);
        };

        let schema = format!("test_{}", Uuid::new_v4().simple());
        let mut admin_conn = sqlx::PgConnection::connect(&admin_database_url)
            .await
            .context("connect admin db for schema create")?;
        sqlx::query(&format!(r#"CREATE SCHEMA "{}""#, schema))
            .execute(&mut admin_conn)
            .await
            .context("create test schema")?;

        let config = DatabaseConfig {
            url: with_search_path(&admin_database_url, &schema)?,
            pool_min_size: 0,
            pool_max_size: 2,
            ..shared.base_config.database.clone()
        };
        let pool = startup::connect_pool(&config).await?;
        startup::run_migrations(&pool).await?;

        Ok(Some(Self {
            store: PostgresCatalogStore::new(pool),
            schema,
            admin_database_url,
        }))
    }

    pub async fn cleanup(self) -> anyhow::Result<()> {
        self.store.pool().close().await;

        let mut admin_conn = sqlx::PgConnection::connect(&self.admin_database_url)
            .await
            .context("connect admin db for schema drop")?;
        sqlx::query(&format!(r#"DROP SCHEMA "{}" CASCADE"#, self.schema))
            .execute(&mut admin_conn)
            .await
            .context("drop test schema")?;
        Ok(())
    }
}

fn with_search_path(database_url: &str, schema: &str) -> anyhow::Result<String> {
    let mut url = Url::parse(database_url).context("parse database URL")?;
    url.query_pairs_mut()
        .append_pair("options", &format!("-c search_path={}", schema));
    Ok(url.to_string())
}
