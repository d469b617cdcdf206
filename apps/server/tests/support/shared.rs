use std::sync::Arc;
use coverage_catalog::Config;
use tokio::sync::OnceCell;

static SHARED: OnceCell<Arc<SharedTestResources>> = OnceCell::const_new();

/// Environment variable naming a PostgreSQL database the store tests may use.
pub const TEST_DATABASE_URL_VAR: &str = "CATALOG_TEST_DATABASE_URL";

pub struct SharedTestResources {
    pub base_config: Config,
}

pub async fn shared() -> anyhow::Result<Arc<SharedTestResources>> {
    SHARED
        .get_or_try_init(|| async {
            init_tracing();

            // Defaults only: tests must not pick up a developer's config/local.toml.
            let mut config = Config::default();
            config.app_name = "Catalog Test".to_string();
            config.server.cors_origins = vec!["*".to_string()];
            if let Ok(url) = std::env::var(TEST_DATABASE_URL_VAR) {
                config.database.test_database_url = Some(url.clone());
                config.database.url = url;
            }
            config.database.pool_min_size = 0;
            config.database.pool_max_size = 2;

            Ok(Arc::new(SharedTestResources {
                base_config: config,
            }))
        })
        .await
        .cloned()
}

fn init_tracing() {
    use std::sync::OnceLock;
    use tracing_subscriber::prelude::*;
    static INIT: OnceLock<()> = OnceLock::new();
    INIT.get_or_init(|| {
        let _ = tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "coverage_catalog=warn,sqlx=warn".into()),
            )
            .with(tracing_subscriber::fmt::layer().with_test_writer())
            .try_init();
    });
}
