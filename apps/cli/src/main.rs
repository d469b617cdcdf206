use anyhow::Context;
use clap::{Parser, Subcommand};
use coverage_catalog::{
    api::views::StatsView,
    config::Config,
    db::{CatalogStore, PostgresCatalogStore},
    logging,
    services::{
        source_from_config, HttpJsonSource, JsonFileSource, Refresher, SeedLoader, UpstreamSource,
    },
    startup,
};
use std::{path::PathBuf, sync::Arc, time::Duration};

#[derive(Parser, Debug)]
#[command(name = "catalog-cli")]
#[command(about = "Coverage catalog operator tools", long_about = None)]
struct Cli {
    /// Database URL; overrides configuration files and CATALOG__DATABASE__URL
    #[arg(long, global = true, env = "DATABASE_URL")]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Load products and TUSS codes from JSON files (insert-or-skip, safe to re-run)
    Seed {
        /// JSON array of products (codProduto, planoProduto, ...)
        #[arg(long, default_value = "data/products.json")]
        products: PathBuf,

        /// JSON array of TUSS codes (codigo, descricao)
        #[arg(long, default_value = "data/tuss.json")]
        procedures: PathBuf,

        /// Rows per transaction
        #[arg(long)]
        batch_size: Option<usize>,
    },
    /// Run one upstream refresh (insert-or-update)
    Refresh {
        /// Fetch products from this URL instead of the configured source
        #[arg(long, conflicts_with = "file")]
        url: Option<String>,

        /// Read products from this JSON file instead of the configured source
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Apply pending schema migrations
    Migrate,
    /// Print catalog counters as JSON
    Stats,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init_simple_logging();

    let mut config = Config::load().context("Failed to load configuration")?;
    if let Some(url) = cli.database_url {
        config.database.url = url;
    }

    match cli.command {
        Commands::Migrate => {
            let pool = startup::connect_pool(&config.database).await?;
            startup::run_migrations(&pool).await?;
            println!("Migrations applied");
        }
        Commands::Seed {
            products,
            procedures,
            batch_size,
        } => {
            let store = connect_store(&config).await?;
            let loader = SeedLoader::new(store, batch_size.unwrap_or(config.ingest.batch_size));
            let report = loader
                .run(&products, &procedures)
                .await
                .context("Seed run failed")?;
            println!(
                "Products: {} inserted, {} already present",
                report.products.inserted, report.products.skipped
            );
            println!(
                "TUSS codes: {} inserted, {} already present",
                report.procedure_codes.inserted, report.procedure_codes.skipped
            );
        }
        Commands::Refresh { url, file } => {
            let source: Arc<dyn UpstreamSource> = match (url, file) {
                (Some(url), _) => Arc::new(HttpJsonSource::new(
                    url,
                    Duration::from_secs(config.ingest.request_timeout_seconds),
                )?),
                (None, Some(path)) => Arc::new(JsonFileSource::new(path)),
                (None, None) => source_from_config(&config.ingest)?
                    .context("No upstream source: pass --url/--file or configure ingest.upstream_url")?,
            };
            let store = connect_store(&config).await?;
            let refresher = Refresher::new(store, source, config.ingest.batch_size);
            let report = refresher.run_once().await.context("Refresh run failed")?;
            println!(
                "Fetched {}: {} inserted, {} updated, {} unchanged",
                report.fetched,
                report.outcome.inserted,
                report.outcome.updated,
                report.outcome.skipped
            );
        }
        Commands::Stats => {
            let store = connect_store(&config).await?;
            let stats = store.stats().await?;
            println!("{}", serde_json::to_string_pretty(&StatsView::from(stats))?);
        }
    }

    Ok(())
}

async fn connect_store(config: &Config) -> anyhow::Result<Arc<dyn CatalogStore>> {
    tracing::info!(database = config.redacted_database_url(), "Connecting");
    let pool = startup::connect_and_migrate(&config.database)
        .await
        .context("Failed to connect to database")?;
    Ok(Arc::new(PostgresCatalogStore::new(pool)))
}
