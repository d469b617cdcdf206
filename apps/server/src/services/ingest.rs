//! Ingest service - write side of the catalog
//!
//! Two paths write rows, both through [`CatalogStore`] upserts keyed by the
//! business key, one transaction per batch:
//! - [`SeedLoader`] bulk-loads JSON files with insert-or-skip, so re-running it
//!   is a no-op.
//! - [`Refresher`] pulls products from an [`UpstreamSource`] with
//!   insert-or-update, refreshing `updated_at` on changed rows.

use crate::{
    db::{CatalogStore, UpsertMode, UpsertOutcome},
    metrics::{INGEST_ROWS_TOTAL, REFRESH_RUNS_TOTAL},
    models::{NewProcedureCode, NewProduct},
    services::upstream::UpstreamSource,
    Result,
};
use serde::{Deserialize, Deserializer, Serialize};
use std::{path::Path, sync::Arc};

/// Product row as published upstream and stored in the seed file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawProduct {
    #[serde(rename = "codProduto", deserialize_with = "lenient_string")]
    pub cod_produto: String,
    #[serde(rename = "planoProduto", deserialize_with = "lenient_string")]
    pub plano_produto: String,
    #[serde(rename = "planoANS", deserialize_with = "lenient_string")]
    pub plano_ans: String,
    #[serde(rename = "nomeRegistradoANS", deserialize_with = "lenient_string")]
    pub nome_registrado_ans: String,
    #[serde(deserialize_with = "lenient_string")]
    pub segmentacao: String,
    #[serde(deserialize_with = "lenient_string")]
    pub classificacao: String,
    #[serde(rename = "codOperadora", deserialize_with = "lenient_string")]
    pub cod_operadora: String,
    #[serde(rename = "nomeOperadora", deserialize_with = "lenient_string")]
    pub nome_operadora: String,
    #[serde(deserialize_with = "lenient_string")]
    pub situacao: String,
    #[serde(rename = "codProdutoAPI", deserialize_with = "lenient_string")]
    pub cod_produto_api: String,
    #[serde(rename = "codPlanoAPI", deserialize_with = "lenient_string")]
    pub cod_plano_api: String,
}

/// TUSS row as stored in the seed file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawProcedureCode {
    #[serde(deserialize_with = "lenient_string")]
    pub codigo: String,
    #[serde(deserialize_with = "lenient_string")]
    pub descricao: String,
}

/// Accept strings, numbers and null; codes sometimes arrive as JSON numbers.
fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    use serde_json::Value;
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(String::new()),
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected a string, found {other}"
        ))),
    }
}

impl From<RawProduct> for NewProduct {
    fn from(raw: RawProduct) -> Self {
        Self {
            product_code: raw.cod_produto,
            plan_name: raw.plano_produto,
            ans_plan_code: raw.plano_ans,
            ans_registered_name: raw.nome_registrado_ans,
            segment: raw.segmentacao,
            classification: raw.classificacao,
            operator_code: raw.cod_operadora,
            operator_name: raw.nome_operadora,
            status: raw.situacao,
            api_product_code: raw.cod_produto_api,
            api_plan_code: raw.cod_plano_api,
        }
    }
}

impl From<RawProcedureCode> for NewProcedureCode {
    fn from(raw: RawProcedureCode) -> Self {
        Self {
            code: raw.codigo,
            description: raw.descricao,
        }
    }
}

fn record_rows(entity: &str, outcome: &UpsertOutcome) {
    for (label, count) in [
        ("inserted", outcome.inserted),
        ("updated", outcome.updated),
        ("skipped", outcome.skipped),
    ] {
        if count > 0 {
            INGEST_ROWS_TOTAL
                .with_label_values(&[entity, label])
                .inc_by(count);
        }
    }
}

/// Upsert products in batches, one transaction each. A failing batch aborts.
pub async fn write_products(
    store: &dyn CatalogStore,
    rows: &[NewProduct],
    mode: UpsertMode,
    batch_size: usize,
) -> Result<UpsertOutcome> {
    let mut outcome = UpsertOutcome::default();
    for batch in rows.chunks(batch_size.max(1)) {
        let batch_outcome = store.upsert_products(batch, mode).await?;
        record_rows("product", &batch_outcome);
        outcome.merge(batch_outcome);
        tracing::info!(
            processed = outcome.total(),
            of = rows.len(),
            "Products batch written"
        );
    }
    Ok(outcome)
}

/// Upsert procedure codes in batches, one transaction each.
pub async fn write_procedure_codes(
    store: &dyn CatalogStore,
    rows: &[NewProcedureCode],
    mode: UpsertMode,
    batch_size: usize,
) -> Result<UpsertOutcome> {
    let mut outcome = UpsertOutcome::default();
    for batch in rows.chunks(batch_size.max(1)) {
        let batch_outcome = store.upsert_procedure_codes(batch, mode).await?;
        record_rows("procedure_code", &batch_outcome);
        outcome.merge(batch_outcome);
        tracing::info!(
            processed = outcome.total(),
            of = rows.len(),
            "TUSS codes batch written"
        );
    }
    Ok(outcome)
}

/// Counts from one seed run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub products: UpsertOutcome,
    pub procedure_codes: UpsertOutcome,
}

/// Loads `products.json` and `tuss.json` style files with insert-or-skip.
pub struct SeedLoader {
    store: Arc<dyn CatalogStore>,
    batch_size: usize,
}

impl SeedLoader {
    pub fn new(store: Arc<dyn CatalogStore>, batch_size: usize) -> Self {
        Self { store, batch_size }
    }

    pub async fn run(&self, products_path: &Path, procedures_path: &Path) -> Result<SeedReport> {
        let products = self.load_products(products_path).await?;
        let procedure_codes = self.load_procedure_codes(procedures_path).await?;
        Ok(SeedReport {
            products,
            procedure_codes,
        })
    }

    pub async fn load_products(&self, path: &Path) -> Result<UpsertOutcome> {
        let raw: Vec<RawProduct> = read_json(path).await?;
        tracing::info!(path = %path.display(), rows = raw.len(), "Seeding products");

        let rows: Vec<NewProduct> = raw.into_iter().map(NewProduct::from).collect();
        let outcome =
            write_products(self.store.as_ref(), &rows, UpsertMode::SkipExisting, self.batch_size)
                .await?;

        tracing::info!(
            inserted = outcome.inserted,
            skipped = outcome.skipped,
            "Products seeded"
        );
        Ok(outcome)
    }

    pub async fn load_procedure_codes(&self, path: &Path) -> Result<UpsertOutcome> {
        let raw: Vec<RawProcedureCode> = read_json(path).await?;
        tracing::info!(path = %path.display(), rows = raw.len(), "Seeding TUSS codes");

        let rows: Vec<NewProcedureCode> = raw.into_iter().map(NewProcedureCode::from).collect();
        let outcome = write_procedure_codes(
            self.store.as_ref(),
            &rows,
            UpsertMode::SkipExisting,
            self.batch_size,
        )
        .await?;

        tracing::info!(
            inserted = outcome.inserted,
            skipped = outcome.skipped,
            "TUSS codes seeded"
        );
        Ok(outcome)
    }
}

async fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let bytes = tokio::fs::read(path).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Result of one refresh run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshReport {
    /// Rows returned by the upstream
    pub fetched: usize,
    pub outcome: UpsertOutcome,
}

/// Pulls products from an upstream source and overwrites matching rows.
pub struct Refresher {
    store: Arc<dyn CatalogStore>,
    source: Arc<dyn UpstreamSource>,
    batch_size: usize,
}

impl Refresher {
    pub fn new(
        store: Arc<dyn CatalogStore>,
        source: Arc<dyn UpstreamSource>,
        batch_size: usize,
    ) -> Self {
        Self {
            store,
            source,
            batch_size,
        }
    }

    pub fn source_name(&self) -> &str {
        self.source.name()
    }

    /// One fetch-and-upsert pass. An empty upstream leaves stored data as is.
    #[tracing::instrument(skip_all, fields(source = self.source.name()))]
    pub async fn run_once(&self) -> Result<RefreshReport> {
        let source = self.source.name();
        let result = self.refresh().await;
        let status = match &result {
            Ok(report) if report.fetched == 0 => "empty",
            Ok(_) => "ok",
            Err(_) => "error",
        };
        REFRESH_RUNS_TOTAL.with_label_values(&[source, status]).inc();
        result
    }

    async fn refresh(&self) -> Result<RefreshReport> {
        let raw = self.source.fetch_products().await?;
        if raw.is_empty() {
            tracing::warn!("Upstream returned no products, keeping existing data");
            return Ok(RefreshReport::default());
        }

        let fetched = raw.len();
        let rows: Vec<NewProduct> = raw.into_iter().map(NewProduct::from).collect();
        let outcome =
            write_products(self.store.as_ref(), &rows, UpsertMode::Overwrite, self.batch_size)
                .await?;

        tracing::info!(
            fetched,
            inserted = outcome.inserted,
            updated = outcome.updated,
            unchanged = outcome.skipped,
            "Refresh complete"
        );
        Ok(RefreshReport { fetched, outcome })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_product_defaults_missing_fields() {
        let raw: RawProduct =
            serde_json::from_str(r#"{"codProduto": "1", "planoProduto": null}"#).unwrap();
        assert_eq!(raw.cod_produto, "1");
        assert_eq!(raw.plano_produto, "");
        assert_eq!(raw.cod_plano_api, "");
    }

    #[test]
    fn raw_product_accepts_numeric_codes() {
        let raw: RawProduct =
            serde_json::from_str(r#"{"codProduto": 123, "codOperadora": 6246}"#).unwrap();
        assert_eq!(raw.cod_produto, "123");
        assert_eq!(raw.cod_operadora, "6246");
    }

    #[test]
    fn raw_product_rejects_nested_values() {
        let result = serde_json::from_str::<RawProduct>(r#"{"codProduto": [1]}"#);
        assert!(result.is_err());
    }

    #[test]
    fn raw_product_maps_every_field() {
        let raw: RawProduct = serde_json::from_str(
            r#"{
                "codProduto": "P", "planoProduto": "PL", "planoANS": "A",
                "nomeRegistradoANS": "N", "segmentacao": "S", "classificacao": "C",
                "codOperadora": "O", "nomeOperadora": "ON", "situacao": "ST",
                "codProdutoAPI": "PA", "codPlanoAPI": "PLA"
            }"#,
        )
        .unwrap();
        let product = NewProduct::from(raw);
        assert_eq!(product.product_code, "P");
        assert_eq!(product.plan_name, "PL");
        assert_eq!(product.ans_plan_code, "A");
        assert_eq!(product.ans_registered_name, "N");
        assert_eq!(product.segment, "S");
        assert_eq!(product.classification, "C");
        assert_eq!(product.operator_code, "O");
        assert_eq!(product.operator_name, "ON");
        assert_eq!(product.status, "ST");
        assert_eq!(product.api_product_code, "PA");
        assert_eq!(product.api_plan_code, "PLA");
    }
}
