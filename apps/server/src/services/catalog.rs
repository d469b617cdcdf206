//! Catalog service - read side of the catalog
//!
//! Orchestrates listing queries by:
//! - Counting the full match set, then fetching one page of it
//! - Resolving exact lookups by surrogate id or business code
//! - Enumerating facet values and aggregate statistics
//!
//! Count and fetch run as two independent store calls. A concurrent writer can
//! make `total` and `items` disagree by the rows it touched in between; the
//! refresh worker is the only writer, so the window is small and accepted.

use crate::{
    db::{CatalogStore, Facet, Page, PageRequest, ProcedureQuery, ProductQuery},
    metrics::{CATALOG_QUERIES_TOTAL, CATALOG_QUERY_MATCHES},
    models::{CatalogRecord, CatalogStats, EntityKey, ProcedureCode, Product},
    Error, Result,
};
use std::sync::Arc;

pub struct CatalogService {
    store: Arc<dyn CatalogStore>,
}

impl CatalogService {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn CatalogStore> {
        &self.store
    }

    /// Filtered, searched page of products ordered by surrogate id.
    #[tracing::instrument(skip_all, fields(page = page.page, page_size = page.page_size))]
    pub async fn query_products(
        &self,
        query: &ProductQuery,
        page: PageRequest,
    ) -> Result<Page<Product>> {
        let result = async {
            let total = self.store.count_products(query).await?;
            let items = self.store.fetch_products(query, page).await?;
            Ok(Page::new(items, total, page))
        }
        .await;
        record_query("product", &result);
        result
    }

    /// Page of procedure codes. Digits-only terms are code prefixes.
    #[tracing::instrument(skip_all, fields(page = page.page, page_size = page.page_size))]
    pub async fn query_procedure_codes(
        &self,
        query: &ProcedureQuery,
        page: PageRequest,
    ) -> Result<Page<ProcedureCode>> {
        let result = async {
            let total = self.store.count_procedure_codes(query).await?;
            let items = self.store.fetch_procedure_codes(query, page).await?;
            Ok(Page::new(items, total, page))
        }
        .await;
        record_query("procedure_code", &result);
        result
    }

    pub async fn get_by_id(&self, key: &EntityKey) -> Result<Option<CatalogRecord>> {
        match key {
            EntityKey::Product(id) => Ok(self
                .store
                .get_product(*id)
                .await?
                .map(CatalogRecord::Product)),
            EntityKey::ProcedureCode(code) => Ok(self
                .store
                .get_procedure_code(code)
                .await?
                .map(CatalogRecord::ProcedureCode)),
        }
    }

    /// Product by id, or `Error::NotFound`.
    pub async fn product(&self, id: i64) -> Result<Product> {
        match self.get_by_id(&EntityKey::Product(id)).await? {
            Some(CatalogRecord::Product(product)) => Ok(product),
            _ => Err(Error::not_found("Product", id)),
        }
    }

    /// Procedure code by code, or `Error::NotFound`.
    pub async fn procedure_code(&self, code: &str) -> Result<ProcedureCode> {
        match self
            .get_by_id(&EntityKey::ProcedureCode(code.to_string()))
            .await?
        {
            Some(CatalogRecord::ProcedureCode(procedure)) => Ok(procedure),
            _ => Err(Error::not_found("TUSS code", code)),
        }
    }

    /// Sorted distinct values of one filterable product field.
    pub async fn facet(&self, facet: Facet) -> Result<Vec<String>> {
        let values = self.store.distinct_values(facet).await?;
        tracing::debug!(facet = facet.slug(), count = values.len(), "Facet values loaded");
        Ok(values)
    }

    pub async fn stats(&self) -> Result<CatalogStats> {
        self.store.stats().await
    }
}

fn record_query<T>(entity: &str, result: &Result<Page<T>>) {
    match result {
        Ok(page) => {
            CATALOG_QUERIES_TOTAL.with_label_values(&[entity, "ok"]).inc();
            CATALOG_QUERY_MATCHES
                .with_label_values(&[entity])
                .observe(page.total as f64);
            tracing::debug!(
                entity,
                total = page.total,
                returned = page.items.len(),
                "Catalog query completed"
            );
        }
        Err(e) => {
            CATALOG_QUERIES_TOTAL.with_label_values(&[entity, "error"]).inc();
            tracing::warn!(entity, error = %e, "Catalog query failed");
        }
    }
}
