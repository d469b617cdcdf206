//! Core trait for catalog storage backends

use crate::{
    db::query::{Facet, PageRequest, ProcedureQuery, ProductQuery},
    models::{CatalogStats, NewProcedureCode, NewProduct, ProcedureCode, Product},
    Result,
};
use async_trait::async_trait;

/// What an upsert does when the business key already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertMode {
    /// Leave the existing row untouched (seed loading)
    SkipExisting,
    /// Overwrite non-key fields and refresh `updated_at` (upstream refresh)
    Overwrite,
}

/// Row counts produced by one upsert call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpsertOutcome {
    pub inserted: u64,
    pub updated: u64,
    /// Existing rows left as they were (skip mode, or overwrite with identical values)
    pub skipped: u64,
}

impl UpsertOutcome {
    pub fn merge(&mut self, other: UpsertOutcome) {
        self.inserted += other.inserted;
        self.updated += other.updated;
        self.skipped += other.skipped;
    }

    pub fn total(&self) -> u64 {
        self.inserted + self.updated + self.skipped
    }
}

/// Storage operations behind the catalog.
///
/// Any backend (PostgreSQL, in-memory) can implement this trait. Implementations
/// must order listing results by surrogate id ascending in both the count and
/// the page fetch, and must enforce business-key uniqueness for both entity
/// kinds. There is no delete operation.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Number of products matching `query`, ignoring pagination.
    async fn count_products(&self, query: &ProductQuery) -> Result<i64>;

    /// One page of products matching `query`.
    async fn fetch_products(&self, query: &ProductQuery, page: PageRequest)
        -> Result<Vec<Product>>;

    async fn count_procedure_codes(&self, query: &ProcedureQuery) -> Result<i64>;

    async fn fetch_procedure_codes(
        &self,
        query: &ProcedureQuery,
        page: PageRequest,
    ) -> Result<Vec<ProcedureCode>>;

    /// Product by surrogate id.
    async fn get_product(&self, id: i64) -> Result<Option<Product>>;

    /// Procedure code by business code.
    async fn get_procedure_code(&self, code: &str) -> Result<Option<ProcedureCode>>;

    /// Sorted distinct values currently stored for a facet.
    async fn distinct_values(&self, facet: Facet) -> Result<Vec<String>>;

    /// Aggregate counters, read from a single snapshot where supported.
    async fn stats(&self) -> Result<CatalogStats>;

    /// Insert-or-skip / insert-or-update keyed by (product code, plan name, API plan code).
    async fn upsert_products(&self, rows: &[NewProduct], mode: UpsertMode)
        -> Result<UpsertOutcome>;

    /// Insert-or-skip / insert-or-update keyed by code.
    async fn upsert_procedure_codes(
        &self,
        rows: &[NewProcedureCode],
        mode: UpsertMode,
    ) -> Result<UpsertOutcome>;
}
