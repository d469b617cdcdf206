//! Domain models for the catalog
//!
//! Internal record shapes as stored. External view shapes live in
//! [`crate::api::views`] and are produced by explicit mapping.

pub mod procedure_code;
pub mod product;

pub use procedure_code::{NewProcedureCode, ProcedureCode};
pub use product::{NewProduct, Product, ProductKey};

/// Lookup key for a single catalog record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityKey {
    /// Product by surrogate id
    Product(i64),
    /// Procedure code by business code
    ProcedureCode(String),
}

/// A single catalog record of either kind.
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogRecord {
    Product(Product),
    ProcedureCode(ProcedureCode),
}

/// Aggregate counters over the whole catalog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CatalogStats {
    pub total_products: i64,
    pub total_procedure_codes: i64,
    pub distinct_plans: i64,
    pub distinct_segments: i64,
}
