//! Database layer - catalog storage backends and query compilation

pub mod memory;
pub mod postgres;
pub mod query;
pub mod traits;

pub use memory::InMemoryCatalogStore;
pub use postgres::PostgresCatalogStore;
pub use query::{
    Facet, Page, PageRequest, ProcedureQuery, ProcedureSearch, ProductFilters, ProductQuery,
    SearchTerm,
};
pub use traits::{CatalogStore, UpsertMode, UpsertOutcome};
