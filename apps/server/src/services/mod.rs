//! Service layer - catalog reads, seed loading and upstream refresh

pub mod catalog;
pub mod ingest;
pub mod upstream;

pub use catalog::CatalogService;
pub use ingest::{
    RawProcedureCode, RawProduct, RefreshReport, Refresher, SeedLoader, SeedReport,
};
pub use upstream::{source_from_config, HttpJsonSource, JsonFileSource, UpstreamSource};
