//! Route tables

pub mod catalog;
pub mod metrics;

pub use catalog::catalog_routes;
pub use metrics::metrics_routes;
