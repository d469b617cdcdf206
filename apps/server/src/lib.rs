//! Coverage Catalog - Rust implementation
//!
//! HTTP catalog of health-insurance products and TUSS procedure codes with:
//! - Filtered, searched and paginated listings with stable ordering
//! - Distinct-value facets for client-side filter controls
//! - Aggregate statistics
//! - Idempotent seed loading and periodic upstream refresh

#![allow(
    clippy::too_many_arguments,      // Row mappers take one argument per column
    clippy::large_enum_variant,      // Record enums mirror table rows
)]

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod request_context;
pub mod services;
pub mod startup;
pub mod state;
pub mod workers;

pub use config::Config;
pub use error::{Error, Result};
pub use state::AppState;
