//! Request handlers for API endpoints
//!
//! Handlers coordinate between routes and services, handling:
//! - Query and path extraction with validation
//! - Service invocation
//! - Mapping records to response views

pub mod catalog;
pub mod health;
pub mod metrics;

pub use catalog::*;
pub use health::*;
pub use metrics::*;
