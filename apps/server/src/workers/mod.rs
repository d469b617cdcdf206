//! Background workers
//!
//! The only worker keeps the product table in step with the upstream source.

pub mod refresh;

pub use refresh::{run_refresh_loop, RefreshLoopConfig};
