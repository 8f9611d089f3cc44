//! Loopscan Common Utilities
//!
//! Shared infrastructure for all Loopscan crates:
//! - Error types and result aliases
//! - Sampling clock for fixed-rate offline analysis
//! - Tracing/logging initialization
//! - Configuration loading

pub mod clock;
pub mod config;
pub mod error;
pub mod logging;

pub use clock::*;
pub use config::*;
pub use error::*;
