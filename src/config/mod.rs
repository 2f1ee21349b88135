//! Application configuration and constants.
//!
//! This module provides:
//! - Configuration constants (timeouts, caps, heuristic thresholds)
//! - The `Config` options struct shared by the library and the CLI

mod constants;
mod types;

// Re-export all constants
pub use constants::*;
pub use types::{Config, LogFormat, LogLevel};
