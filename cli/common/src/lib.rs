//! Shared utilities for cv-catalog CLI binaries.
//!
//! Logging setup, the common `--log-level` argument and number formatting
//! for run summaries.

pub mod args;
pub mod format;
pub mod logging;

pub use args::LogLevel;
pub use format::{format_number, format_seconds};
pub use logging::init_logging;
