//! CLI command implementations for herakles-iostat-exporter.
//!
//! This module provides implementations for all CLI subcommands:
//! - `check`: System validation
//! - `config`: Configuration file generation
//! - `test`: Collection testing
//! - `stats`: Statistic mapping listing

pub mod check;
pub mod config;
pub mod stats;
pub mod test;

// Re-export command functions
pub use check::command_check;
pub use config::command_config;
pub use stats::command_stats;
pub use test::command_test;
