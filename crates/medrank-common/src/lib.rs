//! medrank-common: shared error type and run configuration used across all medrank crates.

pub mod error;
pub mod ranking_config;

// Re-export commonly used types
pub use error::{MedrankError, Result};
pub use ranking_config::{CostView, DatasetConfig, OutputConfig, OutputFormat, RankingConfig, SubmissionsConfig};
