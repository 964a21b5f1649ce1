//! Error types for humanbench

use thiserror::Error;

/// Errors that can occur during analysis
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Malformed grid: row {row} has {found} cells, expected {expected}")]
    MalformedGrid {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("Empty input: {0}")]
    EmptyInput(String),

    #[error("Non-positive value {0} where a strictly positive value is required")]
    NonPositiveValue(f64),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid capture: {0}")]
    InvalidCapture(String),
}
