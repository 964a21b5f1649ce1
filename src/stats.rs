//! Statistics primitives
//!
//! Small order-statistic and averaging helpers shared by every analyzer.
//! Empty input never fails here: the averaging functions return `None` and
//! [`Summary::of`] returns the all-`None` sentinel.

use crate::error::AnalysisError;
use serde::{Deserialize, Serialize};

/// Arithmetic mean
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(total(values) / values.len() as f64)
}

/// Median; the average of the two middle values for even lengths
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Geometric mean, defined only for strictly positive values
pub fn geometric_mean(values: &[f64]) -> Result<f64, AnalysisError> {
    if values.is_empty() {
        return Err(AnalysisError::EmptyInput(
            "geometric mean of an empty sequence".to_string(),
        ));
    }

    if let Some(&bad) = values.iter().find(|v| **v <= 0.0) {
        return Err(AnalysisError::NonPositiveValue(bad));
    }

    // Averaging in log space keeps long runs of large values from overflowing
    let log_mean = values.iter().map(|v| v.ln()).sum::<f64>() / values.len() as f64;
    Ok(log_mean.exp())
}

/// Smallest value
pub fn min(values: &[f64]) -> Option<f64> {
    values.iter().copied().min_by(f64::total_cmp)
}

/// Largest value
pub fn max(values: &[f64]) -> Option<f64> {
    values.iter().copied().max_by(f64::total_cmp)
}

/// Sum of all values (0 for an empty slice)
pub fn total(values: &[f64]) -> f64 {
    values.iter().sum()
}

/// Five-number summary of a sample
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Summary {
    pub total: Option<f64>,
    pub mean: Option<f64>,
    pub median: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl Summary {
    /// The "no data" sentinel: every field absent
    pub fn empty() -> Self {
        Self::default()
    }

    /// Summarize a sample, returning the sentinel for empty input
    pub fn of(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::empty();
        }

        Self {
            total: Some(total(values)),
            mean: mean(values),
            median: median(values),
            min: min(values),
            max: max(values),
        }
    }

    /// Whether the summary carries data
    pub fn is_empty(&self) -> bool {
        self.total.is_none()
    }
}
