//! Analysis configuration
//!
//! Every field defaults to the calibration the benchmark tests were tuned
//! with, so an empty JSON object is a valid configuration.

use crate::error::AnalysisError;
use crate::spatial::TARGET_RADIUS;
use crate::typing::DifficultyCalibration;
use crate::verbal::MOST_COMMON_COUNT;
use serde::{Deserialize, Serialize};

/// Tunable parameters shared by the analyzers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Radius of each aim target in pixels
    pub target_radius: f64,
    /// How many of the most frequent verbal memory words to report
    pub most_common_count: usize,
    /// Typing difficulty calibration
    pub difficulty: DifficultyCalibration,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            target_radius: TARGET_RADIUS,
            most_common_count: MOST_COMMON_COUNT,
            difficulty: DifficultyCalibration::default(),
        }
    }
}

impl AnalysisConfig {
    /// Parse and validate a JSON configuration
    pub fn from_json(json: &str) -> Result<Self, AnalysisError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String, AnalysisError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject configurations that would make a score meaningless
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if !(self.target_radius.is_finite() && self.target_radius >= 0.0) {
            return Err(AnalysisError::InvalidConfig(format!(
                "target_radius must be a non-negative number, got {}",
                self.target_radius
            )));
        }

        if self.most_common_count == 0 {
            return Err(AnalysisError::InvalidConfig(
                "most_common_count must be at least 1".to_string(),
            ));
        }

        let d = &self.difficulty;
        if d.easy_capital_rate == d.hard_capital_rate {
            return Err(AnalysisError::InvalidConfig(
                "capital letter easy and hard rates must differ".to_string(),
            ));
        }
        if d.easy_punctuation_rate == d.hard_punctuation_rate {
            return Err(AnalysisError::InvalidConfig(
                "punctuation easy and hard rates must differ".to_string(),
            ));
        }

        let weights = [
            d.repeated_words_weight,
            d.capital_letters_weight,
            d.punctuation_weight,
        ];
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(AnalysisError::InvalidConfig(
                "difficulty weights must be non-negative".to_string(),
            ));
        }
        if weights.iter().sum::<f64>() <= 0.0 {
            return Err(AnalysisError::InvalidConfig(
                "difficulty weights must not all be zero".to_string(),
            ));
        }

        if let Some((c, w)) = d
            .punctuation_weights
            .iter()
            .find(|(_, w)| !w.is_finite() || **w < 0.0)
        {
            return Err(AnalysisError::InvalidConfig(format!(
                "punctuation weight for {c:?} must be non-negative, got {w}"
            )));
        }

        Ok(())
    }
}
