//! Capture bundle schema
//!
//! A capture bundle is what the external capture layer hands over after a
//! benchmark run: the raw values extracted from each test it completed. Every
//! test is optional.
//!
//! ```json
//! {
//!   "session_id": "run-42",
//!   "reaction": { "times": [231, 198, 240] },
//!   "aim": { "targets": 30, "seconds": 5.8, "coordinates": [[120, 300], [480, 96]] },
//!   "verbal": { "score": 88, "words": { "cat": [0, 3], "dog": [1] } },
//!   "typing": { "words_per_min": 140, "text": "The quick brown fox." }
//! }
//! ```

use crate::error::AnalysisError;
use crate::grid::Grid;
use crate::memory::{CHIMP_MAX_LEVELS, VISUAL_MAX_LEVEL};
use crate::spatial::TARGET_COUNT;
use crate::types::{named_tests, Coordinate};
use crate::verbal::WordOccurrenceLog;
use serde::{Deserialize, Deserializer, Serialize};

/// Reaction times in milliseconds, one per attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReactionCapture {
    pub times: Vec<u32>,
}

/// Last successfully recalled sequence of cell indices
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceCapture {
    pub final_sequence: Vec<u32>,
}

/// Aim trainer run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AimCapture {
    /// Targets the page confirmed as hit
    pub targets: u32,
    /// Elapsed time from the first to the last hit
    pub seconds: f64,
    /// Target centres in hit order
    pub coordinates: Vec<Coordinate>,
}

/// Numbers recalled correctly, one per level.
///
/// Later levels outgrow any integer type, so numbers are carried as decimal
/// digit strings. Plain JSON integers are accepted for the short ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumberCapture {
    #[serde(deserialize_with = "digit_strings")]
    pub numbers: Vec<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RecalledNumber {
    Digits(String),
    Integer(u64),
}

fn digit_strings<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let numbers = Vec::<RecalledNumber>::deserialize(deserializer)?;
    Ok(numbers
        .into_iter()
        .map(|n| match n {
            RecalledNumber::Digits(digits) => digits,
            RecalledNumber::Integer(n) => n.to_string(),
        })
        .collect())
}

/// Verbal memory run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerbalCapture {
    #[serde(default)]
    pub score: u32,
    pub words: WordOccurrenceLog,
}

/// Chimp test run: the numbered grid of each completed level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChimpCapture {
    pub grids: Vec<Grid>,
    pub seconds: f64,
}

/// Visual memory run: the active-square board of each completed level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualCapture {
    pub level_lost: u32,
    pub boards: Vec<Grid>,
}

/// Typing test run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypingCapture {
    pub words_per_min: u32,
    pub text: String,
}

/// Raw values from one benchmark run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CaptureBundle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reaction: Option<ReactionCapture>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence: Option<SequenceCapture>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aim: Option<AimCapture>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<NumberCapture>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verbal: Option<VerbalCapture>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chimp: Option<ChimpCapture>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visual: Option<VisualCapture>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub typing: Option<TypingCapture>,
}

impl CaptureBundle {
    /// Parse a bundle from JSON
    pub fn from_json(json: &str) -> Result<Self, AnalysisError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse newline-delimited bundles, skipping blank lines
    pub fn parse_ndjson(input: &str) -> Result<Vec<Self>, AnalysisError> {
        input
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(i, line)| {
                serde_json::from_str(line).map_err(|e| {
                    AnalysisError::InvalidCapture(format!("line {}: {}", i + 1, e))
                })
            })
            .collect()
    }

    /// Names of the tests present in this bundle, in report order
    pub fn tests_present(&self) -> Vec<&'static str> {
        named_tests([
            self.reaction.is_some(),
            self.sequence.is_some(),
            self.aim.is_some(),
            self.number.is_some(),
            self.verbal.is_some(),
            self.chimp.is_some(),
            self.visual.is_some(),
            self.typing.is_some(),
        ])
    }

    /// Check the values serde cannot: durations must be finite and
    /// non-negative, and counts must fit the test they came from
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if let Some(aim) = &self.aim {
            validate_seconds("aim", aim.seconds)?;
            if aim.targets > TARGET_COUNT {
                return Err(AnalysisError::InvalidCapture(format!(
                    "aim: {} targets hit, a run has {}",
                    aim.targets, TARGET_COUNT
                )));
            }
        }
        if let Some(number) = &self.number {
            if let Some(bad) = number
                .numbers
                .iter()
                .find(|n| n.is_empty() || !n.bytes().all(|b| b.is_ascii_digit()))
            {
                return Err(AnalysisError::InvalidCapture(format!(
                    "number: {bad:?} is not a decimal number"
                )));
            }
        }
        if let Some(chimp) = &self.chimp {
            validate_seconds("chimp", chimp.seconds)?;
            if chimp.grids.len() > CHIMP_MAX_LEVELS {
                return Err(AnalysisError::InvalidCapture(format!(
                    "chimp: {} grids, the test has {} levels",
                    chimp.grids.len(),
                    CHIMP_MAX_LEVELS
                )));
            }
        }
        if let Some(visual) = &self.visual {
            if visual.level_lost > VISUAL_MAX_LEVEL {
                return Err(AnalysisError::InvalidCapture(format!(
                    "visual: level {} is above the supported {}",
                    visual.level_lost, VISUAL_MAX_LEVEL
                )));
            }
            let completed = visual.level_lost.saturating_sub(1) as usize;
            if visual.boards.len() > completed {
                return Err(AnalysisError::InvalidCapture(format!(
                    "visual: {} boards for {} completed levels",
                    visual.boards.len(),
                    completed
                )));
            }
        }
        Ok(())
    }
}

fn validate_seconds(test: &str, seconds: f64) -> Result<(), AnalysisError> {
    if seconds.is_finite() && seconds >= 0.0 {
        Ok(())
    } else {
        Err(AnalysisError::InvalidCapture(format!(
            "{test}: seconds must be a non-negative number, got {seconds}"
        )))
    }
}
