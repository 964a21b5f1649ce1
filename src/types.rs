//! Result record types
//!
//! Every analyzer hands back one of these plain records. They carry named
//! fields only, so a reporting layer can format them without knowing which
//! analyzer produced them.

use serde::{Deserialize, Serialize};

pub use crate::stats::Summary;

/// Summary of edge-to-edge gaps between consecutive aim targets
pub type DistanceSummary = Summary;

/// Centre of a clicked circular target, in pixels.
///
/// Serialized as a two-element array `[x, y]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "(i32, i32)", into = "(i32, i32)")]
pub struct Coordinate {
    pub x: i32,
    pub y: i32,
}

impl Coordinate {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance between two centres
    pub fn distance_to(&self, other: &Coordinate) -> f64 {
        let dx = f64::from(other.x) - f64::from(self.x);
        let dy = f64::from(other.y) - f64::from(self.y);
        dx.hypot(dy)
    }
}

impl From<(i32, i32)> for Coordinate {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

impl From<Coordinate> for (i32, i32) {
    fn from(c: Coordinate) -> Self {
        (c.x, c.y)
    }
}

// ============================================================================
// Grid-based memory tests
// ============================================================================

/// One analyzed grid: the captured cells and their island sizes (descending)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridRound {
    pub grid: Vec<Vec<u32>>,
    pub islands: Vec<usize>,
}

/// Chimp test result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChimpResult {
    /// Numbers shown on the last completed level
    pub numbers: u32,
    pub grids: Vec<GridRound>,
    pub seconds: f64,
    /// Squares clicked across all completed levels
    pub squares: u64,
    pub squares_per_second: Option<f64>,
}

/// Visual memory test result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualResult {
    pub score: u32,
    pub total_squares: u64,
    pub boards: Vec<GridRound>,
}

/// Sequence memory test result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceResult {
    /// Last successfully recalled sequence of cell indices
    pub final_sequence: Vec<u32>,
    pub score: usize,
    /// Longest contiguous run that occurs more than once in `final_sequence`
    pub longest_sub_sequence: Vec<u32>,
}

// ============================================================================
// Timing tests
// ============================================================================

/// Reaction time test result (milliseconds)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReactionTimeResult {
    pub times: Vec<u32>,
    pub mean: Option<f64>,
    pub geometric_mean: Option<f64>,
    pub median: Option<f64>,
    pub best: Option<u32>,
}

/// Aim trainer result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AimResult {
    pub targets: u32,
    pub seconds: f64,
    pub ms_per_target: f64,
    pub coordinates: Vec<Coordinate>,
    /// Absent when no target was hit at all
    pub distance: Option<DistanceSummary>,
}

/// Number memory test result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumberResult {
    pub score: usize,
    /// Decimal digit strings, one per level
    pub numbers: Vec<String>,
    pub total_digits: usize,
    /// Occurrences of each decimal digit, indexed by digit
    pub digit_breakdown: [u32; 10],
}

// ============================================================================
// Verbal memory
// ============================================================================

/// A word and how many times it was shown
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordCount {
    pub word: String,
    pub count: usize,
}

/// A word and a per-word character tally (vowels or consonants)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordTally {
    pub word: String,
    pub count: usize,
}

/// A word and the number of other words shown between two of its occurrences
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordGap {
    pub word: String,
    pub gap: usize,
}

/// Verbal memory test result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerbalResult {
    pub score: u32,
    pub most_common: Vec<WordCount>,
    pub unique_count: usize,
    pub duplicate_count: usize,
    pub average_word_length: Option<f64>,
    pub longest: Option<String>,
    pub shortest: Option<String>,
    pub most_vowels: Option<WordTally>,
    pub most_consonants: Option<WordTally>,
    pub biggest_gap: Option<WordGap>,
    pub smallest_gap: Option<WordGap>,
}

// ============================================================================
// Typing
// ============================================================================

/// Typing difficulty, each factor in [0, 100]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DifficultyScore {
    pub repeated_words: f64,
    /// Absent when the text has no alphanumeric characters
    pub capital_letters: Option<f64>,
    /// Absent when the text is empty
    pub punctuation: Option<f64>,
    /// Absent when any factor is absent
    pub overall: Option<f64>,
}

/// Typing test result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypingResult {
    pub words_per_min: u32,
    pub chars_per_min: Option<f64>,
    pub ms: Option<f64>,
    pub text: String,
    pub word_count: usize,
    pub character_count: usize,
    pub average_word_length: Option<f64>,
    pub punctuation_count: usize,
    pub difficulty: DifficultyScore,
}

/// Benchmark tests in report order
pub const TEST_NAMES: [&str; 8] = [
    "reaction", "sequence", "aim", "number", "verbal", "chimp", "visual", "typing",
];

/// Names of the tests flagged present, given flags in [`TEST_NAMES`] order
pub fn named_tests(present: [bool; 8]) -> Vec<&'static str> {
    TEST_NAMES
        .into_iter()
        .zip(present)
        .filter_map(|(name, present)| present.then_some(name))
        .collect()
}

/// Results for every test present in a capture bundle
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkReport {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reaction: Option<ReactionTimeResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence: Option<SequenceResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aim: Option<AimResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<NumberResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verbal: Option<VerbalResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chimp: Option<ChimpResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visual: Option<VisualResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub typing: Option<TypingResult>,
}

impl BenchmarkReport {
    /// Names of the tests with results, in report order
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
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinate_serializes_as_pair() {
        let json = serde_json::to_string(&Coordinate::new(120, -4)).unwrap();
        assert_eq!(json, "[120,-4]");

        let parsed: Vec<Coordinate> = serde_json::from_str("[[1,2],[3,4]]").unwrap();
        assert_eq!(parsed, vec![Coordinate::new(1, 2), Coordinate::new(3, 4)]);
    }

    #[test]
    fn test_coordinate_distance() {
        let a = Coordinate::new(0, 0);
        let b = Coordinate::new(3, 4);
        assert!((a.distance_to(&b) - 5.0).abs() < 1e-9);
        assert_eq!(a.distance_to(&a), 0.0);
    }

    #[test]
    fn test_empty_distance_summary_serializes_nulls() {
        let value = serde_json::to_value(DistanceSummary::empty()).unwrap();
        assert!(value["total"].is_null());
        assert!(value["median"].is_null());
    }

    #[test]
    fn test_report_tests_present() {
        let report = BenchmarkReport {
            number: Some(NumberResult {
                score: 0,
                numbers: vec![],
                total_digits: 0,
                digit_breakdown: [0; 10],
            }),
            ..Default::default()
        };
        assert_eq!(report.tests_present(), vec!["number"]);
        assert!(BenchmarkReport::default().tests_present().is_empty());
        assert_eq!(named_tests([true; 8]), TEST_NAMES.to_vec());
    }
}
