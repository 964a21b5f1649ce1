//! Typing test analysis
//!
//! Decomposes the typed extract into words and punctuation and rates how hard
//! it is for a human to type on a 0-100 scale. Three factors contribute:
//!
//! - repeated words make an extract slightly easier, more so when the repeat
//!   follows closely
//! - capital letters make it harder (shift is needed)
//! - punctuation makes it much harder, some characters more than others

use crate::types::{DifficultyScore, TypingResult};
use crate::verbal::WordOccurrenceLog;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Lowest difficulty
pub const MIN_DIFFICULTY: f64 = 0.0;

/// Highest difficulty
pub const MAX_DIFFICULTY: f64 = 100.0;

/// Starting point of the repeated words factor
const REPEATED_WORDS_BASE: f64 = 50.0;

/// Per-character punctuation weights (space lightest, quotes and brackets heaviest)
pub const DEFAULT_PUNCTUATION_WEIGHTS: [(char, f64); 12] = [
    (' ', 0.1),
    ('.', 2.0),
    (',', 2.0),
    ('-', 4.0),
    ('!', 5.0),
    ('?', 5.0),
    (':', 8.0),
    ('(', 8.0),
    (')', 8.0),
    ('\'', 8.0),
    ('"', 8.0),
    (';', 8.0),
];

/// Calibration of the difficulty scorer.
///
/// Rates map linearly onto the 0-100 scale: the easy rate scores 0 and the
/// hard rate scores 100.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DifficultyCalibration {
    /// Capital letters per alphanumeric character scoring 0
    pub easy_capital_rate: f64,
    /// Capital letters per alphanumeric character scoring 100
    pub hard_capital_rate: f64,
    /// Weighted punctuation points per character scoring 0
    pub easy_punctuation_rate: f64,
    /// Weighted punctuation points per character scoring 100
    pub hard_punctuation_rate: f64,
    pub repeated_words_weight: f64,
    pub capital_letters_weight: f64,
    pub punctuation_weight: f64,
    pub punctuation_weights: BTreeMap<char, f64>,
}

impl Default for DifficultyCalibration {
    fn default() -> Self {
        Self {
            easy_capital_rate: 0.01,
            hard_capital_rate: 0.03,
            easy_punctuation_rate: 0.04,
            hard_punctuation_rate: 0.12,
            repeated_words_weight: 0.15,
            capital_letters_weight: 0.35,
            punctuation_weight: 0.5,
            punctuation_weights: DEFAULT_PUNCTUATION_WEIGHTS.into_iter().collect(),
        }
    }
}

/// A typed extract broken down for scoring
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextSample {
    /// Space-separated words, lower-cased with non-alphanumerics stripped
    pub words: Vec<String>,
    /// Occurrences of every non-alphanumeric character, spaces included
    pub punctuation: BTreeMap<char, usize>,
    /// Characters in the extract
    pub character_count: usize,
    /// Alphanumeric characters (the summed word lengths)
    pub alnum_count: usize,
    pub capital_letter_count: usize,
}

impl TextSample {
    pub fn parse(text: &str) -> Self {
        let mut punctuation: BTreeMap<char, usize> = BTreeMap::new();
        let mut capital_letter_count = 0;
        let mut character_count = 0;

        for c in text.chars() {
            character_count += 1;
            if !c.is_alphanumeric() {
                *punctuation.entry(c).or_insert(0) += 1;
            }
            if c.is_uppercase() {
                capital_letter_count += 1;
            }
        }

        // Extracts are single-line, so only spaces separate words
        let words: Vec<String> = text
            .split(' ')
            .map(|token| {
                token
                    .chars()
                    .filter(|c| c.is_alphanumeric())
                    .flat_map(char::to_lowercase)
                    .collect::<String>()
            })
            .filter(|word| !word.is_empty())
            .collect();

        let alnum_count = words.iter().map(|w| w.chars().count()).sum();

        Self {
            words,
            punctuation,
            character_count,
            alnum_count,
            capital_letter_count,
        }
    }

    /// Total non-alphanumeric characters
    pub fn punctuation_count(&self) -> usize {
        self.punctuation.values().sum()
    }
}

fn clamp_difficulty(score: f64) -> f64 {
    score.clamp(MIN_DIFFICULTY, MAX_DIFFICULTY)
}

/// Map a rate onto 0-100 between an easy and a hard calibration point
fn interpolate(rate: f64, easy: f64, hard: f64) -> f64 {
    clamp_difficulty((rate - easy) / (hard - easy) * 100.0)
}

/// Repeated words factor.
///
/// Starts at 50. Each consecutive pair of the same word subtracts
/// `max(6 - log2(p2 - p1), -0.5)`, so a close repeat eases the extract and a
/// distant one can make it marginally harder. Every word used only once adds 1.
pub fn repeated_words_difficulty(words: &[String]) -> f64 {
    let log = WordOccurrenceLog::from_words(words);
    let mut difficulty = REPEATED_WORDS_BASE;

    for (_, positions) in log.iter() {
        if positions.len() == 1 {
            difficulty += 1.0;
        }
        for pair in positions.windows(2) {
            difficulty -= repeat_decrease(pair[1] - pair[0]);
        }
    }

    clamp_difficulty(difficulty)
}

/// Ease gained from a word repeating `distance` positions later
fn repeat_decrease(distance: usize) -> f64 {
    (6.0 - (distance as f64).log2()).max(-0.5)
}

/// Capital letters factor; `None` without alphanumeric characters
pub fn capital_letters_difficulty(
    capital_letter_count: usize,
    alnum_count: usize,
    calibration: &DifficultyCalibration,
) -> Option<f64> {
    if alnum_count == 0 {
        return None;
    }
    let rate = capital_letter_count as f64 / alnum_count as f64;
    Some(interpolate(
        rate,
        calibration.easy_capital_rate,
        calibration.hard_capital_rate,
    ))
}

/// Punctuation factor; `None` for an empty extract.
///
/// Characters outside the weight table carry no weight.
pub fn punctuation_difficulty(
    punctuation: &BTreeMap<char, usize>,
    character_count: usize,
    calibration: &DifficultyCalibration,
) -> Option<f64> {
    if character_count == 0 {
        return None;
    }
    let points: f64 = calibration
        .punctuation_weights
        .iter()
        .map(|(c, weight)| punctuation.get(c).copied().unwrap_or(0) as f64 * weight)
        .sum();
    let rate = points / character_count as f64;
    Some(interpolate(
        rate,
        calibration.easy_punctuation_rate,
        calibration.hard_punctuation_rate,
    ))
}

/// Rate a text sample.
///
/// Overall difficulty is the weighted mean of the clamped factors, so only the
/// ratio between the weights matters.
pub fn difficulty_score(sample: &TextSample, calibration: &DifficultyCalibration) -> DifficultyScore {
    let repeated_words = repeated_words_difficulty(&sample.words);
    let capital_letters = capital_letters_difficulty(
        sample.capital_letter_count,
        sample.alnum_count,
        calibration,
    );
    let punctuation =
        punctuation_difficulty(&sample.punctuation, sample.character_count, calibration);

    let weight_sum = calibration.repeated_words_weight
        + calibration.capital_letters_weight
        + calibration.punctuation_weight;

    let overall = match (capital_letters, punctuation) {
        (Some(capitals), Some(punct)) if weight_sum > 0.0 => Some(
            (repeated_words * calibration.repeated_words_weight
                + capitals * calibration.capital_letters_weight
                + punct * calibration.punctuation_weight)
                / weight_sum,
        ),
        _ => None,
    };

    DifficultyScore {
        repeated_words,
        capital_letters,
        punctuation,
        overall,
    }
}

/// Build the typing test result from the observed speed and the extract
pub fn typing_result(
    words_per_min: u32,
    text: &str,
    calibration: &DifficultyCalibration,
) -> TypingResult {
    let sample = TextSample::parse(text);
    let word_count = sample.words.len();

    let ms = (words_per_min > 0).then(|| word_count as f64 / f64::from(words_per_min) * 60_000.0);
    let chars_per_min = ms
        .filter(|ms| *ms > 0.0)
        .map(|ms| sample.character_count as f64 / ms * 60_000.0);
    let average_word_length =
        (word_count > 0).then(|| sample.alnum_count as f64 / word_count as f64);

    let difficulty = difficulty_score(&sample, calibration);
    debug!(
        words_per_min,
        word_count,
        overall = ?difficulty.overall,
        "analyzed typing capture"
    );

    TypingResult {
        words_per_min,
        chars_per_min,
        ms,
        text: text.to_string(),
        word_count,
        character_count: sample.character_count,
        average_word_length,
        punctuation_count: sample.punctuation_count(),
        difficulty,
    }
}
