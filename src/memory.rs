//! Level-based memory tests: chimp, visual memory and number memory
//!
//! These tests grow by one item per level, so most totals follow from the
//! number of completed levels.

use crate::types::{ChimpResult, GridRound, NumberResult, VisualResult};
use tracing::debug;

/// Numbers shown on the first chimp test level
pub const CHIMP_MIN_NUMBERS: u32 = 4;

/// Numbers shown on the last chimp test level
pub const CHIMP_MAX_NUMBERS: u32 = 40;

/// Chimp test levels between the first and the last
pub const CHIMP_MAX_LEVELS: usize = (CHIMP_MAX_NUMBERS - CHIMP_MIN_NUMBERS + 1) as usize;

/// Squares shown on the first visual memory level
pub const VISUAL_STARTING_SQUARES: u32 = 3;

/// Highest visual memory level accepted from a capture
pub const VISUAL_MAX_LEVEL: u32 = 10_000;

/// Sum of `1..=n`, saturating at `u64::MAX`
fn triangular(n: u64) -> u64 {
    n.saturating_mul(n.saturating_add(1)) / 2
}

/// Build the chimp test result from the analyzed grid of each completed level.
///
/// Level `k` shows `k + 3` numbers, so after `n` levels the last one showed
/// `n + 3` and `4 + 5 + ... + (n + 3)` squares were clicked in total.
pub fn chimp_result(grids: Vec<GridRound>, seconds: f64) -> ChimpResult {
    if grids.is_empty() {
        return ChimpResult {
            numbers: 0,
            grids,
            seconds,
            squares: 0,
            squares_per_second: None,
        };
    }

    let numbers = u32::try_from(grids.len())
        .unwrap_or(u32::MAX)
        .saturating_add(CHIMP_MIN_NUMBERS - 1);
    let squares = triangular(u64::from(numbers)) - triangular(u64::from(CHIMP_MIN_NUMBERS - 1));
    let squares_per_second = (seconds > 0.0).then(|| squares as f64 / seconds);

    debug!(numbers, squares, "analyzed chimp capture");
    ChimpResult {
        numbers,
        grids,
        seconds,
        squares,
        squares_per_second,
    }
}

/// Build the visual memory result.
///
/// `level_lost` is the level on which the run ended; level `k` shows `k + 2`
/// squares, so a score `s` covers `3 + 4 + ... + (s + 2)` squares.
pub fn visual_result(level_lost: u32, boards: Vec<GridRound>) -> VisualResult {
    let score = level_lost.saturating_sub(1);
    if score == 0 {
        return VisualResult {
            score: 0,
            total_squares: 0,
            boards: Vec::new(),
        };
    }

    let total_squares = triangular(u64::from(score) + u64::from(VISUAL_STARTING_SQUARES) - 1)
        - triangular(u64::from(VISUAL_STARTING_SQUARES - 1));
    debug!(score, total_squares, "analyzed visual memory capture");
    VisualResult {
        score,
        total_squares,
        boards,
    }
}

/// Build the number memory result from the numbers recalled correctly.
///
/// Level `k` shows a `k`-digit number, so `s` levels cover `s(s+1)/2` digits.
/// Numbers are decimal digit strings since later levels outgrow any integer
/// type; bytes other than ASCII digits are not counted.
pub fn number_result(numbers: Vec<String>) -> NumberResult {
    let score = numbers.len();
    let total_digits = score * (score + 1) / 2;

    let mut digit_breakdown = [0u32; 10];
    for digit in numbers
        .iter()
        .flat_map(|number| number.bytes())
        .filter(u8::is_ascii_digit)
    {
        digit_breakdown[usize::from(digit - b'0')] += 1;
    }

    NumberResult {
        score,
        numbers,
        total_digits,
        digit_breakdown,
    }
}
