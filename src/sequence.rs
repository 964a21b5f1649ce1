//! Repeated run detection for sequence memory captures

use crate::types::SequenceResult;
use std::collections::HashSet;
use std::hash::Hash;
use tracing::debug;

/// Longest contiguous run that appears at least twice in `sequence`.
///
/// Lengths are tried from `n - 1` down to 1 and windows are scanned left to
/// right, so the first duplicate found at the greatest length wins.
/// Occurrences may overlap (`[1, 1, 1]` yields `[1, 1]`). Returns an empty
/// vector when nothing repeats.
pub fn longest_repeated_run<T: Eq + Hash + Clone>(sequence: &[T]) -> Vec<T> {
    for length in (1..sequence.len()).rev() {
        let mut seen: HashSet<&[T]> = HashSet::with_capacity(sequence.len() - length + 1);
        for window in sequence.windows(length) {
            if !seen.insert(window) {
                return window.to_vec();
            }
        }
    }
    Vec::new()
}

impl SequenceResult {
    /// Analyze the last successfully recalled sequence
    pub fn from_sequence(final_sequence: Vec<u32>) -> Self {
        let longest_sub_sequence = longest_repeated_run(&final_sequence);
        debug!(
            score = final_sequence.len(),
            repeat_len = longest_sub_sequence.len(),
            "analyzed sequence capture"
        );
        Self {
            score: final_sequence.len(),
            final_sequence,
            longest_sub_sequence,
        }
    }
}
