//! Reaction time analysis

use crate::stats;
use crate::types::ReactionTimeResult;
use tracing::{debug, warn};

/// Attempts in a full reaction time test
pub const ROUNDS: u32 = 5;

/// Summarize reaction times in milliseconds.
///
/// The geometric mean is left absent when a time is zero, since it is only
/// defined for positive values.
pub fn reaction_result(times: Vec<u32>) -> ReactionTimeResult {
    if times.is_empty() {
        return ReactionTimeResult {
            times,
            mean: None,
            geometric_mean: None,
            median: None,
            best: None,
        };
    }

    let values: Vec<f64> = times.iter().map(|&t| f64::from(t)).collect();
    let geometric_mean = match stats::geometric_mean(&values) {
        Ok(gm) => Some(gm),
        Err(e) => {
            warn!(error = %e, "geometric mean undefined for reaction times");
            None
        }
    };

    let result = ReactionTimeResult {
        mean: stats::mean(&values),
        geometric_mean,
        median: stats::median(&values),
        best: times.iter().copied().min(),
        times,
    };
    debug!(attempts = result.times.len(), best = ?result.best, "analyzed reaction capture");
    result
}

/// Recover the last attempt when only the average of all `rounds` is shown.
///
/// Formula: `displayed_mean * rounds - sum(previous)`. Returns `None` when the
/// implied time is not positive, which means the displayed figure was rounded
/// too coarsely or belongs to a different run.
pub fn infer_final_attempt(displayed_mean: u32, previous: &[u32], rounds: u32) -> Option<u32> {
    let implied = i64::from(displayed_mean) * i64::from(rounds)
        - previous.iter().map(|&t| i64::from(t)).sum::<i64>();
    u32::try_from(implied).ok().filter(|&t| t > 0)
}
