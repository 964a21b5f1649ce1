//! Verbal memory word statistics
//!
//! Aggregates the words shown during a verbal memory run: how often each
//! appeared, which were extremal by length or letter makeup, and how far apart
//! repeat appearances of the same word were.

use crate::stats;
use crate::types::{VerbalResult, WordCount, WordGap, WordTally};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

/// Number of most frequent words reported
pub const MOST_COMMON_COUNT: usize = 10;

const VOWELS: [char; 5] = ['a', 'e', 'i', 'o', 'u'];

// ============================================================================
// Word occurrence log
// ============================================================================

/// Positions at which each word was shown during one run.
///
/// Words keep the order in which they were first recorded; that order breaks
/// every tie in [`verbal_result`]. Words are lower-cased and positions are
/// kept strictly ascending.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordOccurrenceLog {
    entries: Vec<(String, Vec<usize>)>,
    index: HashMap<String, usize>,
    next_position: usize,
}

impl WordOccurrenceLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a log from words in the order they were shown
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut log = Self::new();
        for word in words {
            log.record(word.as_ref());
        }
        log
    }

    /// Record the next word shown, returning its position
    pub fn record(&mut self, word: &str) -> usize {
        let position = self.next_position;
        self.push_positions(word, &[position]);
        position
    }

    /// Add known positions for a word
    pub fn insert(&mut self, word: &str, positions: &[usize]) {
        self.push_positions(word, positions);
    }

    fn push_positions(&mut self, word: &str, positions: &[usize]) {
        let key = word.to_lowercase();
        let slot = match self.index.get(&key) {
            Some(&slot) => slot,
            None => {
                self.entries.push((key.clone(), Vec::new()));
                self.index.insert(key, self.entries.len() - 1);
                self.entries.len() - 1
            }
        };

        // A position holds one word, so repeats of it collapse
        let list = &mut self.entries[slot].1;
        list.extend_from_slice(positions);
        list.sort_unstable();
        list.dedup();

        if let Some(&last) = positions.iter().max() {
            self.next_position = self.next_position.max(last + 1);
        }
    }

    /// Positions of a word, if it was shown
    pub fn positions(&self, word: &str) -> Option<&[usize]> {
        self.index
            .get(&word.to_lowercase())
            .map(|&slot| self.entries[slot].1.as_slice())
    }

    /// Words with their positions, in first-recorded order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[usize])> {
        self.entries
            .iter()
            .map(|(word, positions)| (word.as_str(), positions.as_slice()))
    }

    /// Number of distinct words
    pub fn unique_count(&self) -> usize {
        self.entries.len()
    }

    /// Number of words shown, counting repeats
    pub fn total_occurrences(&self) -> usize {
        self.entries.iter().map(|(_, positions)| positions.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for WordOccurrenceLog {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (word, positions) in &self.entries {
            map.serialize_entry(word, positions)?;
        }
        map.end()
    }
}

/// Reads a JSON object keeping its key order
struct WordOccurrenceLogVisitor;

impl<'de> Visitor<'de> for WordOccurrenceLogVisitor {
    type Value = WordOccurrenceLog;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of words to position lists")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut log = WordOccurrenceLog::new();
        while let Some((word, positions)) = access.next_entry::<String, Vec<usize>>()? {
            log.insert(&word, &positions);
        }
        Ok(log)
    }
}

impl<'de> Deserialize<'de> for WordOccurrenceLog {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(WordOccurrenceLogVisitor)
    }
}

// ============================================================================
// Ranked list
// ============================================================================

/// Bounded list ordered by descending count.
///
/// Items with equal counts stay in the order they were offered, so the
/// ranking is stable with respect to the scan order of the log.
#[derive(Debug, Clone)]
pub struct RankedList<T> {
    capacity: usize,
    entries: Vec<(T, usize)>,
}

impl<T> RankedList<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: Vec::with_capacity(capacity.saturating_add(1)),
        }
    }

    /// Offer an item; returns whether it made the list
    pub fn offer(&mut self, item: T, count: usize) -> bool {
        if self.capacity == 0 {
            return false;
        }
        if self.entries.len() == self.capacity
            && self.entries.last().is_some_and(|(_, last)| count <= *last)
        {
            return false;
        }

        // First slot holding a strictly smaller count keeps ties first-come
        let slot = self
            .entries
            .iter()
            .position(|(_, existing)| count > *existing)
            .unwrap_or(self.entries.len());
        self.entries.insert(slot, (item, count));
        self.entries.truncate(self.capacity);
        true
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(T, usize)> {
        self.entries.iter()
    }

    pub fn into_vec(self) -> Vec<(T, usize)> {
        self.entries
    }
}

// ============================================================================
// Aggregation
// ============================================================================

/// Vowels (a, e, i, o, u) in a lower-case word
pub fn count_vowels(word: &str) -> usize {
    word.chars().filter(|c| VOWELS.contains(c)).count()
}

/// Alphabetic characters that are not vowels
pub fn count_consonants(word: &str) -> usize {
    word.chars()
        .filter(|c| c.is_alphabetic() && !VOWELS.contains(c))
        .count()
}

/// Replace `current` when `value` beats it; ties keep the earlier word
fn keep_first_best<'a>(
    current: &mut Option<(&'a str, usize)>,
    word: &'a str,
    value: usize,
    better: impl Fn(usize, usize) -> bool,
) {
    let replace = match current {
        Some((_, best)) => better(value, *best),
        None => true,
    };
    if replace {
        *current = Some((word, value));
    }
}

/// Aggregate a verbal memory run.
///
/// Gap between two consecutive occurrences of a word is the number of other
/// words shown in between: `p2 - p1 - 1`.
pub fn verbal_result(log: &WordOccurrenceLog, score: u32, top_k: usize) -> VerbalResult {
    let unique_count = log.unique_count();
    let duplicate_count = log.total_occurrences() - unique_count;

    let lengths: Vec<f64> = log
        .iter()
        .map(|(word, _)| word.chars().count() as f64)
        .collect();
    let average_word_length = stats::mean(&lengths);

    let mut most_common = RankedList::new(top_k);
    let mut longest: Option<(&str, usize)> = None;
    let mut shortest: Option<(&str, usize)> = None;
    let mut most_vowels: Option<(&str, usize)> = None;
    let mut most_consonants: Option<(&str, usize)> = None;
    let mut biggest_gap: Option<(&str, usize)> = None;
    let mut smallest_gap: Option<(&str, usize)> = None;

    for (word, positions) in log.iter() {
        most_common.offer(word, positions.len());

        let length = word.chars().count();
        keep_first_best(&mut longest, word, length, |a, b| a > b);
        keep_first_best(&mut shortest, word, length, |a, b| a < b);
        keep_first_best(&mut most_vowels, word, count_vowels(word), |a, b| a > b);
        keep_first_best(&mut most_consonants, word, count_consonants(word), |a, b| a > b);

        for pair in positions.windows(2) {
            let gap = pair[1] - pair[0] - 1;
            keep_first_best(&mut biggest_gap, word, gap, |a, b| a > b);
            keep_first_best(&mut smallest_gap, word, gap, |a, b| a < b);
        }
    }

    let tally = |pick: Option<(&str, usize)>| {
        pick.map(|(word, count)| WordTally {
            word: word.to_string(),
            count,
        })
    };
    let gap = |pick: Option<(&str, usize)>| {
        pick.map(|(word, gap)| WordGap {
            word: word.to_string(),
            gap,
        })
    };

    let result = VerbalResult {
        score,
        most_common: most_common
            .into_vec()
            .into_iter()
            .map(|(word, count)| WordCount {
                word: word.to_string(),
                count,
            })
            .collect(),
        unique_count,
        duplicate_count,
        average_word_length,
        longest: longest.map(|(w, _)| w.to_string()),
        shortest: shortest.map(|(w, _)| w.to_string()),
        most_vowels: tally(most_vowels),
        most_consonants: tally(most_consonants),
        biggest_gap: gap(biggest_gap),
        smallest_gap: gap(smallest_gap),
    };

    debug!(
        unique = result.unique_count,
        duplicates = result.duplicate_count,
        "aggregated verbal memory log"
    );
    result
}
