//! Insertion-ordered frequency counter.

use std::collections::HashMap;

/// Counts keys while remembering the order they were first seen.
///
/// Ranking is a stable sort by count, so ties keep first-seen order.
#[derive(Debug, Clone, Default)]
pub struct Tally {
    counts: Vec<(String, usize)>,
    index: HashMap<String, usize>,
}

impl Tally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, key: &str) {
        match self.index.get(key) {
            Some(&pos) => self.counts[pos].1 += 1,
            None => {
                self.index.insert(key.to_string(), self.counts.len());
                self.counts.push((key.to_string(), 1));
            }
        }
    }

    /// The `n` most frequent keys, highest count first.
    pub fn top(self, n: usize) -> Vec<(String, usize)> {
        let mut ranked = self.counts;
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.truncate(n);
        ranked
    }
}
