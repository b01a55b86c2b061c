//! Dominant-emotion frequency counts.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use moodtrace_core::EmotionLabel;

/// The most frequent dominant emotion and how many detections it won.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DominantEntry {
    pub emotion: EmotionLabel,
    pub count: u64,
}

/// Histogram over the dominant emotion of every recorded detection.
///
/// Detections that carried no labels have no dominant emotion and are not counted.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DominantHistogram {
    counts: BTreeMap<EmotionLabel, u64>,
    most_frequent: Option<DominantEntry>,
}

impl DominantHistogram {
    /// Count a dominant-emotion history.
    ///
    /// Among labels with equal counts the one that first appeared earliest in
    /// the history is reported as most frequent.
    pub fn from_history(history: &[Option<EmotionLabel>]) -> Self {
        let mut counts = BTreeMap::new();
        let mut arrival = Vec::new();

        for label in history.iter().flatten() {
            let count = counts.entry(*label).or_insert(0u64);
            if *count == 0 {
                arrival.push(*label);
            }
            *count += 1;
        }

        let most_frequent = arrival
            .into_iter()
            .fold(None, |best: Option<DominantEntry>, emotion| {
                let count = counts[&emotion];
                match best {
                    Some(b) if count <= b.count => Some(b),
                    _ => Some(DominantEntry { emotion, count }),
                }
            });

        Self {
            counts,
            most_frequent,
        }
    }

    pub fn count(&self, label: EmotionLabel) -> u64 {
        self.counts.get(&label).copied().unwrap_or(0)
    }

    /// Per-label counts for labels that were dominant at least once.
    pub fn counts(&self) -> &BTreeMap<EmotionLabel, u64> {
        &self.counts
    }

    pub fn most_frequent(&self) -> Option<DominantEntry> {
        self.most_frequent
    }

    /// Number of detections that had a dominant emotion.
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}
