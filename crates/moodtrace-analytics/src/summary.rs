//! Read-only aggregate view over a session.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use moodtrace_core::events::SessionId;
use moodtrace_core::EmotionLabel;

use crate::histogram::DominantEntry;
use crate::scoring::ConfidenceRating;

/// Mean score of one emotion over the session.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct EmotionAverage {
    pub emotion: EmotionLabel,
    pub average: f64,
}

/// Snapshot of a non-empty session, as printed in the statistics report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionSummary {
    pub session_id: SessionId,
    pub started_at: DateTime<Utc>,
    pub total_detections: u64,
    pub average_confidence: f64,
    pub confidence_rating: ConfidenceRating,
    pub average_clarity: f64,
    /// All seven emotions, highest average first; equal averages keep declaration order.
    pub emotion_averages: Vec<EmotionAverage>,
    pub dominant: Option<DominantEntry>,
    pub dominant_counts: BTreeMap<EmotionLabel, u64>,
}

/// Order per-emotion averages for display, highest first.
pub fn sort_averages(averages: &BTreeMap<EmotionLabel, f64>) -> Vec<EmotionAverage> {
    let mut sorted: Vec<EmotionAverage> = averages
        .iter()
        .map(|(&emotion, &average)| EmotionAverage { emotion, average })
        .collect();
    sorted.sort_by(|a, b| b.average.total_cmp(&a.average));
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_averages_descending_with_stable_ties() {
        let averages = BTreeMap::from([
            (EmotionLabel::Angry, 0.0),
            (EmotionLabel::Happy, 42.0),
            (EmotionLabel::Sad, 42.0),
            (EmotionLabel::Neutral, 10.0),
        ]);
        let sorted = sort_averages(&averages);
        let order: Vec<_> = sorted.iter().map(|a| a.emotion).collect();
        assert_eq!(
            order,
            vec![
                EmotionLabel::Happy,
                EmotionLabel::Sad,
                EmotionLabel::Neutral,
                EmotionLabel::Angry,
            ]
        );
    }
}
