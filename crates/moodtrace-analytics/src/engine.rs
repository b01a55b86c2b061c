//! The session analytics engine.
//!
//! Owns the accumulated state of one session and exposes ingestion, queries,
//! and reset. All operations are infallible; an absent detection is a no-op.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use moodtrace_core::events::SessionId;
use moodtrace_core::{Detection, EmotionLabel};

use crate::histogram::DominantHistogram;
use crate::scoring::{ConfidenceRating, ObservationScore};
use crate::summary::{sort_averages, SessionSummary};

/// Everything accumulated since the session started.
///
/// `confidence_scores`, `clarity_scores`, and `dominant_history` always have
/// exactly `total_detections` entries. Each label's samples hold one entry per
/// recorded detection that reported that label.
#[derive(Debug, Clone, Default, PartialEq)]
struct SessionState {
    samples: [Vec<f64>; 7],
    confidence_scores: Vec<f64>,
    clarity_scores: Vec<f64>,
    dominant_history: Vec<Option<EmotionLabel>>,
    total_detections: u64,
}

impl SessionState {
    fn clear(&mut self) {
        for samples in &mut self.samples {
            samples.clear();
        }
        self.confidence_scores.clear();
        self.clarity_scores.clear();
        self.dominant_history.clear();
        self.total_detections = 0;
    }
}

/// Accumulates emotion detections for one session and derives statistics.
#[derive(Debug, Clone)]
pub struct SessionEngine {
    session_id: SessionId,
    started_at: DateTime<Utc>,
    state: SessionState,
}

impl Default for SessionEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionEngine {
    /// Start an empty session.
    pub fn new() -> Self {
        Self {
            session_id: SessionId::new(),
            started_at: Utc::now(),
            state: SessionState::default(),
        }
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Fold one classifier observation into the session.
    ///
    /// `None` means no face was found and leaves the session untouched. A
    /// present detection always counts, even with no labels.
    pub fn record(&mut self, detection: Option<&Detection>) -> Option<ObservationScore> {
        let Some(detection) = detection else {
            tracing::trace!(session_id = %self.session_id, "No face detected, nothing recorded");
            return None;
        };

        let observation = ObservationScore::of(detection);
        let state = &mut self.state;

        for (label, score) in detection.iter() {
            state.samples[label.index()].push(score);
        }
        state.dominant_history.push(observation.dominant_label());
        state.confidence_scores.push(observation.confidence);
        state.clarity_scores.push(observation.clarity);
        state.total_detections += 1;

        tracing::debug!(
            session_id = %self.session_id,
            dominant = ?observation.dominant_label(),
            confidence = observation.confidence,
            clarity = observation.clarity,
            total_detections = state.total_detections,
            "Detection recorded"
        );

        Some(observation)
    }

    pub fn total_detections(&self) -> u64 {
        self.state.total_detections
    }

    pub fn is_empty(&self) -> bool {
        self.state.total_detections == 0
    }

    /// Every score recorded for `label`, in arrival order.
    pub fn samples(&self, label: EmotionLabel) -> &[f64] {
        &self.state.samples[label.index()]
    }

    pub fn confidence_scores(&self) -> &[f64] {
        &self.state.confidence_scores
    }

    pub fn clarity_scores(&self) -> &[f64] {
        &self.state.clarity_scores
    }

    /// Dominant label per recorded detection; `None` where the detection had no labels.
    pub fn dominant_history(&self) -> &[Option<EmotionLabel>] {
        &self.state.dominant_history
    }

    /// Mean score per emotion over the detections that reported it; 0.0 if none did.
    pub fn average_emotions(&self) -> BTreeMap<EmotionLabel, f64> {
        self.averages_for(&EmotionLabel::ALL)
    }

    /// [`Self::average_emotions`] without the neutral baseline.
    pub fn non_neutral_emotion_averages(&self) -> BTreeMap<EmotionLabel, f64> {
        self.averages_for(&EmotionLabel::NON_NEUTRAL)
    }

    fn averages_for(&self, labels: &[EmotionLabel]) -> BTreeMap<EmotionLabel, f64> {
        labels
            .iter()
            .map(|&label| (label, mean(self.samples(label))))
            .collect()
    }

    /// Mean of the per-detection weighted confidence values.
    pub fn average_confidence(&self) -> f64 {
        mean(&self.state.confidence_scores)
    }

    pub fn average_clarity(&self) -> f64 {
        mean(&self.state.clarity_scores)
    }

    pub fn confidence_rating(score: f64) -> ConfidenceRating {
        ConfidenceRating::from_score(score)
    }

    pub fn dominant_emotion_histogram(&self) -> DominantHistogram {
        DominantHistogram::from_history(&self.state.dominant_history)
    }

    /// Aggregate view for reporting; `None` until at least one detection is recorded.
    pub fn summary(&self) -> Option<SessionSummary> {
        if self.is_empty() {
            return None;
        }

        let average_confidence = self.average_confidence();
        let histogram = self.dominant_emotion_histogram();

        Some(SessionSummary {
            session_id: self.session_id,
            started_at: self.started_at,
            total_detections: self.state.total_detections,
            average_confidence,
            confidence_rating: ConfidenceRating::from_score(average_confidence),
            average_clarity: self.average_clarity(),
            emotion_averages: sort_averages(&self.average_emotions()),
            dominant: histogram.most_frequent(),
            dominant_counts: histogram.counts().clone(),
        })
    }

    /// Clear all accumulated data and begin a new session.
    ///
    /// Returns the number of detections that were discarded.
    pub fn reset(&mut self) -> u64 {
        let cleared = self.state.total_detections;
        let previous = self.session_id;

        self.state.clear();
        self.session_id = SessionId::new();
        self.started_at = Utc::now();

        tracing::info!(
            previous_session = %previous,
            session_id = %self.session_id,
            cleared_detections = cleared,
            "Session data reset"
        );

        cleared
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}
