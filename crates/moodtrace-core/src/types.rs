//! Core domain types for moodtrace.
//!
//! A `Detection` is one classifier observation: a partial map from the closed
//! set of `EmotionLabel`s to percentage scores. `ClassifierOutput` is the
//! boundary where the classifier's loosely shaped JSON is normalized into
//! `Option<Detection>` before it reaches the analytics engine.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{MoodtraceError, Result};

// ── Emotion labels ────────────────────────────────────────────────

/// The fixed set of emotions reported by the upstream classifier.
///
/// Declaration order is significant: it is the tie-break order wherever two
/// labels compare equal, and the iteration order of every per-label view.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum EmotionLabel {
    Angry,
    Disgust,
    Fear,
    Happy,
    Sad,
    Surprise,
    Neutral,
}

impl EmotionLabel {
    /// All labels in declaration order.
    pub const ALL: [EmotionLabel; 7] = [
        Self::Angry,
        Self::Disgust,
        Self::Fear,
        Self::Happy,
        Self::Sad,
        Self::Surprise,
        Self::Neutral,
    ];

    /// Every label except `Neutral`, in declaration order.
    pub const NON_NEUTRAL: [EmotionLabel; 6] = [
        Self::Angry,
        Self::Disgust,
        Self::Fear,
        Self::Happy,
        Self::Sad,
        Self::Surprise,
    ];

    /// Position of this label in declaration order.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Exact lowercase match, as the classifier spells its score keys.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|label| label.as_str() == key)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Angry => "angry",
            Self::Disgust => "disgust",
            Self::Fear => "fear",
            Self::Happy => "happy",
            Self::Sad => "sad",
            Self::Surprise => "surprise",
            Self::Neutral => "neutral",
        }
    }
}

impl fmt::Display for EmotionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EmotionLabel {
    type Err = MoodtraceError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|label| label.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| MoodtraceError::InvalidDetection(format!("unknown emotion label: {s}")))
    }
}

// ── Detection ─────────────────────────────────────────────────────

/// One classifier observation: emotion label → percentage score in [0, 100].
///
/// Labels the classifier did not report are simply absent. Scores are not
/// required to sum to 100.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct Detection {
    scores: BTreeMap<EmotionLabel, f64>,
}

impl Detection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a detection from `(label, score)` pairs. Non-finite scores are dropped;
    /// a repeated label keeps its last score.
    pub fn from_scores(scores: impl IntoIterator<Item = (EmotionLabel, f64)>) -> Self {
        let mut detection = Self::new();
        for (label, score) in scores {
            detection.insert(label, score);
        }
        detection
    }

    /// Builder-style variant of [`Detection::insert`].
    pub fn with(mut self, label: EmotionLabel, score: f64) -> Self {
        self.insert(label, score);
        self
    }

    /// Set the score for `label`. Returns `false` if the score was rejected as non-finite.
    pub fn insert(&mut self, label: EmotionLabel, score: f64) -> bool {
        if !score.is_finite() {
            tracing::trace!(%label, score, "Dropping non-finite emotion score");
            return false;
        }
        self.scores.insert(label, score);
        true
    }

    pub fn get(&self, label: EmotionLabel) -> Option<f64> {
        self.scores.get(&label).copied()
    }

    pub fn contains(&self, label: EmotionLabel) -> bool {
        self.scores.contains_key(&label)
    }

    /// Present labels and their scores, in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (EmotionLabel, f64)> + '_ {
        self.scores.iter().map(|(&label, &score)| (label, score))
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// The label with the strictly highest score. Equal scores resolve to the
    /// label declared first. `None` for an empty detection.
    pub fn dominant(&self) -> Option<(EmotionLabel, f64)> {
        self.iter().fold(None, |best, (label, score)| match best {
            Some((_, best_score)) if score <= best_score => best,
            _ => Some((label, score)),
        })
    }

    /// Present labels sorted by descending score; equal scores keep declaration order.
    pub fn sorted_desc(&self) -> Vec<(EmotionLabel, f64)> {
        let mut pairs: Vec<_> = self.iter().collect();
        pairs.sort_by(|a, b| b.1.total_cmp(&a.1));
        pairs
    }

    /// The `n` strongest labels, strongest first.
    pub fn top(&self, n: usize) -> Vec<(EmotionLabel, f64)> {
        let mut pairs = self.sorted_desc();
        pairs.truncate(n);
        pairs
    }
}

impl FromIterator<(EmotionLabel, f64)> for Detection {
    fn from_iter<I: IntoIterator<Item = (EmotionLabel, f64)>>(iter: I) -> Self {
        Self::from_scores(iter)
    }
}

// ── Classifier output ─────────────────────────────────────────────

/// Raw classifier output as it arrives over JSON.
///
/// The classifier is inconsistent about its result shape: sometimes a bare
/// score map, sometimes `{"emotion": {...}, "region": ...}`, sometimes a list
/// of one such result, and `null` when no face was found. All of these are
/// normalized here so the engine only ever sees `Option<Detection>`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct ClassifierOutput(pub Value);

impl ClassifierOutput {
    /// Parse one JSON document (e.g. one line of a capture log).
    pub fn from_json_str(raw: &str) -> Result<Self> {
        Ok(Self(serde_json::from_str(raw)?))
    }

    pub fn into_detection(self) -> Result<Option<Detection>> {
        Self::parse(&self.0)
    }

    /// Normalize a classifier result into a detection, or `None` when no face was found.
    pub fn parse(value: &Value) -> Result<Option<Detection>> {
        match value {
            Value::Null => Ok(None),
            Value::Array(results) => match results.first() {
                Some(first) => Self::parse(first),
                None => Ok(None),
            },
            Value::Object(map) => match map.get("emotion") {
                Some(Value::Object(scores)) => parse_score_map(scores).map(Some),
                Some(other) => Err(MoodtraceError::InvalidDetection(format!(
                    "\"emotion\" must be an object, got {}",
                    json_kind(other)
                ))),
                None => parse_score_map(map).map(Some),
            },
            other => Err(MoodtraceError::InvalidDetection(format!(
                "expected object, array, or null, got {}",
                json_kind(other)
            ))),
        }
    }
}

fn parse_score_map(map: &serde_json::Map<String, Value>) -> Result<Detection> {
    let mut detection = Detection::new();
    for (key, value) in map {
        let Some(label) = EmotionLabel::from_key(key) else {
            continue;
        };
        let score = value.as_f64().ok_or_else(|| {
            MoodtraceError::InvalidDetection(format!(
                "score for {label} must be a number, got {}",
                json_kind(value)
            ))
        })?;
        detection.insert(label, score);
    }
    Ok(detection)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
