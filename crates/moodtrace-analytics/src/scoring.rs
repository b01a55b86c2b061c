//! Per-detection scoring policy.
//!
//! Formula: `confidence = clamp(100 × Σ(score_i / 100 × weight_i) + 50, 45, 100)`
//! with absent labels contributing 0. Neutral and happy raise confidence,
//! every other emotion lowers it. The weights, offset, and bounds are fixed.

use serde::{Deserialize, Serialize};

use moodtrace_core::{Detection, EmotionLabel};

/// Fixed per-label confidence weights, in summation order.
pub const CONFIDENCE_WEIGHTS: [(EmotionLabel, f64); 7] = [
    (EmotionLabel::Neutral, 0.50),
    (EmotionLabel::Happy, 0.60),
    (EmotionLabel::Fear, -0.30),
    (EmotionLabel::Sad, -0.20),
    (EmotionLabel::Disgust, -0.15),
    (EmotionLabel::Angry, -0.10),
    (EmotionLabel::Surprise, -0.05),
];

/// Added to the weighted base score before clamping.
pub const CONFIDENCE_OFFSET: f64 = 50.0;
pub const CONFIDENCE_FLOOR: f64 = 45.0;
pub const CONFIDENCE_CEILING: f64 = 100.0;

/// Weighted confidence for one detection, always within `[45.0, 100.0]`.
pub fn weighted_confidence(detection: &Detection) -> f64 {
    let weighted_sum: f64 = CONFIDENCE_WEIGHTS
        .iter()
        .map(|&(label, weight)| detection.get(label).unwrap_or(0.0) / 100.0 * weight)
        .sum();

    let base_confidence = weighted_sum * 100.0;
    (base_confidence + CONFIDENCE_OFFSET).clamp(CONFIDENCE_FLOOR, CONFIDENCE_CEILING)
}

/// Gap between the two highest scores; 0.0 when fewer than two labels are present.
pub fn clarity(detection: &Detection) -> f64 {
    match detection.top(2).as_slice() {
        [(_, first), (_, second)] => first - second,
        _ => 0.0,
    }
}

/// Scores derived from a single recorded detection.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ObservationScore {
    /// Arg-max label and its score; `None` for a detection without labels.
    pub dominant: Option<(EmotionLabel, f64)>,
    pub confidence: f64,
    pub clarity: f64,
}

impl ObservationScore {
    pub fn of(detection: &Detection) -> Self {
        Self {
            dominant: detection.dominant(),
            confidence: weighted_confidence(detection),
            clarity: clarity(detection),
        }
    }

    pub fn dominant_label(&self) -> Option<EmotionLabel> {
        self.dominant.map(|(label, _)| label)
    }
}

/// Coarse rating of an average confidence value.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ConfidenceRating {
    #[serde(rename = "Very High")]
    VeryHigh,
    High,
    Moderate,
    Low,
    #[serde(rename = "Very Low")]
    VeryLow,
}

impl ConfidenceRating {
    /// Classify any real score. Out-of-range values and NaN never fail; NaN rates `VeryLow`.
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            Self::VeryHigh
        } else if score >= 60.0 {
            Self::High
        } else if score >= 40.0 {
            Self::Moderate
        } else if score >= 20.0 {
            Self::Low
        } else {
            Self::VeryLow
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::VeryHigh => "Very High",
            Self::High => "High",
            Self::Moderate => "Moderate",
            Self::Low => "Low",
            Self::VeryLow => "Very Low",
        }
    }
}

impl std::fmt::Display for ConfidenceRating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
