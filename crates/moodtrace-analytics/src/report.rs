//! Plain-text rendering of session statistics and single detections.
//!
//! Numeric fields are fixed to two decimals; bar glyphs and column widths are
//! cosmetic.

use std::fmt;

use moodtrace_core::config::MoodtraceConfig;
use moodtrace_core::{Detection, EmotionLabel};

use crate::scoring::{
    ConfidenceRating, ObservationScore, CONFIDENCE_CEILING, CONFIDENCE_FLOOR, CONFIDENCE_OFFSET,
    CONFIDENCE_WEIGHTS,
};
use crate::summary::SessionSummary;

const RULE_WIDTH: usize = 50;
const BAR_GLYPH: &str = "█";
const MAX_BAR: usize = 100;

/// Cosmetic report settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportStyle {
    /// One bar glyph per this many percentage points.
    pub bar_divisor: f64,
    pub show_weights: bool,
}

impl Default for ReportStyle {
    fn default() -> Self {
        Self {
            bar_divisor: 2.0,
            show_weights: true,
        }
    }
}

impl From<&MoodtraceConfig> for ReportStyle {
    fn from(config: &MoodtraceConfig) -> Self {
        Self {
            bar_divisor: config.bar_divisor,
            show_weights: config.show_weights,
        }
    }
}

impl ReportStyle {
    fn bar(&self, value: f64) -> String {
        let glyphs = (value / self.bar_divisor).clamp(0.0, MAX_BAR as f64) as usize;
        BAR_GLYPH.repeat(glyphs)
    }
}

/// Render the session statistics report, or the "no data" notice for an empty session.
pub fn render_summary(summary: Option<&SessionSummary>, style: &ReportStyle) -> String {
    SummaryReport { summary, style }.to_string()
}

/// Render the per-detection analysis shown after each classified image.
pub fn render_detection(
    detection: &Detection,
    observation: &ObservationScore,
    style: &ReportStyle,
) -> String {
    DetectionReport {
        detection,
        observation,
        style,
    }
    .to_string()
}

struct SummaryReport<'a> {
    summary: Option<&'a SessionSummary>,
    style: &'a ReportStyle,
}

impl fmt::Display for SummaryReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(summary) = self.summary else {
            writeln!(f, "=== Session Statistics ===")?;
            return writeln!(f, "No emotion detections recorded yet.");
        };
        let rule = "-".repeat(RULE_WIDTH);
        let heavy = "=".repeat(RULE_WIDTH);

        writeln!(f, "{heavy}")?;
        writeln!(f, "=== Session Statistics ===")?;
        writeln!(f, "Total Detections: {}", summary.total_detections)?;
        writeln!(f, "{rule}")?;

        writeln!(f, "Confidence Metrics (weighted emotion method):")?;
        writeln!(f, "{rule}")?;
        if self.style.show_weights {
            write_weights(f)?;
            writeln!(f, "{rule}")?;
        }
        writeln!(f, "Average Confidence: {:6.2}%", summary.average_confidence)?;
        writeln!(f, "Confidence Rating: {}", summary.confidence_rating)?;
        writeln!(f, "Average Detection Clarity: {:6.2}%", summary.average_clarity)?;
        writeln!(
            f,
            "Confidence Level: {} {:.1}%",
            self.style.bar(summary.average_confidence),
            summary.average_confidence
        )?;
        writeln!(f, "{rule}")?;

        writeln!(f, "Average Emotion Values:")?;
        writeln!(f, "{rule}")?;
        for entry in &summary.emotion_averages {
            writeln!(
                f,
                "{:<12}: {:6.2}% {}",
                entry.emotion.as_str(),
                entry.average,
                self.style.bar(entry.average)
            )?;
        }

        if let Some(dominant) = summary.dominant {
            writeln!(f)?;
            writeln!(
                f,
                "Most Frequently Dominant Emotion: {} ({} times)",
                dominant.emotion, dominant.count
            )?;
        }
        writeln!(f, "{heavy}")
    }
}

fn write_weights(f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let terms: Vec<String> = CONFIDENCE_WEIGHTS
        .iter()
        .map(|&(label, weight)| format!("{}({:+.2})", title_case(label), weight))
        .collect();
    let (first, second) = terms.split_at(4);
    writeln!(f, "Weights: {},", first.join(", "))?;
    writeln!(f, "         {}", second.join(", "))?;
    writeln!(
        f,
        "Base Offset: {:+} (clamped to {}-{})",
        CONFIDENCE_OFFSET, CONFIDENCE_FLOOR, CONFIDENCE_CEILING
    )
}

fn title_case(label: EmotionLabel) -> String {
    let name = label.as_str();
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

struct DetectionReport<'a> {
    detection: &'a Detection,
    observation: &'a ObservationScore,
    style: &'a ReportStyle,
}

impl fmt::Display for DetectionReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Emotion Analysis ===")?;
        if self.detection.is_empty() {
            writeln!(f, "No emotion scores reported.")?;
        }
        for (label, score) in self.detection.sorted_desc() {
            writeln!(
                f,
                "{:<12}: {:6.2}% {}",
                label.as_str(),
                score,
                self.style.bar(score)
            )?;
        }

        if let Some((label, score)) = self.observation.dominant {
            writeln!(f)?;
            writeln!(f, ">>> Dominant Emotion: {label} ({score:.2}%) <<<")?;
        }
        writeln!(
            f,
            "Confidence: {:.2}% ({})",
            self.observation.confidence,
            ConfidenceRating::from_score(self.observation.confidence)
        )?;
        writeln!(f, "Clarity: {:.2}%", self.observation.clarity)
    }
}
