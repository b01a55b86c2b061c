//! moodtrace-analytics: Session analytics over streams of emotion detections.
//!
//! Each recorded detection is reduced to a weighted confidence score, a
//! clarity gap, and a dominant emotion; the engine keeps these per session and
//! exposes averages, a dominant-emotion histogram, a confidence rating, and a
//! summary view. `SharedSessionEngine` wraps an engine for use across tasks
//! and publishes session events.

pub mod engine;
pub mod histogram;
pub mod report;
pub mod scoring;
pub mod shared;
pub mod summary;

pub use engine::SessionEngine;
pub use histogram::{DominantEntry, DominantHistogram};
pub use report::{render_detection, render_summary, ReportStyle};
pub use scoring::{ConfidenceRating, ObservationScore};
pub use shared::SharedSessionEngine;
pub use summary::{EmotionAverage, SessionSummary};
