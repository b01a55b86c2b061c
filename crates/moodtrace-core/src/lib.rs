//! moodtrace-core: Shared types, configuration, and error handling for moodtrace.
//!
//! This crate provides the foundational types used across all moodtrace components:
//! - The closed set of emotion labels and the per-frame `Detection` score map
//! - Normalization of loosely shaped classifier output into `Option<Detection>`
//! - Session event types for observers of a running session
//! - Configuration management
//! - Common error types

pub mod config;
pub mod error;
pub mod events;
pub mod types;

pub use error::MoodtraceError;
pub use types::{ClassifierOutput, Detection, EmotionLabel};
