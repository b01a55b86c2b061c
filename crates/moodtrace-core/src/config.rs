//! Configuration management for moodtrace.
//!
//! Configuration is loaded from (in priority order):
//! 1. Environment variables (`MOODTRACE__ANALYTICS__*`)
//! 2. Config file (`moodtrace.toml`, `[analytics]` section)
//! 3. Defaults

use serde::Deserialize;

use crate::error::{MoodtraceError, Result};

/// Settings for feeding and reporting a session.
///
/// The confidence weights are fixed constants and are not configurable.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct MoodtraceConfig {
    /// Only every Nth captured frame is sent to the engine (default 5).
    #[serde(default = "default_analyze_interval")]
    pub analyze_interval: u64,

    /// Report bars draw one glyph per `bar_divisor` percentage points (default 2.0).
    #[serde(default = "default_bar_divisor")]
    pub bar_divisor: f64,

    /// Print the weighting policy block in text reports.
    #[serde(default = "default_true")]
    pub show_weights: bool,

    /// Emit an interim report every K recorded detections during replay (0 disables).
    #[serde(default)]
    pub report_every: u64,
}

fn default_analyze_interval() -> u64 {
    5
}

fn default_bar_divisor() -> f64 {
    2.0
}

fn default_true() -> bool {
    true
}

impl Default for MoodtraceConfig {
    fn default() -> Self {
        Self {
            analyze_interval: default_analyze_interval(),
            bar_divisor: default_bar_divisor(),
            show_weights: default_true(),
            report_every: 0,
        }
    }
}

impl MoodtraceConfig {
    /// Load the `[analytics]` section from `{file_prefix}.toml` (optional) and
    /// `MOODTRACE__ANALYTICS__*` environment variables.
    ///
    /// A missing file or section yields defaults; present but invalid values are errors.
    pub fn load(file_prefix: &str) -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::File::with_name(file_prefix).required(false))
            .add_source(
                config::Environment::with_prefix("MOODTRACE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let loaded = match cfg.get::<MoodtraceConfig>("analytics") {
            Ok(c) => c,
            Err(config::ConfigError::NotFound(_)) => {
                tracing::debug!(file_prefix, "No [analytics] config found, using defaults");
                MoodtraceConfig::default()
            }
            Err(e) => return Err(e.into()),
        };

        loaded.validate()?;
        Ok(loaded)
    }

    /// Reject settings the ingest loop or report renderer cannot honor.
    pub fn validate(&self) -> Result<()> {
        if self.analyze_interval == 0 {
            return Err(MoodtraceError::Config(
                "analyze_interval must be at least 1".to_string(),
            ));
        }
        if !(self.bar_divisor.is_finite() && self.bar_divisor > 0.0) {
            return Err(MoodtraceError::Config(format!(
                "bar_divisor must be a positive number, got {}",
                self.bar_divisor
            )));
        }
        Ok(())
    }
}
