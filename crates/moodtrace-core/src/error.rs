use thiserror::Error;

/// Top-level error type for moodtrace.
///
/// The analytics engine itself never fails; these errors only arise at the
/// boundaries where classifier output or configuration enter.
#[derive(Error, Debug)]
pub enum MoodtraceError {
    #[error("Invalid detection: {0}")]
    InvalidDetection(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<config::ConfigError> for MoodtraceError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, MoodtraceError>;
