//! moodtrace-cli: Drives a session from recorded classifier output.
//!
//! Reads newline-delimited classifier results, samples every Nth frame the
//! way a live capture loop does, and feeds the normalized detections to a
//! shared session engine.

pub mod error;
pub mod replay;
pub mod sampler;

pub use error::CliError;
