//! Replay of recorded classifier output through a shared session.
//!
//! A reader task streams newline-delimited classifier results, one line per
//! captured frame, applies the frame sampler, normalizes each sampled frame,
//! and hands it over an mpsc channel to the recorder loop, which owns all
//! writes to the session.
//!
//! A line consisting of the word `reset` is a marker, not a frame: it clears
//! the session at that point in the stream and does not advance the sampler.

use std::io::Write;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;

use moodtrace_analytics::{render_summary, ReportStyle, SharedSessionEngine};
use moodtrace_core::{ClassifierOutput, Detection};

use crate::error::{CliError, Result};
use crate::sampler::FrameSampler;

const FRAME_BUFFER: usize = 64;
const RESET_MARKER: &str = "reset";

/// Options controlling a replay run.
#[derive(Debug, Clone)]
pub struct ReplayOptions {
    /// Analyze every Nth frame.
    pub every: u64,
    /// Write an interim report every K recorded detections (0 disables).
    pub report_every: u64,
    pub style: ReportStyle,
}

/// Counters describing a finished replay.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct ReplayStats {
    /// Non-blank input lines.
    pub frames: u64,
    /// Frames selected by the sampler.
    pub sampled: u64,
    /// Sampled frames in which a face was found.
    pub recorded: u64,
    /// Sampled frames with no face.
    pub absent: u64,
    /// Sampled frames that could not be parsed.
    pub malformed: u64,
    /// Reset markers applied.
    pub resets: u64,
}

/// What the reader hands to the recorder, in input order.
enum ReplayItem {
    /// A sampled frame after normalization.
    Frame {
        line: u64,
        detection: Option<Detection>,
    },
    Reset {
        line: u64,
    },
}

#[derive(Default)]
struct ReaderStats {
    frames: u64,
    sampled: u64,
    malformed: u64,
}

/// Replay `input` into `engine`, writing interim reports to `out`.
pub async fn replay<R, W>(
    input: R,
    engine: &SharedSessionEngine,
    options: &ReplayOptions,
    out: &mut W,
) -> Result<ReplayStats>
where
    R: AsyncBufRead + Unpin + Send + 'static,
    W: Write,
{
    let (tx, mut rx) = mpsc::channel(FRAME_BUFFER);
    let reader = tokio::spawn(read_frames(input, options.every, tx));

    let mut stats = ReplayStats::default();
    while let Some(item) = rx.recv().await {
        let (line, detection) = match item {
            ReplayItem::Reset { line } => {
                let cleared = engine.reset();
                tracing::info!(line, cleared_detections = cleared, "Reset marker applied");
                stats.resets += 1;
                continue;
            }
            ReplayItem::Frame { line, detection } => (line, detection),
        };

        if engine.record(detection.as_ref()).is_none() {
            tracing::debug!(line, "No face in frame");
            stats.absent += 1;
            continue;
        }
        stats.recorded += 1;

        if options.report_every > 0 && stats.recorded % options.report_every == 0 {
            let summary = engine.summary();
            writeln!(out, "{}", render_summary(summary.as_ref(), &options.style))?;
        }
    }

    let reader_stats = reader
        .await
        .map_err(|e| CliError::Reader(e.to_string()))??;
    stats.frames = reader_stats.frames;
    stats.sampled = reader_stats.sampled;
    stats.malformed = reader_stats.malformed;

    tracing::info!(
        frames = stats.frames,
        sampled = stats.sampled,
        recorded = stats.recorded,
        absent = stats.absent,
        malformed = stats.malformed,
        resets = stats.resets,
        "Replay complete"
    );

    Ok(stats)
}

async fn read_frames<R>(
    input: R,
    every: u64,
    tx: mpsc::Sender<ReplayItem>,
) -> Result<ReaderStats>
where
    R: AsyncBufRead + Unpin,
{
    let mut sampler = FrameSampler::new(every);
    let mut stats = ReaderStats::default();
    let mut lines = input.lines();
    let mut line_no = 0u64;

    while let Some(line) = lines.next_line().await? {
        line_no += 1;
        let raw = line.trim();
        if raw.is_empty() {
            continue;
        }
        if raw == RESET_MARKER {
            if tx.send(ReplayItem::Reset { line: line_no }).await.is_err() {
                tracing::warn!("Recorder stopped early, abandoning input");
                break;
            }
            continue;
        }

        stats.frames += 1;
        if !sampler.tick() {
            continue;
        }
        stats.sampled += 1;

        let parsed =
            ClassifierOutput::from_json_str(raw).and_then(ClassifierOutput::into_detection);
        let detection = match parsed {
            Ok(detection) => detection,
            Err(e) => {
                tracing::warn!(line = line_no, error = %e, "Skipping malformed frame");
                stats.malformed += 1;
                continue;
            }
        };

        let frame = ReplayItem::Frame {
            line: line_no,
            detection,
        };
        if tx.send(frame).await.is_err() {
            tracing::warn!("Recorder stopped early, abandoning input");
            break;
        }
    }

    Ok(stats)
}
