//! CLI entry point for moodtrace.
//!
//! Reports go to stdout; logs and session events go to stderr.

use clap::{Parser, Subcommand, ValueEnum};
use tokio::io::{AsyncBufRead, BufReader};
use tokio::sync::broadcast::{self, error::RecvError};
use tracing_subscriber::{fmt, EnvFilter};

use moodtrace_analytics::{
    render_detection, render_summary, ConfidenceRating, ObservationScore, ReportStyle,
    SharedSessionEngine,
};
use moodtrace_core::config::MoodtraceConfig;
use moodtrace_core::events::SessionEvent;
use moodtrace_core::ClassifierOutput;

use moodtrace_cli::replay::{replay, ReplayOptions};

#[derive(Parser)]
#[command(name = "moodtrace")]
#[command(about = "Emotional-engagement statistics over a session of face-emotion detections")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Config file prefix (default: moodtrace).
    #[arg(short, long, default_value = "moodtrace", global = true)]
    config: String,

    /// Emit logs as JSON.
    #[arg(long, global = true)]
    json_logs: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Replay newline-delimited classifier output (one frame per line) through a session.
    ///
    /// A line containing only `reset` clears the session at that point.
    Replay {
        /// Input file, or `-` for stdin.
        #[arg(short, long, default_value = "-")]
        input: String,

        /// Analyze every Nth frame (default: analytics.analyze_interval). Use 1 for every line.
        #[arg(long)]
        every: Option<u64>,

        /// Print an interim report every K recorded detections.
        #[arg(long)]
        report_every: Option<u64>,

        /// Output format for the final report.
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Echo session events to stderr as JSON lines.
        #[arg(long)]
        events: bool,
    },
    /// Analyze a single classifier result.
    Inspect {
        /// Input file, or `-` for stdin.
        #[arg(short, long, default_value = "-")]
        input: String,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Print the confidence rating for a score.
    Rate {
        #[arg(allow_negative_numbers = true)]
        score: f64,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.json_logs);

    match cli.command {
        Command::Replay {
            ref input,
            every,
            report_every,
            format,
            events,
        } => {
            let config = MoodtraceConfig::load(&cli.config)?;
            let options = ReplayOptions {
                every: every.unwrap_or(config.analyze_interval),
                report_every: report_every.unwrap_or(config.report_every),
                style: ReportStyle::from(&config),
            };
            if options.every == 0 {
                anyhow::bail!("--every must be at least 1");
            }
            tracing::info!(
                input = %input,
                every = options.every,
                report_every = options.report_every,
                "Starting replay"
            );

            let engine = SharedSessionEngine::new();
            let echo = events.then(|| tokio::spawn(echo_events(engine.subscribe())));

            let reader = open_input(input).await?;
            let mut stdout = std::io::stdout();
            let stats = replay(reader, &engine, &options, &mut stdout).await?;
            let summary = engine.summary();

            // Dropping the last handle closes the event channel so the echo task drains and exits.
            drop(engine);
            if let Some(echo) = echo {
                echo.await?;
            }

            match format {
                OutputFormat::Text => {
                    println!("{}", render_summary(summary.as_ref(), &options.style))
                }
                OutputFormat::Json => println!(
                    "{}",
                    serde_json::to_string_pretty(&serde_json::json!({
                        "replay": stats,
                        "summary": summary,
                    }))?
                ),
            }
        }
        Command::Inspect { ref input, format } => {
            let config = MoodtraceConfig::load(&cli.config)?;
            let raw = read_all(input).await?;
            let detection = ClassifierOutput::from_json_str(&raw)?.into_detection()?;

            match (detection, format) {
                (None, OutputFormat::Text) => println!("No face detected."),
                (None, OutputFormat::Json) => println!("null"),
                (Some(detection), OutputFormat::Text) => {
                    let observation = ObservationScore::of(&detection);
                    let style = ReportStyle::from(&config);
                    println!("{}", render_detection(&detection, &observation, &style));
                }
                (Some(detection), OutputFormat::Json) => {
                    let observation = ObservationScore::of(&detection);
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&serde_json::json!({
                            "detection": detection,
                            "observation": observation,
                            "rating": ConfidenceRating::from_score(observation.confidence),
                        }))?
                    );
                }
            }
        }
        Command::Rate { score } => {
            println!("{}", ConfidenceRating::from_score(score));
        }
    }

    Ok(())
}

fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = fmt().with_env_filter(filter).with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn open_input(path: &str) -> anyhow::Result<Box<dyn AsyncBufRead + Unpin + Send>> {
    if path == "-" {
        return Ok(Box::new(BufReader::new(tokio::io::stdin())));
    }
    let file = tokio::fs::File::open(path)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to open {path}: {e}"))?;
    Ok(Box::new(BufReader::new(file)))
}

async fn read_all(path: &str) -> anyhow::Result<String> {
    if path == "-" {
        let raw = tokio::task::spawn_blocking(|| std::io::read_to_string(std::io::stdin()))
            .await??;
        return Ok(raw);
    }
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to read {path}: {e}"))
}

async fn echo_events(mut rx: broadcast::Receiver<SessionEvent>) {
    loop {
        match rx.recv().await {
            Ok(event) => match serde_json::to_string(&event) {
                Ok(line) => eprintln!("{line}"),
                Err(e) => tracing::warn!(error = %e, "Failed to serialize session event"),
            },
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "Event echo fell behind, events dropped");
            }
            Err(RecvError::Closed) => break,
        }
    }
}
