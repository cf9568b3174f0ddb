use std::fs::{self, File};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::Level;
use tracing_appender::non_blocking::{NonBlockingBuilder, WorkerGuard};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::{self, format::FmtSpan};

use crate::config::{LoggingConfig, ResolvedOutputs};

pub const TELEMETRY_FILE: &str = "telemetry.jsonl";

/// Event targets raised while a deck is generated and benchmarked.
pub const DECK_TARGETS: [&str; 6] = [
    "deckforge::scoring",
    "deckforge::pools",
    "deckforge::assembly",
    "deckforge::graph",
    "deckforge::pipeline",
    "deckforge_bench::run",
];

/// Flushes buffered deck telemetry when dropped.
pub struct TelemetryGuard {
    _flush: WorkerGuard,
    pub telemetry_path: PathBuf,
}

/// Filter directives: deck targets at `level`, everything else at warn.
pub fn telemetry_directives(level: Level) -> String {
    let level = level.as_str().to_ascii_lowercase();
    let mut directives = String::from("warn");
    for target in DECK_TARGETS {
        directives.push_str(&format!(",{target}={level}"));
    }
    directives
}

/// `RUST_LOG` wins over the configured deck level.
fn telemetry_filter(logging: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(telemetry_directives(logging.level().unwrap_or(Level::INFO)))
    })
}

fn create_telemetry_file(dir: &Path) -> Result<(File, PathBuf)> {
    fs::create_dir_all(dir)
        .with_context(|| format!("creating telemetry directory {}", dir.display()))?;
    let path = dir.join(TELEMETRY_FILE);
    let file = File::create(&path)
        .with_context(|| format!("creating telemetry file {}", path.display()))?;
    Ok((file, path))
}

/// Streams assembly, scoring and run events as JSON lines next to the summary
/// table. Returns `None` when structured telemetry is switched off.
pub fn init_telemetry(
    logging: &LoggingConfig,
    outputs: &ResolvedOutputs,
) -> Result<Option<TelemetryGuard>> {
    if !logging.enable_structured {
        return Ok(None);
    }

    let (file, telemetry_path) = create_telemetry_file(&outputs.summary_dir())?;
    // Blocks rather than drops when the buffer fills.
    let (writer, flush) = NonBlockingBuilder::default().lossy(false).finish(file);

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(telemetry_filter(logging))
        .json()
        .flatten_event(true)
        .with_target(true)
        .with_current_span(false)
        .with_span_events(FmtSpan::NONE)
        .with_writer(writer)
        .finish();

    // Only the first subscriber in a process takes effect.
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!(
            "telemetry subscriber already installed; {} stays empty",
            telemetry_path.display()
        );
    }

    Ok(Some(TelemetryGuard {
        _flush: flush,
        telemetry_path,
    }))
}
