//! Subscriber setup: console output plus, for runs, a plain-text log in the run directory

use anyhow::{Context, Result};
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter directives, e.g. `BROWNAMING_LOG=debug` or `BROWNAMING_LOG=brownaming_search=trace`
pub const LOG_ENV: &str = "BROWNAMING_LOG";

fn default_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

/// Install the global subscriber. With `run_log` set, lines are also written
/// to `<dir>/<run_id>.log`; keep the returned guard alive until exit so the
/// file writer flushes.
pub fn init_logging(verbose: u8, run_log: Option<(&Path, &str)>) -> Result<Option<WorkerGuard>> {
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level(verbose)));
    let console = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    match run_log {
        Some((dir, run_id)) => {
            let appender = RollingFileAppender::builder()
                .rotation(Rotation::NEVER)
                .filename_prefix(run_id)
                .filename_suffix("log")
                .build(dir)
                .with_context(|| format!("Could not open the run log in {}", dir.display()))?;
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let file = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(false);

            tracing_subscriber::registry()
                .with(filter)
                .with(console)
                .with(file)
                .try_init()?;
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(console)
                .try_init()?;
            Ok(None)
        }
    }
}
