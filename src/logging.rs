//! Tracing subscriber setup for the command-line front end
//!
//! Logs go to stderr (stdout carries command output). `RUST_LOG` overrides the
//! default `version_engine=info` filter.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_FILTER: &str = "version_engine=info";

/// Build the filter from `RUST_LOG`, or from the verbosity flag when unset
pub fn env_filter(verbose: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new("version_engine=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    }
}

/// Initialize the global subscriber.
///
/// With `log_file` set, output is written there through a non-blocking writer;
/// keep the returned guard alive until exit so buffered lines are flushed.
pub fn init(
    verbose: bool,
    json: bool,
    log_file: Option<&Path>,
) -> Result<Option<WorkerGuard>, Box<dyn std::error::Error + Send + Sync>> {
    let (writer, guard) = match log_file {
        Some(path) => {
            let dir = path.parent().unwrap_or_else(|| Path::new("."));
            std::fs::create_dir_all(dir)?;
            let file_name = path
                .file_name()
                .ok_or_else(|| format!("log file path has no file name: {}", path.display()))?;
            let appender = tracing_appender::rolling::never(dir, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (fmt::writer::BoxMakeWriter::new(writer), Some(guard))
        }
        None => (fmt::writer::BoxMakeWriter::new(std::io::stderr), None),
    };

    let registry = tracing_subscriber::registry().with(env_filter(verbose));

    if json {
        registry
            .with(fmt::layer().json().with_writer(writer))
            .try_init()?;
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_ansi(log_file.is_none())
                    .compact()
                    .with_writer(writer),
            )
            .try_init()?;
    }

    Ok(guard)
}
