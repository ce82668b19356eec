//! Tracing subscriber setup.
//!
//! Logs go to stderr, human-readable or JSON. When a log directory is
//! configured a daily rolling file receives the same events; the returned
//! guard must be held until exit or buffered lines are lost.

use std::path::Path;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter, Layer, Registry, layer::SubscriberExt, util::SubscriberInitExt,
};

use crate::config::RoadmapConfig;

pub const LOG_FILE_PREFIX: &str = "roadmap.log";

/// Build the filter from `RUST_LOG`/`logging.level`, raised to `debug` for
/// this crate when `verbose` is set.
pub fn build_filter(directives: &str, verbose: bool) -> EnvFilter {
    let directives = if verbose {
        format!("{},roadmap=debug,roadmap_core=debug", directives)
    } else {
        directives.to_string()
    };
    EnvFilter::try_new(&directives).unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber.
pub fn init(config: &RoadmapConfig, verbose: bool) -> Result<Option<WorkerGuard>> {
    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();

    if config.log_json {
        layers.push(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .boxed(),
        );
    } else {
        layers.push(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .boxed(),
        );
    }

    let guard = match &config.log_dir {
        Some(dir) => {
            let (writer, guard) = file_writer(dir)?;
            layers.push(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_ansi(false)
                    .with_writer(writer)
                    .boxed(),
            );
            Some(guard)
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(layers)
        .with(build_filter(&config.log_filter, verbose))
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(guard)
}

fn file_writer(dir: &Path) -> Result<(tracing_appender::non_blocking::NonBlocking, WorkerGuard)> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
    let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
    Ok(tracing_appender::non_blocking(appender))
}
