//! Logging setup for fileshare.
//!
//! Events go to stdout and, when a log file is configured, are appended to it.
//! `RUST_LOG` directives are honored on top of the configured level.

use std::fs::{self, File, OpenOptions};
use std::path::Path;
use std::sync::Arc;

use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;
use crate::Result;

/// Map a configured level name to a tracing level. Unknown names mean `info`.
fn parse_level(level: &str) -> Level {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" | "warning" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::from_default_env().add_directive(parse_level(level).into())
}

/// Open the log file for appending, creating parent directories as needed.
fn open_log_file(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    Ok(OpenOptions::new().create(true).append(true).open(path)?)
}

/// Install the global subscriber writing to stdout and the configured file.
///
/// Restarts keep earlier log lines; the file is never truncated.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let log_file = Arc::new(open_log_file(Path::new(&config.file))?);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stdout.and(log_file))
                .with_ansi(false)
                .with_target(true),
        )
        .with(env_filter(&config.level))
        .init();

    Ok(())
}

/// Install a stdout-only subscriber.
pub fn init_console_only(level: &str) {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .with(env_filter(level))
        .init();
}
