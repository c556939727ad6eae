//! Logging system initialization
//!
//! This module sets up `tracing` based on the `[logging]` section of the
//! static configuration.

use std::io::Write;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;

use crate::config::{LoggingConfig, StaticConfig};

const DEFAULT_LOG_FILENAME: &str = "linkscope.log";

/// Initialize logging system based on configuration
///
/// Should be called once during startup, after the configuration has been
/// loaded. A log file that cannot be opened falls back to stdout. If a
/// global subscriber is already installed the call leaves it in place.
///
/// # Returns
/// * `WorkerGuard` - Must be kept alive for the duration of the program
///   to ensure non-blocking log writes are flushed
pub fn init_logging(config: &StaticConfig) -> WorkerGuard {
    let logging = &config.logging;
    let to_file = logging.file.as_ref().is_some_and(|f| !f.is_empty());

    let writer = build_writer(logging);
    let (non_blocking_writer, guard) = tracing_appender::non_blocking(writer);
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(logging.level.clone()));

    let subscriber_builder = tracing_subscriber::fmt()
        .with_writer(non_blocking_writer)
        .with_env_filter(filter)
        .with_level(true)
        .with_ansi(!to_file);

    let result = if logging.format == "json" {
        subscriber_builder.json().try_init()
    } else {
        subscriber_builder.try_init()
    };

    if let Err(e) = result {
        eprintln!("Logging already initialized: {}", e);
    }

    guard
}

fn build_writer(logging: &LoggingConfig) -> Box<dyn Write + Send + Sync> {
    let Some(log_file) = logging.file.as_deref().filter(|f| !f.is_empty()) else {
        return Box::new(std::io::stdout());
    };

    if logging.enable_rotation {
        let path = Path::new(log_file);
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        let filename = path
            .file_name()
            .and_then(|f| f.to_str())
            .unwrap_or(DEFAULT_LOG_FILENAME);

        match rolling::Builder::new()
            .rotation(rolling::Rotation::DAILY)
            .filename_prefix(filename.trim_end_matches(".log"))
            .filename_suffix("log")
            .max_log_files(logging.max_backups.max(1) as usize)
            .build(dir)
        {
            Ok(appender) => Box::new(appender),
            Err(e) => {
                eprintln!(
                    "Failed to create rolling log appender in {}: {}, using stdout",
                    dir.display(),
                    e
                );
                Box::new(std::io::stdout())
            }
        }
    } else {
        // 不轮转，追加写入
        match std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_file)
        {
            Ok(file) => Box::new(file),
            Err(e) => {
                eprintln!("Failed to open log file {}: {}, using stdout", log_file, e);
                Box::new(std::io::stdout())
            }
        }
    }
}
