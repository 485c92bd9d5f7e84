use crate::common::error::{Result, SwipeError};
use std::fs;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const LOG_FILE_PREFIX: &str = "swipe_deck";
const DEFAULT_FILTER: &str = "swipe_deck=info,warn";

/// Installs the global subscriber: JSON lines to a daily file under `log_dir`
/// and human-readable output on stderr, so it stays out of the deck on stdout.
///
/// The returned guard flushes the file writer when dropped; hold it for the
/// lifetime of the process.
pub fn init_logging(log_dir: &Path) -> Result<WorkerGuard> {
    fs::create_dir_all(log_dir)?;

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .filename_suffix("log")
        .build(log_dir)
        .map_err(|e| {
            SwipeError::Config(format!(
                "Cannot open log directory '{}': {}",
                log_dir.display(),
                e
            ))
        })?;
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer().json().with_writer(file_writer);
    let console_layer = fmt::layer().with_target(true).with_writer(std::io::stderr);

    // RUST_LOG wins when set
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer)
        .try_init()
        .map_err(|e| SwipeError::Config(format!("Logging already initialized: {}", e)))?;

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    // The only test in the crate that installs a global subscriber.
    #[test]
    fn creates_log_dir_and_refuses_second_init() {
        let dir = tempdir().unwrap();
        let log_dir = dir.path().join("nested").join("logs");

        let guard = init_logging(&log_dir).unwrap();
        assert!(log_dir.is_dir());
        tracing::info!("written through the file layer");

        assert!(matches!(init_logging(&log_dir), Err(SwipeError::Config(_))));
        drop(guard);
    }
}
