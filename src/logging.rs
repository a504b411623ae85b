use std::path::PathBuf;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::error::Result;

const LOG_FILE_PREFIX: &str = "relay.log";

/// Default directives when `RUST_LOG` is not set. axum reports extractor
/// rejections under `axum::rejection` at trace level.
fn default_filter() -> String {
    format!(
        "{}=debug,tower_http=debug,axum::rejection=trace",
        env!("CARGO_CRATE_NAME")
    )
}

pub struct FileLogger {
    log_directory: PathBuf,
    rotation: Rotation,
}

impl FileLogger {
    pub fn new(log_directory: PathBuf) -> Self {
        Self {
            log_directory,
            rotation: Rotation::DAILY,
        }
    }

    #[cfg(test)]
    pub fn with_rotation(mut self, rotation: Rotation) -> Self {
        self.rotation = rotation;
        self
    }

    /// Creates the log directory and a non-blocking rolling writer. The
    /// guard must outlive the program or buffered lines are lost.
    pub fn setup_file_logging(&self) -> Result<(NonBlocking, WorkerGuard)> {
        std::fs::create_dir_all(&self.log_directory)?;

        let file_appender =
            RollingFileAppender::new(self.rotation.clone(), &self.log_directory, LOG_FILE_PREFIX);

        Ok(tracing_appender::non_blocking(file_appender))
    }
}

/// Installs the global subscriber: console output always, plus a rolling
/// file when `log_dir` is set.
pub fn setup_logging(log_dir: Option<PathBuf>) -> Result<Option<WorkerGuard>> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter()));

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let (writer, guard) = FileLogger::new(dir).setup_file_logging()?;
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false) // Disable ANSI colors for file logs
                .boxed();
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer()) // Console output
        .with(file_layer)
        .init();

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_filter_targets_this_crate() {
        let filter = default_filter();
        assert!(filter.starts_with("jenkins_discord_relay=debug"));
        assert!(EnvFilter::try_new(filter).is_ok());
    }

    #[test]
    fn file_logger_creates_directory() {
        let dir = std::env::temp_dir().join(format!("relay-logs-{}", uuid::Uuid::now_v7()));
        let logger = FileLogger::new(dir.clone()).with_rotation(Rotation::NEVER);

        let (_writer, _guard) = logger.setup_file_logging().unwrap();
        assert!(dir.is_dir());

        std::fs::remove_dir_all(&dir).ok();
    }
}
