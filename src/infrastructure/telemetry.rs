//! # Telemetry
//!
//! Installs the global `tracing` subscriber.
//!
//! | Environment | Format | Level | Destination |
//! |-------------|--------|-------|-------------|
//! | `local`     | text   | DEBUG | `app.log`   |
//! | `dev`       | JSON   | DEBUG | stdout      |
//! | `prod`      | JSON   | INFO  | stdout      |
//!
//! `RUST_LOG` overrides the level when set.

use crate::config::AppEnv;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

/// Log file used by the `local` environment and the batch tool.
pub const DEFAULT_LOG_FILE: &str = "app.log";

/// Subscriber installation failure.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The log file could not be opened for appending.
    #[error("cannot open log file {}: {source}", path.display())]
    LogFile {
        /// Path of the log file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A global subscriber is already installed.
    #[error("cannot install subscriber: {0}")]
    Install(String),
}

/// Log line format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines.
    Text,
    /// One JSON object per event.
    Json,
}

/// Where log lines go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    /// Standard output.
    Stdout,
    /// A file, opened for appending.
    File(PathBuf),
}

/// Subscriber settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetrySettings {
    /// Default level when `RUST_LOG` is unset.
    pub level: LevelFilter,
    /// Line format.
    pub format: LogFormat,
    /// Destination.
    pub target: LogTarget,
}

impl TelemetrySettings {
    /// Settings for a deployment environment.
    #[must_use]
    pub fn for_env(env: AppEnv) -> Self {
        match env {
            AppEnv::Local => Self::file(DEFAULT_LOG_FILE),
            AppEnv::Dev => Self {
                level: LevelFilter::DEBUG,
                format: LogFormat::Json,
                target: LogTarget::Stdout,
            },
            AppEnv::Prod => Self {
                level: LevelFilter::INFO,
                format: LogFormat::Json,
                target: LogTarget::Stdout,
            },
        }
    }

    /// Text logs at DEBUG appended to `path`.
    #[must_use]
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            level: LevelFilter::DEBUG,
            format: LogFormat::Text,
            target: LogTarget::File(path.into()),
        }
    }
}

fn open_log(path: &Path) -> Result<Arc<File>, TelemetryError> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map(Arc::new)
        .map_err(|source| TelemetryError::LogFile {
            path: path.to_path_buf(),
            source,
        })
}

/// Installs the global subscriber.
///
/// # Errors
///
/// Returns `TelemetryError` if the log file cannot be opened or a subscriber
/// is already installed.
pub fn init(settings: &TelemetrySettings) -> Result<(), TelemetryError> {
    let filter = EnvFilter::builder()
        .with_default_directive(settings.level.into())
        .from_env_lossy();
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let installed = match (settings.format, &settings.target) {
        (LogFormat::Text, LogTarget::Stdout) => builder.try_init(),
        (LogFormat::Json, LogTarget::Stdout) => builder.json().try_init(),
        (LogFormat::Text, LogTarget::File(path)) => builder
            .with_ansi(false)
            .with_writer(open_log(path)?)
            .try_init(),
        (LogFormat::Json, LogTarget::File(path)) => builder
            .json()
            .with_writer(open_log(path)?)
            .try_init(),
    };
    installed.map_err(|e| TelemetryError::Install(e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn local_logs_text_to_file() {
        let settings = TelemetrySettings::for_env(AppEnv::Local);
        assert_eq!(settings.level, LevelFilter::DEBUG);
        assert_eq!(settings.format, LogFormat::Text);
        assert_eq!(settings.target, LogTarget::File(PathBuf::from("app.log")));
    }

    #[test]
    fn dev_logs_json_debug() {
        let settings = TelemetrySettings::for_env(AppEnv::Dev);
        assert_eq!(settings.level, LevelFilter::DEBUG);
        assert_eq!(settings.format, LogFormat::Json);
        assert_eq!(settings.target, LogTarget::Stdout);
    }

    #[test]
    fn prod_logs_json_info() {
        let settings = TelemetrySettings::for_env(AppEnv::Prod);
        assert_eq!(settings.level, LevelFilter::INFO);
        assert_eq!(settings.format, LogFormat::Json);
    }

    #[test]
    fn unwritable_log_path_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("app.log");
        let err = open_log(&path).unwrap_err();
        assert!(err.to_string().contains("app.log"));
    }
}
