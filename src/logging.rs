//! Install log setup using the tracing crate.
//!
//! Every run appends to a single install log. The playbook runner writes its
//! output to the same file, so the log holds the whole story of an install in
//! order. With `-v` the events are also mirrored to stderr.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::level_filters::LevelFilter;
use tracing::Subscriber;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::error::{Error, ErrorContext, Result};

/// Log verbosity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Map `-v` occurrences to a stderr level; zero means no mirroring.
    pub fn from_verbosity(verbosity: u8) -> Option<Self> {
        match verbosity {
            0 => None,
            1 => Some(LogLevel::Info),
            2 => Some(LogLevel::Debug),
            _ => Some(LogLevel::Trace),
        }
    }

    fn as_filter(self) -> LevelFilter {
        match self {
            LogLevel::Trace => LevelFilter::TRACE,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Error => LevelFilter::ERROR,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Install log level unless `RUST_LOG` says otherwise.
const FILE_LEVEL: LogLevel = LogLevel::Debug;

/// Builder for the install log subscriber.
#[derive(Debug, Clone)]
pub struct LoggingBuilder {
    file: Option<PathBuf>,
    stderr_level: Option<LogLevel>,
    ansi: bool,
}

impl LoggingBuilder {
    /// Create a builder logging at `debug` with no outputs configured.
    pub fn new() -> Self {
        Self {
            file: None,
            stderr_level: None,
            ansi: true,
        }
    }

    /// Append events to this file, creating it if needed.
    pub fn with_file_output(mut self, path: impl AsRef<Path>) -> Self {
        self.file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Mirror events at or above `level` to stderr.
    pub fn with_stderr(mut self, level: Option<LogLevel>) -> Self {
        self.stderr_level = level;
        self
    }

    /// Set ANSI colors on the stderr mirror.
    pub fn with_ansi(mut self, enabled: bool) -> Self {
        self.ansi = enabled;
        self
    }

    fn build_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(FILE_LEVEL.as_str()))
    }

    fn open_log(path: &Path) -> Result<File> {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open log file {}", path.display()))
    }

    /// Build the subscriber without installing it.
    pub fn build(self) -> Result<impl Subscriber + for<'a> LookupSpan<'a> + Send + Sync> {
        let file_layer = match &self.file {
            Some(path) => {
                let file = Arc::new(Self::open_log(path)?);
                Some(
                    tracing_subscriber::fmt::layer()
                        .with_writer(file)
                        .with_ansi(false)
                        .with_target(false)
                        .with_filter(self.build_filter()),
                )
            }
            None => None,
        };

        let stderr_layer = self.stderr_level.map(|level| {
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(self.ansi)
                .with_target(level == LogLevel::Trace)
                .with_filter(level.as_filter())
        });

        Ok(tracing_subscriber::registry()
            .with(file_layer)
            .with(stderr_layer))
    }

    /// Build and install the global subscriber.
    pub fn init(self) -> Result<()> {
        self.build()?
            .try_init()
            .map_err(|e| Error::Config(e.to_string()))
    }
}

impl Default for LoggingBuilder {
    fn default() -> Self {
        Self::new()
    }
}
