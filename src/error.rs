//! Error types for nsx-install.
//!
//! This module defines the error types used throughout the crate, providing
//! enough context (file, key, playbook, log location) for an operator to fix
//! the input and rerun.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for nsx-install operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for nsx-install.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Parameter File Errors
    // ========================================================================
    /// A defaults or config file does not exist.
    #[error("Parameter file not found: {}", path.display())]
    ParamFileNotFound {
        /// Path that was looked up
        path: PathBuf,
    },

    /// A line in a parameter file could not be parsed.
    #[error("Failed to parse '{file}' line {line}: {message}")]
    ParamSyntax {
        /// File name the line came from
        file: String,
        /// One-based line number
        line: usize,
        /// Error message
        message: String,
    },

    /// A required key is absent.
    #[error("Missing parameter '{key}' in '{file}'")]
    MissingParam {
        /// File name the key was expected in
        file: String,
        /// Parameter key
        key: String,
    },

    /// A parameter has a value that fails validation.
    #[error("Invalid value '{value}' for '{key}' in '{file}': {reason}")]
    InvalidParam {
        /// File name the key came from
        file: String,
        /// Parameter key
        key: String,
        /// Offending value
        value: String,
        /// Why it was rejected
        reason: String,
    },

    /// More uplinks were requested than a node supports.
    #[error("Max allowed {node} Uplinks: {max}. Configured: {configured}")]
    UplinkLimit {
        /// Node kind ("Edge" or "Host")
        node: String,
        /// Number requested
        configured: u32,
        /// Upper bound
        max: u32,
    },

    // ========================================================================
    // vSphere Errors
    // ========================================================================
    /// The distributed switch does not exist in vCenter.
    #[error("Distributed Switch: {name} Not found in vCenter.")]
    SwitchNotFound {
        /// Switch display name
        name: String,
    },

    /// The vSphere API returned an error or an unexpected payload.
    #[error("Unable to query vCenter '{host}': {message}")]
    Vsphere {
        /// vCenter host
        host: String,
        /// Error message
        message: String,
    },

    // ========================================================================
    // Playbook Errors
    // ========================================================================
    /// The automation runner binary could not be located.
    #[error("Playbook runner '{0}' not found in PATH")]
    RunnerNotFound(String),

    /// A playbook exited with a non-zero status.
    #[error("Could not run {}: exit status {}. Please check {}", playbook.display(), code.map_or_else(|| "signal".to_string(), |c| c.to_string()), log.display())]
    PlaybookFailed {
        /// Playbook file
        playbook: PathBuf,
        /// Exit code, `None` when killed by a signal
        code: Option<i32>,
        /// Log file holding the runner output
        log: PathBuf,
    },

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    // ========================================================================
    // IO / Serialization Errors
    // ========================================================================
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Generic error with source.
    #[error("{message}")]
    Other {
        /// Error message
        message: String,
        /// Source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl Error {
    /// Creates a new invalid parameter error.
    pub fn invalid_param(
        file: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidParam {
            file: file.into(),
            key: key.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Creates a new vSphere API error.
    pub fn vsphere(host: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Vsphere {
            host: host.into(),
            message: message.into(),
        }
    }

    /// Returns the error code for CLI exit status.
    ///
    /// Input validation and vCenter lookups exit with 2, runner failures
    /// with 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::UplinkLimit { .. }
            | Error::InvalidParam { .. }
            | Error::MissingParam { .. }
            | Error::ParamSyntax { .. }
            | Error::ParamFileNotFound { .. }
            | Error::SwitchNotFound { .. }
            | Error::Vsphere { .. } => 2,
            _ => 1,
        }
    }
}

/// Extension trait for adding context to errors.
pub trait ErrorContext<T> {
    /// Adds context to an error.
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Adds context with a closure that is only evaluated on error.
    fn with_context<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>;
}

impl<T, E> ErrorContext<T> for std::result::Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::Other {
            message: message.into(),
            source: Some(Box::new(e)),
        })
    }

    fn with_context<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(|e| Error::Other {
            message: f().into(),
            source: Some(Box::new(e)),
        })
    }
}
