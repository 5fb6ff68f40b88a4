//! Structured CLI errors with meaningful exit codes.
//!
//! Exit code scheme:
//! - 0:  success
//! - 2:  clap arg parse error (automatic, before our code runs)
//! - 10: plot error (unknown preset, bad axis, bad config values)
//! - 11: I/O error (config read, PNG write)
//! - 12: input error (bad --param, --start or range syntax, bad color)
//! - 13: serialization error

use fieldplot_core::PlotError;
use thiserror::Error;

/// Errors produced by CLI operations, each mapped to a distinct exit code.
#[derive(Debug, Error)]
pub enum CliError {
    /// A plotting error (unknown preset, invalid axis or config).
    #[error(transparent)]
    Plot(PlotError),
    /// An I/O error (config file read, PNG write).
    #[error("{0}")]
    Io(String),
    /// A user input error (malformed argument value).
    #[error("{0}")]
    Input(String),
    /// A serialization error (config JSON syntax, JSON output failure).
    #[error("invalid JSON: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CliError {
    /// Returns the process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Plot(_) => 10,
            CliError::Io(_) => 11,
            CliError::Input(_) => 12,
            CliError::Serialization(_) => 13,
        }
    }
}

impl From<PlotError> for CliError {
    fn from(e: PlotError) -> Self {
        match e {
            PlotError::Io(msg) => CliError::Io(msg),
            PlotError::InvalidColor(msg) => CliError::Input(msg),
            other => CliError::Plot(other),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Io(e.to_string())
    }
}
