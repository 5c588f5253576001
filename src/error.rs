use std::io;
use thiserror::Error;

/// Errors surfaced by the disk check to its host.
#[derive(Error, Debug)]
pub enum CheckError {
    /// Invalid or conflicting configuration. Raised before any I/O.
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid excluded_disk_re {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// The underlying command or partition table could not be read.
    #[error("Acquisition failed: {0}")]
    Acquisition(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Config parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, CheckError>;

impl CheckError {
    pub fn config<S: Into<String>>(msg: S) -> Self {
        CheckError::Config(msg.into())
    }

    pub fn acquisition<S: Into<String>>(msg: S) -> Self {
        CheckError::Acquisition(msg.into())
    }

    /// True for errors the host should treat as fatal misconfiguration.
    pub fn is_config(&self) -> bool {
        matches!(self, CheckError::Config(_) | CheckError::InvalidPattern { .. } | CheckError::Toml(_))
    }
}
