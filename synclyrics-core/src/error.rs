use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    // Document errors
    #[error("Line index {index} out of range for document with {len} lines")]
    IndexOutOfRange { index: usize, len: usize },

    // Timestamp errors
    #[error("Invalid timestamp {token:?}: {reason}")]
    InvalidTimestamp { token: String, reason: String },

    // Configuration errors
    #[error("Config file not found at {path}. A template has been created - edit it if needed and restart.")]
    ConfigNotFound { path: PathBuf },

    #[error("Invalid config: {message}")]
    ConfigInvalid { message: String },

    #[error("Failed to parse config file: {0}")]
    ConfigParseError(#[from] toml::de::Error),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CoreError>;
