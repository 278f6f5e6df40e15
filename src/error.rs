//! Error types for vagaudio

use thiserror::Error;

/// Result type alias for vagaudio operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for vagaudio
#[derive(Error, Debug)]
pub enum Error {
    /// IO error propagated from the underlying stream
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The stream does not start with a VAGp/VAGi magic
    #[error("bad magic {found:?} at offset 0, expected \"VAGp\" or \"VAGi\"")]
    BadMagic { found: [u8; 4] },

    /// Malformed container data
    #[error("Format error: {0}")]
    Format(String),

    /// Writer configuration rejected at construction
    #[error("Configuration error: {0}")]
    Config(String),

    /// Operation not valid in the current state
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Invalid caller-supplied input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    /// Create a format error
    pub fn format<S: Into<String>>(msg: S) -> Self {
        Error::Format(msg.into())
    }

    /// Create a configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Error::Config(msg.into())
    }

    /// Create an invalid state error
    pub fn invalid_state<S: Into<String>>(msg: S) -> Self {
        Error::InvalidState(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Error::InvalidInput(msg.into())
    }
}
