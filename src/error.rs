// src/error.rs

//! Error types for mask gamma correction and compositing.
//!
//! Every failure is reported at the precondition that failed:
//! - Configuration errors (gamma, contrast, bit counts)
//! - Input errors (mask dimensions and buffer sizes)
//! - Allocation errors (output bitmap could not be reserved)
//! - Configuration file errors (I/O and JSON parsing)

use thiserror::Error;

/// Result type alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type.
#[derive(Error, Debug)]
pub enum Error {
    /// Gamma/contrast parameters or bit counts are outside their valid range.
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Mask dimensions or buffer length violate the caller contract.
    #[error("Input error: {message}")]
    Input { message: String },

    /// The output bitmap could not be allocated.
    #[error("Allocation error: could not reserve {bytes} bytes for output bitmap")]
    Allocation { bytes: usize },

    /// Reading a configuration file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A configuration file could not be parsed.
    #[error("Config parse error: {0}")]
    ConfigParse(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn configuration(message: impl Into<String>) -> Self {
        Error::Configuration {
            message: message.into(),
        }
    }

    pub(crate) fn input(message: impl Into<String>) -> Self {
        Error::Input {
            message: message.into(),
        }
    }
}
