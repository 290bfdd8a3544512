//! Error types for Mnemos

use thiserror::Error;

/// Result type alias using Mnemos' Error
pub type Result<T> = std::result::Result<T, Error>;

/// Mnemos error types
///
/// Builder and Merger are total over well-formed inputs: store failures
/// propagate unchanged through [`Error::Store`], and the only errors the
/// merger itself produces are upfront configuration rejections.
#[derive(Error, Debug)]
pub enum Error {
    // Store errors (E001-E099)
    #[error("Knowledge store error: {0}")]
    Store(String),

    // Merge configuration errors (E100-E199)
    #[error(
        "Unknown merge strategy '{0}'. Expected one of: union, intersection, first_priority, second_priority."
    )]
    UnknownStrategy(String),

    #[error("Invalid merge options: {0}")]
    InvalidOptions(String),

    // Generic errors
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Get error code for this error type
    pub fn code(&self) -> &'static str {
        match self {
            Self::Store(_) => "E001",
            Self::UnknownStrategy(_) => "E100",
            Self::InvalidOptions(_) => "E101",
            Self::Other(_) => "E9999",
        }
    }
}
