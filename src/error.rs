//! Error types for adivinar operations.
//!
//! Prediction paths never fail: insufficient data and numeric degeneracy
//! produce well-defined degenerate results instead of errors. Errors only
//! arise on the sample-archive boundary (I/O, serialization, versioning).

use std::fmt;

/// Main error type for adivinar operations.
///
/// # Examples
///
/// ```
/// use adivinar::error::AdivinarError;
///
/// let err = AdivinarError::UnsupportedVersion {
///     found: "2.0".to_string(),
///     supported: "1.x".to_string(),
/// };
/// assert!(err.to_string().contains("Unsupported archive version"));
/// ```
#[derive(Debug)]
pub enum AdivinarError {
    /// I/O error (file not found, permission denied, etc.).
    Io(std::io::Error),

    /// Serialization/deserialization error.
    Serialization(String),

    /// Sample archive carries a version this build cannot read.
    UnsupportedVersion {
        /// Version found in the archive
        found: String,
        /// Versions this build supports
        supported: String,
    },

    /// Generic error with string message.
    Other(String),
}

impl fmt::Display for AdivinarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdivinarError::Io(e) => write!(f, "I/O error: {e}"),
            AdivinarError::Serialization(msg) => write!(f, "Serialization error: {msg}"),
            AdivinarError::UnsupportedVersion { found, supported } => {
                write!(
                    f,
                    "Unsupported archive version: found {found}, supported {supported}"
                )
            }
            AdivinarError::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for AdivinarError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AdivinarError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for AdivinarError {
    fn from(err: std::io::Error) -> Self {
        AdivinarError::Io(err)
    }
}

impl From<&str> for AdivinarError {
    fn from(msg: &str) -> Self {
        AdivinarError::Other(msg.to_string())
    }
}

impl From<String> for AdivinarError {
    fn from(msg: String) -> Self {
        AdivinarError::Other(msg)
    }
}

/// Convenience type alias for Results.
pub type Result<T> = std::result::Result<T, AdivinarError>;
