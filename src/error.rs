//! Error types for recomendar operations.
//!
//! Lookup misses, untrained models and degenerate inputs are *not*
//! errors in this crate — they produce empty recommendation lists so
//! callers can fall back to a lower-tier scorer. The variants here
//! cover genuine contract violations: impossible dimensions, invalid
//! hyperparameters and malformed configuration.

use std::fmt;

/// Main error type for recomendar operations.
///
/// # Examples
///
/// ```
/// use recomendar::error::RecomendarError;
///
/// let err = RecomendarError::InvalidHyperparameter {
///     param: "n_items".to_string(),
///     value: "0".to_string(),
///     constraint: "> 0".to_string(),
/// };
/// assert!(err.to_string().contains("n_items"));
/// ```
#[derive(Debug)]
pub enum RecomendarError {
    /// Matrix/vector dimensions don't match for the operation.
    DimensionMismatch {
        /// Expected dimensions description
        expected: String,
        /// Actual dimensions found
        actual: String,
    },

    /// Invalid hyperparameter value provided.
    InvalidHyperparameter {
        /// Parameter name
        param: String,
        /// Provided value
        value: String,
        /// Constraint description
        constraint: String,
    },

    /// Bounded queue refused an element.
    QueueFull {
        /// Queue capacity
        capacity: usize,
    },

    /// Serialization/deserialization error (configuration data).
    Serialization(String),

    /// I/O error (configuration file).
    Io(std::io::Error),

    /// Generic error with string message.
    Other(String),
}

impl fmt::Display for RecomendarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecomendarError::DimensionMismatch { expected, actual } => {
                write!(f, "dimension mismatch: expected {expected}, got {actual}")
            }
            RecomendarError::InvalidHyperparameter {
                param,
                value,
                constraint,
            } => {
                write!(
                    f,
                    "invalid hyperparameter: {param} = {value}, expected {constraint}"
                )
            }
            RecomendarError::QueueFull { capacity } => {
                write!(f, "update queue full (capacity {capacity})")
            }
            RecomendarError::Serialization(msg) => write!(f, "serialization error: {msg}"),
            RecomendarError::Io(e) => write!(f, "I/O error: {e}"),
            RecomendarError::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for RecomendarError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RecomendarError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for RecomendarError {
    fn from(err: std::io::Error) -> Self {
        RecomendarError::Io(err)
    }
}

impl From<serde_json::Error> for RecomendarError {
    fn from(err: serde_json::Error) -> Self {
        RecomendarError::Serialization(err.to_string())
    }
}

impl From<&str> for RecomendarError {
    fn from(msg: &str) -> Self {
        RecomendarError::Other(msg.to_string())
    }
}

impl From<String> for RecomendarError {
    fn from(msg: String) -> Self {
        RecomendarError::Other(msg)
    }
}

impl RecomendarError {
    /// Create a dimension mismatch error with descriptive context.
    #[must_use]
    pub fn dimension_mismatch(context: &str, expected: usize, actual: usize) -> Self {
        Self::DimensionMismatch {
            expected: format!("{context}={expected}"),
            actual: format!("{actual}"),
        }
    }

    /// Create an invalid hyperparameter error.
    #[must_use]
    pub fn invalid_param(param: &str, value: impl fmt::Display, constraint: &str) -> Self {
        Self::InvalidHyperparameter {
            param: param.to_string(),
            value: value.to_string(),
            constraint: constraint.to_string(),
        }
    }
}

/// Convenience type alias for Results.
pub type Result<T> = std::result::Result<T, RecomendarError>;
