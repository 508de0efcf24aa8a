//! Error types for geoprim.

use thiserror::Error;

use super::Storage;

/// Main error type for fallible construction.
///
/// Queries never return this: they answer `None` instead.
#[derive(Error, Debug)]
pub enum Error {
    /// Attribute name is empty or not an identifier
    #[error("Invalid attribute name: '{0}'")]
    InvalidAttributeName(String),

    /// Attribute type declaration could not be parsed
    #[error("Invalid type declaration '{spec}': {reason}")]
    InvalidTypeSpec { spec: String, reason: String },

    /// Arrays combined into one view disagree on tuple size
    #[error("Tuple size mismatch: expected {expected}, got {actual}")]
    TupleSizeMismatch { expected: usize, actual: usize },

    /// Arrays combined into one view cannot share a storage
    #[error("Storage mismatch: {expected} cannot be combined with {actual}")]
    StorageMismatch { expected: Storage, actual: Storage },

    /// A view was built over nothing
    #[error("Cannot build a list array from zero arrays")]
    EmptyList,

    /// Refine parameter holds a value of the wrong kind
    #[error("Refine parameter '{key}' has invalid value '{value}'")]
    InvalidParm { key: String, value: String },

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an "other" error from a string.
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Create a type declaration error.
    pub fn type_spec(spec: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidTypeSpec {
            spec: spec.into(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for geoprim operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let e = Error::TupleSizeMismatch { expected: 3, actual: 2 };
        assert!(e.to_string().contains("3"));
        assert!(e.to_string().contains("2"));

        let e = Error::StorageMismatch {
            expected: Storage::String,
            actual: Storage::Real32,
        };
        assert!(e.to_string().contains("fpreal32"));
    }

    #[test]
    fn test_error_from_json() {
        let json_err = serde_json::from_str::<u32>("nope").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Json(_)));
    }
}
