//! Error handling foundation for maestro.
//!
//! This module provides the `Result` type alias using rootcause and the
//! error type for the file storage contract. Each crate defines its own
//! domain-specific error types in its own error module.

use rootcause::Report;
use std::fmt;

/// A Result type alias using rootcause's Report for error handling.
///
/// Each layer adds its own context as errors propagate.
pub type Result<T, C = ()> = std::result::Result<T, Report<C>>;

/// Errors from file storage operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileStorageError {
    /// No blob is stored under this resource id.
    NotFound { resource_id: String },
    /// The resource id cannot name a file inside the storage root.
    InvalidId { resource_id: String },
    /// Filesystem operation failed.
    Io { path: String, reason: String },
}

impl fmt::Display for FileStorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { resource_id } => write!(f, "resource not found: {resource_id}"),
            Self::InvalidId { resource_id } => write!(f, "invalid resource id: {resource_id}"),
            Self::Io { path, reason } => write!(f, "file storage i/o failed at {path}: {reason}"),
        }
    }
}

impl std::error::Error for FileStorageError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_type_works() {
        let ok: Result<i32> = Ok(42);
        assert_eq!(ok.expect("should be ok"), 42);
    }

    #[test]
    fn file_storage_error_display() {
        let err = FileStorageError::NotFound {
            resource_id: "01HX.pdf".to_string(),
        };
        assert!(err.to_string().contains("01HX.pdf"));
    }
}
