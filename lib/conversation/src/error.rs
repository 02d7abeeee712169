//! Error types for the conversation crate.
//!
//! - `StoreError`: Errors from transcript persistence
//! - `ContextError`: Invalid conversation identity

use maestro_core::ChatId;
use std::fmt;

/// Errors from session store operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// No transcript is persisted under this id.
    NotFound { chat_id: ChatId },
    /// The persisted transcript could not be parsed.
    Malformed { chat_id: ChatId, reason: String },
    /// The id cannot name a transcript file.
    InvalidId { chat_id: String, reason: String },
    /// Filesystem operation failed.
    Io { path: String, reason: String },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { chat_id } => write!(f, "chat not found: {chat_id}"),
            Self::Malformed { chat_id, reason } => {
                write!(f, "failed to parse chat {chat_id}: {reason}")
            }
            Self::InvalidId { chat_id, reason } => {
                write!(f, "invalid chat id '{chat_id}': {reason}")
            }
            Self::Io { path, reason } => write!(f, "chat storage failed at {path}: {reason}"),
        }
    }
}

impl std::error::Error for StoreError {}

/// Errors from conversation identity validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContextError {
    /// An identity field cannot be embedded in a transcript file name.
    InvalidField { field: &'static str, value: String },
}

impl fmt::Display for ContextError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidField { field, value } => {
                write!(f, "invalid context field {field}: '{value}'")
            }
        }
    }
}

impl std::error::Error for ContextError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_error_display() {
        let err = StoreError::NotFound {
            chat_id: ChatId::new_unchecked("client_a_user_b_session_c"),
        };
        assert!(err.to_string().contains("chat not found"));
        assert!(err.to_string().contains("client_a_user_b_session_c"));
    }

    #[test]
    fn context_error_display() {
        let err = ContextError::InvalidField {
            field: "user_id",
            value: "../x".to_string(),
        };
        assert!(err.to_string().contains("user_id"));
    }
}
