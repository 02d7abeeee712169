//! Error types for dispatching.

use maestro_core::ChatId;
use std::fmt;

/// Errors from the dialog dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// The chat has no human message to respond to.
    MissingHumanMessage { chat_id: ChatId },
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingHumanMessage { chat_id } => {
                write!(f, "chat {chat_id} has no human message to respond to")
            }
        }
    }
}

impl std::error::Error for DispatchError {}
