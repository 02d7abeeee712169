//! Conversation identity.
//!
//! A [`Context`] names one conversation. Its chat id is a pure function of
//! the client, user and session fields, so the same tuple always maps to the
//! same persisted transcript.

use crate::error::ContextError;
use maestro_core::{ChatId, SessionId};
use serde::{Deserialize, Serialize};

/// The identity tuple of a conversation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Context {
    /// The client application.
    #[serde(default)]
    pub client_id: String,
    /// The end user within the client.
    #[serde(default)]
    pub user_id: String,
    /// The session of the user.
    #[serde(default)]
    pub session_id: String,
    /// The dialogue flow this conversation runs through.
    #[serde(default)]
    pub track_id: String,
}

impl Context {
    /// Creates a new context.
    #[must_use]
    pub fn new(
        client_id: impl Into<String>,
        user_id: impl Into<String>,
        session_id: impl Into<String>,
        track_id: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            user_id: user_id.into(),
            session_id: session_id.into(),
            track_id: track_id.into(),
        }
    }

    /// Returns the file-name prefix shared by every chat of a user.
    #[must_use]
    pub fn user_prefix(client_id: &str, user_id: &str) -> String {
        format!("client_{client_id}_user_{user_id}_session_")
    }

    /// Derives the conversation id.
    #[must_use]
    pub fn create_id(&self) -> ChatId {
        ChatId::new_unchecked(format!(
            "{}{}",
            Self::user_prefix(&self.client_id, &self.user_id),
            self.session_id
        ))
    }

    /// Returns true if both contexts name the same client, user and session.
    ///
    /// Distinct tuples can share a chat id when a field contains `_session_`
    /// or `_user_`, so a loaded transcript is matched on the fields themselves.
    #[must_use]
    pub fn same_identity(&self, other: &Self) -> bool {
        self.client_id == other.client_id
            && self.user_id == other.user_id
            && self.session_id == other.session_id
    }

    /// Returns this context with a fresh session id if none was set.
    #[must_use]
    pub fn with_session_or_new(mut self) -> Self {
        if self.session_id.is_empty() {
            self.session_id = SessionId::new().to_string();
        }
        self
    }

    /// Checks that the identity fields can be embedded in a file name.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first offending field.
    pub fn validate(&self) -> Result<(), ContextError> {
        let fields = [
            ("client_id", &self.client_id),
            ("user_id", &self.user_id),
            ("session_id", &self.session_id),
        ];
        for (field, value) in fields {
            if value.contains(['/', '\\', '\0']) || value.contains("..") {
                return Err(ContextError::InvalidField {
                    field,
                    value: value.clone(),
                });
            }
        }
        if self.session_id.is_empty() {
            return Err(ContextError::InvalidField {
                field: "session_id",
                value: String::new(),
            });
        }
        Ok(())
    }
}
