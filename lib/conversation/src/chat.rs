//! Conversation transcripts.
//!
//! A [`Chat`] is append-only: messages are never reordered or edited once
//! added, and the whole transcript is re-serialized on every write.

use crate::context::Context;
use crate::message::{AiMessage, HumanMessage, Message};
use chrono::{DateTime, Utc};
use maestro_core::ChatId;
use serde::{Deserialize, Serialize};

/// The full ordered message history of one conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chat {
    /// The conversation identity.
    pub context: Context,
    /// Messages in the order they were added.
    #[serde(default)]
    pub messages: Vec<Message>,
}

impl Chat {
    /// Creates an empty chat bound to a context.
    #[must_use]
    pub fn new(context: Context) -> Self {
        Self {
            context,
            messages: Vec::new(),
        }
    }

    /// Returns the conversation id.
    #[must_use]
    pub fn create_id(&self) -> ChatId {
        self.context.create_id()
    }

    /// Appends a message.
    pub fn add_message(&mut self, message: impl Into<Message>) {
        self.messages.push(message.into());
    }

    /// Returns the most recent AI message, if any.
    #[must_use]
    pub fn last_ai_message(&self) -> Option<&AiMessage> {
        self.messages.iter().rev().find_map(Message::as_ai)
    }

    /// Returns the most recent human message, if any.
    #[must_use]
    pub fn last_human_message(&self) -> Option<&HumanMessage> {
        self.messages.iter().rev().find_map(Message::as_human)
    }

    /// Returns the first human message, if any.
    #[must_use]
    pub fn first_human_message(&self) -> Option<&HumanMessage> {
        self.messages.iter().find_map(Message::as_human)
    }

    /// Returns the state tag of the last AI message, or `default`.
    ///
    /// An AI message with an empty state counts as no state.
    #[must_use]
    pub fn last_state<'a>(&'a self, default: &'a str) -> &'a str {
        self.last_ai_message()
            .map(|m| m.state.as_str())
            .filter(|state| !state.is_empty())
            .unwrap_or(default)
    }

    /// Builds the lightweight listing entry for this chat.
    #[must_use]
    pub fn preview(&self, chat_id: ChatId) -> ChatPreview {
        let first = self.first_human_message();
        ChatPreview {
            chat_id,
            first_replica: first.map(|m| m.text.clone()),
            first_replica_date: first.map(|m| m.date_time),
            track_id: self.context.track_id.clone(),
        }
    }
}

/// A listing entry for one persisted chat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ChatPreview {
    pub chat_id: ChatId,
    pub first_replica: Option<String>,
    pub first_replica_date: Option<DateTime<Utc>>,
    pub track_id: String,
}
