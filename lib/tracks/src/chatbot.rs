//! Provider-backed responder.
//!
//! Sends the whole transcript behind a fixed system preamble to the default
//! text entrypoint. Any failure ends the conversation with a fixed message;
//! retries happen inside the accessor.

use crate::track::{DialogTrack, TrackResponse, Turn};
use async_trait::async_trait;
use maestro_ai::{LlmApi, LlmCallProps, LlmMessage, Request};
use maestro_conversation::{Chat, Message};
use std::sync::Arc;
use tracing::{error, info};

pub const START: &str = "START";
pub const FINAL: &str = "FINAL";

const SYSTEM_PROMPT: &str = "Ты бот-помощник";

const NO_ENTRYPOINTS: &str = "Not found LLM entrypoints, need to configure...";
const ACCESSOR_FAILED: &str = "Failed to access llm-accessor";
const LLM_UNAVAILABLE: &str = "Failed to access LLM...";

/// Maps the transcript to provider messages, skipping empty turns.
fn conversation(chat: &Chat) -> Vec<LlmMessage> {
    std::iter::once(LlmMessage::system(SYSTEM_PROMPT))
        .chain(chat.messages.iter().filter_map(|m| match m {
            Message::Human(h) if !h.text.is_empty() => Some(LlmMessage::user(h.text.clone())),
            Message::Ai(a) if !a.content.text.is_empty() => {
                Some(LlmMessage::assistant(a.content.text.clone()))
            }
            _ => None,
        }))
        .collect()
}

/// General-purpose assistant backed by the default entrypoint.
pub struct Chatbot {
    llm: Arc<dyn LlmApi>,
}

impl Chatbot {
    #[must_use]
    pub fn new(llm: Arc<dyn LlmApi>) -> Self {
        Self { llm }
    }

    async fn failure_text(&self) -> &'static str {
        match self.llm.get_entrypoint_keys().await {
            Ok(keys) if keys.is_empty() => NO_ENTRYPOINTS,
            Ok(_) => ACCESSOR_FAILED,
            Err(e) => {
                error!(error = %e, "LLM accessor is not accessible");
                LLM_UNAVAILABLE
            }
        }
    }
}

#[async_trait]
impl DialogTrack for Chatbot {
    async fn generate(&self, turn: Turn<'_>) -> TrackResponse {
        let request = Request::Messages(conversation(turn.chat));
        match self.llm.get_response(request, &LlmCallProps::default()).await {
            Ok(text) => {
                info!(chars = text.chars().count(), "Response from LLM accessor");
                TrackResponse::new(START, text)
            }
            Err(e) => {
                error!(error = %e, "Failed to get response");
                TrackResponse::new(FINAL, self.failure_text().await)
            }
        }
    }
}
