//! Dialog dispatcher.
//!
//! Recovers the turn state from the transcript, runs the chat's track and
//! appends the answer. An unknown track id is answered with a fixed message.

use crate::catalogue::{self, DomainInfo, TrackInfo};
use crate::error::DispatchError;
use crate::track::{DialogTrack, TrackSet, Turn};
use maestro_conversation::{AiMessage, Chat, Message};
use rootcause::Report;
use tracing::{error, info, instrument};

/// Default answer for chats bound to an unknown track.
pub const NO_SUCH_TRACK: &str = "Этот сценарий еще не проработан.";

/// Routes chats to their tracks.
pub struct DialogDispatcher {
    tracks: TrackSet,
    no_such_track: String,
}

impl DialogDispatcher {
    /// Creates a dispatcher with the default unknown-track message.
    #[must_use]
    pub fn new(tracks: TrackSet) -> Self {
        Self {
            tracks,
            no_such_track: NO_SUCH_TRACK.to_string(),
        }
    }

    /// Replaces the unknown-track message.
    #[must_use]
    pub fn with_no_such_track(mut self, text: impl Into<String>) -> Self {
        self.no_such_track = text.into();
        self
    }

    /// Lists every domain.
    #[must_use]
    pub fn domains(&self) -> Vec<DomainInfo> {
        catalogue::domains()
    }

    /// Lists every track.
    #[must_use]
    pub fn tracks(&self) -> Vec<TrackInfo> {
        catalogue::tracks(&self.tracks)
    }

    /// Answers the last human message and appends the answer to `chat`.
    ///
    /// Returns the appended messages.
    ///
    /// # Errors
    ///
    /// Returns an error if the chat has no human message.
    #[instrument(skip(self, chat), fields(chat_id = %chat.create_id(), track_id = %chat.context.track_id))]
    pub async fn dispatch(&self, chat: &mut Chat) -> Result<Vec<Message>, Report<DispatchError>> {
        let Some(track) = self.tracks.get(&chat.context.track_id) else {
            error!("Track is not present");
            let answer = Message::from(AiMessage::new(self.no_such_track.as_str(), ""));
            chat.add_message(answer.clone());
            return Ok(vec![answer]);
        };

        let human = chat
            .last_human_message()
            .cloned()
            .ok_or_else(|| DispatchError::MissingHumanMessage {
                chat_id: chat.create_id(),
            })?;
        let state = chat.last_state(track.initial_state()).to_string();
        let accumulator = chat.last_ai_message().and_then(|m| m.extra.clone());

        let response = track
            .generate(Turn {
                state: &state,
                accumulator: accumulator.as_ref(),
                message: &human,
                chat,
            })
            .await;
        info!(from = %state, to = %response.state, "Turn processed");

        let answer = Message::from(response.into_message());
        chat.add_message(answer.clone());
        Ok(vec![answer])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeLlm, empty_files};
    use maestro_conversation::{Context, HumanMessage};
    use std::sync::Arc;
    use tempfile::TempDir;

    async fn dispatcher() -> (DialogDispatcher, TempDir) {
        let (files, dir) = empty_files().await;
        let tracks = TrackSet::new(files, Arc::new(FakeLlm::answering("Ответ")));
        (DialogDispatcher::new(tracks), dir)
    }

    fn chat(track_id: &str, text: &str) -> Chat {
        let mut chat = Chat::new(Context::new("web", "u1", "s1", track_id));
        chat.add_message(HumanMessage::new(text));
        chat
    }

    #[tokio::test]
    async fn dummy_scenario() {
        let (dispatcher, _dir) = dispatcher().await;
        let mut chat = chat("Dummy", "hello");

        let messages = dispatcher.dispatch(&mut chat).await.expect("dispatch");

        assert_eq!(messages.len(), 1);
        let ai = messages[0].as_ai().expect("ai message");
        assert_eq!(ai.state, "dummy");
        assert!(ai.content.text.contains("Сообщение: 'hello'"));
        assert!(ai.content.text.contains("файл: нет"));
        assert_eq!(chat.messages.len(), 2);
        assert_eq!(chat.messages[1], messages[0]);
    }

    #[tokio::test]
    async fn unknown_track_gets_fixed_answer() {
        let (dispatcher, _dir) = dispatcher().await;
        let dispatcher = dispatcher.with_no_such_track("nope");
        let mut chat = chat("Weather", "hi");

        let messages = dispatcher.dispatch(&mut chat).await.expect("dispatch");
        assert_eq!(messages[0].as_ai().expect("ai").content.text, "nope");
        assert_eq!(chat.messages.len(), 2);
    }

    #[tokio::test]
    async fn chat_without_human_message_is_rejected() {
        let (dispatcher, _dir) = dispatcher().await;
        let mut chat = Chat::new(Context::new("web", "u1", "s1", "Dummy"));

        let report = dispatcher.dispatch(&mut chat).await.unwrap_err();
        assert!(matches!(
            report.current_context(),
            DispatchError::MissingHumanMessage { .. }
        ));
        assert!(chat.messages.is_empty());
    }

    #[tokio::test]
    async fn state_and_accumulator_flow_through_transcript() {
        let (dispatcher, _dir) = dispatcher().await;
        let mut chat = chat("EntrypointsWizard", "start");

        dispatcher.dispatch(&mut chat).await.expect("first turn");
        chat.add_message(HumanMessage::new("OpenRouter"));
        let messages = dispatcher.dispatch(&mut chat).await.expect("second turn");

        let ai = messages[0].as_ai().expect("ai");
        assert_eq!(ai.state, "OPENROUTER_MODEL_ID");
        let extra = ai.extra.as_ref().expect("accumulator");
        assert_eq!(extra["current_entrypoint"]["provider"], "openrouter");
    }

    #[tokio::test]
    async fn chatbot_answers_through_llm() {
        let (dispatcher, _dir) = dispatcher().await;
        let mut chat = chat("Chatbot", "Привет");

        let messages = dispatcher.dispatch(&mut chat).await.expect("dispatch");
        let ai = messages[0].as_ai().expect("ai");
        assert_eq!(ai.state, "START");
        assert_eq!(ai.content.text, "Ответ");
    }

    #[test]
    fn default_unknown_track_message() {
        assert_eq!(NO_SUCH_TRACK, "Этот сценарий еще не проработан.");
    }
}
