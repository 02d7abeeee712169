//! Track contract and the closed track set.
//!
//! A track is one step of a state machine per turn:
//! `(state, accumulator, human input) -> (next state, accumulator', content)`.
//! Tracks hold no per-session fields; everything a track needs on its next
//! turn travels in the `extra` bag of the AI message it returns.

use crate::catalogue::Domain;
use crate::chatbot::Chatbot;
use crate::dummy::Dummy;
use crate::recipes::RecipesSummarizer;
use crate::wizard::EntrypointsWizard;
use async_trait::async_trait;
use maestro_ai::LlmApi;
use maestro_conversation::{AiMessage, Chat, Content, Extra, HumanMessage};
use maestro_core::FileStorage;
use std::fmt;
use std::sync::Arc;

/// Initial state shared by every track.
pub const EMPTY: &str = "EMPTY";

/// Everything a track sees on one turn.
#[derive(Debug, Clone, Copy)]
pub struct Turn<'a> {
    /// State tag of the last AI message, or the track's initial state.
    pub state: &'a str,
    /// `extra` of the last AI message.
    pub accumulator: Option<&'a Extra>,
    /// The message being answered.
    pub message: &'a HumanMessage,
    /// The full transcript, including `message`.
    pub chat: &'a Chat,
}

/// What a track produces for one turn.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackResponse {
    pub state: String,
    pub content: Content,
    pub extra: Option<Extra>,
}

impl TrackResponse {
    /// Creates a response without accumulator data.
    #[must_use]
    pub fn new(state: impl Into<String>, content: impl Into<Content>) -> Self {
        Self {
            state: state.into(),
            content: content.into(),
            extra: None,
        }
    }

    /// Attaches accumulator data.
    #[must_use]
    pub fn with_extra(mut self, extra: Extra) -> Self {
        self.extra = Some(extra);
        self
    }

    /// Converts the response into an AI message.
    #[must_use]
    pub fn into_message(self) -> AiMessage {
        AiMessage::new(self.content, self.state).with_extra(self.extra)
    }
}

/// A dialogue flow.
#[async_trait]
pub trait DialogTrack: Send + Sync {
    /// State assumed before the first AI message.
    fn initial_state(&self) -> &'static str {
        EMPTY
    }

    /// Advances the state machine by one turn.
    async fn generate(&self, turn: Turn<'_>) -> TrackResponse;
}

/// Identifiers of the known tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackId {
    Dummy,
    Chatbot,
    EntrypointsWizard,
    RecipesSummarizer,
}

impl TrackId {
    pub const ALL: [Self; 4] = [
        Self::Dummy,
        Self::Chatbot,
        Self::EntrypointsWizard,
        Self::RecipesSummarizer,
    ];

    /// Looks up a track id by its wire name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|id| id.as_str() == name)
    }

    /// Returns the wire name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dummy => "Dummy",
            Self::Chatbot => "Chatbot",
            Self::EntrypointsWizard => "EntrypointsWizard",
            Self::RecipesSummarizer => "RecipesSummarizer",
        }
    }

    /// Returns the caption shown in track listings.
    #[must_use]
    pub fn caption(self) -> &'static str {
        match self {
            Self::Dummy => "🛠 Dummy",
            Self::Chatbot => "🤖 Chat",
            Self::EntrypointsWizard => "🧙‍♂️🤖 Entrypoints Wizard",
            Self::RecipesSummarizer => "👩‍🍳 Recipes Summarizer",
        }
    }

    /// Returns the domain the track belongs to.
    #[must_use]
    pub fn domain(self) -> Domain {
        Domain::Examples
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One of the known tracks.
pub enum Track {
    Dummy(Dummy),
    Chatbot(Chatbot),
    EntrypointsWizard(EntrypointsWizard),
    RecipesSummarizer(RecipesSummarizer),
}

impl Track {
    /// Returns the track id.
    #[must_use]
    pub fn id(&self) -> TrackId {
        match self {
            Self::Dummy(_) => TrackId::Dummy,
            Self::Chatbot(_) => TrackId::Chatbot,
            Self::EntrypointsWizard(_) => TrackId::EntrypointsWizard,
            Self::RecipesSummarizer(_) => TrackId::RecipesSummarizer,
        }
    }

    fn inner(&self) -> &dyn DialogTrack {
        match self {
            Self::Dummy(t) => t,
            Self::Chatbot(t) => t,
            Self::EntrypointsWizard(t) => t,
            Self::RecipesSummarizer(t) => t,
        }
    }
}

#[async_trait]
impl DialogTrack for Track {
    fn initial_state(&self) -> &'static str {
        self.inner().initial_state()
    }

    async fn generate(&self, turn: Turn<'_>) -> TrackResponse {
        self.inner().generate(turn).await
    }
}

/// The tracks served by this process, built once at startup.
pub struct TrackSet {
    tracks: Vec<Track>,
}

impl TrackSet {
    /// Builds every known track.
    #[must_use]
    pub fn new(files: Arc<dyn FileStorage>, llm: Arc<dyn LlmApi>) -> Self {
        let tracks = TrackId::ALL
            .into_iter()
            .map(|id| match id {
                TrackId::Dummy => Track::Dummy(Dummy::new(Arc::clone(&files))),
                TrackId::Chatbot => Track::Chatbot(Chatbot::new(Arc::clone(&llm))),
                TrackId::EntrypointsWizard => Track::EntrypointsWizard(EntrypointsWizard),
                TrackId::RecipesSummarizer => {
                    Track::RecipesSummarizer(RecipesSummarizer::new(Arc::clone(&llm)))
                }
            })
            .collect();
        Self { tracks }
    }

    /// Looks up a track by its wire name.
    #[must_use]
    pub fn get(&self, track_id: &str) -> Option<&Track> {
        let id = TrackId::from_name(track_id)?;
        self.tracks.iter().find(|t| t.id() == id)
    }

    /// Iterates over the tracks in listing order.
    pub fn iter(&self) -> impl Iterator<Item = &Track> {
        self.tracks.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeLlm, empty_files};

    #[test]
    fn track_ids_round_trip() {
        for id in TrackId::ALL {
            assert_eq!(TrackId::from_name(id.as_str()), Some(id));
        }
        assert_eq!(TrackId::from_name("dummy"), None);
    }

    #[tokio::test]
    async fn set_resolves_known_names_only() {
        let (files, _dir) = empty_files().await;
        let tracks = TrackSet::new(files, Arc::new(FakeLlm::answering("ok")));

        assert_eq!(tracks.get("Chatbot").map(Track::id), Some(TrackId::Chatbot));
        assert!(tracks.get("Unknown").is_none());
        assert_eq!(tracks.iter().count(), TrackId::ALL.len());
    }

    #[test]
    fn response_becomes_ai_message() {
        let mut extra = Extra::new();
        extra.insert("n".to_string(), serde_json::json!(1));
        let message = TrackResponse::new("START", "hi").with_extra(extra.clone()).into_message();
        assert_eq!(message.state, "START");
        assert_eq!(message.content.text, "hi");
        assert_eq!(message.extra, Some(extra));
    }
}
