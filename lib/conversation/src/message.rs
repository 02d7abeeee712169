//! Message types for conversations.

use chrono::{DateTime, Utc};
use maestro_core::ResourceId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// Free-form accumulator data carried on AI messages.
pub type Extra = Map<String, JsonValue>;

/// A reference to a stored resource, with the name to present it under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRef {
    pub resource_id: ResourceId,
    pub resource_name: String,
}

/// An interactive hint attached to AI content.
///
/// Rendering is up to the client; the server only records the choices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Widget {
    /// Suggested replies, one per button.
    pub buttons: Vec<String>,
}

impl Widget {
    /// Creates a widget with one button per item.
    #[must_use]
    pub fn buttons<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            buttons: items.into_iter().map(Into::into).collect(),
        }
    }
}

/// Rendered AI content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Content {
    /// The text shown to the user.
    #[serde(default)]
    pub text: String,
    /// A resource returned alongside the text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<ResourceRef>,
    /// Suggested replies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub widget: Option<Widget>,
}

impl Content {
    /// Creates text-only content.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Attaches a widget.
    #[must_use]
    pub fn with_widget(mut self, widget: Widget) -> Self {
        self.widget = Some(widget);
        self
    }

    /// Attaches a resource reference.
    #[must_use]
    pub fn with_resource(mut self, resource: ResourceRef) -> Self {
        self.resource = Some(resource);
        self
    }
}

impl From<&str> for Content {
    fn from(text: &str) -> Self {
        Self::text(text)
    }
}

impl From<String> for Content {
    fn from(text: String) -> Self {
        Self::text(text)
    }
}

/// A message written by the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HumanMessage {
    /// Free text.
    #[serde(default)]
    pub text: String,
    /// An uploaded resource the user refers to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<ResourceId>,
    /// When the message was created.
    #[serde(default = "Utc::now")]
    pub date_time: DateTime<Utc>,
}

impl HumanMessage {
    /// Creates a text message stamped with the current time.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            resource_id: None,
            date_time: Utc::now(),
        }
    }

    /// Attaches a resource reference.
    #[must_use]
    pub fn with_resource(mut self, resource_id: ResourceId) -> Self {
        self.resource_id = Some(resource_id);
        self
    }
}

/// A message produced by a track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiMessage {
    /// Rendered content.
    pub content: Content,
    /// The track's position after producing this message.
    #[serde(default)]
    pub state: String,
    /// Accumulator data the track needs on its next turn.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<Extra>,
    /// When the message was created.
    #[serde(default = "Utc::now")]
    pub date_time: DateTime<Utc>,
}

impl AiMessage {
    /// Creates a message with content and state, stamped with the current time.
    #[must_use]
    pub fn new(content: impl Into<Content>, state: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            state: state.into(),
            extra: None,
            date_time: Utc::now(),
        }
    }

    /// Attaches accumulator data.
    #[must_use]
    pub fn with_extra(mut self, extra: Option<Extra>) -> Self {
        self.extra = extra;
        self
    }
}

/// A message in a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Message {
    Human(HumanMessage),
    Ai(AiMessage),
}

impl Message {
    /// Returns the message timestamp.
    #[must_use]
    pub fn date_time(&self) -> DateTime<Utc> {
        match self {
            Self::Human(m) => m.date_time,
            Self::Ai(m) => m.date_time,
        }
    }

    /// Returns the human message, if this is one.
    #[must_use]
    pub fn as_human(&self) -> Option<&HumanMessage> {
        match self {
            Self::Human(m) => Some(m),
            Self::Ai(_) => None,
        }
    }

    /// Returns the AI message, if this is one.
    #[must_use]
    pub fn as_ai(&self) -> Option<&AiMessage> {
        match self {
            Self::Ai(m) => Some(m),
            Self::Human(_) => None,
        }
    }
}

impl From<HumanMessage> for Message {
    fn from(m: HumanMessage) -> Self {
        Self::Human(m)
    }
}

impl From<AiMessage> for Message {
    fn from(m: AiMessage) -> Self {
        Self::Ai(m)
    }
}
