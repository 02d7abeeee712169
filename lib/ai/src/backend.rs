//! LLM entrypoint abstraction.
//!
//! Provides a unified interface for the configured providers and the
//! request shapes tracks hand to the accessor.

use crate::error::LlmError;
use async_trait::async_trait;
use maestro_core::ResourceId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// What an entrypoint can do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Text completion.
    Text,
    /// Image understanding.
    Image,
    /// File upload and attachment.
    File,
    /// Embedding vectors.
    Embedding,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Text => "text",
            Self::Image => "image",
            Self::File => "file",
            Self::Embedding => "embedding",
        })
    }
}

/// Known provider kinds, selected by the entrypoint's `name`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProviderKind {
    #[serde(rename = "gigachat")]
    GigaChat,
    #[serde(rename = "open-router")]
    OpenRouter,
}

impl ProviderKind {
    /// Looks up a provider by its configured name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "gigachat" => Some(Self::GigaChat),
            "open-router" => Some(Self::OpenRouter),
            _ => None,
        }
    }

    /// Returns the configured name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::GigaChat => "gigachat",
            Self::OpenRouter => "open-router",
        }
    }

    /// Returns the capabilities every entrypoint of this kind declares.
    #[must_use]
    pub fn capabilities(self) -> &'static [Capability] {
        match self {
            Self::GigaChat => &[Capability::Text, Capability::File, Capability::Embedding],
            Self::OpenRouter => &[Capability::Text, Capability::Image],
        }
    }
}

/// A message in a provider conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LlmMessage {
    /// The role of the message sender.
    pub role: MessageRole,
    /// The content of the message.
    pub content: String,
}

impl LlmMessage {
    /// Creates a system message.
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    /// Creates a user message.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    /// Creates an assistant message.
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

/// The role of a message sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// User/human message.
    User,
    /// Assistant/AI message.
    Assistant,
    /// System message.
    System,
}

/// Messages plus stored resources to attach.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payload {
    pub messages: Vec<LlmMessage>,
    #[serde(default)]
    pub attachments: Vec<ResourceId>,
}

/// What a track asks the accessor for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// A single user prompt.
    Text(String),
    /// A prepared conversation.
    Messages(Vec<LlmMessage>),
    /// A conversation with attached resources.
    Payload(Payload),
}

impl Request {
    /// Returns the conversation to send.
    #[must_use]
    pub fn messages(&self) -> Vec<LlmMessage> {
        match self {
            Self::Text(text) => vec![LlmMessage::user(text.clone())],
            Self::Messages(messages) => messages.clone(),
            Self::Payload(payload) => payload.messages.clone(),
        }
    }

    /// Returns the first attached resource.
    ///
    /// Only one attachment is routed per request.
    #[must_use]
    pub fn resource_id(&self) -> Option<&ResourceId> {
        match self {
            Self::Payload(payload) => payload.attachments.first(),
            Self::Text(_) | Self::Messages(_) => None,
        }
    }
}

impl From<&str> for Request {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<Vec<LlmMessage>> for Request {
    fn from(messages: Vec<LlmMessage>) -> Self {
        Self::Messages(messages)
    }
}

/// Per-call options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LlmCallProps {
    /// Requested entrypoint; empty means the default.
    #[serde(default)]
    pub entrypoint_key: String,
    /// Overrides the configured attempt count.
    #[serde(default)]
    pub attempts: Option<u32>,
}

impl LlmCallProps {
    /// Props targeting a specific entrypoint.
    #[must_use]
    pub fn for_key(entrypoint_key: impl Into<String>) -> Self {
        Self {
            entrypoint_key: entrypoint_key.into(),
            attempts: None,
        }
    }
}

/// Extended response with the entrypoint that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseExt {
    pub text: String,
    pub entrypoint_key: String,
}

/// A configured provider handle.
///
/// Operations a provider does not implement fail with
/// [`LlmError::Unsupported`].
#[async_trait]
pub trait EntryPoint: Send + Sync {
    /// Returns the entrypoint key.
    fn key(&self) -> &str;

    /// Returns the provider kind.
    fn provider(&self) -> ProviderKind;

    /// Returns the declared capabilities.
    fn capabilities(&self) -> &[Capability] {
        self.provider().capabilities()
    }

    /// Returns true if the capability is declared.
    fn supports(&self, capability: Capability) -> bool {
        self.capabilities().contains(&capability)
    }

    /// Generates a completion; `attachments` are provider file ids.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider call fails.
    async fn get_response(
        &self,
        messages: &[LlmMessage],
        attachments: &[String],
    ) -> Result<String, LlmError>;

    /// Describes an image.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider call fails or images are unsupported.
    async fn get_image_response(
        &self,
        _image: &[u8],
        _mimetype: &str,
        _prompt: &str,
    ) -> Result<String, LlmError> {
        Err(LlmError::Unsupported {
            provider: self.provider().name().to_string(),
            capability: Capability::Image,
        })
    }

    /// Uploads a file and returns the provider's file id.
    ///
    /// # Errors
    ///
    /// Returns an error if the upload fails or files are unsupported.
    async fn upload_file(
        &self,
        _name: &str,
        _content: Vec<u8>,
        _mimetype: &str,
    ) -> Result<String, LlmError> {
        Err(LlmError::Unsupported {
            provider: self.provider().name().to_string(),
            capability: Capability::File,
        })
    }

    /// Computes an embedding vector.
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails or embeddings are unsupported.
    async fn get_embedding(&self, _prompt: &str) -> Result<Vec<f32>, LlmError> {
        Err(LlmError::Unsupported {
            provider: self.provider().name().to_string(),
            capability: Capability::Embedding,
        })
    }
}
