//! Conversation transcripts for maestro.
//!
//! This crate provides:
//!
//! - **Context**: The identity of a conversation and its derived chat id
//! - **Chat**: The append-only message history of one conversation
//! - **Session Store**: File-backed persistence with archive-on-delete

pub mod chat;
pub mod context;
pub mod error;
pub mod message;
pub mod store;

pub use chat::{Chat, ChatPreview};
pub use context::Context;
pub use error::{ContextError, StoreError};
pub use message::{AiMessage, Content, Extra, HumanMessage, Message, ResourceRef, Widget};
pub use store::ChatStore;
