//! Core domain types and utilities for maestro.
//!
//! This crate provides the identifiers, error handling foundation and the
//! file-blob storage contract shared by the conversation, AI and track
//! crates.

pub mod error;
pub mod files;
pub mod id;

pub use error::{FileStorageError, Result};
pub use files::{DirFileStorage, FileStorage, ensure_dir};
pub use id::{ChatId, ParseIdError, ResourceId, SessionId};
