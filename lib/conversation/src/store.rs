//! File-backed session store.
//!
//! Each conversation is one pretty-printed JSON document named after its chat
//! id. Writes replace the whole document (last writer wins); deletes move the
//! document to an archive directory and never destroy an archived version.
//!
//! ```text
//! logs_dir/
//! ├── client_web_user_u1_session_s1.json
//! └── client_web_user_u1_session_s2.json
//! archive_dir/
//! ├── client_web_user_u1_session_s0.json
//! └── client_web_user_u1_session_s0_1718000000.json
//! ```

use crate::chat::{Chat, ChatPreview};
use crate::context::Context;
use crate::error::StoreError;
use chrono::Utc;
use maestro_core::{ChatId, ensure_dir};
use rootcause::Report;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::instrument;
use ulid::Ulid;

const EXTENSION: &str = "json";

/// Persists chat transcripts under a directory.
#[derive(Debug, Clone)]
pub struct ChatStore {
    logs_dir: PathBuf,
    archive_dir: PathBuf,
}

impl ChatStore {
    /// Opens a store, creating both directories if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if either path is a regular file or cannot be created.
    pub async fn open(
        logs_dir: impl Into<PathBuf>,
        archive_dir: impl Into<PathBuf>,
    ) -> Result<Self, Report<StoreError>> {
        let logs_dir = logs_dir.into();
        let archive_dir = archive_dir.into();
        for dir in [&logs_dir, &archive_dir] {
            ensure_dir(dir).await.map_err(|e| StoreError::Io {
                path: dir.display().to_string(),
                reason: e.to_string(),
            })?;
        }
        Ok(Self {
            logs_dir,
            archive_dir,
        })
    }

    /// Returns the path of the transcript for `chat_id`.
    #[must_use]
    pub fn chat_path(&self, chat_id: &ChatId) -> PathBuf {
        self.logs_dir.join(format!("{chat_id}.{EXTENSION}"))
    }

    /// Returns true if a transcript exists for the context.
    pub async fn has_chat(&self, context: &Context) -> bool {
        let chat_id = context.create_id();
        chat_id.is_valid() && fs::try_exists(self.chat_path(&chat_id)).await.unwrap_or(false)
    }

    /// Loads the transcript for a context, or starts an empty one.
    ///
    /// # Errors
    ///
    /// Returns an error if the context is invalid, an existing transcript
    /// cannot be read or parsed, or the transcript under this id belongs to
    /// another identity.
    #[instrument(skip(self, context), fields(chat_id = %context.create_id()))]
    pub async fn load_or_create(&self, context: &Context) -> Result<Chat, Report<StoreError>> {
        let chat_id = checked_id(context)?;
        match self.load(&chat_id).await {
            Ok(chat) if !chat.context.same_identity(context) => {
                tracing::warn!(
                    stored_user_id = %chat.context.user_id,
                    stored_session_id = %chat.context.session_id,
                    "Chat id is taken by another identity"
                );
                Err(StoreError::InvalidId {
                    chat_id: chat_id.to_string(),
                    reason: "already names another user's conversation".to_string(),
                }
                .into())
            }
            Ok(chat) => {
                tracing::info!("Old session loaded");
                Ok(chat)
            }
            Err(report) if matches!(report.current_context(), StoreError::NotFound { .. }) => {
                tracing::info!("New session created");
                Ok(Chat::new(context.clone()))
            }
            Err(report) => Err(report),
        }
    }

    /// Loads a persisted transcript.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no transcript exists and `Malformed` if it
    /// cannot be parsed. Malformed transcripts are never repaired.
    #[instrument(skip(self))]
    pub async fn load(&self, chat_id: &ChatId) -> Result<Chat, Report<StoreError>> {
        validate_id(chat_id)?;
        let path = self.chat_path(chat_id);
        let text = match fs::read_to_string(&path).await {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StoreError::NotFound {
                    chat_id: chat_id.clone(),
                }
                .into());
            }
            Err(e) => return Err(io_error(&path, &e).into()),
        };
        serde_json::from_str(&text).map_err(|e| {
            tracing::error!(path = %path.display(), error = %e, "Failed to parse chat");
            StoreError::Malformed {
                chat_id: chat_id.clone(),
                reason: e.to_string(),
            }
            .into()
        })
    }

    /// Writes the full transcript, replacing any previous version.
    ///
    /// # Errors
    ///
    /// Returns an error if the context is invalid or the write fails.
    #[instrument(skip(self, chat), fields(chat_id = %chat.create_id(), messages = chat.messages.len()))]
    pub async fn dump(&self, chat: &Chat) -> Result<(), Report<StoreError>> {
        let chat_id = checked_id(&chat.context)?;
        let text = serde_json::to_string_pretty(chat).map_err(|e| StoreError::Malformed {
            chat_id: chat_id.clone(),
            reason: e.to_string(),
        })?;
        let path = self.chat_path(&chat_id);
        write_replacing(&path, text.as_bytes()).await?;
        Ok(())
    }

    /// Moves a transcript to the archive.
    ///
    /// If the archive already holds a transcript with this id, the new entry
    /// gets a timestamp suffix.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if there is no transcript to archive.
    #[instrument(skip(self))]
    pub async fn delete(&self, chat_id: &ChatId) -> Result<PathBuf, Report<StoreError>> {
        validate_id(chat_id)?;
        let path = self.chat_path(chat_id);
        if !exists(&path).await? {
            return Err(StoreError::NotFound {
                chat_id: chat_id.clone(),
            }
            .into());
        }

        let archived = self.free_archive_path(chat_id).await?;
        fs::rename(&path, &archived)
            .await
            .map_err(|e| io_error(&path, &e))?;
        tracing::info!(archived = %archived.display(), "Chat archived");
        Ok(archived)
    }

    async fn free_archive_path(&self, chat_id: &ChatId) -> Result<PathBuf, Report<StoreError>> {
        let plain = self.archive_dir.join(format!("{chat_id}.{EXTENSION}"));
        if !exists(&plain).await? {
            return Ok(plain);
        }
        let ts = Utc::now().timestamp();
        let stamped = self.archive_dir.join(format!("{chat_id}_{ts}.{EXTENSION}"));
        if !exists(&stamped).await? {
            return Ok(stamped);
        }
        let mut n = 1u32;
        loop {
            let candidate = self
                .archive_dir
                .join(format!("{chat_id}_{ts}_{n}.{EXTENSION}"));
            if !exists(&candidate).await? {
                return Ok(candidate);
            }
            n += 1;
        }
    }

    /// Lists previews of every chat of a user.
    ///
    /// Transcripts are found by file-name prefix and then confirmed against
    /// their stored context, so identity fields containing the separator
    /// cannot leak another user's chats. Transcripts that fail to load are
    /// logged and skipped.
    ///
    /// # Errors
    ///
    /// Returns an error only if the transcript directory cannot be listed.
    #[instrument(skip(self))]
    pub async fn list_previews(
        &self,
        client_id: &str,
        user_id: &str,
    ) -> Result<Vec<ChatPreview>, Report<StoreError>> {
        let prefix = Context::user_prefix(client_id, user_id);
        let mut entries = fs::read_dir(&self.logs_dir)
            .await
            .map_err(|e| io_error(&self.logs_dir, &e))?;

        let mut chat_ids = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| io_error(&self.logs_dir, &e))?
        {
            let name = entry.file_name();
            let Some(stem) = name
                .to_str()
                .and_then(|n| n.strip_suffix(&format!(".{EXTENSION}")))
            else {
                continue;
            };
            if stem.starts_with(&prefix) {
                chat_ids.push(ChatId::new_unchecked(stem));
            }
        }
        chat_ids.sort();

        let mut previews = Vec::with_capacity(chat_ids.len());
        for chat_id in chat_ids {
            match self.load(&chat_id).await {
                Ok(chat) => {
                    if chat.context.client_id == client_id && chat.context.user_id == user_id {
                        previews.push(chat.preview(chat_id));
                    }
                }
                Err(report) => {
                    tracing::error!(chat_id = %chat_id, error = %report, "Skipping unreadable chat");
                }
            }
        }
        Ok(previews)
    }
}

fn checked_id(context: &Context) -> Result<ChatId, Report<StoreError>> {
    let chat_id = context.create_id();
    context.validate().map_err(|e| StoreError::InvalidId {
        chat_id: chat_id.to_string(),
        reason: e.to_string(),
    })?;
    validate_id(&chat_id)?;
    Ok(chat_id)
}

fn validate_id(chat_id: &ChatId) -> Result<(), Report<StoreError>> {
    if chat_id.is_valid() {
        return Ok(());
    }
    Err(StoreError::InvalidId {
        chat_id: chat_id.to_string(),
        reason: "not usable as a file name".to_string(),
    }
    .into())
}

/// Reports whether `path` exists; failures to tell are errors, not absence.
async fn exists(path: &Path) -> Result<bool, Report<StoreError>> {
    fs::try_exists(path)
        .await
        .map_err(|e| io_error(path, &e).into())
}

/// Replaces `path` with `content` through a temporary sibling and a rename.
async fn write_replacing(path: &Path, content: &[u8]) -> Result<(), Report<StoreError>> {
    let parent = path.parent().unwrap_or(Path::new("."));
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("chat");
    let tmp_path = parent.join(format!(".{file_name}.{}.tmp", Ulid::new()));

    fs::write(&tmp_path, content)
        .await
        .map_err(|e| io_error(&tmp_path, &e))?;
    if let Err(e) = fs::rename(&tmp_path, path).await {
        let _ = fs::remove_file(&tmp_path).await;
        return Err(io_error(path, &e).into());
    }
    Ok(())
}

fn io_error(path: &Path, e: &std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.display().to_string(),
        reason: e.to_string(),
    }
}
