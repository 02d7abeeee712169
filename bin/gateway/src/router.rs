//! Turn router.
//!
//! Runs one turn end to end: load or create the transcript, append the human
//! message, persist, dispatch to the track, append the answer, persist again.
//! Every operation on a chat id holds that id's lock for its whole duration.

use crate::error::RouterError;
use crate::locks::ChatLocks;
use maestro_conversation::{AiMessage, Chat, ChatPreview, ChatStore, Context, HumanMessage, Message};
use maestro_core::ChatId;
use maestro_tracks::DialogDispatcher;
use rootcause::Report;
use tracing::{info, instrument, warn};

/// Answer to one human turn.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnOutcome {
    pub chat_id: ChatId,
    pub response_messages: Vec<AiMessage>,
}

/// Orchestrates turns against the session store and the dispatcher.
pub struct TurnRouter {
    store: ChatStore,
    dispatcher: DialogDispatcher,
    locks: ChatLocks,
}

impl TurnRouter {
    #[must_use]
    pub fn new(store: ChatStore, dispatcher: DialogDispatcher) -> Self {
        Self {
            store,
            dispatcher,
            locks: ChatLocks::new(),
        }
    }

    #[must_use]
    pub fn dispatcher(&self) -> &DialogDispatcher {
        &self.dispatcher
    }

    /// Creates the conversation for `context`, or touches an existing one.
    ///
    /// An empty session id is replaced with a fresh one.
    ///
    /// # Errors
    ///
    /// Returns `Malformed` for identity fields that cannot name a transcript
    /// and `Storage` if the transcript cannot be written.
    #[instrument(skip(self, context), fields(client_id = %context.client_id, track_id = %context.track_id))]
    pub async fn create(&self, context: Context) -> Result<ChatId, Report<RouterError>> {
        let context = context.with_session_or_new();
        context
            .validate()
            .map_err(|e| RouterError::malformed(e.to_string()))?;
        let chat_id = context.create_id();

        let _lock = self.locks.acquire(&chat_id).await;
        let chat = self
            .store
            .load_or_create(&context)
            .await
            .map_err(|e| RouterError::from_store(&e))?;
        self.persist(&chat).await?;
        info!(chat_id = %chat_id, "Chat created");
        Ok(chat_id)
    }

    /// Loads a transcript.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if nothing is persisted under `chat_id`.
    #[instrument(skip(self))]
    pub async fn get(&self, chat_id: &ChatId) -> Result<Chat, Report<RouterError>> {
        let _lock = self.locks.acquire(chat_id).await;
        self.store
            .load(chat_id)
            .await
            .map_err(|e| RouterError::from_store(&e).into())
    }

    /// Answers a human message in an existing conversation.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the conversation was never created.
    #[instrument(skip(self, message))]
    pub async fn send(
        &self,
        chat_id: &ChatId,
        message: HumanMessage,
    ) -> Result<TurnOutcome, Report<RouterError>> {
        let _lock = self.locks.acquire(chat_id).await;
        let chat = self
            .store
            .load(chat_id)
            .await
            .map_err(|e| RouterError::from_store(&e))?;
        self.run_turn(chat, message).await
    }

    /// Answers a human message, creating the conversation on first contact.
    ///
    /// # Errors
    ///
    /// Returns `Malformed` for an unusable context and `Storage` if the
    /// transcript cannot be read or written.
    #[instrument(skip(self, context, message), fields(chat_id = %context.create_id()))]
    pub async fn send_by_context(
        &self,
        context: &Context,
        message: HumanMessage,
    ) -> Result<TurnOutcome, Report<RouterError>> {
        let chat_id = context.create_id();
        let _lock = self.locks.acquire(&chat_id).await;
        let chat = self
            .store
            .load_or_create(context)
            .await
            .map_err(|e| RouterError::from_store(&e))?;
        self.run_turn(chat, message).await
    }

    /// Archives a conversation.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if nothing is persisted under `chat_id`.
    #[instrument(skip(self))]
    pub async fn delete(&self, chat_id: &ChatId) -> Result<(), Report<RouterError>> {
        let _lock = self.locks.acquire(chat_id).await;
        self.store
            .delete(chat_id)
            .await
            .map_err(|e| RouterError::from_store(&e))?;
        Ok(())
    }

    /// Lists previews of a user's conversations.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the transcript directory cannot be listed.
    #[instrument(skip(self))]
    pub async fn list_previews(
        &self,
        client_id: &str,
        user_id: &str,
    ) -> Result<Vec<ChatPreview>, Report<RouterError>> {
        self.store
            .list_previews(client_id, user_id)
            .await
            .map_err(|e| RouterError::from_store(&e).into())
    }

    /// Appends, persists, dispatches and persists again. The caller holds
    /// the chat's lock.
    async fn run_turn(
        &self,
        mut chat: Chat,
        message: HumanMessage,
    ) -> Result<TurnOutcome, Report<RouterError>> {
        let chat_id = chat.create_id();
        info!(chat_id = %chat_id, track_id = %chat.context.track_id, "Human turn received");
        chat.add_message(message);
        self.persist(&chat).await?;

        let messages = self
            .dispatcher
            .dispatch(&mut chat)
            .await
            .map_err(|e| RouterError::from_dispatch(&e))?;
        self.persist(&chat).await?;

        let response_messages: Vec<AiMessage> = messages
            .into_iter()
            .filter_map(|m| match m {
                Message::Ai(ai) => Some(ai),
                Message::Human(_) => None,
            })
            .collect();
        if response_messages.is_empty() {
            warn!(chat_id = %chat_id, "No messages to respond with");
        }
        Ok(TurnOutcome {
            chat_id,
            response_messages,
        })
    }

    async fn persist(&self, chat: &Chat) -> Result<(), Report<RouterError>> {
        self.store
            .dump(chat)
            .await
            .map_err(|e| RouterError::from_store(&e).into())
    }
}
