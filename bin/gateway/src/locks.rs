//! Per-conversation mutual exclusion.
//!
//! The session store is last-writer-wins, so two turns against one chat id
//! must not interleave their load and dump. Each id gets an async mutex that
//! lives only while some turn holds or waits for it.

use maestro_core::ChatId;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

type LockMap = HashMap<ChatId, Arc<AsyncMutex<()>>>;

/// Keyed async locks over chat ids.
#[derive(Debug, Clone, Default)]
pub struct ChatLocks {
    inner: Arc<Mutex<LockMap>>,
}

impl ChatLocks {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits until no other turn holds `chat_id`, then holds it.
    pub async fn acquire(&self, chat_id: &ChatId) -> ChatLock {
        let lock = {
            let mut map = self.map();
            Arc::clone(map.entry(chat_id.clone()).or_default())
        };
        let guard = lock.lock_owned().await;
        ChatLock {
            chat_id: chat_id.clone(),
            guard: Some(guard),
            locks: Arc::clone(&self.inner),
        }
    }

    /// Number of ids currently held or awaited.
    #[must_use]
    pub fn len(&self) -> usize {
        self.map().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn map(&self) -> MutexGuard<'_, LockMap> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Held lock on one chat id. Released on drop.
#[derive(Debug)]
pub struct ChatLock {
    chat_id: ChatId,
    guard: Option<OwnedMutexGuard<()>>,
    locks: Arc<Mutex<LockMap>>,
}

impl Drop for ChatLock {
    fn drop(&mut self) {
        drop(self.guard.take());
        let mut map = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        // only the map's own reference left: nobody holds or awaits this id
        if map
            .get(&self.chat_id)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            map.remove(&self.chat_id);
        }
    }
}
