//! Fakes shared by the crate's tests.

use async_trait::async_trait;
use maestro_ai::{
    EntrypointsInfo, LlmApi, LlmCallProps, LlmError, LlmMessage, Request, ResponseExt,
};
use maestro_core::{DirFileStorage, FileStorage};
use rootcause::Report;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// How the fake answers.
#[derive(Debug, Clone)]
pub(crate) enum Behavior {
    Answer(String),
    /// Completions fail; the key listing returns these keys.
    Fail { keys: Vec<String> },
    /// Completions and the key listing fail.
    Down,
}

/// Scripted [`LlmApi`] that records every conversation it receives.
pub(crate) struct FakeLlm {
    behavior: Behavior,
    pub seen: Mutex<Vec<Vec<LlmMessage>>>,
}

impl FakeLlm {
    pub(crate) fn new(behavior: Behavior) -> Self {
        Self {
            behavior,
            seen: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn answering(text: &str) -> Self {
        Self::new(Behavior::Answer(text.to_string()))
    }

    fn unavailable() -> Report<LlmError> {
        LlmError::ProviderUnavailable {
            provider: "gigachat".to_string(),
            reason: "connect timeout".to_string(),
        }
        .into()
    }
}

#[async_trait]
impl LlmApi for FakeLlm {
    async fn get_response_ext(
        &self,
        request: Request,
        _props: &LlmCallProps,
    ) -> Result<ResponseExt, Report<LlmError>> {
        self.seen.lock().expect("lock").push(request.messages());
        match &self.behavior {
            Behavior::Answer(text) => Ok(ResponseExt {
                text: text.clone(),
                entrypoint_key: "fake".to_string(),
            }),
            Behavior::Fail { .. } | Behavior::Down => Err(Self::unavailable()),
        }
    }

    async fn get_embedding(
        &self,
        _prompt: &str,
        _props: &LlmCallProps,
    ) -> Result<Vec<f32>, Report<LlmError>> {
        Ok(vec![1.0])
    }

    fn get_entrypoints_config(&self) -> EntrypointsInfo {
        EntrypointsInfo {
            default_entrypoint_key: String::new(),
            entrypoints: Vec::new(),
        }
    }

    async fn get_entrypoint_keys(&self) -> Result<Vec<String>, Report<LlmError>> {
        match &self.behavior {
            Behavior::Answer(_) => Ok(vec!["fake".to_string()]),
            Behavior::Fail { keys } => Ok(keys.clone()),
            Behavior::Down => Err(Self::unavailable()),
        }
    }
}

/// A file store in a fresh temporary directory.
pub(crate) async fn empty_files() -> (Arc<dyn FileStorage>, TempDir) {
    let dir = TempDir::new().expect("tempdir");
    let files = DirFileStorage::open(dir.path()).await.expect("file storage");
    (Arc::new(files), dir)
}
