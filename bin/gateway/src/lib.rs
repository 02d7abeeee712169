//! Maestro gateway.
//!
//! Wires the session store, the LLM accessor and the track set into a
//! [`TurnRouter`](router::TurnRouter) and serves it over HTTP.

pub mod api;
pub mod config;
pub mod error;
pub mod locks;
pub mod router;

use crate::api::AppState;
use crate::config::ServerConfig;
use crate::error::StartupError;
use crate::router::TurnRouter;
use maestro_ai::{EntrypointRegistry, EntrypointsConfig, LlmAccessor, RetryPolicy};
use maestro_conversation::ChatStore;
use maestro_core::{DirFileStorage, FileStorage};
use maestro_tracks::{DialogDispatcher, TrackSet};
use rootcause::Report;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// Reads the entrypoints document, or starts with none configured.
///
/// # Errors
///
/// Returns an error if the document exists but is invalid.
pub fn load_entrypoints(path: Option<&Path>) -> Result<EntrypointsConfig, Report<StartupError>> {
    let Some(path) = path else {
        warn!("No entrypoints document configured, LLM tracks will not answer");
        return Ok(EntrypointsConfig::default());
    };
    let entrypoints = EntrypointsConfig::load(path).map_err(|e| StartupError::Entrypoints {
        reason: e.to_string(),
    })?;
    info!(
        path = %path.display(),
        count = entrypoints.entrypoints.len(),
        default_entrypoint_key = %entrypoints.default_entrypoint_key,
        "Loaded entrypoints"
    );
    Ok(entrypoints)
}

/// Opens storage and assembles the application state.
///
/// # Errors
///
/// Returns an error if a storage directory cannot be opened or the
/// entrypoints document is invalid.
pub async fn build_state(config: &ServerConfig) -> Result<AppState, Report<StartupError>> {
    let files: Arc<dyn FileStorage> = Arc::new(
        DirFileStorage::open(&config.files_dir)
            .await
            .map_err(|e| StartupError::Storage {
                path: config.files_dir.display().to_string(),
                reason: e.to_string(),
            })?,
    );
    let store = ChatStore::open(&config.db_path, &config.archive_path)
        .await
        .map_err(|e| StartupError::Storage {
            path: config.db_path.display().to_string(),
            reason: e.to_string(),
        })?;

    let entrypoints = load_entrypoints(config.entrypoints_path.as_deref())?;
    let warmup = config.warmup_entrypoints || entrypoints.warmup;
    let registry = EntrypointRegistry::with_http_providers(entrypoints);
    if warmup {
        registry.warmup().await;
    }

    let retry = RetryPolicy::new(config.llm.attempts, config.llm.retry_delay());
    let llm = Arc::new(LlmAccessor::new(registry, Arc::clone(&files), retry));
    let tracks = TrackSet::new(files, llm.clone());
    let dispatcher =
        DialogDispatcher::new(tracks).with_no_such_track(config.messages.no_such_track.clone());

    Ok(AppState::new(TurnRouter::new(store, dispatcher), llm))
}
