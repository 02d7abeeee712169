//! Entrypoint registry.
//!
//! Handles are built lazily on first use and cached by key. Build failures
//! are logged and not cached, so a provider that was down is retried on the
//! next lookup.

use crate::backend::{Capability, EntryPoint, ProviderKind};
use crate::config::{EntrypointConfig, EntrypointsConfig};
use crate::error::LlmError;
use crate::providers::{GigaChatEntryPoint, OpenRouterEntryPoint};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

/// Builds provider handles from configuration.
pub trait EntryPointBuilder: Send + Sync {
    /// Builds a handle for one configured entrypoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider is unknown or its arguments are invalid.
    fn build(&self, config: &EntrypointConfig) -> Result<Arc<dyn EntryPoint>, LlmError>;
}

/// Builds the HTTP providers by their configured name.
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpEntryPointBuilder;

impl EntryPointBuilder for HttpEntryPointBuilder {
    fn build(&self, config: &EntrypointConfig) -> Result<Arc<dyn EntryPoint>, LlmError> {
        match ProviderKind::from_name(&config.name) {
            Some(ProviderKind::GigaChat) => Ok(Arc::new(GigaChatEntryPoint::from_config(config)?)),
            Some(ProviderKind::OpenRouter) => {
                Ok(Arc::new(OpenRouterEntryPoint::from_config(config)?))
            }
            None => Err(LlmError::InvalidConfig {
                key: config.key.clone(),
                reason: format!("unknown provider '{}'", config.name),
            }),
        }
    }
}

/// Result of eagerly building every entrypoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WarmupReport {
    pub ready: Vec<String>,
    pub unavailable: Vec<String>,
}

/// Resolves entrypoint keys to provider handles.
pub struct EntrypointRegistry {
    config: EntrypointsConfig,
    builder: Arc<dyn EntryPointBuilder>,
    handles: RwLock<HashMap<String, Arc<dyn EntryPoint>>>,
}

impl EntrypointRegistry {
    /// Creates a registry over a configuration.
    #[must_use]
    pub fn new(config: EntrypointsConfig, builder: Arc<dyn EntryPointBuilder>) -> Self {
        Self {
            config,
            builder,
            handles: RwLock::new(HashMap::new()),
        }
    }

    /// Creates a registry that builds the HTTP providers.
    #[must_use]
    pub fn with_http_providers(config: EntrypointsConfig) -> Self {
        Self::new(config, Arc::new(HttpEntryPointBuilder))
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &EntrypointsConfig {
        &self.config
    }

    /// Returns the configured keys in order.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.config.entrypoints.keys().cloned().collect()
    }

    async fn handle(&self, key: &str) -> Option<Arc<dyn EntryPoint>> {
        if let Some(handle) = self.handles.read().await.get(key) {
            return Some(Arc::clone(handle));
        }
        let Some(config) = self.config.entrypoints.get(key) else {
            warn!(key, "Not found entrypoint");
            return None;
        };
        match self.builder.build(config) {
            Ok(handle) => {
                let mut handles = self.handles.write().await;
                Some(Arc::clone(handles.entry(key.to_string()).or_insert(handle)))
            }
            Err(e) => {
                error!(key, error = %e, "Failed to create entrypoint");
                None
            }
        }
    }

    /// Resolves a key, optionally requiring a capability.
    ///
    /// An empty key never resolves.
    pub async fn resolve(
        &self,
        key: &str,
        capability: Option<Capability>,
    ) -> Option<Arc<dyn EntryPoint>> {
        if key.is_empty() {
            return None;
        }
        let handle = self.handle(key).await?;
        match capability {
            Some(capability) if !handle.supports(capability) => {
                warn!(
                    key,
                    %capability,
                    provider = handle.provider().name(),
                    "Entrypoint lacks capability"
                );
                None
            }
            _ => Some(handle),
        }
    }

    /// Resolves `key`, falling back to `default_key`.
    pub async fn resolve_or_default(
        &self,
        key: &str,
        default_key: &str,
        capability: Option<Capability>,
    ) -> Option<Arc<dyn EntryPoint>> {
        match self.resolve(key, capability).await {
            Some(handle) => Some(handle),
            None => self.resolve(default_key, capability).await,
        }
    }

    /// Builds every configured entrypoint and reports which are ready.
    pub async fn warmup(&self) -> WarmupReport {
        let mut report = WarmupReport::default();
        for key in self.keys() {
            if self.handle(&key).await.is_some() {
                report.ready.push(key);
            } else {
                report.unavailable.push(key);
            }
        }
        info!(ready = %report.ready.join(", "), "Ready entrypoints");
        if !report.unavailable.is_empty() {
            warn!(unavailable = %report.unavailable.join(", "), "Not available entrypoints");
        }
        report
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::backend::LlmMessage;
    use async_trait::async_trait;
    use serde_json::Map;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Scripted entrypoint used across the crate's tests.
    pub(crate) struct FakeEntryPoint {
        pub key: String,
        pub provider: ProviderKind,
    }

    #[async_trait]
    impl EntryPoint for FakeEntryPoint {
        fn key(&self) -> &str {
            &self.key
        }

        fn provider(&self) -> ProviderKind {
            self.provider
        }

        async fn get_response(
            &self,
            messages: &[LlmMessage],
            attachments: &[String],
        ) -> Result<String, LlmError> {
            let last = messages.last().map(|m| m.content.as_str()).unwrap_or_default();
            Ok(format!("{}:{}:{}", self.key, last, attachments.join(",")))
        }

        async fn get_image_response(
            &self,
            image: &[u8],
            mimetype: &str,
            prompt: &str,
        ) -> Result<String, LlmError> {
            if self.provider != ProviderKind::OpenRouter {
                return Err(LlmError::Unsupported {
                    provider: self.provider.name().to_string(),
                    capability: Capability::Image,
                });
            }
            Ok(format!("{}:image:{mimetype}:{}:{prompt}", self.key, image.len()))
        }

        async fn upload_file(
            &self,
            name: &str,
            _content: Vec<u8>,
            _mimetype: &str,
        ) -> Result<String, LlmError> {
            Ok(format!("uploaded-{name}"))
        }

        async fn get_embedding(&self, prompt: &str) -> Result<Vec<f32>, LlmError> {
            Ok(vec![prompt.len() as f32, 0.0])
        }
    }

    /// Builds fakes; names starting with `broken` fail to build.
    #[derive(Default)]
    pub(crate) struct FakeBuilder {
        pub builds: AtomicU32,
    }

    impl EntryPointBuilder for FakeBuilder {
        fn build(&self, config: &EntrypointConfig) -> Result<Arc<dyn EntryPoint>, LlmError> {
            self.builds.fetch_add(1, Ordering::SeqCst);
            if config.name.starts_with("broken") {
                return Err(LlmError::ProviderUnavailable {
                    provider: config.name.clone(),
                    reason: "connect timeout".to_string(),
                });
            }
            let provider = ProviderKind::from_name(&config.name).ok_or_else(|| {
                LlmError::InvalidConfig {
                    key: config.key.clone(),
                    reason: "unknown provider".to_string(),
                }
            })?;
            Ok(Arc::new(FakeEntryPoint {
                key: config.key.clone(),
                provider,
            }))
        }
    }

    pub(crate) fn entry(key: &str, name: &str) -> EntrypointConfig {
        EntrypointConfig {
            key: key.to_string(),
            name: name.to_string(),
            caption: key.to_string(),
            args: Map::new(),
        }
    }

    pub(crate) fn fake_registry(config: EntrypointsConfig) -> (EntrypointRegistry, Arc<FakeBuilder>) {
        let builder = Arc::new(FakeBuilder::default());
        (EntrypointRegistry::new(config, builder.clone()), builder)
    }

    fn config() -> EntrypointsConfig {
        EntrypointsConfig::from_entries(
            [
                entry("giga", "gigachat"),
                entry("or", "open-router"),
                entry("down", "broken-gigachat"),
            ],
            "giga",
        )
    }

    #[tokio::test]
    async fn handles_are_cached() {
        let (registry, builder) = fake_registry(config());
        let first = registry.resolve("giga", None).await.expect("giga");
        let second = registry.resolve("giga", None).await.expect("giga");

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(builder.builds.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn build_failures_are_retried_later() {
        let (registry, builder) = fake_registry(config());
        assert!(registry.resolve("down", None).await.is_none());
        assert!(registry.resolve("down", None).await.is_none());
        assert_eq!(builder.builds.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn capability_mismatch_does_not_resolve() {
        let (registry, _) = fake_registry(config());
        assert!(registry.resolve("giga", Some(Capability::Image)).await.is_none());
        assert!(registry.resolve("or", Some(Capability::Image)).await.is_some());
    }

    #[tokio::test]
    async fn falls_back_to_default() {
        let (registry, _) = fake_registry(config());

        let handle = registry.resolve_or_default("", "giga", None).await.expect("default");
        assert_eq!(handle.key(), "giga");

        let handle = registry
            .resolve_or_default("missing", "giga", None)
            .await
            .expect("default");
        assert_eq!(handle.key(), "giga");

        let handle = registry.resolve_or_default("or", "giga", None).await.expect("or");
        assert_eq!(handle.key(), "or");
    }

    #[tokio::test]
    async fn fallback_respects_capability() {
        let (registry, _) = fake_registry(config());
        assert!(
            registry
                .resolve_or_default("giga", "giga", Some(Capability::Image))
                .await
                .is_none()
        );
        let handle = registry
            .resolve_or_default("giga", "or", Some(Capability::Image))
            .await
            .expect("image fallback");
        assert_eq!(handle.key(), "or");
    }

    #[tokio::test]
    async fn empty_keys_resolve_nothing() {
        let (registry, builder) = fake_registry(EntrypointsConfig::default());
        assert!(registry.resolve_or_default("", "", None).await.is_none());
        assert_eq!(builder.builds.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn warmup_partitions_keys() {
        let (registry, _) = fake_registry(config());
        let report = registry.warmup().await;
        assert_eq!(report.ready, vec!["giga", "or"]);
        assert_eq!(report.unavailable, vec!["down"]);
    }

    #[test]
    fn http_builder_rejects_unknown_provider() {
        let result = HttpEntryPointBuilder.build(&entry("x", "ollama"));
        assert!(matches!(result, Err(LlmError::InvalidConfig { .. })));
    }
}
