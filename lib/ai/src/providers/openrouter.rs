//! OpenRouter provider: text completion and image understanding.

use super::{DEFAULT_TIMEOUT_SECS, build_client, parse_args, parse_chat_completion, send_json};
use crate::backend::{EntryPoint, LlmMessage, ProviderKind};
use crate::config::EntrypointConfig;
use crate::error::LlmError;
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;
use serde_json::{Value as JsonValue, json};
use tracing::{instrument, warn};

const PROVIDER: &str = "open-router";

/// Default API base URL.
pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

/// What to do when the provider returns an error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
enum OnError {
    #[default]
    Fail,
    /// Answer with an empty completion instead.
    Empty,
}

#[derive(Debug, Clone, Deserialize)]
struct OpenRouterArgs {
    model_id: String,
    api_key: String,
    #[serde(default = "default_base_url")]
    base_url: String,
    #[serde(default)]
    on_error: OnError,
    #[serde(default = "default_timeout_secs")]
    timeout_secs: u64,
}

/// Builds an `image_url` message with the image inlined as a data URL.
fn image_body(model: &str, image: &[u8], mimetype: &str, prompt: &str) -> JsonValue {
    let data_url = format!("data:{mimetype};base64,{}", STANDARD.encode(image));
    json!({
        "model": model,
        "messages": [{
            "role": "user",
            "content": [
                {"type": "text", "text": prompt},
                {"type": "image_url", "image_url": {"url": data_url}},
            ],
        }],
    })
}

/// A model routed through OpenRouter.
pub struct OpenRouterEntryPoint {
    key: String,
    model_id: String,
    api_key: String,
    base_url: String,
    on_error: OnError,
    client: reqwest::Client,
}

impl OpenRouterEntryPoint {
    /// Creates an entrypoint from its configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if `model_id` or `api_key` is missing.
    pub fn from_config(config: &EntrypointConfig) -> Result<Self, LlmError> {
        let args: OpenRouterArgs = parse_args(&config.key, &config.args)?;
        Ok(Self {
            key: config.key.clone(),
            model_id: args.model_id,
            api_key: args.api_key,
            base_url: args.base_url.trim_end_matches('/').to_string(),
            on_error: args.on_error,
            client: build_client(&config.key, args.timeout_secs, true)?,
        })
    }

    /// Returns the routed model id.
    #[must_use]
    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    async fn complete(&self, body: &JsonValue) -> Result<String, LlmError> {
        let request = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(body);
        let result = send_json(PROVIDER, request)
            .await
            .and_then(|response| parse_chat_completion(PROVIDER, &response));
        match (result, self.on_error) {
            (Err(e), OnError::Empty) => {
                warn!(key = %self.key, error = %e, "Completion failed, answering empty");
                Ok(String::new())
            }
            (result, _) => result,
        }
    }
}

#[async_trait]
impl EntryPoint for OpenRouterEntryPoint {
    fn key(&self) -> &str {
        &self.key
    }

    fn provider(&self) -> ProviderKind {
        ProviderKind::OpenRouter
    }

    #[instrument(skip(self, messages, attachments), fields(key = %self.key))]
    async fn get_response(
        &self,
        messages: &[LlmMessage],
        attachments: &[String],
    ) -> Result<String, LlmError> {
        if !attachments.is_empty() {
            warn!(count = attachments.len(), "Ignoring file attachments");
        }
        self.complete(&json!({"model": self.model_id, "messages": messages}))
            .await
    }

    #[instrument(skip(self, image, prompt), fields(key = %self.key))]
    async fn get_image_response(
        &self,
        image: &[u8],
        mimetype: &str,
        prompt: &str,
    ) -> Result<String, LlmError> {
        self.complete(&image_body(&self.model_id, image, mimetype, prompt))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::Capability;

    fn config(args: JsonValue) -> EntrypointConfig {
        let JsonValue::Object(args) = args else {
            panic!("args must be an object");
        };
        EntrypointConfig {
            key: "open-router_qwen".to_string(),
            name: "open-router".to_string(),
            caption: "Qwen".to_string(),
            args,
        }
    }

    #[test]
    fn args_from_wizard_output() {
        let ep = OpenRouterEntryPoint::from_config(&config(
            json!({"model_id": "qwen/qwen-2.5-72b-instruct", "api_key": "sk-1", "on_error": "fail"}),
        ))
        .expect("entrypoint");
        assert_eq!(ep.model_id(), "qwen/qwen-2.5-72b-instruct");
        assert_eq!(ep.base_url, DEFAULT_BASE_URL);
        assert_eq!(ep.on_error, OnError::Fail);
        assert!(ep.supports(Capability::Image));
        assert!(!ep.supports(Capability::Embedding));
    }

    #[test]
    fn api_key_is_required() {
        let result = OpenRouterEntryPoint::from_config(&config(json!({"model_id": "m"})));
        assert!(matches!(result, Err(LlmError::InvalidConfig { .. })));
    }

    #[test]
    fn image_is_inlined_as_data_url() {
        let body = image_body("m", b"\x89PNG", "image/png", "what is it?");
        let content = &body["messages"][0]["content"];
        assert_eq!(content[0]["text"], "what is it?");
        assert_eq!(content[1]["image_url"]["url"], "data:image/png;base64,iVBORw==");
    }

    #[tokio::test]
    async fn embeddings_are_unsupported() {
        let ep = OpenRouterEntryPoint::from_config(&config(json!({"model_id": "m", "api_key": "k"})))
            .expect("entrypoint");
        let err = ep.get_embedding("text").await.unwrap_err();
        assert!(matches!(
            err,
            LlmError::Unsupported {
                capability: Capability::Embedding,
                ..
            }
        ));
    }
}
