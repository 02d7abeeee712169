//! GigaChat provider.
//!
//! Supports text completion, file upload with attachments and embeddings.
//! Access tokens are fetched lazily and refreshed shortly before expiry.

use super::{
    DEFAULT_TIMEOUT_SECS, build_client, parse_args, parse_chat_completion, parse_embedding,
    send_json,
};
use crate::backend::{EntryPoint, LlmMessage, MessageRole, ProviderKind};
use crate::config::EntrypointConfig;
use crate::error::LlmError;
use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use serde::Deserialize;
use serde_json::{Value as JsonValue, json};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};
use ulid::Ulid;

const PROVIDER: &str = "gigachat";

/// Default API base URL.
pub const DEFAULT_BASE_URL: &str = "https://gigachat.devices.sberbank.ru/api/v1";
const DEFAULT_AUTH_URL: &str = "https://ngw.devices.sberbank.ru:9443/api/v2/oauth";
const DEFAULT_SCOPE: &str = "GIGACHAT_API_PERS";
const EMBEDDINGS_MODEL: &str = "Embeddings";

/// Returns the model behind a well-known entrypoint key.
#[must_use]
pub fn model_for_key(key: &str) -> Option<&'static str> {
    match key {
        "giga" => Some("GigaChat"),
        "giga-max" => Some("GigaChat-Max"),
        "giga-max-2" => Some("GigaChat-2-Max"),
        _ => None,
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_auth_url() -> String {
    DEFAULT_AUTH_URL.to_string()
}

fn default_scope() -> String {
    DEFAULT_SCOPE.to_string()
}

fn default_verify_ssl_certs() -> bool {
    true
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

#[derive(Debug, Clone, Deserialize)]
struct GigaChatArgs {
    #[serde(default = "default_base_url")]
    base_url: String,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    user: Option<String>,
    #[serde(default)]
    password: Option<String>,
    #[serde(default)]
    client_id: Option<String>,
    #[serde(default)]
    client_secret: Option<String>,
    #[serde(default = "default_scope")]
    scope: String,
    #[serde(default = "default_auth_url")]
    auth_url: String,
    #[serde(default = "default_verify_ssl_certs")]
    verify_ssl_certs: bool,
    #[serde(default = "default_timeout_secs")]
    timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Auth {
    Password { user: String, password: String },
    ClientCredentials {
        client_id: String,
        client_secret: String,
        scope: String,
        auth_url: String,
    },
}

impl Auth {
    fn from_args(key: &str, args: &GigaChatArgs) -> Result<Self, LlmError> {
        match (&args.user, &args.password, &args.client_id, &args.client_secret) {
            (Some(user), Some(password), _, _) => Ok(Self::Password {
                user: user.clone(),
                password: password.clone(),
            }),
            (_, _, Some(client_id), Some(client_secret)) => Ok(Self::ClientCredentials {
                client_id: client_id.clone(),
                client_secret: client_secret.clone(),
                scope: args.scope.clone(),
                auth_url: args.auth_url.clone(),
            }),
            _ => Err(LlmError::InvalidConfig {
                key: key.to_string(),
                reason: "expected user/password or client_id/client_secret".to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone)]
struct AccessToken {
    value: String,
    expires_at: DateTime<Utc>,
}

impl AccessToken {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        self.expires_at - TimeDelta::seconds(60) > now
    }
}

/// Parses either token response shape into a token.
///
/// Client credentials return `{access_token, expires_at}`; password auth
/// returns `{tok, exp}`. Expiry is in epoch milliseconds.
fn parse_token(body: &JsonValue) -> Result<AccessToken, LlmError> {
    let value = body
        .get("access_token")
        .or_else(|| body.get("tok"))
        .and_then(JsonValue::as_str);
    let expires = body
        .get("expires_at")
        .or_else(|| body.get("exp"))
        .and_then(JsonValue::as_i64);
    match (value, expires.and_then(DateTime::from_timestamp_millis)) {
        (Some(value), Some(expires_at)) => Ok(AccessToken {
            value: value.to_string(),
            expires_at,
        }),
        _ => Err(LlmError::ResponseParseFailed {
            provider: PROVIDER.to_string(),
            reason: "token response without token or expiry".to_string(),
        }),
    }
}

/// Formats a fresh ULID as a UUID string for the `RqUID` header.
fn request_uid() -> String {
    let n = Ulid::new().0;
    let hex = format!("{n:032x}");
    format!(
        "{}-{}-{}-{}-{}",
        &hex[0..8],
        &hex[8..12],
        &hex[12..16],
        &hex[16..20],
        &hex[20..32]
    )
}

/// Builds the chat completions body. Attachments go on the last user message.
fn chat_body(model: &str, messages: &[LlmMessage], attachments: &[String]) -> JsonValue {
    let last_user = messages.iter().rposition(|m| m.role == MessageRole::User);
    let messages: Vec<JsonValue> = messages
        .iter()
        .enumerate()
        .map(|(i, m)| {
            let mut value = json!({"role": m.role, "content": m.content});
            if Some(i) == last_user && !attachments.is_empty() {
                value["attachments"] = json!(attachments);
            }
            value
        })
        .collect();
    json!({"model": model, "messages": messages})
}

/// A GigaChat model reachable with one set of credentials.
pub struct GigaChatEntryPoint {
    key: String,
    model: String,
    base_url: String,
    auth: Auth,
    client: reqwest::Client,
    token: Mutex<Option<AccessToken>>,
}

impl GigaChatEntryPoint {
    /// Creates an entrypoint from its configuration.
    ///
    /// The model comes from `args.model`, else from the well-known key,
    /// else `GigaChat`.
    ///
    /// # Errors
    ///
    /// Returns an error if the arguments lack credentials or the HTTP
    /// client cannot be built.
    pub fn from_config(config: &EntrypointConfig) -> Result<Self, LlmError> {
        let args: GigaChatArgs = parse_args(&config.key, &config.args)?;
        let auth = Auth::from_args(&config.key, &args)?;
        let model = args
            .model
            .clone()
            .or_else(|| model_for_key(&config.key).map(str::to_string))
            .unwrap_or_else(|| "GigaChat".to_string());
        Ok(Self {
            key: config.key.clone(),
            model,
            base_url: args.base_url.trim_end_matches('/').to_string(),
            auth,
            client: build_client(&config.key, args.timeout_secs, args.verify_ssl_certs)?,
            token: Mutex::new(None),
        })
    }

    /// Returns the model name.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    async fn fetch_token(&self) -> Result<AccessToken, LlmError> {
        let request = match &self.auth {
            Auth::Password { user, password } => self
                .client
                .post(format!("{}/token", self.base_url))
                .basic_auth(user, Some(password)),
            Auth::ClientCredentials {
                client_id,
                client_secret,
                scope,
                auth_url,
            } => self
                .client
                .post(auth_url)
                .basic_auth(client_id, Some(client_secret))
                .header("RqUID", request_uid())
                .form(&[("scope", scope.as_str())]),
        };
        let body = send_json(PROVIDER, request).await?;
        let token = parse_token(&body)?;
        info!(key = %self.key, expires_at = %token.expires_at, "Obtained GigaChat token");
        Ok(token)
    }

    async fn access_token(&self) -> Result<String, LlmError> {
        let mut guard = self.token.lock().await;
        if let Some(token) = guard.as_ref().filter(|t| t.is_fresh(Utc::now())) {
            return Ok(token.value.clone());
        }
        let token = self.fetch_token().await?;
        let value = token.value.clone();
        *guard = Some(token);
        Ok(value)
    }

    async fn invalidate_token(&self) {
        *self.token.lock().await = None;
    }

    async fn authorized(&self, request: reqwest::RequestBuilder) -> Result<JsonValue, LlmError> {
        let token = self.access_token().await?;
        let result = send_json(PROVIDER, request.bearer_auth(token)).await;
        if matches!(&result, Err(LlmError::RequestFailed { reason, .. }) if reason.starts_with("401")) {
            self.invalidate_token().await;
        }
        result
    }
}

#[async_trait]
impl EntryPoint for GigaChatEntryPoint {
    fn key(&self) -> &str {
        &self.key
    }

    fn provider(&self) -> ProviderKind {
        ProviderKind::GigaChat
    }

    #[instrument(skip(self, messages, attachments), fields(key = %self.key))]
    async fn get_response(
        &self,
        messages: &[LlmMessage],
        attachments: &[String],
    ) -> Result<String, LlmError> {
        let body = chat_body(&self.model, messages, attachments);
        let response = self
            .authorized(
                self.client
                    .post(format!("{}/chat/completions", self.base_url))
                    .json(&body),
            )
            .await?;
        parse_chat_completion(PROVIDER, &response)
    }

    #[instrument(skip(self, content), fields(key = %self.key))]
    async fn upload_file(
        &self,
        name: &str,
        content: Vec<u8>,
        mimetype: &str,
    ) -> Result<String, LlmError> {
        let part = reqwest::multipart::Part::bytes(content)
            .file_name(name.to_string())
            .mime_str(mimetype)
            .map_err(|e| LlmError::BadRequest {
                reason: e.to_string(),
            })?;
        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("purpose", "general");
        let response = self
            .authorized(
                self.client
                    .post(format!("{}/files", self.base_url))
                    .multipart(form),
            )
            .await?;
        let id = response
            .get("id")
            .and_then(JsonValue::as_str)
            .ok_or_else(|| LlmError::ResponseParseFailed {
                provider: PROVIDER.to_string(),
                reason: "upload response without id".to_string(),
            })?;
        debug!(file_id = id, "Uploaded file");
        Ok(id.to_string())
    }

    #[instrument(skip(self, prompt), fields(key = %self.key))]
    async fn get_embedding(&self, prompt: &str) -> Result<Vec<f32>, LlmError> {
        let body = json!({"model": EMBEDDINGS_MODEL, "input": [prompt]});
        let response = self
            .authorized(
                self.client
                    .post(format!("{}/embeddings", self.base_url))
                    .json(&body),
            )
            .await?;
        parse_embedding(PROVIDER, &response)
    }
}
