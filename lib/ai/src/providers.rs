//! HTTP providers.
//!
//! Both providers speak an OpenAI-style chat completions dialect; the
//! helpers here parse those responses and classify transport failures.

pub mod gigachat;
pub mod openrouter;

pub use gigachat::GigaChatEntryPoint;
pub use openrouter::OpenRouterEntryPoint;

use crate::error::LlmError;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value as JsonValue};
use std::time::Duration;

pub(crate) const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Deserializes provider arguments from an entrypoint's `args` map.
pub(crate) fn parse_args<T: DeserializeOwned>(
    key: &str,
    args: &Map<String, JsonValue>,
) -> Result<T, LlmError> {
    serde_json::from_value(JsonValue::Object(args.clone())).map_err(|e| LlmError::InvalidConfig {
        key: key.to_string(),
        reason: e.to_string(),
    })
}

pub(crate) fn build_client(
    key: &str,
    timeout_secs: u64,
    verify_ssl_certs: bool,
) -> Result<reqwest::Client, LlmError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .danger_accept_invalid_certs(!verify_ssl_certs)
        .build()
        .map_err(|e| LlmError::InvalidConfig {
            key: key.to_string(),
            reason: e.to_string(),
        })
}

/// Maps a transport failure to an error.
pub(crate) fn transport_error(provider: &str, err: &reqwest::Error) -> LlmError {
    if err.is_timeout() || err.is_connect() {
        LlmError::ProviderUnavailable {
            provider: provider.to_string(),
            reason: err.to_string(),
        }
    } else {
        LlmError::RequestFailed {
            provider: provider.to_string(),
            reason: err.to_string(),
        }
    }
}

/// Maps a non-success status to an error.
///
/// Rate limits and server errors mean the provider is unavailable.
pub(crate) fn status_error(provider: &str, status: StatusCode, body: &str) -> LlmError {
    let reason = format!("{status}: {body}");
    if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
        LlmError::ProviderUnavailable {
            provider: provider.to_string(),
            reason,
        }
    } else {
        LlmError::RequestFailed {
            provider: provider.to_string(),
            reason,
        }
    }
}

/// Sends a request and decodes a JSON success body.
pub(crate) async fn send_json(
    provider: &str,
    request: reqwest::RequestBuilder,
) -> Result<JsonValue, LlmError> {
    let response = request
        .send()
        .await
        .map_err(|e| transport_error(provider, &e))?;
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(status_error(provider, status, &body));
    }
    response
        .json::<JsonValue>()
        .await
        .map_err(|e| LlmError::ResponseParseFailed {
            provider: provider.to_string(),
            reason: e.to_string(),
        })
}

/// Extracts `choices[0].message.content`.
pub(crate) fn parse_chat_completion(provider: &str, body: &JsonValue) -> Result<String, LlmError> {
    body.pointer("/choices/0/message/content")
        .and_then(JsonValue::as_str)
        .map(str::to_string)
        .ok_or_else(|| LlmError::ResponseParseFailed {
            provider: provider.to_string(),
            reason: "missing choices[0].message.content".to_string(),
        })
}

/// Extracts `data[0].embedding`.
pub(crate) fn parse_embedding(provider: &str, body: &JsonValue) -> Result<Vec<f32>, LlmError> {
    let values = body
        .pointer("/data/0/embedding")
        .and_then(JsonValue::as_array)
        .ok_or_else(|| LlmError::ResponseParseFailed {
            provider: provider.to_string(),
            reason: "missing data[0].embedding".to_string(),
        })?;
    values
        .iter()
        .map(|v| {
            v.as_f64()
                .map(|x| x as f32)
                .ok_or_else(|| LlmError::ResponseParseFailed {
                    provider: provider.to_string(),
                    reason: format!("non-numeric embedding component: {v}"),
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn chat_completion_content() {
        let body = json!({"choices": [{"message": {"role": "assistant", "content": "Привет"}}]});
        assert_eq!(parse_chat_completion("gigachat", &body).expect("content"), "Привет");
    }

    #[test]
    fn chat_completion_without_choices() {
        let err = parse_chat_completion("open-router", &json!({"choices": []})).unwrap_err();
        assert!(matches!(err, LlmError::ResponseParseFailed { .. }));
    }

    #[test]
    fn embedding_vector() {
        let body = json!({"data": [{"embedding": [0.5, -1.0, 0]}]});
        assert_eq!(
            parse_embedding("gigachat", &body).expect("embedding"),
            vec![0.5, -1.0, 0.0]
        );
    }

    #[test]
    fn embedding_with_garbage_component() {
        let body = json!({"data": [{"embedding": [0.5, "x"]}]});
        assert!(parse_embedding("gigachat", &body).is_err());
    }

    #[test]
    fn status_classification() {
        assert!(matches!(
            status_error("gigachat", StatusCode::SERVICE_UNAVAILABLE, ""),
            LlmError::ProviderUnavailable { .. }
        ));
        assert!(matches!(
            status_error("gigachat", StatusCode::TOO_MANY_REQUESTS, ""),
            LlmError::ProviderUnavailable { .. }
        ));
        assert!(matches!(
            status_error("gigachat", StatusCode::UNAUTHORIZED, ""),
            LlmError::RequestFailed { .. }
        ));
    }

    #[test]
    fn args_errors_name_the_key() {
        #[derive(Debug, serde::Deserialize)]
        struct Args {
            #[allow(dead_code)]
            api_key: String,
        }
        let err = parse_args::<Args>("or", &Map::new()).unwrap_err();
        assert!(matches!(err, LlmError::InvalidConfig { key, .. } if key == "or"));
    }
}
