//! Entrypoints configuration wizard.
//!
//! Walks the user through configuring GigaChat and OpenRouter entrypoints and
//! emits the resulting entrypoints document as JSON. The entries collected so
//! far and the entry being edited travel in the AI message `extra` as
//! `{collected_entrypoints, current_entrypoint}`; the track itself is
//! stateless.

use crate::track::{DialogTrack, TrackResponse, Turn};
use async_trait::async_trait;
use maestro_ai::providers::gigachat::DEFAULT_BASE_URL;
use maestro_ai::{EntrypointConfig, EntrypointsConfig};
use maestro_conversation::{Content, Extra, Widget};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue, json};
use tracing::{info, warn};

const GIGACHAT_KEYS: [&str; 3] = ["giga", "giga-max", "giga-max-2"];
const GIGACHAT_DEFAULT_KEY: &str = "giga-max-2";
const GIGACHAT_DEFAULT_CAPTION: &str = "Gigachat";
const USER_PASSWORD: &str = "user/password";
const CLIENT_CREDENTIALS: &str = "client_id/client_secret";
const OPENROUTER_MODELS: [&str; 4] = [
    "google/gemini-2.0-flash-001",
    "deepseek/deepseek-chat-v3-0324",
    "meta-llama/llama-3.1-8b-instruct",
    "openai/gpt-3.5-turbo",
];

const INVALID_INPUT: &str = "Invalid input. Exit";

/// Position in the wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardState {
    Empty,
    ChooseProvider,
    GigachatBaseUrl,
    GigachatAuthMethod,
    GigachatUser,
    GigachatPassword,
    GigachatClientId,
    GigachatClientSecret,
    GigachatCaption,
    GigachatKey,
    OpenrouterModelId,
    OpenrouterApiKey,
    OpenrouterCaption,
    OpenrouterKey,
    FinalDefaultEntrypoint,
    Final,
}

impl WizardState {
    const ALL: [Self; 16] = [
        Self::Empty,
        Self::ChooseProvider,
        Self::GigachatBaseUrl,
        Self::GigachatAuthMethod,
        Self::GigachatUser,
        Self::GigachatPassword,
        Self::GigachatClientId,
        Self::GigachatClientSecret,
        Self::GigachatCaption,
        Self::GigachatKey,
        Self::OpenrouterModelId,
        Self::OpenrouterApiKey,
        Self::OpenrouterCaption,
        Self::OpenrouterKey,
        Self::FinalDefaultEntrypoint,
        Self::Final,
    ];

    /// Returns the state tag stored on AI messages.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Empty => "EMPTY",
            Self::ChooseProvider => "CHOOSE_PROVIDER",
            Self::GigachatBaseUrl => "GIGACHAT_BASE_URL",
            Self::GigachatAuthMethod => "GIGACHAT_AUTH_METHOD",
            Self::GigachatUser => "GIGACHAT_USER",
            Self::GigachatPassword => "GIGACHAT_PASSWORD",
            Self::GigachatClientId => "GIGACHAT_CLIENT_ID",
            Self::GigachatClientSecret => "GIGACHAT_CLIENT_SECRET",
            Self::GigachatCaption => "GIGACHAT_CAPTION",
            Self::GigachatKey => "GIGACHAT_KEY",
            Self::OpenrouterModelId => "OPENROUTER_MODEL_ID",
            Self::OpenrouterApiKey => "OPENROUTER_API_KEY",
            Self::OpenrouterCaption => "OPENROUTER_CAPTION",
            Self::OpenrouterKey => "OPENROUTER_KEY",
            Self::FinalDefaultEntrypoint => "FINAL_DEFAULT_ENTRYPOINT",
            Self::Final => "FINAL",
        }
    }

    /// Parses a state tag.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == name)
    }
}

/// The entry being edited.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
struct Draft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    provider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    auth_method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    client_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    client_secret: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    caption: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    model_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    api_key: Option<String>,
}

impl Draft {
    fn for_provider(provider: &str) -> Self {
        Self {
            provider: Some(provider.to_string()),
            ..Self::default()
        }
    }

    fn model_id(&self) -> &str {
        self.model_id.as_deref().unwrap_or_default()
    }

    /// Builds a gigachat entry; args carry exactly one credential pair.
    fn finish_gigachat(&self, key: String) -> Option<EntrypointConfig> {
        let mut args = Map::new();
        args.insert("base_url".to_string(), json!(self.base_url.as_ref()?));
        if self.auth_method.as_deref() == Some(USER_PASSWORD) {
            args.insert("user".to_string(), json!(self.user.as_ref()?));
            args.insert("password".to_string(), json!(self.password.as_ref()?));
        } else {
            args.insert("client_id".to_string(), json!(self.client_id.as_ref()?));
            args.insert("client_secret".to_string(), json!(self.client_secret.as_ref()?));
        }
        Some(EntrypointConfig {
            key,
            name: "gigachat".to_string(),
            caption: self.caption.clone()?,
            args,
        })
    }

    fn finish_openrouter(&self, key: String) -> Option<EntrypointConfig> {
        let mut args = Map::new();
        args.insert("model_id".to_string(), json!(self.model_id.as_ref()?));
        args.insert("api_key".to_string(), json!(self.api_key.as_ref()?));
        args.insert("on_error".to_string(), json!("fail"));
        Some(EntrypointConfig {
            key,
            name: "open-router".to_string(),
            caption: self.caption.clone()?,
            args,
        })
    }
}

/// Accumulator carried between turns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct WizardData {
    #[serde(default)]
    collected_entrypoints: Vec<EntrypointConfig>,
    #[serde(default)]
    current_entrypoint: Draft,
}

impl WizardData {
    fn from_extra(extra: Option<&Extra>) -> Result<Self, serde_json::Error> {
        match extra {
            Some(extra) => serde_json::from_value(JsonValue::Object(extra.clone())),
            None => Ok(Self::default()),
        }
    }

    fn to_extra(&self) -> Extra {
        match serde_json::to_value(self) {
            Ok(JsonValue::Object(map)) => map,
            _ => Extra::new(),
        }
    }

    fn has_key(&self, key: &str) -> bool {
        self.collected_entrypoints.iter().any(|e| e.key == key)
    }

    fn document(&self, default_key: &str) -> String {
        EntrypointsConfig::from_entries(self.collected_entrypoints.iter().cloned(), default_key)
            .to_pretty_json()
    }

    fn push(&mut self, entry: EntrypointConfig) {
        info!(key = %entry.key, provider = %entry.name, "Entrypoint configured");
        self.collected_entrypoints.push(entry);
        self.current_entrypoint = Draft::default();
    }
}

fn provider_menu(data: &WizardData, text: Option<&str>) -> Content {
    let text = text.map_or_else(
        || {
            format!(
                "Total configured entrypoints: {}. What would you like to configure?",
                data.collected_entrypoints.len()
            )
        },
        str::to_string,
    );
    Content::text(text).with_widget(Widget::buttons(["Gigachat", "OpenRouter", "Exit"]))
}

fn ask_base_url(text: String) -> Content {
    Content::text(text).with_widget(Widget::buttons([DEFAULT_BASE_URL]))
}

fn ask_auth_method() -> Content {
    Content::text(format!("Select authentication method ( default: {CLIENT_CREDENTIALS} )"))
        .with_widget(Widget::buttons([USER_PASSWORD, CLIENT_CREDENTIALS]))
}

fn ask_gigachat_key(text: String) -> Content {
    Content::text(text).with_widget(Widget::buttons(GIGACHAT_KEYS))
}

fn ask_model_id() -> Content {
    Content::text("Enter model ID").with_widget(Widget::buttons(OPENROUTER_MODELS))
}

fn ask_default_entrypoint(data: &WizardData, text: &str) -> Content {
    Content::text(text).with_widget(Widget::buttons(
        data.collected_entrypoints.iter().map(|e| e.key.clone()),
    ))
}

fn trim_dots(text: &str) -> &str {
    text.trim_matches(|c: char| c.is_whitespace() || c == '.')
}

fn invalid() -> (WizardState, Content) {
    (WizardState::Final, Content::text(INVALID_INPUT))
}

/// Advances the wizard by one input.
fn step(state: WizardState, data: &mut WizardData, text: &str) -> (WizardState, Content) {
    use WizardState as S;

    let draft = &mut data.current_entrypoint;
    match state {
        S::Empty => {
            *data = WizardData::default();
            (S::ChooseProvider, provider_menu(data, None))
        }
        S::ChooseProvider => match text {
            "Gigachat" => {
                *draft = Draft::for_provider("gigachat");
                let prompt = format!("Enter GigaChat BASE_URL (default: {DEFAULT_BASE_URL}):");
                (S::GigachatBaseUrl, ask_base_url(prompt))
            }
            "OpenRouter" => {
                *draft = Draft::for_provider("openrouter");
                (S::OpenrouterModelId, ask_model_id())
            }
            _ if text.eq_ignore_ascii_case("exit") => match data.collected_entrypoints.as_slice() {
                [] => (S::Final, Content::text(data.document(""))),
                [only] => {
                    let key = only.key.clone();
                    (S::Final, Content::text(data.document(&key)))
                }
                _ => (
                    S::FinalDefaultEntrypoint,
                    ask_default_entrypoint(data, "Select default entrypoint:"),
                ),
            },
            _ => (S::ChooseProvider, provider_menu(data, Some("Select again"))),
        },

        S::GigachatBaseUrl => {
            let base_url = trim_dots(text);
            if !base_url.is_empty() && !base_url.starts_with("http") {
                let prompt = format!("Unexpected base_url: {base_url}, try again");
                return (S::GigachatBaseUrl, ask_base_url(prompt));
            }
            let base_url = if base_url.is_empty() {
                DEFAULT_BASE_URL
            } else {
                base_url
            };
            draft.base_url = Some(base_url.to_string());
            (S::GigachatAuthMethod, ask_auth_method())
        }
        S::GigachatAuthMethod => {
            if text == USER_PASSWORD {
                draft.auth_method = Some(USER_PASSWORD.to_string());
                (S::GigachatUser, Content::text("Enter username:"))
            } else {
                draft.auth_method = Some(CLIENT_CREDENTIALS.to_string());
                (S::GigachatClientId, Content::text("Enter client ID:"))
            }
        }
        S::GigachatUser => {
            draft.user = Some(text.to_string());
            (S::GigachatPassword, Content::text("Enter password:"))
        }
        S::GigachatClientId => {
            draft.client_id = Some(text.to_string());
            (S::GigachatClientSecret, Content::text("Enter client secret:"))
        }
        S::GigachatPassword | S::GigachatClientSecret => {
            if state == S::GigachatPassword {
                draft.password = Some(text.to_string());
            } else {
                draft.client_secret = Some(text.to_string());
            }
            let prompt = format!("Enter display name (default: {GIGACHAT_DEFAULT_CAPTION}):");
            (
                S::GigachatCaption,
                Content::text(prompt).with_widget(Widget::buttons([GIGACHAT_DEFAULT_CAPTION])),
            )
        }
        S::GigachatCaption => {
            let caption = if text.is_empty() {
                GIGACHAT_DEFAULT_CAPTION
            } else {
                text
            };
            draft.caption = Some(caption.to_string());
            let prompt = format!("Enter entrypoint key (default: {GIGACHAT_DEFAULT_KEY}):");
            (S::GigachatKey, ask_gigachat_key(prompt))
        }
        S::GigachatKey => {
            let key = trim_dots(text);
            if !key.is_empty() && !GIGACHAT_KEYS.contains(&key) {
                let prompt = format!("Invalid gigachat key: {key}, choose again");
                return (S::GigachatKey, ask_gigachat_key(prompt));
            }
            let key = if key.is_empty() { GIGACHAT_DEFAULT_KEY } else { key };
            let Some(entry) = draft.finish_gigachat(key.to_string()) else {
                return invalid();
            };
            data.push(entry);
            (S::ChooseProvider, provider_menu(data, None))
        }

        S::OpenrouterModelId => {
            if text.is_empty() {
                return (S::OpenrouterModelId, ask_model_id());
            }
            draft.model_id = Some(text.to_string());
            (S::OpenrouterApiKey, Content::text("Enter API key:"))
        }
        S::OpenrouterApiKey => {
            if text.is_empty() {
                return (S::OpenrouterApiKey, Content::text("Enter API key:"));
            }
            draft.api_key = Some(text.to_string());
            let model_id = draft.model_id().to_string();
            (
                S::OpenrouterCaption,
                Content::text(format!("Enter display name (default: {model_id}):"))
                    .with_widget(Widget::buttons([model_id])),
            )
        }
        S::OpenrouterCaption => {
            let caption = if text.is_empty() {
                draft.model_id().to_string()
            } else {
                text.to_string()
            };
            draft.caption = Some(caption);
            let default_key = format!("open-router_{}", draft.model_id());
            (
                S::OpenrouterKey,
                Content::text(format!("Enter entrypoint key (default: {default_key}):"))
                    .with_widget(Widget::buttons([default_key])),
            )
        }
        S::OpenrouterKey => {
            let key = if text.is_empty() {
                format!("open-router_{}", draft.model_id())
            } else {
                text.to_string()
            };
            let Some(entry) = draft.finish_openrouter(key) else {
                return invalid();
            };
            data.push(entry);
            (S::ChooseProvider, provider_menu(data, None))
        }

        S::FinalDefaultEntrypoint => {
            let Some(first) = data.collected_entrypoints.first() else {
                return invalid();
            };
            let key = if text.is_empty() { first.key.as_str() } else { text };
            if !data.has_key(key) {
                let prompt = format!("Unknown entrypoint key: {key}, choose again");
                return (S::FinalDefaultEntrypoint, ask_default_entrypoint(data, &prompt));
            }
            let key = key.to_string();
            (S::Final, Content::text(data.document(&key)))
        }
        S::Final => (S::Final, Content::text("Exit")),
    }
}

/// Interactive builder of the entrypoints document.
#[derive(Debug, Clone, Copy, Default)]
pub struct EntrypointsWizard;

#[async_trait]
impl DialogTrack for EntrypointsWizard {
    fn initial_state(&self) -> &'static str {
        WizardState::Empty.as_str()
    }

    async fn generate(&self, turn: Turn<'_>) -> TrackResponse {
        let text = turn.message.text.trim();
        let mut data = match WizardData::from_extra(turn.accumulator) {
            Ok(data) => data,
            Err(e) => {
                warn!(error = %e, "Malformed wizard data");
                let (state, content) = invalid();
                return TrackResponse::new(state.as_str(), content);
            }
        };
        let (next, content) = match WizardState::from_name(turn.state) {
            Some(state) => step(state, &mut data, text),
            None => {
                warn!(state = turn.state, "Unknown wizard state");
                invalid()
            }
        };
        info!(from = turn.state, to = next.as_str(), "Wizard transition");
        TrackResponse::new(next.as_str(), content).with_extra(data.to_extra())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maestro_conversation::{AiMessage, Chat, Context, HumanMessage};

    /// Feeds inputs through the wizard the way the dispatcher does.
    struct Session {
        chat: Chat,
    }

    impl Session {
        fn new() -> Self {
            Self {
                chat: Chat::new(Context::new("web", "u1", "s1", "EntrypointsWizard")),
            }
        }

        async fn send(&mut self, text: &str) -> TrackResponse {
            let message = HumanMessage::new(text);
            self.chat.add_message(message.clone());
            let response = {
                let turn = Turn {
                    state: self.chat.last_state("EMPTY"),
                    accumulator: self.chat.last_ai_message().and_then(|m| m.extra.as_ref()),
                    message: &message,
                    chat: &self.chat,
                };
                EntrypointsWizard.generate(turn).await
            };
            self.chat.add_message(response.clone().into_message());
            response
        }

        async fn run(&mut self, inputs: &[&str]) -> Vec<String> {
            let mut states = Vec::new();
            for input in inputs {
                states.push(self.send(input).await.state);
            }
            states
        }
    }

    fn document(response: &TrackResponse) -> JsonValue {
        serde_json::from_str(&response.content.text).expect("json document")
    }

    #[tokio::test]
    async fn gigachat_user_password_path() {
        let mut session = Session::new();
        let states = session
            .run(&["hi", "Gigachat", "", "user/password", "alice", "secret", ""])
            .await;
        assert_eq!(
            states,
            vec![
                "CHOOSE_PROVIDER",
                "GIGACHAT_BASE_URL",
                "GIGACHAT_AUTH_METHOD",
                "GIGACHAT_USER",
                "GIGACHAT_PASSWORD",
                "GIGACHAT_CAPTION",
                "GIGACHAT_KEY",
            ]
        );

        let response = session.send("").await;
        assert_eq!(response.state, "CHOOSE_PROVIDER");
        assert!(response.content.text.contains("Total configured entrypoints: 1"));

        let response = session.send("exit").await;
        assert_eq!(response.state, "FINAL");
        let document = document(&response);
        assert_eq!(document["default_entrypoint_key"], "giga-max-2");
        let entry = &document["entrypoints"]["giga-max-2"];
        assert_eq!(entry["name"], "gigachat");
        assert_eq!(entry["caption"], "Gigachat");
        assert_eq!(entry["args"]["base_url"], DEFAULT_BASE_URL);
        assert_eq!(entry["args"]["user"], "alice");
        assert!(entry["args"].get("client_id").is_none());
    }

    #[tokio::test]
    async fn gigachat_client_credentials_with_custom_values() {
        let mut session = Session::new();
        session
            .run(&[
                "",
                "Gigachat",
                "https://example.test/api/v1.",
                "client_id/client_secret",
                "id-1",
                "secret-1",
                "Giga Max",
            ])
            .await;

        let response = session.send("giga-large").await;
        assert_eq!(response.state, "GIGACHAT_KEY");
        assert!(response.content.text.starts_with("Invalid gigachat key"));

        session.send("giga-max").await;
        let document = document(&session.send("Exit").await);
        let args = &document["entrypoints"]["giga-max"]["args"];
        assert_eq!(args["base_url"], "https://example.test/api/v1");
        assert_eq!(args["client_id"], "id-1");
        assert_eq!(args["client_secret"], "secret-1");
        assert!(args.get("user").is_none());
        assert_eq!(document["entrypoints"]["giga-max"]["caption"], "Giga Max");
    }

    #[tokio::test]
    async fn base_url_must_look_like_http() {
        let mut session = Session::new();
        session.run(&["", "Gigachat"]).await;
        let response = session.send("ftp://nope").await;
        assert_eq!(response.state, "GIGACHAT_BASE_URL");
        assert!(response.content.text.contains("Unexpected base_url"));
    }

    #[tokio::test]
    async fn invalid_choice_keeps_menu() {
        let mut session = Session::new();
        session.send("").await;
        let response = session.send("Anthropic").await;
        assert_eq!(response.state, "CHOOSE_PROVIDER");
        assert_eq!(response.content.text, "Select again");
        assert_eq!(
            response.content.widget.expect("widget").buttons,
            vec!["Gigachat", "OpenRouter", "Exit"]
        );
    }

    #[tokio::test]
    async fn exit_without_entries_emits_empty_document() {
        let mut session = Session::new();
        session.send("").await;
        let response = session.send("exit").await;
        assert_eq!(response.state, "FINAL");
        assert_eq!(
            document(&response),
            json!({"entrypoints": {}, "default_entrypoint_key": "", "warmup": false})
        );

        let response = session.send("anything").await;
        assert_eq!(response.state, "FINAL");
        assert_eq!(response.content.text, "Exit");
    }

    #[tokio::test]
    async fn openrouter_defaults() {
        let mut session = Session::new();
        let states = session
            .run(&["", "OpenRouter", "", "openai/gpt-3.5-turbo", "", "sk-1", "", ""])
            .await;
        assert_eq!(
            states,
            vec![
                "CHOOSE_PROVIDER",
                "OPENROUTER_MODEL_ID",
                "OPENROUTER_MODEL_ID",
                "OPENROUTER_API_KEY",
                "OPENROUTER_API_KEY",
                "OPENROUTER_CAPTION",
                "OPENROUTER_KEY",
                "CHOOSE_PROVIDER",
            ]
        );

        let document = document(&session.send("exit").await);
        let key = "open-router_openai/gpt-3.5-turbo";
        assert_eq!(document["default_entrypoint_key"], key);
        let entry = &document["entrypoints"][key];
        assert_eq!(entry["name"], "open-router");
        assert_eq!(entry["caption"], "openai/gpt-3.5-turbo");
        assert_eq!(
            entry["args"],
            json!({"model_id": "openai/gpt-3.5-turbo", "api_key": "sk-1", "on_error": "fail"})
        );
    }

    #[tokio::test]
    async fn several_entries_ask_for_default() {
        let mut session = Session::new();
        session
            .run(&["", "Gigachat", "", "user/password", "u", "p", "", "giga"])
            .await;
        session
            .run(&["OpenRouter", "m/x", "key", "X", "or-x"])
            .await;

        let response = session.send("exit").await;
        assert_eq!(response.state, "FINAL_DEFAULT_ENTRYPOINT");
        assert_eq!(
            response.content.widget.expect("widget").buttons,
            vec!["giga", "or-x"]
        );

        let response = session.send("missing").await;
        assert_eq!(response.state, "FINAL_DEFAULT_ENTRYPOINT");

        let document = document(&session.send("").await);
        assert_eq!(document["default_entrypoint_key"], "giga");
        assert_eq!(document["entrypoints"].as_object().map(Map::len), Some(2));
    }

    #[tokio::test]
    async fn explicit_default_choice() {
        let mut session = Session::new();
        session
            .run(&["", "Gigachat", "", "", "id", "secret", "", "", "OpenRouter", "m", "k", "", "or"])
            .await;
        session.send("exit").await;
        let document = document(&session.send("or").await);
        let parsed: EntrypointsConfig =
            serde_json::from_value(document).expect("valid entrypoints document");
        assert_eq!(parsed.default_entrypoint_key, "or");
        assert!(parsed.validate().is_ok());
    }

    #[tokio::test]
    async fn unknown_state_falls_back_to_final() {
        let mut chat = Chat::new(Context::new("web", "u1", "s1", "EntrypointsWizard"));
        chat.add_message(AiMessage::new("?", "SOMEWHERE_ELSE"));
        let message = HumanMessage::new("hi");
        chat.add_message(message.clone());

        let response = EntrypointsWizard
            .generate(Turn {
                state: "SOMEWHERE_ELSE",
                accumulator: None,
                message: &message,
                chat: &chat,
            })
            .await;
        assert_eq!(response.state, "FINAL");
        assert_eq!(response.content.text, INVALID_INPUT);
    }

    #[tokio::test]
    async fn malformed_accumulator_falls_back_to_final() {
        let chat = Chat::new(Context::new("web", "u1", "s1", "EntrypointsWizard"));
        let message = HumanMessage::new("exit");
        let mut extra = Extra::new();
        extra.insert("collected_entrypoints".to_string(), json!("not a list"));

        let response = EntrypointsWizard
            .generate(Turn {
                state: "CHOOSE_PROVIDER",
                accumulator: Some(&extra),
                message: &message,
                chat: &chat,
            })
            .await;
        assert_eq!(response.state, "FINAL");
        assert_eq!(response.content.text, INVALID_INPUT);
    }

    #[tokio::test]
    async fn sessions_do_not_share_entries() {
        let mut first = Session::new();
        let mut second = Session::new();
        first
            .run(&["", "Gigachat", "", "", "id", "secret", "", ""])
            .await;
        second.send("").await;

        let document = document(&second.send("exit").await);
        assert_eq!(document["entrypoints"], json!({}));
    }

    #[test]
    fn state_tags_round_trip() {
        for state in WizardState::ALL {
            assert_eq!(WizardState::from_name(state.as_str()), Some(state));
        }
    }
}
