//! HTTP surface.
//!
//! Chat routes require a `client-id` header. Listing responses keep the
//! PascalCase field names existing clients read. `POST /api/v0/send` is the
//! older single-call form that carries the full context in the body and
//! creates the conversation on first contact.

use crate::error::{ApiError, RouterError};
use crate::router::TurnRouter;
use axum::extract::{FromRequestParts, Path, Query, State};
use axum::http::request::Parts;
use axum::routing::{get, post};
use axum::{Json, Router};
use maestro_ai::LlmApi;
use maestro_conversation::{AiMessage, ChatPreview, Context, HumanMessage, Message};
use maestro_core::ChatId;
use maestro_tracks::{DomainInfo, TrackInfo};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

const CLIENT_ID_HEADER: &str = "client-id";

/// Shared application state.
pub struct AppState {
    pub router: TurnRouter,
    pub llm: Arc<dyn LlmApi>,
}

impl AppState {
    #[must_use]
    pub fn new(router: TurnRouter, llm: Arc<dyn LlmApi>) -> Self {
        Self { router, llm }
    }
}

/// Builds the application router.
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/v3/chats", post(create_chat))
        .route(
            "/api/v3/chats/{chat_id}",
            get(get_chat).post(send).delete(delete_chat),
        )
        .route("/api/v2/chats", get(chat_previews))
        .route("/api/v0/send", post(send_legacy))
        .route("/api/v3/info/domains", get(domains))
        .route("/api/v3/info/tracks", get(tracks))
        .route("/api/v3/info/entrypoints", get(entrypoints))
        .route("/api/health/readiness", get(health))
        .route("/api/health/liveness", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// The calling client, from the `client-id` header.
pub struct ClientId(pub String);

impl<S> FromRequestParts<S> for ClientId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(CLIENT_ID_HEADER)
            .ok_or_else(|| RouterError::malformed("missing client-id header"))?
            .to_str()
            .map_err(|_| RouterError::malformed("client-id header is not valid text"))?;
        check_client(value)?;
        Ok(Self(value.to_string()))
    }
}

fn check_client(client_id: &str) -> Result<(), ApiError> {
    // '_' separates the fields of a chat id
    if client_id.is_empty() || client_id.contains('_') {
        return Err(RouterError::WrongClient {
            client_id: client_id.to_string(),
        }
        .into());
    }
    Ok(())
}

/// Takes the only message of a request, which must come from the user.
fn single_human(mut messages: Vec<Message>) -> Result<HumanMessage, ApiError> {
    if messages.len() != 1 {
        return Err(RouterError::malformed(format!(
            "One message expected, found: {}",
            messages.len()
        ))
        .into());
    }
    match messages.pop() {
        Some(Message::Human(message)) => Ok(message),
        _ => Err(RouterError::malformed("Expected only human message").into()),
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateResponse {
    pub chat_id: ChatId,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub chat_id: ChatId,
    pub messages: Vec<Message>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SendRequest {
    pub messages: Vec<Message>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SendResponse {
    pub chat_id: ChatId,
    pub response_messages: Vec<AiMessage>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LegacySendRequest {
    pub context: Context,
    pub messages: Vec<Message>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LegacySendResponse {
    pub context: Context,
    pub messages: Vec<Message>,
    pub response_messages: Vec<AiMessage>,
}

#[derive(Debug, Deserialize)]
pub struct PreviewsQuery {
    pub user_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PreviewsResponse {
    pub chat_previews: Vec<ChatPreview>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DomainsResponse {
    pub domains: Vec<DomainInfo>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TracksResponse {
    pub tracks: Vec<TrackInfo>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct EntrypointItem {
    pub entrypoint_key: String,
    pub caption: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct EntrypointsResponse {
    pub entrypoints: Vec<EntrypointItem>,
    pub default_entrypoint_key: String,
}

fn parse_chat_id(raw: &str) -> Result<ChatId, ApiError> {
    raw.parse()
        .map_err(|_| RouterError::malformed(format!("invalid chat id '{raw}'")).into())
}

async fn create_chat(
    State(state): State<Arc<AppState>>,
    ClientId(client_id): ClientId,
    Json(mut context): Json<Context>,
) -> Result<Json<CreateResponse>, ApiError> {
    if context.client_id.is_empty() {
        context.client_id = client_id;
    } else if context.client_id != client_id {
        return Err(RouterError::malformed(format!(
            "client-id from context ({}) and header ({client_id}) are not aligned",
            context.client_id
        ))
        .into());
    }
    let chat_id = state.router.create(context).await?;
    Ok(Json(CreateResponse { chat_id }))
}

async fn get_chat(
    State(state): State<Arc<AppState>>,
    _client: ClientId,
    Path(chat_id): Path<String>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let chat_id = parse_chat_id(&chat_id)?;
    let chat = state.router.get(&chat_id).await?;
    Ok(Json(HistoryResponse {
        chat_id,
        messages: chat.messages,
    }))
}

async fn send(
    State(state): State<Arc<AppState>>,
    _client: ClientId,
    Path(chat_id): Path<String>,
    Json(request): Json<SendRequest>,
) -> Result<Json<SendResponse>, ApiError> {
    let chat_id = parse_chat_id(&chat_id)?;
    let message = single_human(request.messages)?;
    let outcome = state.router.send(&chat_id, message).await?;
    Ok(Json(SendResponse {
        chat_id: outcome.chat_id,
        response_messages: outcome.response_messages,
    }))
}

async fn send_legacy(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LegacySendRequest>,
) -> Result<Json<LegacySendResponse>, ApiError> {
    check_client(&request.context.client_id)?;
    let message = single_human(request.messages)?;
    let outcome = state
        .router
        .send_by_context(&request.context, message.clone())
        .await?;
    Ok(Json(LegacySendResponse {
        context: request.context,
        messages: vec![Message::Human(message)],
        response_messages: outcome.response_messages,
    }))
}

async fn delete_chat(
    State(state): State<Arc<AppState>>,
    _client: ClientId,
    Path(chat_id): Path<String>,
) -> Result<Json<()>, ApiError> {
    let chat_id = parse_chat_id(&chat_id)?;
    state.router.delete(&chat_id).await?;
    Ok(Json(()))
}

async fn chat_previews(
    State(state): State<Arc<AppState>>,
    ClientId(client_id): ClientId,
    Query(query): Query<PreviewsQuery>,
) -> Result<Json<PreviewsResponse>, ApiError> {
    let chat_previews = state
        .router
        .list_previews(&client_id, &query.user_id)
        .await?;
    Ok(Json(PreviewsResponse { chat_previews }))
}

async fn domains(State(state): State<Arc<AppState>>) -> Json<DomainsResponse> {
    Json(DomainsResponse {
        domains: state.router.dispatcher().domains(),
    })
}

async fn tracks(State(state): State<Arc<AppState>>) -> Json<TracksResponse> {
    Json(TracksResponse {
        tracks: state.router.dispatcher().tracks(),
    })
}

async fn entrypoints(State(state): State<Arc<AppState>>) -> Json<EntrypointsResponse> {
    let info = state.llm.get_entrypoints_config();
    Json(EntrypointsResponse {
        entrypoints: info
            .entrypoints
            .into_iter()
            .map(|e| EntrypointItem {
                entrypoint_key: e.entrypoint_key,
                caption: e.caption,
            })
            .collect(),
        default_entrypoint_key: info.default_entrypoint_key,
    })
}

async fn health() -> Json<bool> {
    Json(true)
}
