//! Error types for the gateway.
//!
//! [`RouterError`] is what the turn router reports; [`ApiError`] maps it to
//! an HTTP response. [`StartupError`] aborts `main`. Response bodies never
//! carry storage paths or provider details, those are only logged.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use maestro_conversation::StoreError;
use maestro_tracks::DispatchError;
use rootcause::Report;
use serde_json::json;
use std::fmt;

/// Errors from turn router operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouterError {
    /// No conversation is persisted under this id.
    NotFound { chat_id: String },
    /// The request cannot be processed as given.
    Malformed { reason: String },
    /// The `client-id` header is not an acceptable client id.
    WrongClient { client_id: String },
    /// Persisting or loading a transcript failed.
    Storage { reason: String },
}

impl fmt::Display for RouterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { chat_id } => write!(f, "chat '{chat_id}' not found"),
            Self::Malformed { reason } => write!(f, "malformed request: {reason}"),
            Self::WrongClient { client_id } => write!(f, "wrong client id '{client_id}'"),
            Self::Storage { reason } => write!(f, "chat storage error: {reason}"),
        }
    }
}

impl std::error::Error for RouterError {}

impl RouterError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::Malformed {
            reason: reason.into(),
        }
    }

    /// Classifies a session store failure.
    pub(crate) fn from_store(report: &Report<StoreError>) -> Self {
        match report.current_context() {
            StoreError::NotFound { chat_id } => Self::NotFound {
                chat_id: chat_id.to_string(),
            },
            StoreError::InvalidId { reason, .. } => Self::malformed(reason.clone()),
            StoreError::Malformed { .. } | StoreError::Io { .. } => Self::Storage {
                reason: report.to_string(),
            },
        }
    }

    pub(crate) fn from_dispatch(report: &Report<DispatchError>) -> Self {
        match report.current_context() {
            DispatchError::MissingHumanMessage { .. } => Self::malformed(report.to_string()),
        }
    }
}

/// Errors that stop the gateway from starting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartupError {
    /// Environment configuration could not be parsed.
    Config { reason: String },
    /// A storage directory could not be opened.
    Storage { path: String, reason: String },
    /// The entrypoints document is unreadable or inconsistent.
    Entrypoints { reason: String },
    /// The listener could not be bound or stopped serving.
    Serve { address: String, reason: String },
}

impl fmt::Display for StartupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config { reason } => write!(f, "failed to load configuration: {reason}"),
            Self::Storage { path, reason } => {
                write!(f, "failed to open storage at {path}: {reason}")
            }
            Self::Entrypoints { reason } => write!(f, "failed to load entrypoints: {reason}"),
            Self::Serve { address, reason } => write!(f, "server error on {address}: {reason}"),
        }
    }
}

impl std::error::Error for StartupError {}

/// HTTP-facing wrapper around a router error report.
#[derive(Debug)]
pub struct ApiError(pub Report<RouterError>);

impl From<Report<RouterError>> for ApiError {
    fn from(report: Report<RouterError>) -> Self {
        Self(report)
    }
}

impl From<RouterError> for ApiError {
    fn from(err: RouterError) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self.0.current_context() {
            RouterError::NotFound { chat_id } => {
                (StatusCode::NOT_FOUND, format!("Chat not found: {chat_id}"))
            }
            RouterError::Malformed { reason } => {
                tracing::warn!(reason = %reason, "Malformed request");
                (StatusCode::UNPROCESSABLE_ENTITY, reason.clone())
            }
            RouterError::WrongClient { .. } => {
                (StatusCode::UNAUTHORIZED, "Wrong client_id.".to_string())
            }
            RouterError::Storage { .. } => {
                tracing::error!(error = %self.0, "Chat storage failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(json!({ "detail": [{ "error": message }] }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maestro_core::ChatId;

    #[test]
    fn store_errors_are_classified() {
        let not_found: Report<StoreError> = StoreError::NotFound {
            chat_id: ChatId::new_unchecked("client_a_user_b_session_c"),
        }
        .into();
        assert_eq!(
            RouterError::from_store(&not_found),
            RouterError::NotFound {
                chat_id: "client_a_user_b_session_c".to_string()
            }
        );

        let io: Report<StoreError> = StoreError::Io {
            path: "/var/chats/x.json".to_string(),
            reason: "disk full".to_string(),
        }
        .into();
        assert!(matches!(
            RouterError::from_store(&io),
            RouterError::Storage { .. }
        ));
    }

    #[test]
    fn status_codes() {
        let cases = [
            (
                RouterError::NotFound {
                    chat_id: "x".to_string(),
                },
                StatusCode::NOT_FOUND,
            ),
            (RouterError::malformed("bad"), StatusCode::UNPROCESSABLE_ENTITY),
            (
                RouterError::WrongClient {
                    client_id: "a_b".to_string(),
                },
                StatusCode::UNAUTHORIZED,
            ),
            (
                RouterError::Storage {
                    reason: "/var/chats/x.json: denied".to_string(),
                },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).into_response().status(), status);
        }
    }
}
