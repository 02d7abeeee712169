//! Reflective responder: describes the message and attachment back.

use crate::track::{DialogTrack, TrackResponse, Turn};
use async_trait::async_trait;
use maestro_conversation::{Content, ResourceRef};
use maestro_core::FileStorage;
use std::sync::Arc;

/// State after every echo.
pub const DUMMY: &str = "dummy";
/// Terminal state after `exit`.
pub const FINAL: &str = "final";

/// Echoes the text and the attached file name.
pub struct Dummy {
    files: Arc<dyn FileStorage>,
}

impl Dummy {
    #[must_use]
    pub fn new(files: Arc<dyn FileStorage>) -> Self {
        Self { files }
    }
}

#[async_trait]
impl DialogTrack for Dummy {
    async fn generate(&self, turn: Turn<'_>) -> TrackResponse {
        let text = turn.message.text.as_str();
        if text.eq_ignore_ascii_case("exit") {
            return TrackResponse::new(FINAL, "Exit!");
        }

        let text_info = if text.is_empty() {
            "Сообщение: нет".to_string()
        } else {
            format!("Сообщение: '{text}'")
        };

        let Some(resource_id) = &turn.message.resource_id else {
            return TrackResponse::new(DUMMY, format!("{text_info}, файл: нет"));
        };
        let name = self
            .files
            .fname(resource_id)
            .await
            .unwrap_or_else(|| resource_id.to_string());
        let content = Content::text(format!("{text_info}, файл: '{name}'.")).with_resource(
            ResourceRef {
                resource_id: resource_id.clone(),
                resource_name: format!("response-{name}"),
            },
        );
        TrackResponse::new(DUMMY, content)
    }
}
