//! Reformats a free-form recipe into stages with checkboxes.

use crate::track::{DialogTrack, TrackResponse, Turn};
use async_trait::async_trait;
use maestro_ai::{LlmApi, LlmCallProps, LlmMessage, Request};
use std::sync::Arc;
use tracing::error;

pub const START: &str = "START";
pub const FINAL: &str = "FINAL";

const FAILURE: &str = "Не удалось обработать рецепт, попробуйте позже.";

const SYSTEM_PROMPT: &str = "Тебе пользователь на вход пришлёт рецепт. Твоя задача - преобразовать этот рецепт в формат
- заголовок
- этап готовки
- в каждом этапе перечислены шаги

Дополнительные правила:
- если шаг совпадает с нужным ингридиентом, то в шаге нужно добавить checkbox `[ ]`
- если ингридиент повторяется, то чекбокс не нужен
- этапы отформатируй в формате `📍 *Название этапа*`
- сохраняй все количества, температуры и временные параметры
===
Рецепт борща
📍 *Бульон*
- [ ] ~800 г мяса и несколько костей
- [ ] луковица
- [ ] соль
- [ ] лавровый лист
- варить 3..5 часов, пенку снимать

📍 *Обжарка*
- [ ] 2 луковицы
- [ ] 2.5 морковки
- [ ] 2 средние свеклы
- [ ] чеснок

📍 *Сборка*
- обжарка, бульон (мясо порвать)
- [ ] капуста по вкусу
- [ ] картошка по вкусу
- [ ] чёрный перец
- [ ] хмели-сунели
- [ ] уксус (2..3 столовые ложки) или выжать пол-лимона
- [ ] томатная паста
===
";

/// Single-turn recipe formatter.
pub struct RecipesSummarizer {
    llm: Arc<dyn LlmApi>,
}

impl RecipesSummarizer {
    #[must_use]
    pub fn new(llm: Arc<dyn LlmApi>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl DialogTrack for RecipesSummarizer {
    async fn generate(&self, turn: Turn<'_>) -> TrackResponse {
        let request = Request::Messages(vec![
            LlmMessage::system(SYSTEM_PROMPT),
            LlmMessage::user(turn.message.text.clone()),
        ]);
        match self.llm.get_response(request, &LlmCallProps::default()).await {
            Ok(text) => TrackResponse::new(START, text),
            Err(e) => {
                error!(error = %e, "Failed to summarize recipe");
                TrackResponse::new(FINAL, FAILURE)
            }
        }
    }
}
