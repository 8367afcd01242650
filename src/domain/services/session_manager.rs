#[cfg(test)]
#[path = "session_manager_test.rs"]
mod tests;

use super::HistoryStore;
use crate::domain::models::Backend;
use crate::domain::models::Direction;
use crate::domain::models::History;
use crate::domain::models::HistoryEntry;
use crate::domain::models::SessionState;
use crate::domain::models::TranslationRequest;
use crate::domain::models::TranslationResponse;

/// Shown in place of the translation whenever the provider fails.
pub const TRANSLATION_ERROR_MESSAGE: &str =
    "خطا در برقراری ارتباط با هوش مصنوعی. لطفا مجددا تلاش کنید.";

/// Owns the session state and the history, and is the only thing allowed to
/// change either. Every history change is written to the store before the
/// mutating call returns.
pub struct SessionManager {
    state: SessionState,
    history: History,
    store: HistoryStore,
    generation: u64,
}

impl SessionManager {
    pub async fn new(store: HistoryStore, direction: Direction) -> SessionManager {
        let history = store.load().await;
        tracing::debug!(entries = history.len(), "Loaded history");

        return SessionManager {
            state: SessionState::new(direction),
            history,
            store,
            generation: 0,
        };
    }

    pub fn state(&self) -> &SessionState {
        return &self.state;
    }

    pub fn history(&self) -> &History {
        return &self.history;
    }

    pub fn set_source_text(&mut self, text: &str) {
        self.state.source_text = text.to_string();
        self.generation += 1;
    }

    /// First half of a translation. Returns the request to run, or `None` when
    /// there is nothing to translate or a translation is already in flight.
    pub fn begin_translation(&mut self) -> Option<TranslationRequest> {
        if self.state.source_text.trim().is_empty() || self.state.is_loading {
            return None;
        }

        self.state.is_loading = true;
        self.state.error = None;

        return Some(TranslationRequest {
            generation: self.generation,
            text: self.state.source_text.to_string(),
            direction: self.state.direction,
        });
    }

    /// Whether `request` was started from the current source text and direction.
    pub fn is_current(&self, request: &TranslationRequest) -> bool {
        return request.generation == self.generation;
    }

    /// Second half of a translation. Responses for a request that has since
    /// been superseded by an edit, swap, reset or history selection only end
    /// the loading state.
    pub async fn complete_translation(&mut self, response: TranslationResponse) {
        self.state.is_loading = false;

        let request = response.request;
        if !self.is_current(&request) {
            tracing::debug!(
                request_generation = request.generation,
                generation = self.generation,
                "Discarding stale translation"
            );
            return;
        }

        match response.result {
            Ok(text) => {
                self.state.translated_text = text.to_string();
                self.history.prepend(HistoryEntry::new(
                    &request.text,
                    &text,
                    request.direction,
                ));
                self.persist().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "Translation failed");
                self.state.error = Some(TRANSLATION_ERROR_MESSAGE.to_string());
            }
        }
    }

    /// Runs a whole translation against `backend`.
    pub async fn submit_translation(&mut self, backend: &dyn Backend) {
        let request = match self.begin_translation() {
            Some(request) => request,
            None => return,
        };

        let result = backend
            .translate(&request.text, request.direction.target())
            .await;

        self.complete_translation(TranslationResponse { request, result })
            .await;
    }

    /// Flips the direction and exchanges source and translated text, so the
    /// last output can be refined as a new input.
    pub fn swap_direction(&mut self) {
        self.state.direction = self.state.direction.toggle();
        std::mem::swap(
            &mut self.state.source_text,
            &mut self.state.translated_text,
        );
        self.state.error = None;
        self.generation += 1;
    }

    pub fn select_history_entry(&mut self, entry: &HistoryEntry) {
        self.state.source_text = entry.source_text.to_string();
        self.state.translated_text = entry.translated_text.to_string();
        self.state.direction = entry.direction;
        self.state.error = None;
        self.generation += 1;
    }

    /// Callers are expected to have confirmed this with the user.
    pub async fn clear_history(&mut self) {
        self.history.clear();
        self.persist().await;
    }

    pub fn reset_input(&mut self) {
        self.state.source_text = "".to_string();
        self.state.translated_text = "".to_string();
        self.state.error = None;
        self.generation += 1;
    }

    async fn persist(&self) {
        if let Err(err) = self.store.save(&self.history).await {
            tracing::warn!(error = ?err, "Failed to save history");
        }
    }
}
