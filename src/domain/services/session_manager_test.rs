use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use anyhow::Result;
use async_trait::async_trait;
use tempfile::TempDir;

use super::SessionManager;
use super::TRANSLATION_ERROR_MESSAGE;
use crate::domain::models::Backend;
use crate::domain::models::BackendName;
use crate::domain::models::Direction;
use crate::domain::models::HistoryEntry;
use crate::domain::models::ProviderError;
use crate::domain::models::TranslationPrompt;
use crate::domain::models::TranslationResponse;
use crate::domain::models::HISTORY_CAPACITY;
use crate::domain::services::HistoryStore;

struct FixedBackend {
    reply: Option<String>,
    calls: AtomicUsize,
}

impl FixedBackend {
    fn replying(text: &str) -> FixedBackend {
        return FixedBackend {
            reply: Some(text.to_string()),
            calls: AtomicUsize::new(0),
        };
    }

    fn failing() -> FixedBackend {
        return FixedBackend {
            reply: None,
            calls: AtomicUsize::new(0),
        };
    }

    fn calls(&self) -> usize {
        return self.calls.load(Ordering::SeqCst);
    }
}

#[async_trait]
impl Backend for FixedBackend {
    fn name(&self) -> BackendName {
        return BackendName::Gemini;
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        return Ok(());
    }

    async fn get_translation(&self, _prompt: &TranslationPrompt) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(reply) = &self.reply {
            return Ok(reply.to_string());
        }

        return Err(ProviderError::Status {
            backend: BackendName::Gemini,
            status: 500,
        });
    }
}

async fn new_manager() -> Result<(SessionManager, TempDir)> {
    let dir = tempfile::tempdir()?;
    let store = HistoryStore::new(dir.path().join("history.json"));
    let manager = SessionManager::new(store, Direction::EnglishToPersian).await;

    return Ok((manager, dir));
}

async fn stored_history_len(dir: &TempDir) -> usize {
    return HistoryStore::new(dir.path().join("history.json"))
        .load()
        .await
        .len();
}

mod submit_translation {
    use super::*;

    #[tokio::test]
    async fn it_translates_and_records_history() -> Result<()> {
        let (mut manager, dir) = new_manager().await?;
        let backend = FixedBackend::replying("سلام دنیا");

        manager.set_source_text("Hello world");
        manager.submit_translation(&backend).await;

        let state = manager.state();
        assert_eq!(state.translated_text, "سلام دنیا");
        assert!(!state.is_loading);
        assert!(state.error.is_none());

        assert_eq!(manager.history().len(), 1);
        let entry = &manager.history().entries()[0];
        assert_eq!(entry.source_text, "Hello world");
        assert_eq!(entry.translated_text, "سلام دنیا");
        assert_eq!(entry.direction, Direction::EnglishToPersian);

        assert_eq!(stored_history_len(&dir).await, 1);
        assert_eq!(backend.calls(), 1);

        return Ok(());
    }

    #[tokio::test]
    async fn it_ignores_empty_and_blank_input() -> Result<()> {
        let (mut manager, dir) = new_manager().await?;
        let backend = FixedBackend::replying("x");

        for text in ["", "   ", "\n\t"] {
            manager.set_source_text(text);
            manager.submit_translation(&backend).await;

            assert!(!manager.state().is_loading);
            assert_eq!(manager.state().translated_text, "");
            assert!(manager.history().is_empty());
        }

        assert_eq!(backend.calls(), 0);
        assert_eq!(stored_history_len(&dir).await, 0);

        return Ok(());
    }

    #[tokio::test]
    async fn it_keeps_previous_output_on_failure() -> Result<()> {
        let (mut manager, _dir) = new_manager().await?;

        manager.set_source_text("Hello world");
        manager
            .submit_translation(&FixedBackend::replying("سلام دنیا"))
            .await;

        manager.set_source_text("Goodbye");
        manager.submit_translation(&FixedBackend::failing()).await;

        let state = manager.state();
        assert!(!state.is_loading);
        assert_eq!(state.error.as_deref(), Some(TRANSLATION_ERROR_MESSAGE));
        assert_eq!(state.translated_text, "سلام دنیا");
        assert_eq!(manager.history().len(), 1);

        return Ok(());
    }

    #[tokio::test]
    async fn it_clears_previous_error_on_success() -> Result<()> {
        let (mut manager, _dir) = new_manager().await?;

        manager.set_source_text("Hello");
        manager.submit_translation(&FixedBackend::failing()).await;
        assert!(manager.state().error.is_some());

        manager.submit_translation(&FixedBackend::replying("سلام")).await;
        assert!(manager.state().error.is_none());
        assert_eq!(manager.state().translated_text, "سلام");

        return Ok(());
    }

    #[tokio::test]
    async fn it_never_exceeds_history_capacity() -> Result<()> {
        let (mut manager, dir) = new_manager().await?;
        let backend = FixedBackend::replying("ok");

        for idx in 0..=HISTORY_CAPACITY {
            manager.set_source_text(&format!("text {idx}"));
            manager.submit_translation(&backend).await;
        }

        assert_eq!(manager.history().len(), HISTORY_CAPACITY);
        assert_eq!(
            manager.history().entries()[0].source_text,
            format!("text {HISTORY_CAPACITY}")
        );
        assert_eq!(
            manager.history().entries().last().unwrap().source_text,
            "text 1"
        );
        assert_eq!(stored_history_len(&dir).await, HISTORY_CAPACITY);

        return Ok(());
    }

    #[tokio::test]
    async fn it_records_translation_direction() -> Result<()> {
        let (mut manager, _dir) = new_manager().await?;

        manager.set_source_text("ممنون");
        manager.swap_direction();
        manager.set_source_text("ممنون");
        manager
            .submit_translation(&FixedBackend::replying("Thanks"))
            .await;

        assert_eq!(
            manager.history().entries()[0].direction,
            Direction::PersianToEnglish
        );

        return Ok(());
    }
}

mod in_flight {
    use super::*;

    #[tokio::test]
    async fn it_rejects_a_second_request_while_loading() -> Result<()> {
        let (mut manager, _dir) = new_manager().await?;

        manager.set_source_text("Hello world");
        let first = manager.begin_translation();
        assert!(first.is_some());
        assert!(manager.state().is_loading);

        assert!(manager.begin_translation().is_none());

        let backend = FixedBackend::replying("x");
        manager.submit_translation(&backend).await;
        assert_eq!(backend.calls(), 0);
        assert!(manager.state().is_loading);
        assert!(manager.history().is_empty());

        return Ok(());
    }

    #[tokio::test]
    async fn it_clears_error_when_starting() -> Result<()> {
        let (mut manager, _dir) = new_manager().await?;

        manager.set_source_text("Hello");
        manager.submit_translation(&FixedBackend::failing()).await;
        assert!(manager.state().error.is_some());

        let request = manager.begin_translation().unwrap();
        assert!(manager.state().error.is_none());
        assert_eq!(request.text, "Hello");
        assert_eq!(request.direction, Direction::EnglishToPersian);

        return Ok(());
    }

    #[tokio::test]
    async fn it_applies_a_current_response() -> Result<()> {
        let (mut manager, _dir) = new_manager().await?;

        manager.set_source_text("Hello world");
        let request = manager.begin_translation().unwrap();
        manager
            .complete_translation(TranslationResponse {
                request,
                result: Ok("سلام دنیا".to_string()),
            })
            .await;

        assert!(!manager.state().is_loading);
        assert_eq!(manager.state().translated_text, "سلام دنیا");
        assert_eq!(manager.history().len(), 1);

        return Ok(());
    }

    #[tokio::test]
    async fn it_discards_a_response_superseded_by_swap() -> Result<()> {
        let (mut manager, dir) = new_manager().await?;

        manager.set_source_text("Hello world");
        let request = manager.begin_translation().unwrap();
        manager.swap_direction();

        manager
            .complete_translation(TranslationResponse {
                request,
                result: Ok("سلام دنیا".to_string()),
            })
            .await;

        let state = manager.state();
        assert!(!state.is_loading);
        assert_eq!(state.translated_text, "Hello world");
        assert_eq!(state.source_text, "");
        assert_eq!(state.direction, Direction::PersianToEnglish);
        assert!(manager.history().is_empty());
        assert_eq!(stored_history_len(&dir).await, 0);

        return Ok(());
    }

    #[tokio::test]
    async fn it_discards_a_failure_superseded_by_edit() -> Result<()> {
        let (mut manager, _dir) = new_manager().await?;

        manager.set_source_text("Hello world");
        let request = manager.begin_translation().unwrap();
        manager.set_source_text("Hello there");

        manager
            .complete_translation(TranslationResponse {
                request,
                result: Err(ProviderError::Status {
                    backend: BackendName::OpenAI,
                    status: 401,
                }),
            })
            .await;

        assert!(!manager.state().is_loading);
        assert!(manager.state().error.is_none());
        assert_eq!(manager.state().source_text, "Hello there");

        return Ok(());
    }
}

mod swap_direction {
    use super::*;

    #[tokio::test]
    async fn it_swaps_text_and_direction() -> Result<()> {
        let (mut manager, _dir) = new_manager().await?;

        manager.set_source_text("Hello world");
        manager
            .submit_translation(&FixedBackend::replying("سلام دنیا"))
            .await;
        manager.swap_direction();

        let state = manager.state();
        assert_eq!(state.direction, Direction::PersianToEnglish);
        assert_eq!(state.source_text, "سلام دنیا");
        assert_eq!(state.translated_text, "Hello world");
        assert_eq!(manager.history().len(), 1);

        return Ok(());
    }

    #[tokio::test]
    async fn it_restores_everything_when_applied_twice() -> Result<()> {
        let (mut manager, _dir) = new_manager().await?;
        manager.set_source_text("Hello world");
        let before = manager.state().clone();

        manager.swap_direction();
        manager.swap_direction();

        assert_eq!(manager.state(), &before);

        return Ok(());
    }

    #[tokio::test]
    async fn it_does_not_restore_text_after_an_edit() -> Result<()> {
        let (mut manager, _dir) = new_manager().await?;
        manager.set_source_text("Hello world");

        manager.swap_direction();
        manager.set_source_text("ویرایش شده");
        manager.swap_direction();

        assert_eq!(manager.state().direction, Direction::EnglishToPersian);
        assert_eq!(manager.state().source_text, "Hello world");
        assert_eq!(manager.state().translated_text, "ویرایش شده");

        return Ok(());
    }

    #[tokio::test]
    async fn it_allows_empty_translation() -> Result<()> {
        let (mut manager, _dir) = new_manager().await?;
        manager.set_source_text("Hello");

        manager.swap_direction();

        assert_eq!(manager.state().source_text, "");
        assert_eq!(manager.state().translated_text, "Hello");

        return Ok(());
    }

    #[tokio::test]
    async fn it_clears_error() -> Result<()> {
        let (mut manager, _dir) = new_manager().await?;
        manager.set_source_text("Hello");
        manager.submit_translation(&FixedBackend::failing()).await;

        manager.swap_direction();

        assert!(manager.state().error.is_none());

        return Ok(());
    }
}

mod history {
    use super::*;

    #[tokio::test]
    async fn it_selects_history_entry() -> Result<()> {
        let (mut manager, _dir) = new_manager().await?;
        manager.set_source_text("Hello");
        manager.submit_translation(&FixedBackend::failing()).await;

        let entry = HistoryEntry::new("خیلی ممنون", "Thank you", Direction::PersianToEnglish);
        manager.select_history_entry(&entry);

        let state = manager.state();
        assert_eq!(state.source_text, "خیلی ممنون");
        assert_eq!(state.translated_text, "Thank you");
        assert_eq!(state.direction, Direction::PersianToEnglish);
        assert!(state.error.is_none());
        assert!(manager.history().is_empty());

        return Ok(());
    }

    #[tokio::test]
    async fn it_clears_and_persists_empty_history() -> Result<()> {
        let (mut manager, dir) = new_manager().await?;
        let backend = FixedBackend::replying("x");
        for text in ["one", "two", "three"] {
            manager.set_source_text(text);
            manager.submit_translation(&backend).await;
        }
        assert_eq!(stored_history_len(&dir).await, 3);

        manager.clear_history().await;

        assert!(manager.history().is_empty());
        assert_eq!(stored_history_len(&dir).await, 0);
        assert_eq!(manager.state().source_text, "three");

        return Ok(());
    }

    #[tokio::test]
    async fn it_loads_history_from_store_on_start() -> Result<()> {
        let (mut manager, dir) = new_manager().await?;
        manager.set_source_text("Hello");
        manager.submit_translation(&FixedBackend::replying("سلام")).await;

        let store = HistoryStore::new(dir.path().join("history.json"));
        let reloaded = SessionManager::new(store, Direction::PersianToEnglish).await;

        assert_eq!(reloaded.history(), manager.history());
        assert_eq!(reloaded.state().direction, Direction::PersianToEnglish);
        assert_eq!(reloaded.state().source_text, "");

        return Ok(());
    }
}

mod reset_input {
    use super::*;

    #[tokio::test]
    async fn it_resets_input_only() -> Result<()> {
        let (mut manager, _dir) = new_manager().await?;
        manager.set_source_text("Hello");
        manager.submit_translation(&FixedBackend::replying("سلام")).await;
        manager.swap_direction();

        manager.reset_input();

        let state = manager.state();
        assert_eq!(state.source_text, "");
        assert_eq!(state.translated_text, "");
        assert!(state.error.is_none());
        assert_eq!(state.direction, Direction::PersianToEnglish);
        assert_eq!(manager.history().len(), 1);

        return Ok(());
    }
}
