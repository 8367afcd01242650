#[cfg(test)]
#[path = "actions_test.rs"]
mod tests;

use anyhow::Result;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::clipboard::ClipboardService;
use crate::domain::models::Action;
use crate::domain::models::BackendBox;
use crate::domain::models::Event;
use crate::domain::models::TranslationResponse;

pub struct ActionsService {}

impl ActionsService {
    /// Runs provider calls and clipboard writes off the input loop. Each
    /// translation is its own task and answers with an
    /// `Event::TranslationResponse`. Returns once the action channel closes.
    pub async fn start(
        backend: BackendBox,
        tx: mpsc::UnboundedSender<Event>,
        rx: &mut mpsc::UnboundedReceiver<Action>,
    ) -> Result<()> {
        let mut workers: Vec<JoinHandle<Result<()>>> = vec![];

        while let Some(action) = rx.recv().await {
            workers.retain(|worker| return !worker.is_finished());

            match action {
                Action::CopyTranslation(text) => {
                    tx.send(Event::CopyResponse(ClipboardService::set(text)))?;
                }
                Action::Translate(request) => {
                    let worker_tx = tx.clone();
                    let worker_backend = backend.clone();

                    workers.push(tokio::spawn(async move {
                        tracing::debug!(
                            generation = request.generation,
                            direction = %request.direction,
                            "Requesting translation"
                        );

                        let result = worker_backend
                            .translate(&request.text, request.direction.target())
                            .await;

                        worker_tx.send(Event::TranslationResponse(TranslationResponse {
                            request,
                            result,
                        }))?;

                        return Ok(());
                    }));
                }
            }
        }

        for worker in workers {
            worker.await??;
        }

        return Ok(());
    }
}
