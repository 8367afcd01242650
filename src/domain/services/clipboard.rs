#[cfg(test)]
#[path = "clipboard_test.rs"]
mod tests;

use anyhow::anyhow;
use anyhow::Result;
use once_cell::sync::OnceCell;
use tokio::sync::mpsc;

static SENDER: OnceCell<mpsc::UnboundedSender<String>> = OnceCell::new();

/// Holds the system clipboard for the lifetime of an interactive session.
/// Some platforms drop clipboard contents once their owner goes away.
pub struct ClipboardService {}

impl ClipboardService {
    pub async fn start() -> Result<()> {
        let mut clipboard = arboard::Clipboard::new()?;
        let (tx, mut rx) = mpsc::unbounded_channel::<String>();
        SENDER
            .set(tx)
            .map_err(|_| return anyhow!("Clipboard service is already running."))?;

        while let Some(text) = rx.recv().await {
            clipboard.set_text(text)?;
        }

        return Ok(());
    }

    pub fn healthcheck() -> Result<()> {
        if SENDER.get().is_some() {
            return Ok(());
        }

        arboard::Clipboard::new()?;
        return Ok(());
    }

    pub fn set(text: String) -> Result<()> {
        if let Some(tx) = SENDER.get() {
            tx.send(text)?;
            return Ok(());
        }

        return Err(anyhow!("Clipboard service is not initialized."));
    }

    /// Copies without the background service, for one-shot commands.
    pub fn set_once(text: &str) -> Result<()> {
        arboard::Clipboard::new()?.set_text(text.to_string())?;
        return Ok(());
    }
}
