#[cfg(test)]
#[path = "history_store_test.rs"]
mod tests;

use std::path;

use anyhow::Result;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::History;
use crate::domain::models::HistoryEntry;

/// Persists the whole history as a single JSON document.
pub struct HistoryStore {
    pub file_path: path::PathBuf,
}

impl Default for HistoryStore {
    fn default() -> HistoryStore {
        let mut file_path = Config::get(ConfigKey::HistoryFile);
        if file_path.is_empty() {
            file_path = Config::default(ConfigKey::HistoryFile);
        }

        return HistoryStore::new(path::PathBuf::from(file_path));
    }
}

impl HistoryStore {
    pub fn new(file_path: path::PathBuf) -> HistoryStore {
        return HistoryStore { file_path };
    }

    /// Reads the stored history. Anything missing or unreadable results in an
    /// empty history.
    pub async fn load(&self) -> History {
        if !self.file_path.exists() {
            return History::default();
        }

        let payload = match fs::read_to_string(&self.file_path).await {
            Ok(payload) => payload,
            Err(err) => {
                tracing::warn!(error = ?err, path = ?self.file_path, "Failed to read history");
                return History::default();
            }
        };

        match serde_json::from_str::<Vec<HistoryEntry>>(&payload) {
            Ok(entries) => return History::new(entries),
            Err(err) => {
                tracing::warn!(error = ?err, path = ?self.file_path, "Discarding unparseable history");
                return History::default();
            }
        }
    }

    /// Overwrites the stored history with `history`.
    pub async fn save(&self, history: &History) -> Result<()> {
        let payload = serde_json::to_string(history)?;

        if let Some(parent) = self.file_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).await?;
            }
        }

        let mut file = fs::File::create(&self.file_path).await?;
        file.write_all(payload.as_bytes()).await?;
        file.flush().await?;

        tracing::debug!(entries = history.len(), "Saved history");

        return Ok(());
    }
}
