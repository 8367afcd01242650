#[cfg(test)]
#[path = "history_test.rs"]
mod tests;

use chrono::Utc;
use serde_derive::Deserialize;
use serde_derive::Serialize;
use uuid::Uuid;

use super::Direction;

/// Maximum number of entries kept in history. Older entries are evicted first.
pub const HISTORY_CAPACITY: usize = 50;

/// A completed translation. Entries are never mutated after creation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: String,
    pub source_text: String,
    pub translated_text: String,
    pub direction: Direction,
    /// Unix epoch in milliseconds.
    pub timestamp: i64,
}

impl HistoryEntry {
    pub fn new(source_text: &str, translated_text: &str, direction: Direction) -> HistoryEntry {
        return HistoryEntry {
            id: HistoryEntry::create_id(),
            source_text: source_text.to_string(),
            translated_text: translated_text.to_string(),
            direction,
            timestamp: Utc::now().timestamp_millis(),
        };
    }

    pub fn create_id() -> String {
        return Uuid::new_v4()
            .to_string()
            .split('-')
            .enumerate()
            .filter_map(|(idx, str)| {
                if idx > 1 {
                    return None;
                }
                return Some(str);
            })
            .collect::<Vec<&str>>()
            .join("-");
    }

    /// Single line preview of both sides of the translation.
    pub fn summary(&self) -> String {
        let source = first_line(&self.source_text);
        let translated = first_line(&self.translated_text);

        return format!("{}, {source} → {translated}", self.direction);
    }
}

fn first_line(text: &str) -> String {
    let line = text.trim().split('\n').next().unwrap_or_default().trim();
    if line.chars().count() > 70 {
        return format!("{}...", line.chars().take(67).collect::<String>());
    }

    return line.to_string();
}

/// Past translations, newest first.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct History {
    entries: Vec<HistoryEntry>,
}

impl History {
    pub fn new(mut entries: Vec<HistoryEntry>) -> History {
        entries.truncate(HISTORY_CAPACITY);
        return History { entries };
    }

    /// Adds an entry to the front, evicting from the back once over capacity.
    pub fn prepend(&mut self, entry: HistoryEntry) {
        self.entries.insert(0, entry);
        self.entries.truncate(HISTORY_CAPACITY);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        return &self.entries;
    }

    pub fn find(&self, id: &str) -> Option<&HistoryEntry> {
        return self.entries.iter().find(|e| return e.id == id);
    }

    pub fn len(&self) -> usize {
        return self.entries.len();
    }

    pub fn is_empty(&self) -> bool {
        return self.entries.is_empty();
    }
}
