#[cfg(test)]
#[path = "direction_test.rs"]
mod tests;

use serde_derive::Deserialize;
use serde_derive::Serialize;
use strum::EnumIter;
use strum::EnumVariantNames;
use strum::IntoEnumIterator;

#[derive(Copy, Clone, Debug, PartialEq, Eq, strum::Display)]
pub enum Language {
    English,
    Persian,
}

/// Which of the two languages is being translated from, and which to.
#[derive(
    Copy,
    Clone,
    Debug,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    EnumIter,
    EnumVariantNames,
    strum::Display,
)]
pub enum Direction {
    #[default]
    #[serde(rename = "en-to-fa")]
    #[strum(serialize = "en-to-fa")]
    EnglishToPersian,
    #[serde(rename = "fa-to-en")]
    #[strum(serialize = "fa-to-en")]
    PersianToEnglish,
}

impl Direction {
    pub fn parse(text: &str) -> Option<Direction> {
        return Direction::iter().find(|e| return e.to_string() == text);
    }

    pub fn toggle(&self) -> Direction {
        match self {
            Direction::EnglishToPersian => return Direction::PersianToEnglish,
            Direction::PersianToEnglish => return Direction::EnglishToPersian,
        }
    }

    pub fn source(&self) -> Language {
        match self {
            Direction::EnglishToPersian => return Language::English,
            Direction::PersianToEnglish => return Language::Persian,
        }
    }

    pub fn target(&self) -> Language {
        match self {
            Direction::EnglishToPersian => return Language::Persian,
            Direction::PersianToEnglish => return Language::English,
        }
    }

    /// Human readable label, e.g. `English → Persian`.
    pub fn label(&self) -> String {
        return format!("{} → {}", self.source(), self.target());
    }
}
