#[cfg(test)]
#[path = "backend_test.rs"]
mod tests;

use std::sync::Arc;

use async_trait::async_trait;
use strum::EnumIter;
use strum::EnumVariantNames;
use strum::IntoEnumIterator;
use thiserror::Error;

use super::Language;

/// Sampling temperature sent with every translation. Kept low so results are
/// literal and stable between runs.
pub const TRANSLATION_TEMPERATURE: f32 = 0.3;

#[derive(Copy, Clone, Debug, PartialEq, Eq, EnumIter, EnumVariantNames, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum BackendName {
    Gemini,
    OpenAI,
}

impl BackendName {
    pub fn parse(text: &str) -> Option<BackendName> {
        return BackendName::iter().find(|e| return e.to_string() == text);
    }
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("{backend} {setting} is not defined")]
    Misconfigured {
        backend: BackendName,
        setting: &'static str,
    },
    #[error("{backend} is not reachable: {source}")]
    Transport {
        backend: BackendName,
        #[source]
        source: reqwest::Error,
    },
    #[error("{backend} responded with status {status}")]
    Status { backend: BackendName, status: u16 },
}

pub struct TranslationPrompt {
    pub text: String,
    pub target: Language,
}

impl TranslationPrompt {
    pub fn new(text: &str, target: Language) -> TranslationPrompt {
        return TranslationPrompt {
            text: text.to_string(),
            target,
        };
    }

    /// The full instruction sent to the model for the prompt's target language.
    pub fn instruction(&self) -> String {
        let text = &self.text;
        match self.target {
            Language::Persian => {
                return format!("Translate the following text to Persian (Farsi). Provide a natural, fluent translation suitable for a general audience. Do not add any explanations or notes, just the translation. Text: \"{text}\"");
            }
            Language::English => {
                return format!("Translate the following Persian (Farsi) text to English. Provide a natural, fluent translation. Do not add any explanations or notes, just the translation. Text: \"{text}\"");
            }
        }
    }
}

/// Model output is untrusted. Drops terminal escape sequences and control
/// characters other than newlines and tabs, then trims.
pub fn sanitize_translation(text: &str) -> String {
    let mut res = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\u{1b}' {
            match chars.next() {
                // CSI runs until its final byte.
                Some('[') => {
                    for n in chars.by_ref() {
                        if ('@'..='~').contains(&n) {
                            break;
                        }
                    }
                }
                // OSC and the other string sequences run until BEL or ST.
                Some(']' | 'P' | 'X' | '^' | '_') => {
                    while let Some(n) = chars.next() {
                        if n == '\u{7}' {
                            break;
                        }
                        if n == '\u{1b}' && chars.peek() == Some(&'\\') {
                            chars.next();
                            break;
                        }
                    }
                }
                _ => (),
            }
            continue;
        }

        if c.is_control() && c != '\n' && c != '\t' {
            continue;
        }

        res.push(c);
    }

    return res.trim().to_string();
}

#[async_trait]
pub trait Backend: Send + Sync {
    fn name(&self) -> BackendName;

    /// Used before starting a session to verify the backend is configured and
    /// reachable.
    async fn health_check(&self) -> Result<(), ProviderError>;

    /// Issues exactly one request to the provider and returns the raw text it
    /// produced, or an empty string when it produced none.
    async fn get_translation(&self, prompt: &TranslationPrompt) -> Result<String, ProviderError>;

    /// Translates `text` into `target`. Blank input never reaches the network.
    async fn translate(&self, text: &str, target: Language) -> Result<String, ProviderError> {
        if text.trim().is_empty() {
            return Ok("".to_string());
        }

        let prompt = TranslationPrompt::new(text, target);
        let res = self.get_translation(&prompt).await?;

        return Ok(sanitize_translation(&res));
    }
}

pub type BackendBox = Arc<dyn Backend>;
