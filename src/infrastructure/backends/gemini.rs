#[cfg(test)]
#[path = "gemini_test.rs"]
mod tests;

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde::Serialize;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::Backend;
use crate::domain::models::BackendName;
use crate::domain::models::ProviderError;
use crate::domain::models::TranslationPrompt;
use crate::domain::models::TRANSLATION_TEMPERATURE;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
struct ContentPart {
    #[serde(default)]
    text: String,
}

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    role: String,
    #[serde(default)]
    parts: Vec<ContentPart>,
}

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Content,
}

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

impl GenerateContentResponse {
    /// Text of the first candidate, or empty when the model produced none.
    fn text(&self) -> String {
        match self.candidates.first() {
            Some(candidate) => {
                return candidate
                    .content
                    .parts
                    .iter()
                    .map(|part| return part.text.as_str())
                    .collect::<Vec<&str>>()
                    .join("");
            }
            None => return "".to_string(),
        }
    }
}

pub struct Gemini {
    url: String,
    token: String,
    model: String,
    timeout: String,
}

impl Default for Gemini {
    fn default() -> Gemini {
        let mut model = Config::get(ConfigKey::Model);
        if model.is_empty() {
            model = DEFAULT_MODEL.to_string();
        }

        return Gemini {
            url: Config::get(ConfigKey::GeminiURL),
            token: Config::get(ConfigKey::GeminiToken),
            model,
            timeout: Config::get(ConfigKey::BackendHealthCheckTimeout),
        };
    }
}

impl Gemini {
    fn check_config(&self) -> Result<(), ProviderError> {
        if self.url.is_empty() {
            return Err(ProviderError::Misconfigured {
                backend: BackendName::Gemini,
                setting: "URL",
            });
        }
        if self.token.is_empty() {
            return Err(ProviderError::Misconfigured {
                backend: BackendName::Gemini,
                setting: "token",
            });
        }

        return Ok(());
    }

    fn transport_err(err: reqwest::Error) -> ProviderError {
        return ProviderError::Transport {
            backend: BackendName::Gemini,
            source: err,
        };
    }
}

#[async_trait]
impl Backend for Gemini {
    fn name(&self) -> BackendName {
        return BackendName::Gemini;
    }

    #[allow(clippy::implicit_return)]
    async fn health_check(&self) -> Result<(), ProviderError> {
        self.check_config()?;

        let timeout = self.timeout.parse::<u64>().unwrap_or(1000);
        let res = reqwest::Client::new()
            .get(format!(
                "{url}/v1beta/models/{model}",
                url = self.url,
                model = self.model
            ))
            .query(&[("key", &self.token)])
            .timeout(Duration::from_millis(timeout))
            .send()
            .await;

        let res = match res {
            Ok(res) => res,
            Err(err) => {
                tracing::error!(error = ?err, "Gemini is not reachable");
                return Err(Gemini::transport_err(err));
            }
        };

        let status = res.status().as_u16();
        if status >= 400 {
            tracing::error!(status = status, "Gemini health check failed");
            return Err(ProviderError::Status {
                backend: BackendName::Gemini,
                status,
            });
        }

        return Ok(());
    }

    #[allow(clippy::implicit_return)]
    async fn get_translation(&self, prompt: &TranslationPrompt) -> Result<String, ProviderError> {
        self.check_config()?;

        let req = GenerateContentRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![ContentPart {
                    text: prompt.instruction(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: TRANSLATION_TEMPERATURE,
            },
        };

        let res = reqwest::Client::new()
            .post(format!(
                "{url}/v1beta/models/{model}:generateContent",
                url = self.url,
                model = self.model,
            ))
            .query(&[("key", &self.token)])
            .json(&req)
            .send()
            .await
            .map_err(Gemini::transport_err)?;

        if !res.status().is_success() {
            tracing::error!(
                status = res.status().as_u16(),
                "Failed to make translation request to Gemini"
            );
            return Err(ProviderError::Status {
                backend: BackendName::Gemini,
                status: res.status().as_u16(),
            });
        }

        let body = res
            .json::<GenerateContentResponse>()
            .await
            .map_err(Gemini::transport_err)?;

        return Ok(body.text());
    }
}
