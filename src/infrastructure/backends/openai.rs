#[cfg(test)]
#[path = "openai_test.rs"]
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

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct MessageRequest {
    role: String,
    content: String,
}

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
struct CompletionRequest {
    model: String,
    messages: Vec<MessageRequest>,
    temperature: f32,
    stream: bool,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct CompletionMessageResponse {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct CompletionChoiceResponse {
    message: CompletionMessageResponse,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoiceResponse>,
}

pub struct OpenAI {
    url: String,
    token: String,
    model: String,
    timeout: String,
}

impl Default for OpenAI {
    fn default() -> OpenAI {
        let mut model = Config::get(ConfigKey::Model);
        if model.is_empty() {
            model = DEFAULT_MODEL.to_string();
        }

        return OpenAI {
            url: Config::get(ConfigKey::OpenAiURL),
            token: Config::get(ConfigKey::OpenAiToken),
            model,
            timeout: Config::get(ConfigKey::BackendHealthCheckTimeout),
        };
    }
}

impl OpenAI {
    fn check_config(&self) -> Result<(), ProviderError> {
        if self.url.is_empty() {
            return Err(ProviderError::Misconfigured {
                backend: BackendName::OpenAI,
                setting: "URL",
            });
        }
        if self.token.is_empty() {
            return Err(ProviderError::Misconfigured {
                backend: BackendName::OpenAI,
                setting: "token",
            });
        }

        return Ok(());
    }

    fn transport_err(err: reqwest::Error) -> ProviderError {
        return ProviderError::Transport {
            backend: BackendName::OpenAI,
            source: err,
        };
    }
}

#[async_trait]
impl Backend for OpenAI {
    fn name(&self) -> BackendName {
        return BackendName::OpenAI;
    }

    #[allow(clippy::implicit_return)]
    async fn health_check(&self) -> Result<(), ProviderError> {
        self.check_config()?;

        // The official API answers its index with a 404 or a 418, so there is
        // nothing useful to check there.
        if self.url == "https://api.openai.com" {
            return Ok(());
        }

        let timeout = self.timeout.parse::<u64>().unwrap_or(1000);
        let res = reqwest::Client::new()
            .get(&self.url)
            .timeout(Duration::from_millis(timeout))
            .send()
            .await;

        let res = match res {
            Ok(res) => res,
            Err(err) => {
                tracing::error!(error = ?err, "OpenAI is not reachable");
                return Err(OpenAI::transport_err(err));
            }
        };

        let status = res.status().as_u16();
        if status >= 400 && status != 404 && status != 418 {
            tracing::error!(status = status, "OpenAI health check failed");
            return Err(ProviderError::Status {
                backend: BackendName::OpenAI,
                status,
            });
        }

        return Ok(());
    }

    #[allow(clippy::implicit_return)]
    async fn get_translation(&self, prompt: &TranslationPrompt) -> Result<String, ProviderError> {
        self.check_config()?;

        let req = CompletionRequest {
            model: self.model.to_string(),
            messages: vec![MessageRequest {
                role: "user".to_string(),
                content: prompt.instruction(),
            }],
            temperature: TRANSLATION_TEMPERATURE,
            stream: false,
        };

        let res = reqwest::Client::new()
            .post(format!("{url}/v1/chat/completions", url = self.url))
            .header("Authorization", format!("Bearer {}", self.token))
            .json(&req)
            .send()
            .await
            .map_err(OpenAI::transport_err)?;

        if !res.status().is_success() {
            tracing::error!(
                status = res.status().as_u16(),
                "Failed to make translation request to OpenAI"
            );
            return Err(ProviderError::Status {
                backend: BackendName::OpenAI,
                status: res.status().as_u16(),
            });
        }

        let body = res
            .json::<CompletionResponse>()
            .await
            .map_err(OpenAI::transport_err)?;

        let text = body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| return choice.message.content)
            .unwrap_or_default();

        return Ok(text);
    }
}
