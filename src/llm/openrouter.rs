//! OpenRouter chat-completions provider.
//!
//! OpenRouter speaks the OpenAI Chat Completions protocol but may answer 200
//! with an `error` object instead of choices, so both are checked.

use async_trait::async_trait;
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

use crate::config::LlmConfig;
use crate::error::LlmError;
use crate::llm::provider::{
    ChatMessage, CompletionRequest, CompletionResponse, FinishReason, LlmProvider,
};

const PROVIDER_NAME: &str = "openrouter";

/// Attribution headers OpenRouter shows on its dashboard.
const REFERER: &str = "https://cos-ai-bot.com";
const APP_TITLE: &str = "Cos AI Bot";

pub struct OpenRouterProvider {
    client: Client,
    config: LlmConfig,
}

impl OpenRouterProvider {
    pub fn new(config: LlmConfig) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LlmError::RequestFailed {
                provider: PROVIDER_NAME.to_string(),
                reason: format!("Failed to build reqwest client: {}", e),
            })?;

        Ok(Self { client, config })
    }

    /// Construct API URL for a given path.
    /// Strips trailing `/v1` from base_url to avoid double `/v1` issues.
    fn api_url(&self, path: &str) -> String {
        let base = self.config.base_url.trim_end_matches('/');
        let base = base.strip_suffix("/v1").unwrap_or(base);
        format!("{}/v1/{}", base, path.trim_start_matches('/'))
    }

    async fn send_request(
        &self,
        body: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, LlmError> {
        let url = self.api_url("chat/completions");

        tracing::debug!(
            url = %url,
            key_len = self.config.api_key.expose_secret().len(),
            "Sending request to OpenRouter"
        );

        let response = self
            .client
            .post(&url)
            .header(
                "Authorization",
                format!("Bearer {}", self.config.api_key.expose_secret()),
            )
            .header("HTTP-Referer", REFERER)
            .header("X-Title", APP_TITLE)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("OpenRouter request failed: {}", e);
                if e.is_timeout() {
                    LlmError::Timeout {
                        provider: PROVIDER_NAME.to_string(),
                        timeout: self.config.timeout,
                    }
                } else {
                    LlmError::RequestFailed {
                        provider: PROVIDER_NAME.to_string(),
                        reason: e.to_string(),
                    }
                }
            })?;

        let status = response.status();
        let response_text = response.text().await.map_err(|e| {
            tracing::error!("Failed to read response body: {}", e);
            if e.is_timeout() {
                LlmError::Timeout {
                    provider: PROVIDER_NAME.to_string(),
                    timeout: self.config.timeout,
                }
            } else {
                LlmError::RequestFailed {
                    provider: PROVIDER_NAME.to_string(),
                    reason: format!("Failed to read response body: {}", e),
                }
            }
        })?;

        tracing::debug!("OpenRouter response status: {}", status);

        match status.as_u16() {
            200 => {}
            401 => {
                return Err(LlmError::AuthFailed {
                    provider: PROVIDER_NAME.to_string(),
                });
            }
            429 => {
                return Err(LlmError::RateLimited {
                    provider: PROVIDER_NAME.to_string(),
                });
            }
            code => {
                return Err(LlmError::Status {
                    provider: PROVIDER_NAME.to_string(),
                    status: code,
                    body: truncate(&response_text, 200).to_string(),
                });
            }
        }

        serde_json::from_str(&response_text).map_err(|e| LlmError::InvalidResponse {
            provider: PROVIDER_NAME.to_string(),
            reason: format!(
                "JSON parse error: {}. Raw: {}",
                e,
                truncate(&response_text, 200)
            ),
        })
    }
}

#[async_trait]
impl LlmProvider for OpenRouterProvider {
    fn model_name(&self) -> &str {
        &self.config.model
    }

    async fn complete(&self, req: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let request = ChatCompletionRequest {
            model: self.config.model.clone(),
            messages: req.messages,
            max_tokens: req.max_tokens,
            temperature: req.temperature,
        };

        let response = self.send_request(&request).await?;

        if let Some(error) = response.error {
            return Err(LlmError::Provider {
                provider: PROVIDER_NAME.to_string(),
                message: error.message,
            });
        }

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::EmptyResponse {
                provider: PROVIDER_NAME.to_string(),
            })?;

        let usage = response.usage.unwrap_or_default();
        Ok(CompletionResponse {
            content: choice.message.content.unwrap_or_default(),
            input_tokens: usage.prompt_tokens,
            output_tokens: usage.completion_tokens,
            finish_reason: FinishReason::from_api(choice.finish_reason.as_deref()),
        })
    }
}

/// Cut `s` to at most `max` bytes without splitting a character.
fn truncate(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatCompletionChoice>,
    #[serde(default)]
    error: Option<ApiErrorBody>,
    #[serde(default)]
    usage: Option<ChatCompletionUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionChoice {
    message: ChatCompletionResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

#[derive(Debug, Default, Deserialize)]
struct ChatCompletionUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}
