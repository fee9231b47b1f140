use std::time::Duration;

use async_trait::async_trait;
use redlens_core::{Corpus, LlmError, SummaryParameters};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub mod prompt;

use crate::prompt::{PromptTemplate, SYSTEM_PROMPT};

const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";
const PROVIDER_NAME: &str = "OpenAI";
const MAX_COMPLETION_TOKENS: u32 = 1000;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Turns a user's flattened history into a readable summary.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    async fn summarize(
        &self,
        username: &str,
        corpus: &Corpus,
        params: &SummaryParameters,
    ) -> Result<String, LlmError>;
}

pub struct OpenAiProvider {
    api_key: String,
    client: reqwest::Client,
}

impl OpenAiProvider {
    pub fn new(api_key: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to create HTTP client");

        Self { api_key, client }
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    async fn summarize(
        &self,
        username: &str,
        corpus: &Corpus,
        params: &SummaryParameters,
    ) -> Result<String, LlmError> {
        let template = PromptTemplate::resolve(params.custom_prompt.as_deref());
        let user_prompt = template.render(username, corpus);

        let body = ChatCompletionRequest {
            model: params.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user_prompt,
                },
            ],
            temperature: params.temperature,
            max_tokens: MAX_COMPLETION_TOKENS,
        };

        debug!(model = %params.model, "Sending completion request");

        let response = self
            .client
            .post(OPENAI_API_URL)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status().as_u16();

        if status == 429 {
            return Err(LlmError::RateLimitExceeded {
                provider: PROVIDER_NAME.to_string(),
                retry_after: retry_after_seconds(&response),
            });
        }
        if status == 401 || status == 403 {
            return Err(LlmError::AuthenticationFailed {
                provider: PROVIDER_NAME.to_string(),
            });
        }
        if status != 200 {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "Provider returned error");
            return Err(LlmError::ApiError {
                provider: PROVIDER_NAME.to_string(),
                status_code: status,
                message: error_body,
            });
        }

        let api_response: ChatCompletionResponse =
            response
                .json()
                .await
                .map_err(|e| LlmError::InvalidResponseFormat {
                    provider: PROVIDER_NAME.to_string(),
                    details: format!("failed to parse response: {e}"),
                })?;

        extract_summary(api_response)
    }
}

/// The summary is the first choice's content, verbatim.
fn extract_summary(response: ChatCompletionResponse) -> Result<String, LlmError> {
    if let Some(usage) = &response.usage {
        debug!(
            prompt_tokens = usage.prompt_tokens,
            completion_tokens = usage.completion_tokens,
            total_tokens = usage.total_tokens,
            "Token usage"
        );
    }

    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| LlmError::InvalidResponseFormat {
            provider: PROVIDER_NAME.to_string(),
            details: "no choices in response".to_string(),
        })?;

    Ok(choice.message.content)
}

fn retry_after_seconds(response: &reqwest::Response) -> u64 {
    response
        .headers()
        .get("retry-after")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse().ok())
        .unwrap_or(5)
}

fn map_transport_error(err: reqwest::Error) -> LlmError {
    if err.is_timeout() {
        LlmError::RequestTimeout {
            provider: PROVIDER_NAME.to_string(),
        }
    } else {
        LlmError::Network {
            provider: PROVIDER_NAME.to_string(),
            details: err.to_string(),
        }
    }
}

// --- OpenAI API types (internal) ---

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ApiChoice>,
    #[serde(default)]
    usage: Option<ApiUsage>,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ApiUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_shape() {
        let body = ChatCompletionRequest {
            model: "gpt-4o".to_string(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: "prompt text".to_string(),
                },
            ],
            temperature: 0.5,
            max_tokens: MAX_COMPLETION_TOKENS,
        };

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model"], "gpt-4o");
        assert_eq!(json["max_tokens"], 1000);
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["role"], "user");
        assert_eq!(json["temperature"], 0.5);
    }

    #[test]
    fn test_parse_completion_response() {
        let data = r#"{
            "id": "chatcmpl-123",
            "object": "chat.completion",
            "model": "gpt-4o-2024-08-06",
            "choices": [
                {
                    "index": 0,
                    "message": {"role": "assistant", "content": "A concise summary."},
                    "finish_reason": "stop"
                }
            ],
            "usage": {"prompt_tokens": 120, "completion_tokens": 40, "total_tokens": 160}
        }"#;
        let parsed: ChatCompletionResponse = serde_json::from_str(data).unwrap();
        let summary = extract_summary(parsed).unwrap();
        assert_eq!(summary, "A concise summary.");
    }

    #[test]
    fn test_empty_choices_is_invalid_response() {
        let parsed: ChatCompletionResponse = serde_json::from_str(r#"{"choices": []}"#).unwrap();
        let err = extract_summary(parsed).unwrap_err();
        assert!(matches!(err, LlmError::InvalidResponseFormat { .. }));
    }

    #[test]
    fn test_provider_is_usable_as_trait_object() {
        let provider = OpenAiProvider::new("sk-test".to_string());
        let _object: &dyn LlmProvider = &provider;
    }
}
