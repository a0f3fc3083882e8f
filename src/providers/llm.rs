// LLM chat-completion client (OpenAI-compatible wire format)

use anyhow::{Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{check_status, transport_error};
use crate::config::LlmConfig;
use crate::error::GatewayError;
use crate::normalize::TutoringQuery;

const PROVIDER_NAME: &str = "llm";

/// Persona fixed for every tutoring answer.
const SYSTEM_INSTRUCTION: &str = "You are a patient school tutor. Give a simple, \
     teacher-style explanation a student can follow, step by step, \
     in the language the question asks for.";

pub struct LlmClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl LlmClient {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        })
    }

    /// Ask the model for a tutoring answer. One call, no retry.
    ///
    /// A well-formed completion with no text yields an empty answer rather
    /// than an error — an empty choice list is the provider's way of saying
    /// "nothing to add", not a failure.
    pub async fn ask(&self, query: &TutoringQuery) -> Result<String, GatewayError> {
        let request = self.to_chat_request(query);
        let url = format!("{}/v1/chat/completions", self.base_url);

        tracing::debug!(model = %self.model, "sending chat-completion request");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| transport_error(PROVIDER_NAME, e))?;

        let response = check_status(PROVIDER_NAME, response, &self.api_key).await?;

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| transport_error(PROVIDER_NAME, e))?;

        Ok(extract_answer(chat_response))
    }

    fn to_chat_request(&self, query: &TutoringQuery) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_INSTRUCTION.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: query.prompt(),
                },
            ],
        }
    }
}

/// First choice's text, or the empty-answer sentinel.
fn extract_answer(response: ChatResponse) -> String {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .unwrap_or_default()
}

// OpenAI-compatible wire types (request subset the gateway actually sends)

#[derive(Debug, Clone, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Clone, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client() -> LlmClient {
        LlmClient::new(&LlmConfig {
            base_url: "https://api.openai.com".to_string(),
            api_key: "sk-test".to_string(),
            model: "gpt-4o-mini".to_string(),
            timeout_secs: 15,
        })
        .unwrap()
    }

    fn query() -> TutoringQuery {
        TutoringQuery {
            board: "CBSE".to_string(),
            grade_level: "8".to_string(),
            subject: "Maths".to_string(),
            chapter: "Fractions".to_string(),
            question_text: "What is 2+2?".to_string(),
            language: "en".to_string(),
        }
    }

    #[test]
    fn test_request_has_system_then_user() {
        let request = test_client().to_chat_request(&query());
        assert_eq!(request.model, "gpt-4o-mini");
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[0].role, "system");
        assert_eq!(request.messages[1].role, "user");
    }

    #[test]
    fn test_prompt_fields_verbatim_and_ordered() {
        let request = test_client().to_chat_request(&query());
        let prompt = &request.messages[1].content;

        let positions: Vec<usize> = ["CBSE", "8", "Maths", "Fractions", "What is 2+2?"]
            .iter()
            .map(|needle| {
                prompt
                    .find(needle)
                    .unwrap_or_else(|| panic!("prompt missing '{needle}': {prompt}"))
            })
            .collect();
        assert!(
            positions.windows(2).all(|w| w[0] < w[1]),
            "fields out of order in prompt: {prompt}"
        );
    }

    #[test]
    fn test_extract_answer_first_choice() {
        let response = ChatResponse {
            choices: vec![
                ChatChoice {
                    message: ChatResponseMessage {
                        content: Some("4".to_string()),
                    },
                },
                ChatChoice {
                    message: ChatResponseMessage {
                        content: Some("ignored".to_string()),
                    },
                },
            ],
        };
        assert_eq!(extract_answer(response), "4");
    }

    #[test]
    fn test_extract_answer_empty_choices_is_sentinel() {
        let response = ChatResponse { choices: vec![] };
        assert_eq!(extract_answer(response), "");
    }

    #[test]
    fn test_extract_answer_null_content_is_sentinel() {
        let response = ChatResponse {
            choices: vec![ChatChoice {
                message: ChatResponseMessage { content: None },
            }],
        };
        assert_eq!(extract_answer(response), "");
    }

    #[test]
    fn test_choices_field_optional_in_response() {
        let response: ChatResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(extract_answer(response), "");
    }
}
