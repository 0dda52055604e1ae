//! OpenRouter chat-completions client producing structured steps.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::agent::{render_messages, Message, Step};

use super::{CompletionError, CompletionService};

pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Completion service backed by an OpenAI-compatible chat endpoint.
///
/// The conversation is sent as a single user message of `ROLE: content`
/// lines and the model is asked for a JSON object reply.
pub struct OpenRouterClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

impl OpenRouterClient {
    pub fn new(api_key: String, model: String) -> Self {
        Self::with_base_url(api_key, model, DEFAULT_BASE_URL.to_string())
    }

    pub fn with_base_url(api_key: String, model: String, base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            model,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl CompletionService for OpenRouterClient {
    async fn complete(
        &self,
        system_instruction: &str,
        conversation: &[Message],
    ) -> Result<Step, CompletionError> {
        let prompt_text = render_messages(conversation);
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system_instruction,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt_text,
                },
            ],
            response_format: ResponseFormat {
                kind: "json_object",
            },
        };

        tracing::debug!(
            "Requesting step from {} ({} messages)",
            self.model,
            conversation.len()
        );

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CompletionError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let body: ChatResponse = response.json().await?;
        parse_step_response(body)
    }
}

fn parse_step_response(body: ChatResponse) -> Result<Step, CompletionError> {
    let content = body
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .filter(|c| !c.trim().is_empty())
        .ok_or(CompletionError::EmptyResponse)?;

    Step::from_json(&content)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(json: &str) -> ChatResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn extracts_step_from_first_choice() {
        let body = response(
            r#"{"choices":[{"message":{"role":"assistant","content":"{\"step\":\"PLAN\",\"content\":\"compute\"}"}}]}"#,
        );
        assert_eq!(parse_step_response(body).unwrap(), Step::plan("compute"));
    }

    #[test]
    fn missing_choices_is_empty_response() {
        let err = parse_step_response(response(r#"{"choices":[]}"#)).unwrap_err();
        assert!(matches!(err, CompletionError::EmptyResponse));

        let err = parse_step_response(response(r#"{}"#)).unwrap_err();
        assert!(matches!(err, CompletionError::EmptyResponse));
    }

    #[test]
    fn null_content_is_empty_response() {
        let body = response(r#"{"choices":[{"message":{"content":null}}]}"#);
        assert!(matches!(
            parse_step_response(body),
            Err(CompletionError::EmptyResponse)
        ));
    }

    #[test]
    fn free_text_reply_is_malformed() {
        let body = response(r#"{"choices":[{"message":{"content":"It is 4."}}]}"#);
        assert!(matches!(
            parse_step_response(body),
            Err(CompletionError::MalformedStep { .. })
        ));
    }

    #[test]
    fn request_asks_for_json_object() {
        let request = ChatRequest {
            model: "m",
            messages: vec![ChatMessage {
                role: "user",
                content: "USER: hi",
            }],
            response_format: ResponseFormat {
                kind: "json_object",
            },
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["response_format"]["type"], "json_object");
        assert_eq!(value["messages"][0]["content"], "USER: hi");
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let client = OpenRouterClient::with_base_url(
            "key".to_string(),
            "model".to_string(),
            "http://localhost:8080/v1/".to_string(),
        );
        assert_eq!(client.base_url, "http://localhost:8080/v1");
        assert_eq!(client.model(), "model");
    }
}
