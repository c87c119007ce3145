//! Anthropic Messages API provider (non-streaming).

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::{Value, json};

use super::provider::{
    ChatMessage, CompletionRequest, CompletionResponse, FinishReason, LlmProvider, Role,
};
use crate::error::LlmError;

pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_MAX_TOKENS: u32 = 1000;
const PROVIDER: &str = "anthropic";

pub struct AnthropicProvider {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
    model: String,
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    id: Option<String>,
    content: Vec<ContentBlock>,
    #[serde(default)]
    stop_reason: Option<String>,
    #[serde(default)]
    usage: Usage,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize, Default)]
struct Usage {
    #[serde(default)]
    input_tokens: u32,
    #[serde(default)]
    output_tokens: u32,
}

impl AnthropicProvider {
    pub fn new(api_key: SecretString, model: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: model.into(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

/// Build the request body. System messages are folded into the top-level
/// `system` field.
fn build_request_body(model: &str, request: &CompletionRequest) -> Value {
    let (system, messages): (Vec<&ChatMessage>, Vec<&ChatMessage>) = request
        .messages
        .iter()
        .partition(|m| m.role == Role::System);

    let messages: Vec<Value> = messages
        .into_iter()
        .map(|m| {
            json!({
                "role": if m.role == Role::Assistant { "assistant" } else { "user" },
                "content": [{ "type": "text", "text": m.content }],
            })
        })
        .collect();

    let mut body = json!({
        "model": model,
        "max_tokens": request.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
        "messages": messages,
    });

    if !system.is_empty() {
        let system: Vec<&str> = system.iter().map(|m| m.content.as_str()).collect();
        body["system"] = json!(system.join("\n\n"));
    }
    if let Some(t) = request.temperature {
        body["temperature"] = json!(t);
    }
    body
}

fn parse_response(response: MessagesResponse) -> CompletionResponse {
    let content = response
        .content
        .iter()
        .filter(|b| b.kind == "text")
        .filter_map(|b| b.text.as_deref())
        .collect::<Vec<_>>()
        .join("");

    let finish_reason = match response.stop_reason.as_deref() {
        Some("end_turn") | Some("stop_sequence") => FinishReason::Stop,
        Some("max_tokens") => FinishReason::Length,
        _ => FinishReason::Unknown,
    };

    CompletionResponse {
        content,
        input_tokens: response.usage.input_tokens,
        output_tokens: response.usage.output_tokens,
        finish_reason,
        response_id: response.id,
    }
}

#[async_trait]
impl LlmProvider for AnthropicProvider {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let body = build_request_body(&self.model, &request);

        let resp = self
            .client
            .post(format!("{}/messages", self.base_url))
            .header("x-api-key", self.api_key.expose_secret())
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::RequestFailed {
                provider: PROVIDER.into(),
                reason: e.to_string(),
            })?;

        let status = resp.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(LlmError::AuthFailed {
                provider: PROVIDER.into(),
            });
        }
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = resp
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .map(std::time::Duration::from_secs);
            return Err(LlmError::RateLimited {
                provider: PROVIDER.into(),
                retry_after,
            });
        }
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(LlmError::RequestFailed {
                provider: PROVIDER.into(),
                reason: format!("HTTP {status}: {text}"),
            });
        }

        let parsed: MessagesResponse =
            resp.json().await.map_err(|e| LlmError::InvalidResponse {
                provider: PROVIDER.into(),
                reason: e.to_string(),
            })?;

        let response = parse_response(parsed);
        tracing::debug!(
            model = %self.model,
            input_tokens = response.input_tokens,
            output_tokens = response.output_tokens,
            "Anthropic completion finished"
        );
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_messages_move_to_top_level() {
        let request = CompletionRequest::new(vec![
            ChatMessage::system("You are a moderator."),
            ChatMessage::user("Is this a threat?"),
        ])
        .with_temperature(0.0)
        .with_max_tokens(50);

        let body = build_request_body("claude-test", &request);
        assert_eq!(body["system"], "You are a moderator.");
        assert_eq!(body["max_tokens"], 50);
        assert_eq!(body["temperature"], 0.0);
        let messages = body["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0]["role"], "user");
        assert_eq!(messages[0]["content"][0]["text"], "Is this a threat?");
    }

    #[test]
    fn defaults_when_unset() {
        let body = build_request_body("m", &CompletionRequest::new(vec![ChatMessage::user("x")]));
        assert_eq!(body["max_tokens"], DEFAULT_MAX_TOKENS);
        assert!(body.get("system").is_none());
        assert!(body.get("temperature").is_none());
    }

    #[test]
    fn response_text_blocks_are_joined() {
        let raw: MessagesResponse = serde_json::from_str(
            r#"{
                "id": "msg_1",
                "content": [{"type": "text", "text": "30 days "}, {"type": "text", "text": "suspension"}],
                "stop_reason": "end_turn",
                "usage": {"input_tokens": 12, "output_tokens": 3}
            }"#,
        )
        .unwrap();
        let response = parse_response(raw);
        assert_eq!(response.content, "30 days suspension");
        assert_eq!(response.finish_reason, FinishReason::Stop);
        assert_eq!(response.input_tokens, 12);
        assert_eq!(response.response_id.as_deref(), Some("msg_1"));
    }

    #[test]
    fn max_tokens_stop_reason_maps_to_length() {
        let raw: MessagesResponse = serde_json::from_str(
            r#"{"content": [], "stop_reason": "max_tokens"}"#,
        )
        .unwrap();
        assert_eq!(parse_response(raw).finish_reason, FinishReason::Length);
    }
}
