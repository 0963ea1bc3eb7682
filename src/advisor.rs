//! Chat-completion client for the advisory service.

use reqwest::blocking::{Client, Response};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::AdvisoryError;
use crate::settings::AdvisorConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// One request/response round trip to a language model. Implementations
/// return the completion text unmodified.
pub trait Advisor {
    fn complete(&self, messages: &[ChatMessage]) -> Result<String, AdvisoryError>;
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// Blocking client for an OpenAI-compatible `/chat/completions` endpoint.
pub struct ChatClient {
    http: Client,
    config: AdvisorConfig,
}

impl ChatClient {
    pub fn new(config: AdvisorConfig) -> Result<Self, AdvisoryError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("budget-buddy/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AdvisoryError::Transport(e.to_string()))?;
        Ok(Self { http, config })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.api_base)
    }
}

impl Advisor for ChatClient {
    fn complete(&self, messages: &[ChatMessage]) -> Result<String, AdvisoryError> {
        let prompt_chars: usize = messages.iter().map(|m| m.content.len()).sum();
        debug!(model = %self.config.model, messages = messages.len(), prompt_chars, "sending chat completion");

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(self.config.api_key.as_str())
            .json(&ChatRequest {
                model: &self.config.model,
                messages,
            })
            .send()
            .map_err(|e| AdvisoryError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = retry_after_secs(&response);
            let body = response.text().unwrap_or_default();
            warn!(status = status.as_u16(), "chat completion failed");
            return Err(classify_status(status, retry_after, body));
        }

        let body = response
            .text()
            .map_err(|e| AdvisoryError::Transport(e.to_string()))?;
        let text = extract_completion(&body)?;
        info!(model = %self.config.model, chars = text.len(), "chat completion received");
        Ok(text)
    }
}

fn retry_after_secs(response: &Response) -> Option<u64> {
    response
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}

/// Map a non-success HTTP status onto the advisory error taxonomy.
pub fn classify_status(status: StatusCode, retry_after: Option<u64>, body: String) -> AdvisoryError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AdvisoryError::Auth(status.as_u16()),
        StatusCode::TOO_MANY_REQUESTS => AdvisoryError::RateLimited { retry_after },
        _ => AdvisoryError::Status {
            code: status.as_u16(),
            body: truncate(&body, 300),
        },
    }
}

/// Pull `choices[0].message.content` out of a response body.
pub fn extract_completion(body: &str) -> Result<String, AdvisoryError> {
    let parsed: ChatResponse =
        serde_json::from_str(body).map_err(|e| AdvisoryError::MalformedResponse(e.to_string()))?;
    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .filter(|text| !text.trim().is_empty())
        .ok_or_else(|| AdvisoryError::MalformedResponse("response contained no completion text".into()))
}

fn truncate(s: &str, max_chars: usize) -> String {
    let s = s.trim();
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let cut: String = s.chars().take(max_chars).collect();
    format!("{cut}…")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serialization() {
        let messages = vec![ChatMessage::system("be kind"), ChatMessage::user("hi")];
        let body = serde_json::to_value(ChatRequest {
            model: "llama-3.3-70b-versatile",
            messages: &messages,
        })
        .unwrap();
        assert_eq!(body["model"], "llama-3.3-70b-versatile");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["messages"][1]["content"], "hi");
    }

    #[test]
    fn test_extract_completion() {
        let body = r#"{
            "id": "chatcmpl-1",
            "choices": [
                {"index": 0, "message": {"role": "assistant", "content": "Brew coffee at home."}, "finish_reason": "stop"}
            ],
            "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
        }"#;
        assert_eq!(extract_completion(body).unwrap(), "Brew coffee at home.");
    }

    #[test]
    fn test_extract_completion_preserves_text() {
        let body = r#"{"choices":[{"message":{"content":"  | Merchant | Cost |\n"}}]}"#;
        assert_eq!(extract_completion(body).unwrap(), "  | Merchant | Cost |\n");
    }

    #[test]
    fn test_extract_completion_malformed() {
        for body in [
            "not json",
            r#"{"choices": []}"#,
            r#"{"choices": [{"message": {"content": null}}]}"#,
            r#"{"choices": [{"message": {"content": "   "}}]}"#,
        ] {
            assert!(
                matches!(extract_completion(body), Err(AdvisoryError::MalformedResponse(_))),
                "{body}"
            );
        }
    }

    #[test]
    fn test_classify_status() {
        assert!(matches!(
            classify_status(StatusCode::UNAUTHORIZED, None, String::new()),
            AdvisoryError::Auth(401)
        ));
        assert!(matches!(
            classify_status(StatusCode::FORBIDDEN, None, String::new()),
            AdvisoryError::Auth(403)
        ));
        assert!(matches!(
            classify_status(StatusCode::TOO_MANY_REQUESTS, Some(30), String::new()),
            AdvisoryError::RateLimited { retry_after: Some(30) }
        ));
        match classify_status(StatusCode::INTERNAL_SERVER_ERROR, None, "boom".into()) {
            AdvisoryError::Status { code, body } => {
                assert_eq!(code, 500);
                assert_eq!(body, "boom");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_truncate_long_bodies() {
        let long = "x".repeat(400);
        let out = truncate(&long, 300);
        assert_eq!(out.chars().count(), 301);
        assert!(out.ends_with('…'));
        assert_eq!(truncate(" short ", 300), "short");
    }
}
