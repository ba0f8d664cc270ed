//! Anthropic Messages API client

use super::{api_error, join_url, unrecognized_error, Completion, CompletionRequest, Vendor, VendorClient};
use crate::models::anthropic::*;
use crate::models::{ChatRole, TokenUsage};
use crate::services::client::{secret_header, ClientPolicy, RetryingHttpClient};
use crate::utils::error::{GatewayError, GatewayResult};
use async_trait::async_trait;
use reqwest::header::{HeaderName, HeaderValue};
use tracing::debug;

/// `anthropic-version` header value
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

pub struct AnthropicClient {
    http: RetryingHttpClient,
    url: String,
}

impl AnthropicClient {
    pub fn new(base_url: &str, api_key: &str, policy: &ClientPolicy) -> GatewayResult<Self> {
        let headers = vec![
            (HeaderName::from_static("x-api-key"), secret_header(Vendor::Anthropic, api_key)?),
            (HeaderName::from_static("anthropic-version"), HeaderValue::from_static(ANTHROPIC_VERSION)),
        ];

        Ok(Self {
            http: RetryingHttpClient::new(Vendor::Anthropic, headers, policy)?,
            url: join_url(base_url, "messages"),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// System messages move to the top-level `system` field. The Messages
    /// API has no seed or penalty knobs, so sampling hints are dropped.
    pub fn build_request(&self, request: &CompletionRequest) -> AnthropicRequest {
        let mut system_parts = Vec::new();
        let mut messages = Vec::new();

        for message in &request.messages {
            match message.role {
                ChatRole::System => system_parts.push(message.content.as_str()),
                ChatRole::User | ChatRole::Assistant => messages.push(AnthropicMessage {
                    role: message.role.as_str().to_string(),
                    content: message.content.clone(),
                }),
            }
        }

        AnthropicRequest {
            model: request.model.clone(),
            max_tokens: request.max_tokens,
            messages,
            system: (!system_parts.is_empty()).then(|| system_parts.join("\n\n")),
            temperature: Some(request.temperature),
        }
    }
}

/// Parse `{"type":"error","error":{"type","message"}}`
pub fn parse_error_body(vendor: Vendor, status: u16, body: &str) -> GatewayError {
    match serde_json::from_str::<AnthropicErrorResponse>(body) {
        Ok(response) => api_error(vendor, status, response.error.message, Some(response.error.error_type), None),
        Err(_) => unrecognized_error(vendor, status, body),
    }
}

#[async_trait]
impl VendorClient for AnthropicClient {
    fn vendor(&self) -> Vendor {
        Vendor::Anthropic
    }

    async fn complete(&self, request: &CompletionRequest) -> GatewayResult<Completion> {
        debug!("Sending Anthropic messages request");

        let body = self.build_request(request);
        let response: AnthropicResponse = self.http.post_json(&self.url, &body, parse_error_body).await?;

        let text = response.text();
        Ok(Completion {
            content: (!response.content.is_empty()).then_some(text),
            usage: response.usage.map(|usage| TokenUsage {
                prompt_tokens: usage.input_tokens,
                completion_tokens: usage.output_tokens,
                total_tokens: usage.input_tokens.saturating_add(usage.output_tokens),
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ChatMessage;
    use crate::providers::SamplingHints;

    #[test]
    fn test_system_messages_are_lifted() {
        let client = AnthropicClient::new("https://api.anthropic.com/v1", "key", &ClientPolicy::default()).unwrap();
        assert_eq!(client.url(), "https://api.anthropic.com/v1/messages");

        let request = CompletionRequest {
            model: "claude-3-5-sonnet-latest".to_string(),
            messages: vec![
                ChatMessage::system("You are terse."),
                ChatMessage::user("Hello"),
                ChatMessage::assistant("Hi"),
                ChatMessage::user("Bye"),
            ],
            temperature: 0.0,
            max_tokens: 256,
            json_response: true,
            sampling: SamplingHints::default(),
        };

        let body = client.build_request(&request);
        assert_eq!(body.system.as_deref(), Some("You are terse."));
        assert_eq!(body.messages.len(), 3);
        assert_eq!(body.messages[0].role, "user");
        assert_eq!(body.messages[1].role, "assistant");
        assert_eq!(body.temperature, Some(0.0));
        assert_eq!(body.max_tokens, 256);
    }

    #[test]
    fn test_parse_error_body() {
        let body = r#"{"type":"error","error":{"type":"overloaded_error","message":"Overloaded"}}"#;
        let error = parse_error_body(Vendor::Anthropic, 529, body);
        assert_eq!(error.to_string(), "Anthropic API Error: Overloaded (Type: overloaded_error, Code: none)");
    }
}
