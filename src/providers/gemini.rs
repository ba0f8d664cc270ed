//! Gemini generateContent client

use super::{api_error, join_url, unrecognized_error, Completion, CompletionRequest, Vendor, VendorClient};
use crate::models::gemini::*;
use crate::models::{ChatRole, TokenUsage};
use crate::services::client::{secret_header, ClientPolicy, RetryingHttpClient};
use crate::utils::error::{GatewayError, GatewayResult};
use async_trait::async_trait;
use reqwest::header::HeaderName;
use tracing::debug;

pub struct GeminiClient {
    http: RetryingHttpClient,
    base_url: String,
}

impl GeminiClient {
    pub fn new(base_url: &str, api_key: &str, policy: &ClientPolicy) -> GatewayResult<Self> {
        let headers = vec![(HeaderName::from_static("x-goog-api-key"), secret_header(Vendor::Gemini, api_key)?)];

        Ok(Self {
            http: RetryingHttpClient::new(Vendor::Gemini, headers, policy)?,
            base_url: base_url.to_string(),
        })
    }

    /// Endpoint for a model
    pub fn url_for(&self, model: &str) -> String {
        join_url(&self.base_url, &format!("models/{}:generateContent", model))
    }

    pub fn build_request(&self, request: &CompletionRequest) -> GeminiRequest {
        let mut system_parts = Vec::new();
        let mut contents = Vec::new();

        for message in &request.messages {
            match message.role {
                ChatRole::System => system_parts.push(message.content.as_str()),
                ChatRole::User => contents.push(GeminiContent::text(Some("user"), message.content.clone())),
                ChatRole::Assistant => contents.push(GeminiContent::text(Some("model"), message.content.clone())),
            }
        }

        GeminiRequest {
            contents,
            system_instruction: (!system_parts.is_empty()).then(|| GeminiContent::text(None, system_parts.join("\n\n"))),
            generation_config: GeminiGenerationConfig {
                temperature: Some(request.temperature),
                max_output_tokens: Some(request.max_tokens),
                response_mime_type: request.json_response.then(|| "application/json".to_string()),
                seed: Some(request.sampling.seed),
                presence_penalty: Some(request.sampling.presence_penalty),
                frequency_penalty: Some(request.sampling.frequency_penalty),
            },
        }
    }
}

/// Parse `{"error":{"code","message","status"}}`
pub fn parse_error_body(vendor: Vendor, status: u16, body: &str) -> GatewayError {
    match serde_json::from_str::<GeminiErrorResponse>(body) {
        Ok(response) => {
            let error = response.error;
            api_error(vendor, status, error.message, error.status, error.code.map(|code| code.to_string()))
        }
        Err(_) => unrecognized_error(vendor, status, body),
    }
}

#[async_trait]
impl VendorClient for GeminiClient {
    fn vendor(&self) -> Vendor {
        Vendor::Gemini
    }

    async fn complete(&self, request: &CompletionRequest) -> GatewayResult<Completion> {
        let url = self.url_for(&request.model);
        debug!("Sending Gemini generateContent request for {}", request.model);

        let body = self.build_request(request);
        let response: GeminiResponse = self.http.post_json(&url, &body, parse_error_body).await?;

        Ok(Completion {
            content: response.text(),
            usage: response.usage_metadata.map(|usage| TokenUsage {
                prompt_tokens: usage.prompt_token_count,
                completion_tokens: usage.candidates_token_count,
                total_tokens: usage.total_token_count,
            }),
        })
    }
}
