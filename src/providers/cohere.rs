//! Cohere v2 chat client

use super::{api_error, join_url, unrecognized_error, Completion, CompletionRequest, Vendor, VendorClient};
use crate::models::cohere::*;
use crate::models::openai::OpenAIResponseFormat;
use crate::models::TokenUsage;
use crate::services::client::{secret_header, ClientPolicy, RetryingHttpClient};
use crate::utils::error::{GatewayError, GatewayResult};
use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use tracing::debug;

pub struct CohereClient {
    http: RetryingHttpClient,
    url: String,
}

impl CohereClient {
    pub fn new(base_url: &str, api_key: &str, policy: &ClientPolicy) -> GatewayResult<Self> {
        let headers = vec![(AUTHORIZATION, secret_header(Vendor::Cohere, &format!("Bearer {}", api_key))?)];

        Ok(Self {
            http: RetryingHttpClient::new(Vendor::Cohere, headers, policy)?,
            url: join_url(base_url, "chat"),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn build_request(&self, request: &CompletionRequest) -> CohereRequest {
        CohereRequest {
            model: request.model.clone(),
            messages: request
                .messages
                .iter()
                .map(|message| CohereMessage {
                    role: message.role.as_str().to_string(),
                    content: message.content.clone(),
                })
                .collect(),
            temperature: Some(request.temperature),
            max_tokens: Some(request.max_tokens),
            seed: Some(request.sampling.seed),
            presence_penalty: Some(request.sampling.presence_penalty),
            frequency_penalty: Some(request.sampling.frequency_penalty),
            response_format: request.json_response.then(OpenAIResponseFormat::json_object),
        }
    }
}

/// Parse `{"message": ...}`
pub fn parse_error_body(vendor: Vendor, status: u16, body: &str) -> GatewayError {
    match serde_json::from_str::<CohereErrorResponse>(body) {
        Ok(response) => api_error(vendor, status, response.message, Some("http_error".to_string()), None),
        Err(_) => unrecognized_error(vendor, status, body),
    }
}

fn token_count(value: f64) -> u32 {
    if value.is_finite() && value > 0.0 {
        value.round().min(u32::MAX as f64) as u32
    } else {
        0
    }
}

#[async_trait]
impl VendorClient for CohereClient {
    fn vendor(&self) -> Vendor {
        Vendor::Cohere
    }

    async fn complete(&self, request: &CompletionRequest) -> GatewayResult<Completion> {
        debug!("Sending Cohere chat request");

        let body = self.build_request(request);
        let response: CohereResponse = self.http.post_json(&self.url, &body, parse_error_body).await?;

        let usage = response.usage.as_ref().and_then(|usage| usage.tokens.as_ref()).map(|tokens| {
            let prompt_tokens = token_count(tokens.input_tokens);
            let completion_tokens = token_count(tokens.output_tokens);
            TokenUsage {
                prompt_tokens,
                completion_tokens,
                total_tokens: prompt_tokens.saturating_add(completion_tokens),
            }
        });

        Ok(Completion {
            content: response.text(),
            usage,
        })
    }
}
