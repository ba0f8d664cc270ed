//! OpenAI-compatible client
//!
//! Standard chat completions API, spoken by OpenAI, DeepSeek, Groq,
//! Mistral, Ollama and (with deployment URLs) Azure OpenAI

use super::{join_url, unrecognized_error, api_error, Completion, CompletionRequest, Vendor, VendorClient};
use crate::models::openai::*;
use crate::models::TokenUsage;
use crate::services::client::{plain_header, secret_header, ClientPolicy, RetryingHttpClient};
use crate::utils::error::{GatewayError, GatewayResult};
use async_trait::async_trait;
use reqwest::header::{HeaderName, AUTHORIZATION};
use reqwest::Url;
use tracing::debug;

/// Azure OpenAI REST API version
pub const AZURE_API_VERSION: &str = "2024-02-01";

/// Request field carrying the sampling seed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedField {
    Seed,
    /// Mistral
    RandomSeed,
}

/// OpenAI-compatible client
pub struct OpenAICompatibleClient {
    vendor: Vendor,
    http: RetryingHttpClient,
    url: String,
    /// Azure selects the model through the deployment URL
    send_model: bool,
    seed_field: SeedField,
}

impl OpenAICompatibleClient {
    /// Bearer-authenticated client for `{base_url}/chat/completions`
    pub fn new(
        vendor: Vendor,
        base_url: &str,
        api_key: &str,
        organization: Option<&str>,
        policy: &ClientPolicy,
    ) -> GatewayResult<Self> {
        let mut headers = vec![(AUTHORIZATION, secret_header(vendor, &format!("Bearer {}", api_key))?)];
        if let Some(organization) = organization.filter(|org| !org.trim().is_empty()) {
            headers.push((HeaderName::from_static("openai-organization"), plain_header(organization.trim())?));
        }

        let seed_field = if vendor == Vendor::Mistral {
            SeedField::RandomSeed
        } else {
            SeedField::Seed
        };

        Ok(Self {
            vendor,
            http: RetryingHttpClient::new(vendor, headers, policy)?,
            url: join_url(base_url, "chat/completions"),
            send_model: true,
            seed_field,
        })
    }

    /// Azure OpenAI client for a resource endpoint and deployment
    pub fn azure(base_url: &str, api_key: &str, deployment: &str, policy: &ClientPolicy) -> GatewayResult<Self> {
        let headers = vec![(HeaderName::from_static("api-key"), secret_header(Vendor::Azure, api_key)?)];

        Ok(Self {
            vendor: Vendor::Azure,
            http: RetryingHttpClient::new(Vendor::Azure, headers, policy)?,
            url: azure_url(base_url, deployment)?,
            send_model: false,
            seed_field: SeedField::Seed,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Translate the canonical request into the chat completions shape
    pub fn build_request(&self, request: &CompletionRequest) -> OpenAIRequest {
        let seed = request.sampling.seed;
        OpenAIRequest {
            model: self.send_model.then(|| request.model.clone()),
            messages: request
                .messages
                .iter()
                .map(|message| OpenAIMessage {
                    role: message.role.as_str().to_string(),
                    content: Some(message.content.clone()),
                })
                .collect(),
            max_tokens: Some(request.max_tokens),
            temperature: Some(request.temperature),
            presence_penalty: Some(request.sampling.presence_penalty),
            frequency_penalty: Some(request.sampling.frequency_penalty),
            response_format: request.json_response.then(OpenAIResponseFormat::json_object),
            seed: (self.seed_field == SeedField::Seed).then_some(seed),
            random_seed: (self.seed_field == SeedField::RandomSeed).then_some(seed),
        }
    }
}

/// `{base}/openai/deployments/{deployment}/chat/completions?api-version=...`
///
/// The deployment is percent-encoded as a single path segment.
fn azure_url(base_url: &str, deployment: &str) -> GatewayResult<String> {
    let invalid = || GatewayError::InvalidConfig(format!("Invalid Azure OpenAI endpoint: {}", base_url));

    let mut url = Url::parse(base_url).map_err(|_| invalid())?;
    url.path_segments_mut()
        .map_err(|_| invalid())?
        .pop_if_empty()
        .extend(["openai", "deployments", deployment, "chat", "completions"]);
    url.query_pairs_mut().append_pair("api-version", AZURE_API_VERSION);

    Ok(url.into())
}

/// Parse `{"error":{"message","type","code"}}`
pub fn parse_error_body(vendor: Vendor, status: u16, body: &str) -> GatewayError {
    match serde_json::from_str::<OpenAIErrorResponse>(body) {
        Ok(error_response) => {
            let error = error_response.error;
            let code = error.code.map(|code| match code {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            });
            api_error(vendor, status, error.message, error.error_type, code)
        }
        Err(_) => unrecognized_error(vendor, status, body),
    }
}

#[async_trait]
impl VendorClient for OpenAICompatibleClient {
    fn vendor(&self) -> Vendor {
        self.vendor
    }

    async fn complete(&self, request: &CompletionRequest) -> GatewayResult<Completion> {
        debug!("Sending {} chat completion request", self.vendor);

        let body = self.build_request(request);
        let response: OpenAIResponse = self.http.post_json(&self.url, &body, parse_error_body).await?;

        Ok(Completion {
            content: response.first_content().map(str::to_string),
            usage: response.usage.map(|usage| TokenUsage {
                prompt_tokens: usage.prompt_tokens,
                completion_tokens: usage.completion_tokens,
                total_tokens: usage.total_tokens,
            }),
        })
    }
}
