//! Provider module
//!
//! Defines the vendor table, the wire-level `VendorClient` seam, the
//! `LLMProvider` capability trait and their implementations

pub mod adapter;
pub mod anthropic;
pub mod cohere;
pub mod factory;
pub mod gemini;
pub mod openai;

use crate::models::{ChatMessage, ChatResponse, InsightData, TokenUsage, TransactionData};
use crate::utils::error::{GatewayError, GatewayResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default sampling temperature when the caller omits one
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Default maximum output tokens when the caller omits them
pub const DEFAULT_MAX_TOKENS: u32 = 4000;

/// Fixed sampling seed requested on every call
pub const SAMPLING_SEED: u32 = 42;

/// Presence penalty requested on every call
pub const PRESENCE_PENALTY: f32 = 0.1;

/// Frequency penalty requested on every call
pub const FREQUENCY_PENALTY: f32 = 0.1;

/// Supported LLM vendors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Vendor {
    OpenAI,
    DeepSeek,
    Groq,
    Mistral,
    Ollama,
    Azure,
    Anthropic,
    Gemini,
    Cohere,
}

/// Wire format family a vendor speaks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// `POST {base}/chat/completions` with Bearer auth
    OpenAICompatible,
    /// OpenAI shape behind deployment URLs and `api-key` auth
    AzureOpenAI,
    /// `POST {base}/messages`
    Anthropic,
    /// `POST {base}/models/{model}:generateContent`
    Gemini,
    /// `POST {base}/chat` (v2)
    Cohere,
}

/// Static per-vendor defaults
#[derive(Debug, Clone, Copy)]
pub struct VendorProfile {
    pub default_model: &'static str,
    /// `None` means the caller must supply a base URL
    pub default_base_url: Option<&'static str>,
    pub dialect: Dialect,
    /// Environment variable consulted when a config file leaves the key empty
    pub api_key_env: &'static str,
}

impl Vendor {
    /// Every supported vendor
    pub const ALL: [Vendor; 9] = [
        Vendor::OpenAI,
        Vendor::DeepSeek,
        Vendor::Groq,
        Vendor::Mistral,
        Vendor::Ollama,
        Vendor::Azure,
        Vendor::Anthropic,
        Vendor::Gemini,
        Vendor::Cohere,
    ];

    /// Selector string, as used in configuration and log records
    pub fn id(&self) -> &'static str {
        match self {
            Vendor::OpenAI => "openai",
            Vendor::DeepSeek => "deepseek",
            Vendor::Groq => "groq",
            Vendor::Mistral => "mistral",
            Vendor::Ollama => "ollama",
            Vendor::Azure => "azure",
            Vendor::Anthropic => "anthropic",
            Vendor::Gemini => "gemini",
            Vendor::Cohere => "cohere",
        }
    }

    /// Human-readable vendor name
    pub fn display_name(&self) -> &'static str {
        match self {
            Vendor::OpenAI => "OpenAI",
            Vendor::DeepSeek => "DeepSeek",
            Vendor::Groq => "Groq",
            Vendor::Mistral => "Mistral",
            Vendor::Ollama => "Ollama",
            Vendor::Azure => "Azure OpenAI",
            Vendor::Anthropic => "Anthropic",
            Vendor::Gemini => "Gemini",
            Vendor::Cohere => "Cohere",
        }
    }

    pub fn profile(&self) -> VendorProfile {
        match self {
            Vendor::OpenAI => VendorProfile {
                default_model: "gpt-4-turbo-preview",
                default_base_url: Some("https://api.openai.com/v1"),
                dialect: Dialect::OpenAICompatible,
                api_key_env: "OPENAI_API_KEY",
            },
            Vendor::DeepSeek => VendorProfile {
                default_model: "deepseek-chat",
                default_base_url: Some("https://api.deepseek.com/v1"),
                dialect: Dialect::OpenAICompatible,
                api_key_env: "DEEPSEEK_API_KEY",
            },
            Vendor::Groq => VendorProfile {
                default_model: "llama-3.3-70b-versatile",
                default_base_url: Some("https://api.groq.com/openai/v1"),
                dialect: Dialect::OpenAICompatible,
                api_key_env: "GROQ_API_KEY",
            },
            Vendor::Mistral => VendorProfile {
                default_model: "mistral-large-latest",
                default_base_url: Some("https://api.mistral.ai/v1"),
                dialect: Dialect::OpenAICompatible,
                api_key_env: "MISTRAL_API_KEY",
            },
            Vendor::Ollama => VendorProfile {
                default_model: "llama3.1",
                default_base_url: Some("http://localhost:11434/v1"),
                dialect: Dialect::OpenAICompatible,
                api_key_env: "OLLAMA_API_KEY",
            },
            Vendor::Azure => VendorProfile {
                default_model: "gpt-4o",
                default_base_url: None,
                dialect: Dialect::AzureOpenAI,
                api_key_env: "AZURE_OPENAI_API_KEY",
            },
            Vendor::Anthropic => VendorProfile {
                default_model: "claude-3-5-sonnet-latest",
                default_base_url: Some("https://api.anthropic.com/v1"),
                dialect: Dialect::Anthropic,
                api_key_env: "ANTHROPIC_API_KEY",
            },
            Vendor::Gemini => VendorProfile {
                default_model: "gemini-1.5-pro",
                default_base_url: Some("https://generativelanguage.googleapis.com/v1beta"),
                dialect: Dialect::Gemini,
                api_key_env: "GEMINI_API_KEY",
            },
            Vendor::Cohere => VendorProfile {
                default_model: "command-r-plus",
                default_base_url: Some("https://api.cohere.com/v2"),
                dialect: Dialect::Cohere,
                api_key_env: "COHERE_API_KEY",
            },
        }
    }
}

impl fmt::Display for Vendor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Vendor {
    type Err = GatewayError;

    fn from_str(selector: &str) -> Result<Self, Self::Err> {
        let normalized = selector.trim().to_lowercase();
        let vendor = match normalized.as_str() {
            "azure-openai" | "azure_openai" => Vendor::Azure,
            "google" => Vendor::Gemini,
            other => Vendor::ALL
                .into_iter()
                .find(|vendor| vendor.id() == other)
                .ok_or_else(|| GatewayError::UnsupportedVendor(selector.to_string()))?,
        };
        Ok(vendor)
    }
}

/// Sampling hints sent on every call, honored where the vendor has the knob
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingHints {
    pub seed: u32,
    pub presence_penalty: f32,
    pub frequency_penalty: f32,
}

impl Default for SamplingHints {
    fn default() -> Self {
        Self {
            seed: SAMPLING_SEED,
            presence_penalty: PRESENCE_PENALTY,
            frequency_penalty: FREQUENCY_PENALTY,
        }
    }
}

/// Canonical outbound request handed to a vendor client
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub model: String,
    /// Full ordered conversation, system prompt already prepended
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Ask the vendor for a JSON object response
    pub json_response: bool,
    pub sampling: SamplingHints,
}

/// Canonical vendor reply
#[derive(Debug, Clone, Default)]
pub struct Completion {
    /// Reply text, untrimmed
    pub content: Option<String>,
    pub usage: Option<TokenUsage>,
}

/// Wire-level client for one vendor dialect
///
/// Implementations translate a `CompletionRequest` into the vendor's
/// call shape and normalize replies and errors back.
#[async_trait]
pub trait VendorClient: Send + Sync {
    /// Vendor this client talks to
    fn vendor(&self) -> Vendor;

    /// Issue one completion call
    async fn complete(&self, request: &CompletionRequest) -> GatewayResult<Completion>;
}

/// Capability interface implemented identically for every vendor
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Configured vendor
    fn vendor(&self) -> Vendor;

    /// Resolved model identifier
    fn model(&self) -> &str;

    /// Produce structured insights from transaction data
    async fn analyze(&self, data: &TransactionData) -> GatewayResult<InsightData>;

    /// Continue a conversation
    async fn chat(&self, messages: &[ChatMessage]) -> GatewayResult<ChatResponse>;
}

/// Join a base URL and a path segment
pub(crate) fn join_url(base_url: &str, path: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), path.trim_start_matches('/'))
}

/// Build a normalized vendor error
pub(crate) fn api_error(
    vendor: Vendor,
    status: u16,
    message: impl Into<String>,
    error_type: Option<String>,
    code: Option<String>,
) -> GatewayError {
    GatewayError::VendorApi {
        vendor,
        status: Some(status),
        message: message.into(),
        error_type,
        code,
    }
}

/// Error for a non-success body whose shape is not recognized
pub(crate) fn unrecognized_error(vendor: Vendor, status: u16, body: &str) -> GatewayError {
    let body = body.trim();
    let message = if body.is_empty() {
        format!("HTTP {}", status)
    } else {
        body.to_string()
    };
    api_error(vendor, status, message, Some("http_error".to_string()), None)
}

pub use adapter::{AdapterSettings, VendorAdapter};
pub use factory::ProviderFactory;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vendor_from_str() {
        assert_eq!("openai".parse::<Vendor>().unwrap(), Vendor::OpenAI);
        assert_eq!(" DeepSeek ".parse::<Vendor>().unwrap(), Vendor::DeepSeek);
        assert_eq!("azure-openai".parse::<Vendor>().unwrap(), Vendor::Azure);
        assert_eq!("google".parse::<Vendor>().unwrap(), Vendor::Gemini);

        let err = "bard".parse::<Vendor>().unwrap_err();
        assert!(matches!(err, GatewayError::UnsupportedVendor(ref s) if s == "bard"));
    }

    #[test]
    fn test_every_vendor_round_trips_through_id() {
        for vendor in Vendor::ALL {
            assert_eq!(vendor.id().parse::<Vendor>().unwrap(), vendor);
            let json = serde_json::to_value(vendor).unwrap();
            assert_eq!(json, serde_json::Value::String(vendor.id().to_string()));
        }
    }

    #[test]
    fn test_only_azure_lacks_default_base_url() {
        let missing: Vec<Vendor> = Vendor::ALL
            .into_iter()
            .filter(|vendor| vendor.profile().default_base_url.is_none())
            .collect();
        assert_eq!(missing, vec![Vendor::Azure]);
    }

    #[test]
    fn test_join_url() {
        assert_eq!(join_url("https://api.openai.com/v1", "chat/completions"), "https://api.openai.com/v1/chat/completions");
        assert_eq!(join_url("https://api.openai.com/v1/", "/chat/completions"), "https://api.openai.com/v1/chat/completions");
    }

    #[test]
    fn test_unrecognized_error_keeps_body() {
        let err = unrecognized_error(Vendor::Ollama, 502, "  bad gateway ");
        match err {
            GatewayError::VendorApi { status, message, error_type, .. } => {
                assert_eq!(status, Some(502));
                assert_eq!(message, "bad gateway");
                assert_eq!(error_type.as_deref(), Some("http_error"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
