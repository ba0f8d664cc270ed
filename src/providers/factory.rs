//! Provider factory
//!
//! Maps a `ProviderConfig` onto a ready `LLMProvider`, validating the
//! credential and endpoint eagerly

use super::anthropic::AnthropicClient;
use super::cohere::CohereClient;
use super::gemini::GeminiClient;
use super::openai::OpenAICompatibleClient;
use super::{AdapterSettings, Dialect, LLMProvider, Vendor, VendorAdapter, VendorClient};
use super::{DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE};
use crate::config::ProviderConfig;
use crate::services::call_log::CallLogger;
use crate::services::client::{ClientPolicy, RetryConfig, DEFAULT_TIMEOUT_SECS};
use crate::utils::error::{GatewayError, GatewayResult};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Builds vendor adapters that all share one call logger
#[derive(Clone)]
pub struct ProviderFactory {
    logger: Arc<dyn CallLogger>,
}

impl ProviderFactory {
    pub fn new(logger: Arc<dyn CallLogger>) -> Self {
        Self { logger }
    }

    /// Closed set of vendors this factory can build
    pub fn supported_vendors() -> &'static [Vendor] {
        &Vendor::ALL
    }

    /// Create the provider described by `config`
    pub fn create(&self, config: &ProviderConfig) -> GatewayResult<Arc<dyn LLMProvider>> {
        let vendor: Vendor = config.vendor.parse()?;

        let api_key = config.api_key.trim();
        if api_key.is_empty() {
            return Err(GatewayError::MissingCredential { vendor });
        }

        let profile = vendor.profile();
        let base_url = resolve_base_url(vendor, profile.default_base_url, config.base_url.as_deref())?;

        let settings = resolve_settings(vendor, profile.default_model, config)?;
        let policy = resolve_policy(config)?;

        let client: Box<dyn VendorClient> = match profile.dialect {
            Dialect::OpenAICompatible => Box::new(OpenAICompatibleClient::new(
                vendor,
                &base_url,
                api_key,
                config.organization.as_deref(),
                &policy,
            )?),
            Dialect::AzureOpenAI => Box::new(OpenAICompatibleClient::azure(
                &base_url,
                api_key,
                &settings.model,
                &policy,
            )?),
            Dialect::Anthropic => Box::new(AnthropicClient::new(&base_url, api_key, &policy)?),
            Dialect::Gemini => Box::new(GeminiClient::new(&base_url, api_key, &policy)?),
            Dialect::Cohere => Box::new(CohereClient::new(&base_url, api_key, &policy)?),
        };

        info!(
            "Created {} provider (model: {}, base URL: {}, retries: {}, timeout: {}s)",
            vendor,
            settings.model,
            base_url,
            policy.retry.max_retries,
            policy.timeout.as_secs()
        );

        Ok(Arc::new(VendorAdapter::new(vendor, settings, client, self.logger.clone())))
    }
}

fn resolve_base_url(vendor: Vendor, default: Option<&str>, configured: Option<&str>) -> GatewayResult<String> {
    let configured = configured.map(str::trim).filter(|url| !url.is_empty());

    let base_url = configured.or(default).ok_or_else(|| {
        GatewayError::InvalidConfig(format!("{} requires a base URL", vendor))
    })?;

    if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
        return Err(GatewayError::InvalidConfig(format!(
            "{} base URL must start with http:// or https://, got: {}",
            vendor, base_url
        )));
    }

    Ok(base_url.trim_end_matches('/').to_string())
}

fn resolve_settings(vendor: Vendor, default_model: &str, config: &ProviderConfig) -> GatewayResult<AdapterSettings> {
    let temperature = config.temperature.unwrap_or(DEFAULT_TEMPERATURE);
    if !temperature.is_finite() || temperature < 0.0 {
        return Err(GatewayError::InvalidConfig(format!(
            "{} temperature must be a non-negative number, got: {}",
            vendor, temperature
        )));
    }

    let max_tokens = config.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS);
    if max_tokens == 0 {
        return Err(GatewayError::InvalidConfig(format!("{} max tokens must be greater than 0", vendor)));
    }

    let model = config
        .model
        .as_deref()
        .map(str::trim)
        .filter(|model| !model.is_empty())
        .unwrap_or(default_model)
        .to_string();

    let system_prompt = config
        .system_prompt
        .as_deref()
        .filter(|prompt| !prompt.trim().is_empty())
        .map(str::to_string);

    Ok(AdapterSettings {
        model,
        temperature,
        max_tokens,
        system_prompt,
    })
}

fn resolve_policy(config: &ProviderConfig) -> GatewayResult<ClientPolicy> {
    let timeout_secs = config.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS);
    if timeout_secs == 0 {
        return Err(GatewayError::InvalidConfig("timeout must be greater than 0 seconds".to_string()));
    }

    let mut retry = RetryConfig::default();
    if let Some(max_retries) = config.max_retries {
        retry.max_retries = max_retries;
    }

    Ok(ClientPolicy {
        timeout: Duration::from_secs(timeout_secs),
        retry,
    })
}
