//! File-based configuration loading
//!
//! Loads server and provider configuration from a JSON file

use crate::providers::Vendor;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Environment variable naming an explicit config file
pub const CONFIG_PATH_ENV: &str = "LLMGATEWAY_CONFIG";

/// Config file name searched in default locations
pub const CONFIG_FILE_NAME: &str = "llmgateway.json";

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen host (default: "127.0.0.1" - localhost only)
    #[serde(default = "default_host")]
    pub host: String,

    /// Listen port (default: 8082)
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8082
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Application configuration loaded from JSON file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Server configuration (optional, defaults to localhost:8082)
    #[serde(default)]
    pub server: ServerConfig,

    /// The single configured LLM provider
    pub provider: ProviderConfig,
}

/// Provider configuration
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfig {
    /// Vendor selector (e.g., "openai", "anthropic", "azure-openai")
    pub vendor: String,

    /// API key (can be empty if using env var)
    #[serde(default)]
    pub api_key: String,

    /// Model identifier; Azure uses it as the deployment name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Base URL override (required for Azure)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// OpenAI organization identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,

    /// Transport retries (default: 3)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_retries: Option<u32>,

    /// Per-request timeout in seconds (default: 60)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let api_key = if self.api_key.is_empty() { "" } else { "[redacted]" };
        f.debug_struct("ProviderConfig")
            .field("vendor", &self.vendor)
            .field("api_key", &api_key)
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("organization", &self.organization)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("system_prompt", &self.system_prompt)
            .field("max_retries", &self.max_retries)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl ProviderConfig {
    /// Fill an empty API key from the vendor's environment variable
    pub fn apply_env_credentials(&mut self) {
        self.apply_credentials_from(|name| std::env::var(name).ok());
    }

    /// Fill an empty API key through `lookup`
    pub fn apply_credentials_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if !self.api_key.trim().is_empty() {
            return;
        }
        let Ok(vendor) = self.vendor.parse::<Vendor>() else {
            return;
        };

        let env_name = vendor.profile().api_key_env;
        if let Some(key) = lookup(env_name).filter(|key| !key.trim().is_empty()) {
            debug!("Using {} from environment for {}", env_name, vendor);
            self.api_key = key;
        }
    }
}

impl AppConfig {
    /// Load configuration from JSON file
    pub fn load(path: &Path) -> Result<Self> {
        info!("Loading configuration from: {:?}", path);

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let mut config: AppConfig = serde_json::from_str(&content)
            .with_context(|| "Failed to parse config JSON")?;

        config.provider.apply_env_credentials();
        config.validate()?;

        debug!("Loaded provider configuration: {:?}", config.provider);
        Ok(config)
    }

    /// Load configuration from default locations
    /// Searches in order:
    /// 1. $LLMGATEWAY_CONFIG
    /// 2. ~/.config/llmgateway/llmgateway.json
    /// 3. ./llmgateway.json
    ///
    /// Returns error if no configuration file is found.
    pub fn load_default() -> Result<Self> {
        if let Ok(explicit) = std::env::var(CONFIG_PATH_ENV) {
            return Self::load(Path::new(&explicit));
        }

        let path = Self::default_locations()
            .into_iter()
            .find(|path| path.exists())
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "Configuration file not found. Please create one at:\n\
                     - ~/.config/llmgateway/llmgateway.json (recommended)\n\
                     - ./llmgateway.json (current directory)\n\
                     or point {} at a config file.",
                    CONFIG_PATH_ENV
                )
            })?;

        Self::load(&path)
    }

    /// Default search locations, most specific first
    pub fn default_locations() -> Vec<PathBuf> {
        let mut locations = Vec::new();
        if let Some(home) = dirs::home_dir() {
            locations.push(home.join(".config").join("llmgateway").join(CONFIG_FILE_NAME));
        }
        locations.push(PathBuf::from(CONFIG_FILE_NAME));
        locations
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            anyhow::bail!("Port number cannot be 0");
        }

        let provider = &self.provider;
        let vendor: Vendor = provider
            .vendor
            .parse()
            .with_context(|| format!("Invalid provider vendor '{}'", provider.vendor))?;

        if let Some(base_url) = provider.base_url.as_deref() {
            if !base_url.starts_with("http") {
                anyhow::bail!("Invalid base URL for {}: {}", vendor, base_url);
            }
        }

        if provider.max_tokens == Some(0) {
            anyhow::bail!("maxTokens for {} must be greater than 0", vendor);
        }

        if provider.timeout_secs == Some(0) {
            anyhow::bail!("timeoutSecs for {} must be greater than 0", vendor);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_config() {
        let file = write_config(
            r#"{
                "server": {"port": 9000},
                "provider": {
                    "vendor": "deepseek",
                    "apiKey": "sk-file",
                    "model": "deepseek-reasoner",
                    "temperature": 0.2,
                    "maxTokens": 1024,
                    "systemPrompt": "You are a finance coach."
                }
            }"#,
        );

        let config = AppConfig::load(file.path()).unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.provider.vendor, "deepseek");
        assert_eq!(config.provider.api_key, "sk-file");
        assert_eq!(config.provider.model.as_deref(), Some("deepseek-reasoner"));
        assert_eq!(config.provider.max_tokens, Some(1024));
        assert!(config.provider.base_url.is_none());
    }

    #[test]
    fn test_validation_unknown_vendor() {
        let file = write_config(r#"{"provider": {"vendor": "palm", "apiKey": "k"}}"#);
        assert!(AppConfig::load(file.path()).is_err());
    }

    #[test]
    fn test_validation_invalid_base_url() {
        let file = write_config(r#"{"provider": {"vendor": "ollama", "apiKey": "k", "baseUrl": "localhost:11434"}}"#);
        assert!(AppConfig::load(file.path()).is_err());
    }

    #[test]
    fn test_credentials_from_lookup() {
        let mut config = ProviderConfig {
            vendor: "anthropic".to_string(),
            ..Default::default()
        };
        config.apply_credentials_from(|name| (name == "ANTHROPIC_API_KEY").then(|| "sk-ant".to_string()));
        assert_eq!(config.api_key, "sk-ant");

        let mut explicit = ProviderConfig {
            vendor: "anthropic".to_string(),
            api_key: "from-file".to_string(),
            ..Default::default()
        };
        explicit.apply_credentials_from(|_| Some("from-env".to_string()));
        assert_eq!(explicit.api_key, "from-file");
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = ProviderConfig {
            vendor: "openai".to_string(),
            api_key: "sk-secret".to_string(),
            ..Default::default()
        };
        let debug = format!("{:?}", config);
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("[redacted]"));
    }
}
