//! Configuration module tests

use llmgateway::config::{AppConfig, ProviderConfig, Settings};
use std::collections::HashMap;
use std::env;
use std::io::Write;
use tempfile::NamedTempFile;

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_load_full_provider_config() {
    let file = write_config(
        r#"{
            "server": { "host": "0.0.0.0", "port": 9090 },
            "provider": {
                "vendor": "anthropic",
                "apiKey": "sk-ant-test",
                "model": "claude-3-5-haiku-latest",
                "temperature": 0.2,
                "maxTokens": 1024,
                "systemPrompt": "You are a finance coach.",
                "maxRetries": 1,
                "timeoutSecs": 15
            }
        }"#,
    );

    let config = AppConfig::load(file.path()).unwrap();
    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.server.port, 9090);

    let provider = &config.provider;
    assert_eq!(provider.vendor, "anthropic");
    assert_eq!(provider.api_key, "sk-ant-test");
    assert_eq!(provider.model.as_deref(), Some("claude-3-5-haiku-latest"));
    assert_eq!(provider.temperature, Some(0.2));
    assert_eq!(provider.max_tokens, Some(1024));
    assert_eq!(provider.system_prompt.as_deref(), Some("You are a finance coach."));
    assert_eq!(provider.max_retries, Some(1));
    assert_eq!(provider.timeout_secs, Some(15));
}

#[test]
fn test_server_section_is_optional() {
    let file = write_config(r#"{ "provider": { "vendor": "groq", "apiKey": "gsk-test" } }"#);

    let config = AppConfig::load(file.path()).unwrap();
    assert_eq!(config.server.host, "127.0.0.1");
    assert_eq!(config.server.port, 8082);
    assert!(config.provider.model.is_none());
}

#[test]
fn test_load_rejects_bad_files() {
    let cases = [
        r#"{ "provider": { "vendor": "bard", "apiKey": "k" } }"#,
        r#"{ "provider": { "vendor": "openai", "apiKey": "k", "baseUrl": "ftp://x" } }"#,
        r#"{ "provider": { "vendor": "openai", "apiKey": "k", "maxTokens": 0 } }"#,
        r#"{ "provider": { "vendor": "openai", "apiKey": "k", "timeoutSecs": 0 } }"#,
        r#"{ "server": { "port": 0 }, "provider": { "vendor": "openai", "apiKey": "k" } }"#,
        r#"{ "provider": "#,
    ];

    for content in cases {
        let file = write_config(content);
        assert!(AppConfig::load(file.path()).is_err(), "accepted: {content}");
    }
}

#[test]
fn test_missing_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = AppConfig::load(&dir.path().join("absent.json")).unwrap_err();
    assert!(err.to_string().contains("Failed to read config file"));
}

#[test]
fn test_credentials_from_lookup() {
    let vars: HashMap<&str, &str> = [
        ("MISTRAL_API_KEY", "mistral-env-key"),
        ("GEMINI_API_KEY", "   "),
    ]
    .into_iter()
    .collect();
    let lookup = |name: &str| vars.get(name).map(|value| value.to_string());

    let mut mistral = ProviderConfig {
        vendor: "mistral".to_string(),
        ..Default::default()
    };
    mistral.apply_credentials_from(lookup);
    assert_eq!(mistral.api_key, "mistral-env-key");

    let mut explicit = ProviderConfig {
        vendor: "mistral".to_string(),
        api_key: "from-file".to_string(),
        ..Default::default()
    };
    explicit.apply_credentials_from(lookup);
    assert_eq!(explicit.api_key, "from-file");

    let mut blank_env = ProviderConfig {
        vendor: "google".to_string(),
        ..Default::default()
    };
    blank_env.apply_credentials_from(lookup);
    assert!(blank_env.api_key.is_empty());
}

#[test]
fn test_provider_debug_redacts_key() {
    let config = ProviderConfig {
        vendor: "openai".to_string(),
        api_key: "sk-live-secret".to_string(),
        ..Default::default()
    };
    let rendered = format!("{:?}", config);
    assert!(!rendered.contains("sk-live-secret"));
    assert!(rendered.contains("[redacted]"));
}

#[test]
fn test_default_locations_end_with_working_directory() {
    let locations = AppConfig::default_locations();
    assert_eq!(
        locations.last().map(|path| path.to_string_lossy().into_owned()),
        Some("llmgateway.json".to_string())
    );
}

/// Only test in this binary touching process environment
#[test]
fn test_settings_from_environment() {
    env::set_var("MAX_REQUEST_SIZE", "2048");
    env::set_var("GATEWAY_API_TOKEN", "  gw-token  ");
    env::set_var("ALLOWED_ORIGINS", "https://app.example.com, https://admin.example.com");
    env::set_var("CORS_ENABLED", "false");
    env::set_var("LOG_FORMAT", "json");

    let settings = Settings::new().unwrap();
    assert_eq!(settings.request.max_request_size, 2048);
    assert_eq!(settings.security.api_token.as_deref(), Some("gw-token"));
    assert!(settings.auth_required());
    assert_eq!(
        settings.security.allowed_origins,
        vec!["https://app.example.com", "https://admin.example.com"]
    );
    assert!(!settings.security.cors_enabled);
    assert_eq!(settings.logging.format, "json");

    env::set_var("LOG_FORMAT", "xml");
    assert!(Settings::new().is_err());

    for var in [
        "MAX_REQUEST_SIZE",
        "GATEWAY_API_TOKEN",
        "ALLOWED_ORIGINS",
        "CORS_ENABLED",
        "LOG_FORMAT",
    ] {
        env::remove_var(var);
    }
}
