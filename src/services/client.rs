//! HTTP client service
//!
//! One long-lived reqwest client per adapter with a bounded retry policy

use crate::providers::Vendor;
use crate::utils::error::{GatewayError, GatewayResult};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE, RETRY_AFTER};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, warn};

/// Default per-request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Turns a non-success status and body into a normalized error
pub type ErrorParser = fn(Vendor, u16, &str) -> GatewayError;

/// Retry configuration
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum retry attempts
    pub max_retries: u32,
    /// Base delay time (milliseconds)
    pub base_delay_ms: u64,
    /// Maximum delay time (milliseconds)
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 500,
            max_delay_ms: 8000,
        }
    }
}

impl RetryConfig {
    /// Backoff before the retry following `attempt` (zero-based)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2_u64.saturating_pow(attempt);
        Duration::from_millis(std::cmp::min(
            self.base_delay_ms.saturating_mul(factor),
            self.max_delay_ms,
        ))
    }

    /// Vendor-requested delay when present, capped at `max_delay_ms`, else backoff
    pub fn delay_with_hint(&self, attempt: u32, retry_after: Option<Duration>) -> Duration {
        match retry_after {
            Some(hint) => std::cmp::min(hint, Duration::from_millis(self.max_delay_ms)),
            None => self.delay_for(attempt),
        }
    }
}

/// Delay from a `Retry-After` header given in seconds
///
/// HTTP-date values are not honored and fall back to backoff.
pub fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    let value = headers.get(RETRY_AFTER)?.to_str().ok()?.trim();
    if let Ok(seconds) = value.parse::<u64>() {
        return Some(Duration::from_secs(seconds));
    }
    value
        .parse::<f64>()
        .ok()
        .and_then(|seconds| Duration::try_from_secs_f64(seconds).ok())
}

/// Resilience policy owned by each adapter
#[derive(Debug, Clone)]
pub struct ClientPolicy {
    pub timeout: Duration,
    pub retry: RetryConfig,
}

impl Default for ClientPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            retry: RetryConfig::default(),
        }
    }
}

/// Whether a status is worth another attempt
pub fn is_retryable_status(status: StatusCode) -> bool {
    matches!(status.as_u16(), 408 | 409 | 429) || status.is_server_error()
}

/// Build a header value from a secret, marked sensitive
pub fn secret_header(vendor: Vendor, value: &str) -> GatewayResult<HeaderValue> {
    let mut header = HeaderValue::from_str(value).map_err(|_| {
        GatewayError::InvalidConfig(format!("{} credential contains invalid header characters", vendor))
    })?;
    header.set_sensitive(true);
    Ok(header)
}

/// Build a plain header value
pub fn plain_header(value: &str) -> GatewayResult<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|_| GatewayError::InvalidConfig(format!("Invalid header value: {}", value)))
}

/// Reqwest client wrapper with retry functionality
#[derive(Debug, Clone)]
pub struct RetryingHttpClient {
    client: Client,
    vendor: Vendor,
    retry: RetryConfig,
}

impl RetryingHttpClient {
    /// Create a client whose every request carries `headers`
    pub fn new(
        vendor: Vendor,
        headers: Vec<(HeaderName, HeaderValue)>,
        policy: &ClientPolicy,
    ) -> GatewayResult<Self> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        for (name, value) in headers {
            default_headers.insert(name, value);
        }

        let client = Client::builder()
            .timeout(policy.timeout)
            .user_agent(concat!("llmgateway/", env!("CARGO_PKG_VERSION")))
            .default_headers(default_headers)
            .build()
            .map_err(|e| GatewayError::InvalidConfig(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            vendor,
            retry: policy.retry.clone(),
        })
    }

    pub fn retry_config(&self) -> &RetryConfig {
        &self.retry
    }

    /// POST a JSON body and decode a JSON reply, retrying transient failures
    pub async fn post_json<B, R>(&self, url: &str, body: &B, parse_error: ErrorParser) -> GatewayResult<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let max_retries = self.retry.max_retries;
        let mut attempt = 0;

        loop {
            debug!("Sending {} request (attempt {}/{})", self.vendor, attempt + 1, max_retries + 1);

            match self.client.post(url).json(body).send().await {
                Err(e) => {
                    if attempt < max_retries {
                        let delay = self.retry.delay_for(attempt);
                        warn!(
                            "{} request failed: {}, retrying after {}ms (attempt {}/{})",
                            self.vendor,
                            e,
                            delay.as_millis(),
                            attempt + 1,
                            max_retries
                        );
                        tokio::time::sleep(delay).await;
                        attempt += 1;
                        continue;
                    }
                    return Err(self.transport_error(e));
                }
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        let text = response.text().await.map_err(|e| self.transport_error(e))?;
                        return serde_json::from_str::<R>(&text).map_err(|e| GatewayError::VendorApi {
                            vendor: self.vendor,
                            status: Some(status.as_u16()),
                            message: format!("Failed to decode {} response body: {}", self.vendor, e),
                            error_type: Some("invalid_response_body".to_string()),
                            code: None,
                        });
                    }

                    if is_retryable_status(status) && attempt < max_retries {
                        let delay = self.retry.delay_with_hint(attempt, retry_after(response.headers()));
                        warn!(
                            "{} returned {}, retrying after {}ms (attempt {}/{})",
                            self.vendor,
                            status,
                            delay.as_millis(),
                            attempt + 1,
                            max_retries
                        );
                        tokio::time::sleep(delay).await;
                        attempt += 1;
                        continue;
                    }

                    let error_text = response.text().await.unwrap_or_default();
                    let error = parse_error(self.vendor, status.as_u16(), &error_text);
                    debug!("{} request failed: {}", self.vendor, error);
                    return Err(error);
                }
            }
        }
    }

    fn transport_error(&self, error: reqwest::Error) -> GatewayError {
        let error_type = if error.is_timeout() { "timeout" } else { "connection_error" };
        GatewayError::VendorApi {
            vendor: self.vendor,
            status: None,
            message: error.to_string(),
            error_type: Some(error_type.to_string()),
            code: None,
        }
    }
}
