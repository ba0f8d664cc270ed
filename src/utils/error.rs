//! Error handling module
//!
//! Gateway error taxonomy and its HTTP projection

use crate::providers::Vendor;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by the gateway, uniform across vendors
#[derive(Error, Debug)]
pub enum GatewayError {
    /// No credential supplied at adapter construction
    #[error("{vendor} API key is required")]
    MissingCredential { vendor: Vendor },

    /// Vendor selector outside the supported set
    #[error("Unsupported LLM vendor: {0}")]
    UnsupportedVendor(String),

    /// Provider configuration is unusable (bad base URL, missing endpoint)
    #[error("Invalid provider configuration: {0}")]
    InvalidConfig(String),

    /// Vendor returned no usable text
    #[error("Empty response from {vendor}")]
    EmptyResponse { vendor: Vendor },

    /// Vendor text is not parseable as the expected JSON
    #[error("Failed to parse {vendor} response as JSON: {reason}")]
    MalformedResponse { vendor: Vendor, reason: String },

    /// Vendor-reported failure, normalized
    #[error(
        "{vendor} API Error: {message} (Type: {}, Code: {})",
        .error_type.as_deref().unwrap_or("unknown"),
        .code.as_deref().unwrap_or("none")
    )]
    VendorApi {
        vendor: Vendor,
        /// HTTP status, absent for transport failures
        status: Option<u16>,
        message: String,
        error_type: Option<String>,
        code: Option<String>,
    },
}

impl GatewayError {
    /// Stable kind string for logs and HTTP bodies
    pub fn kind(&self) -> &'static str {
        match self {
            GatewayError::MissingCredential { .. } => "missing_credential",
            GatewayError::UnsupportedVendor(_) => "unsupported_vendor",
            GatewayError::InvalidConfig(_) => "invalid_config",
            GatewayError::EmptyResponse { .. } => "empty_response",
            GatewayError::MalformedResponse { .. } => "malformed_response",
            GatewayError::VendorApi { .. } => "vendor_api_error",
        }
    }

    /// Whether this error comes from configuration rather than a call
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            GatewayError::MissingCredential { .. }
                | GatewayError::UnsupportedVendor(_)
                | GatewayError::InvalidConfig(_)
        )
    }
}

/// Gateway result type alias
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Application (HTTP layer) error types
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] anyhow::Error),

    /// Authentication error
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Request validation failed
    #[error("Request validation failed: {0}")]
    Validation(String),

    /// Upstream vendor error
    #[error("External API error: {0}")]
    ExternalApi(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded, please try again later")]
    RateLimit,

    /// Upstream timeout
    #[error("Upstream request timed out")]
    Timeout,
}

/// Error response structure
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error type
    #[serde(rename = "type")]
    pub error_type: String,
    /// Error message
    pub message: String,
    /// Error code (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Request ID (for tracking)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

/// Envelope returned to HTTP clients
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: ErrorResponse,
}

impl AppError {
    /// Get HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Authentication(_) => StatusCode::UNAUTHORIZED,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::RateLimit => StatusCode::TOO_MANY_REQUESTS,
            AppError::Timeout => StatusCode::GATEWAY_TIMEOUT,
            AppError::ExternalApi(_) => StatusCode::BAD_GATEWAY,
            AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get error type string
    pub fn error_type(&self) -> &'static str {
        match self {
            AppError::Authentication(_) => "authentication_error",
            AppError::Validation(_) => "invalid_request_error",
            AppError::RateLimit => "rate_limit_error",
            AppError::Timeout => "timeout_error",
            AppError::ExternalApi(_) | AppError::Config(_) => "api_error",
        }
    }

    /// Whether detailed error information should be logged
    pub fn should_log_details(&self) -> bool {
        !matches!(self, AppError::Authentication(_))
    }

    /// Convert to the JSON error envelope
    pub fn to_error_body(&self) -> ErrorBody {
        ErrorBody {
            error: ErrorResponse {
                error_type: self.error_type().to_string(),
                message: self.to_string(),
                code: None,
                request_id: None,
            },
        }
    }
}

impl From<GatewayError> for AppError {
    fn from(error: GatewayError) -> Self {
        if error.is_config_error() {
            return AppError::Config(anyhow::Error::new(error));
        }

        match &error {
            GatewayError::VendorApi { status: Some(429), .. } => AppError::RateLimit,
            GatewayError::VendorApi { error_type: Some(kind), status: None, .. } if kind == "timeout" => {
                AppError::Timeout
            }
            _ => AppError::ExternalApi(error.to_string()),
        }
    }
}

/// Implement IntoResponse trait to allow errors to be returned directly as HTTP responses
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if self.should_log_details() {
            tracing::error!("Application error: {} - Status code: {}", self, status);
        } else {
            tracing::warn!("Client error: {} - Status code: {}", self.error_type(), status);
        }

        (status, Json(self.to_error_body())).into_response()
    }
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;
