//! Health check handlers
//!
//! Provides application health status check endpoints

use crate::handlers::AppState;
use axum::{extract::State, response::Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Service name reported by health checks
pub const SERVICE_NAME: &str = "llmgateway";

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service name
    pub service: String,
    /// Version information
    pub version: String,
    /// Timestamp
    pub timestamp: String,
    /// Details (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HealthDetails>,
}

/// Check result
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthDetails {
    /// Configured vendor id
    pub vendor: String,
    /// Resolved model
    pub model: String,
    /// Whether /v1 routes require a bearer token
    pub auth_required: bool,
    /// Uptime in seconds
    pub uptime_seconds: u64,
}

fn response(state: &AppState, status: &str) -> HealthResponse {
    HealthResponse {
        status: status.to_string(),
        service: SERVICE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        details: Some(HealthDetails {
            vendor: state.gateway.vendor().id().to_string(),
            model: state.gateway.model().to_string(),
            auth_required: state.settings.auth_required(),
            uptime_seconds: state.started_at.elapsed().as_secs(),
        }),
    }
}

/// Basic health check
///
/// GET /health
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    debug!("Executing health check");
    Json(response(&state, "healthy"))
}

/// Liveness check
///
/// GET /health/live
/// Does not contact the vendor
pub async fn liveness_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    debug!("Executing liveness check");
    Json(response(&state, "alive"))
}
