//! Insight and chat handlers
//!
//! Thin HTTP projections of the gateway's two capabilities

use crate::handlers::AppState;
use crate::models::{ChatMessage, ChatResponse, InsightData, TransactionData};
use crate::utils::error::{AppError, AppResult};
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

/// Chat request body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
}

/// Handle insight analysis requests
///
/// POST /v1/insights
pub async fn handle_insights(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<TransactionData>, JsonRejection>,
) -> AppResult<Json<InsightData>> {
    let Json(data) = payload.map_err(rejection_error)?;
    debug!("Received insight request for {}", state.gateway.vendor());

    let insight = state.gateway.analyze(&data).await?;
    Ok(Json(insight))
}

/// Handle chat requests
///
/// POST /v1/chat
pub async fn handle_chat(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> AppResult<Json<ChatResponse>> {
    let Json(request) = payload.map_err(rejection_error)?;

    if request.messages.is_empty() {
        warn!("Rejected chat request without messages");
        return Err(AppError::Validation("messages must not be empty".to_string()));
    }

    debug!(
        "Received chat request for {} ({} messages)",
        state.gateway.vendor(),
        request.messages.len()
    );

    let response = state.gateway.chat(&request.messages).await?;
    Ok(Json(response))
}

fn rejection_error(rejection: JsonRejection) -> AppError {
    AppError::Validation(rejection.body_text())
}
