//! HTTP handlers module
//!
//! Contains all HTTP endpoint handling logic

pub mod health;
pub mod insights;

use crate::config::Settings;
use crate::middleware::{auth::auth_middleware, logging::request_logging_middleware};
use crate::services::Gateway;
use axum::{http::HeaderValue, middleware, routing::get, routing::post, Router};
use std::sync::Arc;
use std::time::Instant;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};
use tracing::warn;

/// Application state
#[derive(Debug, Clone)]
pub struct AppState {
    pub settings: Settings,
    pub gateway: Gateway,
    pub started_at: Instant,
}

/// Create application router
pub fn create_router(settings: Settings, gateway: Gateway) -> Router {
    let app_state = Arc::new(AppState {
        settings: settings.clone(),
        gateway,
        started_at: Instant::now(),
    });

    let api_routes = Router::new()
        .route("/v1/insights", post(insights::handle_insights))
        .route("/v1/chat", post(insights::handle_chat))
        .route_layer(middleware::from_fn_with_state(app_state.clone(), auth_middleware));

    let mut router = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/live", get(health::liveness_check))
        .merge(api_routes)
        .with_state(app_state.clone())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::from_fn_with_state(app_state, request_logging_middleware))
                // Innermost: it rewrites the body type the axum middleware above expects
                .layer(RequestBodyLimitLayer::new(settings.request.max_request_size)),
        );

    if settings.security.cors_enabled {
        router = router.layer(cors_layer(&settings.security.allowed_origins));
    }

    router
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if allowed_origins.is_empty() || allowed_origins.iter().any(|origin| origin == "*") {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    layer.allow_origin(AllowOrigin::list(origins))
}
