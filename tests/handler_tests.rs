//! HTTP surface tests
//!
//! Router driven in-process with a stub provider behind the gateway

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use llmgateway::models::{ChatMessage, ChatResponse, InsightData, TokenUsage, TransactionData};
use llmgateway::services::Gateway;
use llmgateway::{create_router, GatewayError, GatewayResult, LLMProvider, Settings, Vendor};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

#[derive(Clone, Copy)]
enum Outcome {
    Ok,
    RateLimited,
    TimedOut,
    Empty,
}

struct StubProvider {
    outcome: Outcome,
}

impl StubProvider {
    fn failure(&self) -> Option<GatewayError> {
        let vendor_api = |status: Option<u16>, error_type: &str| GatewayError::VendorApi {
            vendor: Vendor::Cohere,
            status,
            message: "stubbed".to_string(),
            error_type: Some(error_type.to_string()),
            code: None,
        };
        match self.outcome {
            Outcome::Ok => None,
            Outcome::RateLimited => Some(vendor_api(Some(429), "rate_limit")),
            Outcome::TimedOut => Some(vendor_api(None, "timeout")),
            Outcome::Empty => Some(GatewayError::EmptyResponse { vendor: Vendor::Cohere }),
        }
    }
}

#[async_trait]
impl LLMProvider for StubProvider {
    fn vendor(&self) -> Vendor {
        Vendor::Cohere
    }

    fn model(&self) -> &str {
        "command-r-plus"
    }

    async fn analyze(&self, _data: &TransactionData) -> GatewayResult<InsightData> {
        match self.failure() {
            Some(err) => Err(err),
            None => Ok(InsightData {
                commentary: vec!["Food is your largest category".to_string()],
                tips: vec!["Plan meals weekly".to_string()],
            }),
        }
    }

    async fn chat(&self, messages: &[ChatMessage]) -> GatewayResult<ChatResponse> {
        match self.failure() {
            Some(err) => Err(err),
            None => Ok(ChatResponse {
                content: format!("echo: {}", messages.len()),
                usage: Some(TokenUsage {
                    prompt_tokens: 4,
                    completion_tokens: 2,
                    total_tokens: 6,
                }),
            }),
        }
    }
}

fn app_with(outcome: Outcome, settings: Settings) -> Router {
    let gateway = Gateway::new(Arc::new(StubProvider { outcome }));
    create_router(settings, gateway)
}

fn app(outcome: Outcome) -> Router {
    app_with(outcome, Settings::default())
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health_reports_vendor_and_model() {
    let response = app(Outcome::Ok)
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));

    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "llmgateway");
    assert_eq!(body["details"]["vendor"], "cohere");
    assert_eq!(body["details"]["model"], "command-r-plus");
    assert_eq!(body["details"]["auth_required"], false);
}

#[tokio::test]
async fn test_liveness() {
    let response = app(Outcome::Ok)
        .oneshot(Request::builder().uri("/health/live").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "alive");
}

#[tokio::test]
async fn test_insights_returns_insight_data() {
    let response = app(Outcome::Ok)
        .oneshot(post_json("/v1/insights", json!({"expenses": [{"amount": 12.5}]})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["commentary"], json!(["Food is your largest category"]));
    assert_eq!(body["tips"], json!(["Plan meals weekly"]));
}

#[tokio::test]
async fn test_chat_returns_content_and_usage() {
    let response = app(Outcome::Ok)
        .oneshot(post_json(
            "/v1/chat",
            json!({"messages": [{"role": "user", "content": "hi"}, {"role": "assistant", "content": "hello"}]}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["content"], "echo: 2");
    assert_eq!(body["usage"]["total_tokens"], 6);
}

#[tokio::test]
async fn test_chat_rejects_empty_messages() {
    let response = app(Outcome::Ok)
        .oneshot(post_json("/v1/chat", json!({"messages": []})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"]["type"], "invalid_request_error");
}

#[tokio::test]
async fn test_chat_rejects_unknown_role() {
    let response = app(Outcome::Ok)
        .oneshot(post_json("/v1/chat", json!({"messages": [{"role": "tool", "content": "x"}]})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_bearer_token_gates_api_routes() {
    let mut settings = Settings::default();
    settings.security.api_token = Some("gw-secret".to_string());

    let unauthenticated = app_with(Outcome::Ok, settings.clone())
        .oneshot(post_json("/v1/insights", json!({})))
        .await
        .unwrap();
    assert_eq!(unauthenticated.status(), StatusCode::UNAUTHORIZED);

    let mut wrong = post_json("/v1/insights", json!({}));
    wrong
        .headers_mut()
        .insert(header::AUTHORIZATION, "Bearer nope".parse().unwrap());
    let wrong = app_with(Outcome::Ok, settings.clone()).oneshot(wrong).await.unwrap();
    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);

    let mut authorized = post_json("/v1/insights", json!({}));
    authorized
        .headers_mut()
        .insert(header::AUTHORIZATION, "Bearer gw-secret".parse().unwrap());
    let authorized = app_with(Outcome::Ok, settings.clone()).oneshot(authorized).await.unwrap();
    assert_eq!(authorized.status(), StatusCode::OK);

    let health = app_with(Outcome::Ok, settings)
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(health.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_vendor_failures_map_to_http_status() {
    let cases = [
        (Outcome::RateLimited, StatusCode::TOO_MANY_REQUESTS, "rate_limit_error"),
        (Outcome::TimedOut, StatusCode::GATEWAY_TIMEOUT, "timeout_error"),
        (Outcome::Empty, StatusCode::BAD_GATEWAY, "api_error"),
    ];

    for (outcome, status, error_type) in cases {
        let response = app(outcome)
            .oneshot(post_json("/v1/chat", json!({"messages": [{"role": "user", "content": "hi"}]})))
            .await
            .unwrap();
        assert_eq!(response.status(), status);
        assert_eq!(body_json(response).await["error"]["type"], error_type);
    }
}

#[tokio::test]
async fn test_oversized_body_rejected() {
    let mut settings = Settings::default();
    settings.request.max_request_size = 64;

    let body = json!({"note": "x".repeat(256)}).to_string();
    let request = Request::builder()
        .method("POST")
        .uri("/v1/insights")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::CONTENT_LENGTH, body.len())
        .body(Body::from(body))
        .unwrap();

    let response = app_with(Outcome::Ok, settings).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn test_body_within_limit_accepted() {
    let mut settings = Settings::default();
    settings.request.max_request_size = 1024;

    let response = app_with(Outcome::Ok, settings)
        .oneshot(post_json("/v1/insights", json!({"note": "small"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
