//! LLM Gateway Server
//!
//! HTTP service exposing financial insight analysis and chat over the
//! configured LLM vendor

use anyhow::{Context, Result};
use llmgateway::config::{AppConfig, Settings};
use llmgateway::handlers::create_router;
use llmgateway::services::{CallLogger, Gateway, JsonLinesCallLogger, MultiCallLogger, TracingCallLogger};
use llmgateway::utils::logging::init_logging;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Settings come first so logging honors RUST_LOG / LOG_FORMAT from .env
    let settings = Settings::new().context("Failed to load server settings")?;
    init_logging(&settings.logging)?;
    info!("Server settings loaded");

    let app_config = AppConfig::load_default().context("Failed to load provider configuration")?;
    info!("📁 Provider configuration loaded");

    let logger = build_call_logger(&settings)?;
    let gateway = Gateway::from_config(&app_config.provider, logger)
        .context("Failed to initialize LLM provider")?;
    info!("Using {} with model {}", gateway.vendor(), gateway.model());

    let app = create_router(settings, gateway);

    let addr = format!("{}:{}", app_config.server.host, app_config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("🚀 LLM gateway started!");
    info!("📝 Health check: http://{}/health", addr);
    info!("💡 Insights endpoint: http://{}/v1/insights", addr);
    info!("💬 Chat endpoint: http://{}/v1/chat", addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to start server: {}", e))?;

    Ok(())
}

/// Tracing sink, plus a JSON Lines file when `LLM_CALL_LOG_PATH` is set
fn build_call_logger(settings: &Settings) -> Result<Arc<dyn CallLogger>> {
    let tracing_sink: Arc<dyn CallLogger> = Arc::new(TracingCallLogger::new());

    let Some(path) = settings.logging.call_log_path.as_ref() else {
        return Ok(tracing_sink);
    };

    let file_sink = JsonLinesCallLogger::open(path)
        .with_context(|| format!("Failed to open call log file {}", path.display()))?;
    info!("Writing call log records to {}", path.display());

    let file_sink: Arc<dyn CallLogger> = Arc::new(file_sink);
    Ok(Arc::new(MultiCallLogger::new(vec![tracing_sink, file_sink])))
}
