//! Multi-provider LLM gateway library
//!
//! One vendor-independent interface for financial insight analysis and
//! chat completion over nine LLM vendors

pub mod config;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod providers;
pub mod services;
pub mod utils;

// Re-export common types
pub use config::{AppConfig, ProviderConfig, Settings};
pub use handlers::{create_router, AppState};
pub use models::{ChatMessage, ChatResponse, ChatRole, InsightData, TokenUsage, TransactionData};
pub use providers::{LLMProvider, ProviderFactory, Vendor};
pub use services::{CallLogRecord, CallLogger, Gateway};
pub use utils::error::{AppError, AppResult, GatewayError, GatewayResult};

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Library description
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Get version information
pub fn version_info() -> String {
    format!("{} v{} - {}", NAME, VERSION, DESCRIPTION)
}
