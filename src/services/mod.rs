//! Service layer module
//!
//! Contains the gateway facade, call logging, the retrying HTTP client,
//! prompt building and insight repair

pub mod call_log;
pub mod client;
pub mod gateway;
pub mod insight;
pub mod prompt;

pub use call_log::{
    CallLevel, CallLogRecord, CallLogger, CallOperation, JsonLinesCallLogger, MemoryCallLogger,
    MultiCallLogger, TracingCallLogger,
};
pub use client::{ClientPolicy, RetryConfig, RetryingHttpClient};
pub use gateway::Gateway;
pub use insight::{parse_insight, repair_insight};
pub use prompt::build_insight_prompt;
