//! Gateway facade
//!
//! The vendor-independent entry point the rest of the application holds

use crate::config::ProviderConfig;
use crate::models::{ChatMessage, ChatResponse, InsightData, TransactionData};
use crate::providers::{LLMProvider, ProviderFactory, Vendor};
use crate::services::call_log::CallLogger;
use crate::utils::error::GatewayResult;
use std::fmt;
use std::sync::Arc;

/// Cheap-to-clone handle over the configured provider
#[derive(Clone)]
pub struct Gateway {
    provider: Arc<dyn LLMProvider>,
}

impl Gateway {
    pub fn new(provider: Arc<dyn LLMProvider>) -> Self {
        Self { provider }
    }

    /// Build through the provider factory
    pub fn from_config(config: &ProviderConfig, logger: Arc<dyn CallLogger>) -> GatewayResult<Self> {
        let provider = ProviderFactory::new(logger).create(config)?;
        Ok(Self::new(provider))
    }

    pub fn vendor(&self) -> Vendor {
        self.provider.vendor()
    }

    pub fn model(&self) -> &str {
        self.provider.model()
    }

    pub async fn analyze(&self, data: &TransactionData) -> GatewayResult<InsightData> {
        self.provider.analyze(data).await
    }

    pub async fn chat(&self, messages: &[ChatMessage]) -> GatewayResult<ChatResponse> {
        self.provider.chat(messages).await
    }
}

impl fmt::Debug for Gateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gateway")
            .field("vendor", &self.vendor())
            .field("model", &self.model())
            .finish()
    }
}
