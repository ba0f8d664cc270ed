//! Generic vendor adapter
//!
//! Implements `LLMProvider` once for every vendor on top of a `VendorClient`.
//! Both operations end in exactly one call log record, whatever the outcome.

use super::{CompletionRequest, LLMProvider, SamplingHints, Vendor, VendorClient};
use crate::models::{ChatMessage, ChatResponse, ChatRole, InsightData, TokenUsage, TransactionData};
use crate::services::call_log::{CallLogRecord, CallLogger, CallOperation};
use crate::services::insight::parse_insight;
use crate::services::prompt::build_insight_prompt;
use crate::utils::error::{GatewayError, GatewayResult};
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// Resolved per-adapter tuning
#[derive(Debug, Clone, PartialEq)]
pub struct AdapterSettings {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Prepended as a leading system message when present
    pub system_prompt: Option<String>,
}

/// Failure plus whatever raw vendor text should reach the log
struct CallFailure {
    error: GatewayError,
    raw_response: Option<String>,
}

impl From<GatewayError> for CallFailure {
    fn from(error: GatewayError) -> Self {
        Self {
            error,
            raw_response: None,
        }
    }
}

/// `LLMProvider` implementation shared by all vendors
pub struct VendorAdapter {
    vendor: Vendor,
    settings: AdapterSettings,
    client: Box<dyn VendorClient>,
    logger: Arc<dyn CallLogger>,
}

impl VendorAdapter {
    pub fn new(
        vendor: Vendor,
        settings: AdapterSettings,
        client: Box<dyn VendorClient>,
        logger: Arc<dyn CallLogger>,
    ) -> Self {
        Self {
            vendor,
            settings,
            client,
            logger,
        }
    }

    pub fn settings(&self) -> &AdapterSettings {
        &self.settings
    }

    fn completion_request(&self, messages: &[ChatMessage], json_response: bool) -> CompletionRequest {
        let system_prompt = self
            .settings
            .system_prompt
            .as_deref()
            .filter(|prompt| !prompt.trim().is_empty());

        let mut conversation = Vec::with_capacity(messages.len() + 1);
        if let Some(prompt) = system_prompt {
            conversation.push(ChatMessage::system(prompt));
        }
        conversation.extend_from_slice(messages);

        CompletionRequest {
            model: self.settings.model.clone(),
            messages: conversation,
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
            json_response,
            sampling: SamplingHints::default(),
        }
    }

    /// Issue the call and return trimmed, non-empty text
    async fn complete_text(
        &self,
        messages: &[ChatMessage],
        json_response: bool,
    ) -> GatewayResult<(String, Option<TokenUsage>)> {
        let request = self.completion_request(messages, json_response);
        let completion = self.client.complete(&request).await?;

        let content = completion
            .content
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .ok_or(GatewayError::EmptyResponse { vendor: self.vendor })?;

        Ok((content.to_string(), completion.usage))
    }

    async fn run_analyze(&self, prompt: &str) -> Result<(InsightData, Option<TokenUsage>), CallFailure> {
        let (content, usage) = self.complete_text(&[ChatMessage::user(prompt)], true).await?;

        match parse_insight(&content) {
            Ok(insight) => Ok((insight, usage)),
            Err(e) => Err(CallFailure {
                error: GatewayError::MalformedResponse {
                    vendor: self.vendor,
                    reason: e.to_string(),
                },
                raw_response: Some(content),
            }),
        }
    }

    async fn run_chat(&self, messages: &[ChatMessage]) -> Result<(ChatResponse, Option<TokenUsage>), CallFailure> {
        let (content, usage) = self.complete_text(messages, false).await?;
        let response = ChatResponse { content, usage };
        Ok((response, usage))
    }

    /// Emit the single log record for a call and hand back its result
    fn finish<T: Serialize>(
        &self,
        operation: CallOperation,
        prompt: String,
        started: Instant,
        outcome: Result<(T, Option<TokenUsage>), CallFailure>,
    ) -> GatewayResult<T> {
        let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        match outcome {
            Ok((value, usage)) => {
                let response = serde_json::to_value(&value).unwrap_or_default();
                self.logger.log(CallLogRecord::success(
                    self.vendor,
                    operation,
                    &self.settings.model,
                    prompt,
                    response,
                    usage,
                    duration_ms,
                ));
                Ok(value)
            }
            Err(failure) => {
                self.logger.log(CallLogRecord::failure(
                    self.vendor,
                    operation,
                    &self.settings.model,
                    prompt,
                    failure.error.to_string(),
                    failure.error.kind(),
                    failure.raw_response,
                    duration_ms,
                ));
                Err(failure.error)
            }
        }
    }
}

/// Prompt recorded for a chat call
fn chat_log_prompt(messages: &[ChatMessage]) -> String {
    messages
        .iter()
        .rev()
        .find(|message| message.role == ChatRole::User)
        .or_else(|| messages.last())
        .map(|message| message.content.clone())
        .unwrap_or_default()
}

#[async_trait]
impl LLMProvider for VendorAdapter {
    fn vendor(&self) -> Vendor {
        self.vendor
    }

    fn model(&self) -> &str {
        &self.settings.model
    }

    async fn analyze(&self, data: &TransactionData) -> GatewayResult<InsightData> {
        let started = Instant::now();
        let prompt = build_insight_prompt(data);
        debug!("{} analyze with model {}", self.vendor, self.settings.model);

        let outcome = self.run_analyze(&prompt).await;
        self.finish(CallOperation::Analyze, prompt, started, outcome)
    }

    async fn chat(&self, messages: &[ChatMessage]) -> GatewayResult<ChatResponse> {
        let started = Instant::now();
        debug!(
            "{} chat with model {} ({} messages)",
            self.vendor,
            self.settings.model,
            messages.len()
        );

        let outcome = self.run_chat(messages).await;
        self.finish(CallOperation::Chat, chat_log_prompt(messages), started, outcome)
    }
}
