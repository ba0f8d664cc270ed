//! Data models module
//!
//! Canonical request/response shapes the application programs against,
//! plus the vendor-specific wire structures in submodules

use serde::{Deserialize, Serialize};
use std::fmt;

pub mod anthropic;
pub mod cohere;
pub mod gemini;
pub mod openai;

/// Caller's financial records, passed untouched into the prompt builder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionData(pub serde_json::Value);

impl TransactionData {
    pub fn new(value: serde_json::Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &serde_json::Value {
        &self.0
    }
}

impl From<serde_json::Value> for TransactionData {
    fn from(value: serde_json::Value) -> Self {
        Self(value)
    }
}

/// Structured result of the analyze capability
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsightData {
    /// Narrative observations
    pub commentary: Vec<String>,
    /// Actionable suggestions
    pub tips: Vec<String>,
}

/// Conversation role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::System => "system",
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        }
    }
}

impl fmt::Display for ChatRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single conversation turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(ChatRole::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(ChatRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(ChatRole::Assistant, content)
    }
}

/// Token usage as reported by the vendor
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Canonical chat result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Vendor reply text
    pub content: String,
    /// Vendor-reported usage, absent when the vendor sent none
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_transaction_data_is_transparent() {
        let data = TransactionData::new(json!({"expenses": [{"amount": 12.5}]}));
        let text = serde_json::to_string(&data).unwrap();
        assert_eq!(text, r#"{"expenses":[{"amount":12.5}]}"#);
    }

    #[test]
    fn test_chat_role_serialization() {
        let message = ChatMessage::assistant("hi");
        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(value, json!({"role": "assistant", "content": "hi"}));

        let parsed: ChatMessage = serde_json::from_value(json!({"role": "system", "content": "x"})).unwrap();
        assert_eq!(parsed.role, ChatRole::System);
    }

    #[test]
    fn test_unknown_role_rejected() {
        let result = serde_json::from_value::<ChatMessage>(json!({"role": "tool", "content": "x"}));
        assert!(result.is_err());
    }
}
