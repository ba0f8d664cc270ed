//! Cohere v2 chat wire models

use serde::{Deserialize, Serialize};

use super::openai::OpenAIResponseFormat;

/// v2/chat request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CohereRequest {
    pub model: String,
    pub messages: Vec<CohereMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub presence_penalty: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency_penalty: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<OpenAIResponseFormat>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CohereMessage {
    pub role: String,
    pub content: String,
}

/// v2/chat response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CohereResponse {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub message: Option<CohereReply>,
    #[serde(default)]
    pub usage: Option<CohereUsage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CohereReply {
    #[serde(default)]
    pub content: Vec<CohereContentBlock>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CohereContentBlock {
    #[serde(rename = "type", default)]
    pub block_type: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CohereUsage {
    #[serde(default)]
    pub tokens: Option<CohereTokens>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CohereTokens {
    #[serde(default)]
    pub input_tokens: f64,
    #[serde(default)]
    pub output_tokens: f64,
}

/// Error response (`{"message": ...}`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CohereErrorResponse {
    pub message: String,
}

impl CohereResponse {
    /// Concatenated text blocks of the reply
    pub fn text(&self) -> Option<String> {
        let reply = self.message.as_ref()?;
        let text: String = reply
            .content
            .iter()
            .filter(|block| block.block_type.as_deref().unwrap_or("text") == "text")
            .filter_map(|block| block.text.as_deref())
            .collect();
        Some(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_response_text_and_fractional_tokens() {
        let response: CohereResponse = serde_json::from_value(json!({
            "id": "c1",
            "message": {"role": "assistant", "content": [{"type": "text", "text": "ok"}]},
            "usage": {"tokens": {"input_tokens": 12.0, "output_tokens": 3.0}}
        }))
        .unwrap();

        assert_eq!(response.text().as_deref(), Some("ok"));
        let tokens = response.usage.unwrap().tokens.unwrap();
        assert_eq!(tokens.input_tokens as u32, 12);
    }
}
