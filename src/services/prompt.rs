//! Insight prompt builder

use crate::models::TransactionData;

const INSTRUCTIONS: &str = "You are a personal finance assistant. Review the transaction data below \
and write narrative commentary about the spending and income patterns you observe, \
followed by actionable tips the user can apply to improve their finances.";

const OUTPUT_SHAPE: &str = r#"Respond with a single JSON object and nothing else, using exactly this shape:
{"commentary": ["<observation>", ...], "tips": ["<suggestion>", ...]}"#;

/// Build the analysis prompt for a transaction payload
///
/// The result depends only on `data`.
pub fn build_insight_prompt(data: &TransactionData) -> String {
    let payload = serde_json::to_string_pretty(data.as_value()).unwrap_or_else(|_| data.as_value().to_string());

    format!(
        "{}\n\nTransaction data:\n{}\n\n{}",
        INSTRUCTIONS, payload, OUTPUT_SHAPE
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> TransactionData {
        TransactionData::new(json!({
            "expenses": [
                {"category": "Food", "amount": 42.5},
                {"category": "Rent", "amount": 1200},
                {"category": "Transport", "amount": 60}
            ]
        }))
    }

    #[test]
    fn test_prompt_is_deterministic() {
        assert_eq!(build_insight_prompt(&sample()), build_insight_prompt(&sample()));
    }

    #[test]
    fn test_prompt_embeds_data_and_shape() {
        let prompt = build_insight_prompt(&sample());
        assert!(prompt.contains("\"category\": \"Rent\""));
        assert!(prompt.contains("\"commentary\""));
        assert!(prompt.contains("\"tips\""));
    }

    #[test]
    fn test_prompt_for_empty_payload() {
        let prompt = build_insight_prompt(&TransactionData::new(json!(null)));
        assert!(prompt.contains("Transaction data:\nnull"));
    }
}
