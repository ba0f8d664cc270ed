//! Insight parsing and repair

use crate::models::InsightData;
use serde_json::Value;

/// Strip a surrounding Markdown code fence, if any
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(body) = rest.strip_suffix("```") else {
        return trimmed;
    };
    // Drop an info string such as `json`
    match body.find('\n') {
        Some(newline) if !body[..newline].contains('{') => body[newline + 1..].trim(),
        _ => body.trim(),
    }
}

/// Coerce any parsed JSON value into `InsightData`
///
/// Non-array `commentary`/`tips` become empty. String elements are kept,
/// numbers and booleans are stringified, anything else is dropped.
pub fn repair_insight(value: Value) -> InsightData {
    let Value::Object(mut object) = value else {
        return InsightData::default();
    };

    InsightData {
        commentary: string_items(object.remove("commentary")),
        tips: string_items(object.remove("tips")),
    }
}

fn string_items(value: Option<Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s),
                Value::Number(n) => Some(n.to_string()),
                Value::Bool(b) => Some(b.to_string()),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// Parse vendor text into `InsightData`, repairing partial structure
pub fn parse_insight(text: &str) -> Result<InsightData, serde_json::Error> {
    let value: Value = serde_json::from_str(strip_code_fence(text))?;
    Ok(repair_insight(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_complete_insight() {
        let insight = parse_insight(r#"{"commentary":["spent less"],"tips":["save more"]}"#).unwrap();
        assert_eq!(insight.commentary, vec!["spent less"]);
        assert_eq!(insight.tips, vec!["save more"]);
    }

    #[test]
    fn test_missing_tips_repaired() {
        let insight = parse_insight(r#"{"commentary":["spent less"]}"#).unwrap();
        assert_eq!(insight.commentary, vec!["spent less"]);
        assert!(insight.tips.is_empty());
    }

    #[test]
    fn test_invalid_fields_repaired() {
        let insight = repair_insight(json!({"commentary": "not a list", "tips": [1, true, null, {"x": 1}, "ok"]}));
        assert!(insight.commentary.is_empty());
        assert_eq!(insight.tips, vec!["1", "true", "ok"]);
    }

    #[test]
    fn test_non_object_repaired_to_empty() {
        assert_eq!(parse_insight("[1,2,3]").unwrap(), InsightData::default());
        assert_eq!(parse_insight("\"text\"").unwrap(), InsightData::default());
    }

    #[test]
    fn test_invalid_json_is_error() {
        assert!(parse_insight("Here are your insights: spend less").is_err());
    }

    #[test]
    fn test_code_fence_stripped() {
        let fenced = "```json\n{\"commentary\":[\"a\"],\"tips\":[\"b\"]}\n```";
        assert_eq!(strip_code_fence(fenced), "{\"commentary\":[\"a\"],\"tips\":[\"b\"]}");
        assert_eq!(parse_insight(fenced).unwrap().tips, vec!["b"]);

        assert_eq!(strip_code_fence("```{\"tips\":[]}```"), "{\"tips\":[]}");
        assert_eq!(strip_code_fence("  {}  "), "{}");
    }
}
