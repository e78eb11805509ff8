//! Summarizer result text

use serde_json::Value;

/// Placeholder n8n leaves behind when the expression did not render
const UNRENDERED_TEMPLATE: &str = "{{ $json.output.sanitized }}";

/// The summary text, looked up in `output.sanitized`, `output.text`,
/// `summary`, then `result`. Falls back to the raw JSON so the user still
/// sees what came back.
pub fn summary(value: &Value) -> String {
    let candidates = [
        value.pointer("/output/sanitized"),
        value.pointer("/output/text"),
        value.get("summary").filter(|s| s.as_str() != Some(UNRENDERED_TEMPLATE)),
        value.get("result"),
    ];

    for candidate in candidates.into_iter().flatten() {
        if let Some(text) = candidate.as_str().filter(|s| !s.is_empty()) {
            return text.to_string();
        }
    }

    match value {
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
