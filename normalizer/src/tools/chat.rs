//! Chat replies and conversation memory

use serde::Serialize;
use serde_json::Value;

const NO_RESPONSE: &str = "No response received";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatReply {
    pub text: String,
    pub total_tokens: u64,
}

impl ChatReply {
    fn empty() -> Self {
        Self {
            text: NO_RESPONSE.to_string(),
            total_tokens: 0,
        }
    }
}

/// One remembered exchange. `reply` is `None` when the stored AI message
/// was valid JSON but carried no output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatTurn {
    pub human: String,
    pub reply: Option<ChatReply>,
}

/// Reply from `{"output": [{"output": "...", "total_tokens": n}]}`
pub fn chat_reply(value: &Value) -> ChatReply {
    first_output(value).unwrap_or_else(ChatReply::empty)
}

fn first_output(value: &Value) -> Option<ChatReply> {
    let first = value.get("output")?.as_array()?.first()?;
    let text = first
        .get("output")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .unwrap_or(NO_RESPONSE)
        .to_string();
    let total_tokens = first.get("total_tokens").and_then(Value::as_u64).unwrap_or(0);
    Some(ChatReply { text, total_tokens })
}

/// Conversation memory: an array of `{human, ai}` where `ai` is the
/// JSON-encoded reply. An `ai` that is not JSON is kept as raw text.
pub fn chat_memory(value: &Value) -> Vec<ChatTurn> {
    let Some(turns) = value.as_array() else {
        return Vec::new();
    };

    turns
        .iter()
        .filter_map(|turn| {
            let human = turn.get("human")?.as_str()?.to_string();
            let ai = turn.get("ai").and_then(Value::as_str).unwrap_or_default();
            let reply = match serde_json::from_str::<Value>(ai) {
                Ok(parsed) => first_output(&parsed),
                Err(_) => Some(ChatReply {
                    text: ai.to_string(),
                    total_tokens: 0,
                }),
            };
            Some(ChatTurn { human, reply })
        })
        .collect()
}
