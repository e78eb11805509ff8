//! Backend status check response

use serde::Serialize;
use serde_json::Value;

use super::number_of;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum BackendStatus {
    Connected,
    Down { message: String },
}

impl BackendStatus {
    pub fn is_connected(&self) -> bool {
        matches!(self, BackendStatus::Connected)
    }
}

/// Interpret `{"code": 201|503, "status": "..."}`. `code` may be a number
/// or a numeric string. Anything not recognisably connected counts as down.
pub fn backend_status(value: &Value) -> BackendStatus {
    let code = value.get("code").and_then(number_of).map(|c| c as i64);
    let status = value
        .get("status")
        .map(|s| match s {
            Value::String(s) => s.clone(),
            Value::Null => String::new(),
            other => other.to_string(),
        })
        .unwrap_or_default();
    let lower = status.to_lowercase();

    if code == Some(201) || lower == "connected" {
        BackendStatus::Connected
    } else if code == Some(503) || lower.contains("down") {
        BackendStatus::Down {
            message: "Server down".to_string(),
        }
    } else if status.is_empty() {
        BackendStatus::Down {
            message: "Status unknown".to_string(),
        }
    } else {
        BackendStatus::Down { message: status }
    }
}
