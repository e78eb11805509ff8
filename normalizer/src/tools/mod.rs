//! Per-tool normalizers — ideas, market analyses, game ideas, recipes,
//! vacation plans, summaries, chat and backend status.
//!
//! Each submodule exposes a typed record and a function taking the raw
//! backend `serde_json::Value`.

pub mod chat;
pub mod game;
pub mod ideas;
pub mod market;
pub mod recipe;
pub mod status;
pub mod summary;
pub mod vacation;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A field the backend sends either as a list of strings or as one string
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TextOrList {
    List(Vec<String>),
    Text(String),
}

impl Default for TextOrList {
    fn default() -> Self {
        TextOrList::Text(String::new())
    }
}

impl TextOrList {
    /// The entries as a list; a single string is one entry, a blank one none.
    pub fn items(&self) -> Vec<&str> {
        match self {
            TextOrList::List(items) => items.iter().map(String::as_str).collect(),
            TextOrList::Text(text) if text.trim().is_empty() => Vec::new(),
            TextOrList::Text(text) => vec![text.as_str()],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items().is_empty()
    }
}

/// Accept a number or a numeric string ("85", "85%"); anything else is 0.
pub(crate) fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(number_of(&value).unwrap_or(0.0))
}

/// Accept a string or a number rendered as a string; null is empty.
pub(crate) fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(text_of(&value))
}

pub(crate) fn number_of(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches('%').trim().parse().ok(),
        _ => None,
    }
}

pub(crate) fn text_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
