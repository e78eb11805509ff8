//! Shape matching — locates a tool's collection inside loosely shaped backend JSON
//!
//! The automation backend wraps the same data in several ways depending on
//! how a workflow ends. `classify` decides which wrapping a value uses by
//! running an ordered list of matchers (first match wins), and `extract`
//! unwraps it. Nothing in this module panics or returns an error: an
//! unrecognised value extracts to an empty list.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::debug;

/// Per-tool parameters for the shape matchers
#[derive(Debug, Clone, Copy)]
pub struct ShapeSpec {
    /// Object fields that may hold the collection, checked in order
    pub collections: &'static [&'static str],
    /// An object carrying any of these keys is treated as a single record
    pub record_keys: &'static [&'static str],
}

impl ShapeSpec {
    /// Whether an object looks like one record of the target type
    pub fn looks_like_record(&self, obj: &Map<String, Value>) -> bool {
        self.record_keys.iter().any(|k| obj.contains_key(*k))
    }

    fn named_collection<'a>(&self, obj: &'a Map<String, Value>) -> Option<(&'static str, &'a Vec<Value>)> {
        self.collections
            .iter()
            .find_map(|name| obj.get(*name).and_then(Value::as_array).map(|arr| (*name, arr)))
    }
}

/// Which wrapping a backend response uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// `[{"output": [..]}]`
    NestedOutputArray,
    /// `[record, ..]`
    BareArray,
    /// `{"ideas": [..]}`, `{"result": [..]}`, ...
    NamedCollection(&'static str),
    /// `{"output": [..]}`
    OutputArray,
    /// `{"output": {"sanitized": "<json>"}}` or `{"output": {"text": "<json>"}}`
    EncodedOutput(&'static str),
    /// `{"title": .., ..}` — the record itself
    SingleRecord,
    Unrecognized,
}

/// Keys inside an `output` object that may carry a JSON-encoded payload,
/// in order of preference.
const ENCODED_KEYS: [&str; 2] = ["sanitized", "text"];

/// Decide which shape `value` has. Matchers run in a fixed order and the
/// first that matches wins, so a value matching an earlier shape is never
/// reinterpreted as a later one.
pub fn classify(value: &Value, known: &ShapeSpec) -> Shape {
    match value {
        Value::Array(items) => match items.first() {
            Some(Value::Object(first)) => {
                if first.get("output").map(Value::is_array).unwrap_or(false) {
                    Shape::NestedOutputArray
                } else if known.looks_like_record(first) {
                    Shape::BareArray
                } else {
                    Shape::Unrecognized
                }
            }
            _ => Shape::Unrecognized,
        },
        Value::Object(obj) => {
            if let Some((name, _)) = known.named_collection(obj) {
                return Shape::NamedCollection(name);
            }
            match obj.get("output") {
                Some(Value::Array(_)) => return Shape::OutputArray,
                Some(Value::Object(out)) => {
                    if let Some(key) = encoded_key(out) {
                        return Shape::EncodedOutput(key);
                    }
                }
                _ => {}
            }
            if known.looks_like_record(obj) {
                Shape::SingleRecord
            } else {
                Shape::Unrecognized
            }
        }
        _ => Shape::Unrecognized,
    }
}

/// First key of `ENCODED_KEYS` holding a non-empty string
fn encoded_key(out: &Map<String, Value>) -> Option<&'static str> {
    ENCODED_KEYS
        .iter()
        .copied()
        .find(|k| out.get(*k).and_then(Value::as_str).map(|s| !s.is_empty()).unwrap_or(false))
}

/// Extract the tool's collection from `value` as raw JSON values
pub fn extract(value: &Value, known: &ShapeSpec) -> Vec<Value> {
    let shape = classify(value, known);
    debug!("Response shape: {:?}", shape);

    match shape {
        Shape::NestedOutputArray => value
            .get(0)
            .and_then(|first| first.get("output"))
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default(),
        Shape::BareArray => value.as_array().cloned().unwrap_or_default(),
        Shape::NamedCollection(name) => value
            .get(name)
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default(),
        Shape::OutputArray => value
            .get("output")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default(),
        Shape::EncodedOutput(key) => value
            .get("output")
            .and_then(|out| out.get(key))
            .and_then(Value::as_str)
            .map(|encoded| decode_embedded(encoded, known))
            .unwrap_or_default(),
        Shape::SingleRecord => vec![value.clone()],
        Shape::Unrecognized => Vec::new(),
    }
}

/// Parse a JSON string embedded in an `output` object. An array is the
/// collection; an object may carry the collection under a named field or be
/// a single record. Anything unparsable is empty.
fn decode_embedded(encoded: &str, known: &ShapeSpec) -> Vec<Value> {
    match serde_json::from_str::<Value>(encoded) {
        Ok(Value::Array(items)) => items,
        Ok(Value::Object(obj)) => {
            if let Some((_, arr)) = known.named_collection(&obj) {
                arr.clone()
            } else if known.looks_like_record(&obj) {
                vec![Value::Object(obj)]
            } else {
                Vec::new()
            }
        }
        Ok(_) => Vec::new(),
        Err(e) => {
            debug!("Embedded output is not JSON: {e}");
            Vec::new()
        }
    }
}

/// Extract and deserialize the collection. Elements that do not fit `T`
/// are skipped.
pub fn extract_records<T: DeserializeOwned>(value: &Value, known: &ShapeSpec) -> Vec<T> {
    extract(value, known)
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<T>(item) {
            Ok(record) => Some(record),
            Err(e) => {
                debug!("Skipping malformed record: {e}");
                None
            }
        })
        .collect()
}
