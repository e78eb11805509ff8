//! Idea generator results

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{lenient_f64, lenient_string};
use crate::shape::{extract_records, ShapeSpec};

const SHAPE: ShapeSpec = ShapeSpec {
    collections: &["ideas", "result"],
    record_keys: &["title", "description", "price_point"],
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdeaItem {
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub price_point: String,
    /// Minutes
    #[serde(default, deserialize_with = "lenient_f64")]
    pub time_to_make: f64,
}

pub fn ideas(value: &Value) -> Vec<IdeaItem> {
    extract_records(value, &SHAPE)
}
