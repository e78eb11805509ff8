//! Market analyzer results — ranked by score, limited to the requested depth

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{lenient_f64, lenient_string};
use crate::shape::{extract_records, ShapeSpec};

const SHAPE: ShapeSpec = ShapeSpec {
    collections: &["analyses", "result"],
    record_keys: &["name", "score", "gapDescription"],
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketAnalysis {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    /// 0-100
    #[serde(default, deserialize_with = "lenient_f64")]
    pub score: f64,
    #[serde(default, deserialize_with = "lenient_string")]
    pub gap_description: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub market_size: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub competitors: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub business_model: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub target_customers: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub risks: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub opportunities: String,
    #[serde(default)]
    pub links: Vec<String>,
}

/// Analyses sorted by score (highest first), at most `depth` of them
pub fn analyses(value: &Value, depth: usize) -> Vec<MarketAnalysis> {
    let mut items: Vec<MarketAnalysis> = extract_records(value, &SHAPE);
    items.sort_by(|a, b| b.score.total_cmp(&a.score));
    items.truncate(depth);
    items
}
