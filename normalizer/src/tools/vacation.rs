//! Vacation planner — points of interest and holidays
//!
//! Unlike the list tools, the plan is one object whose two collections may
//! sit under `output`, under `result`, or at the top level. Each collection
//! is looked up independently in that order.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{lenient_f64, lenient_string};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointOfInterest {
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub why_visit: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub admission: String,
    /// 1 (must see) to 6 (temporary)
    #[serde(default, deserialize_with = "lenient_f64")]
    pub priority: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holiday {
    #[serde(default, deserialize_with = "lenient_string")]
    pub holiday_name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub holiday_type: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub date: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VacationPlan {
    pub pois: Vec<PointOfInterest>,
    pub holidays: Vec<Holiday>,
}

impl VacationPlan {
    pub fn is_empty(&self) -> bool {
        self.pois.is_empty() && self.holidays.is_empty()
    }
}

pub fn vacation_plan(value: &Value) -> VacationPlan {
    // n8n sometimes wraps the final item in a one-element array
    let root = match value {
        Value::Array(items) => match items.first() {
            Some(first) => first,
            None => return VacationPlan::default(),
        },
        other => other,
    };

    VacationPlan {
        pois: collection(root, "pois"),
        holidays: collection(root, "holidays"),
    }
}

fn collection<T: serde::de::DeserializeOwned>(root: &Value, field: &str) -> Vec<T> {
    let found = [root.get("output"), root.get("result"), Some(root)]
        .into_iter()
        .flatten()
        .find_map(|scope| scope.get(field).and_then(Value::as_array));

    found
        .map(|items| {
            items
                .iter()
                .filter_map(|item| serde_json::from_value(item.clone()).ok())
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_output_scope() {
        let v = json!({"output": {
            "pois": [{"title": "Wawel", "priority": 1, "admission": "free"}],
            "holidays": [{"holiday_name": "Corpus Christi", "holiday_type": "public"}]
        }});
        let plan = vacation_plan(&v);
        assert_eq!(plan.pois.len(), 1);
        assert_eq!(plan.pois[0].priority, 1.0);
        assert_eq!(plan.holidays[0].holiday_name, "Corpus Christi");
    }

    #[test]
    fn test_collections_resolved_independently() {
        let v = json!({
            "result": {"pois": [{"title": "Old Town"}]},
            "holidays": [{"holiday_name": "Midsummer"}]
        });
        let plan = vacation_plan(&v);
        assert_eq!(plan.pois[0].title, "Old Town");
        assert_eq!(plan.holidays[0].holiday_name, "Midsummer");
    }

    #[test]
    fn test_array_wrapped() {
        let v = json!([{"pois": [{"title": "Harbour"}]}]);
        assert_eq!(vacation_plan(&v).pois.len(), 1);
    }

    #[test]
    fn test_unrecognized_is_empty() {
        assert!(vacation_plan(&json!({"message": "accepted"})).is_empty());
        assert!(vacation_plan(&json!([])).is_empty());
        assert!(vacation_plan(&json!(null)).is_empty());
    }
}
