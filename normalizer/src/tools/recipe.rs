//! Recipe recommender results
//!
//! Recipes carry a free-form `nutritients` object (the backend's spelling).
//! For display it is split into the primary macros and everything else.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{lenient_string, text_of, TextOrList};
use crate::shape::{extract_records, ShapeSpec};

const SHAPE: ShapeSpec = ShapeSpec {
    collections: &["recipes", "result"],
    record_keys: &["name", "title", "ingredients"],
};

/// Nutrient keys shown as primary macros, in display order
const PRIMARY_MACROS: [&str; 5] = ["calories", "protein", "carbs", "carbohydrates", "fat"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    #[serde(default, alias = "title", deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub cuisine: String,
    #[serde(default)]
    pub ingredients: TextOrList,
    #[serde(default)]
    pub instructions: TextOrList,
    #[serde(default, deserialize_with = "lenient_string")]
    pub prep_time: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub servings: String,
    #[serde(default, alias = "nutrients")]
    pub nutritients: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Nutrient {
    pub name: String,
    pub amount: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NutrientGroups {
    pub primary: Vec<Nutrient>,
    pub other: Vec<Nutrient>,
}

impl Recipe {
    pub fn nutrient_groups(&self) -> NutrientGroups {
        let mut groups = NutrientGroups::default();

        for key in PRIMARY_MACROS {
            if let Some((name, value)) = self
                .nutritients
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(key))
            {
                groups.primary.push(Nutrient {
                    name: name.clone(),
                    amount: text_of(value),
                });
            }
        }

        for (name, value) in &self.nutritients {
            let is_primary = PRIMARY_MACROS.iter().any(|k| name.eq_ignore_ascii_case(k));
            if !is_primary {
                groups.other.push(Nutrient {
                    name: name.clone(),
                    amount: text_of(value),
                });
            }
        }

        groups
    }
}

pub fn recipes(value: &Value) -> Vec<Recipe> {
    extract_records(value, &SHAPE)
}
