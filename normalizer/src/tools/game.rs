//! Game idea generator — the page shows one idea, the first found

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{lenient_string, TextOrList};
use crate::shape::{extract_records, ShapeSpec};

const SHAPE: ShapeSpec = ShapeSpec {
    collections: &["ideas", "result"],
    record_keys: &["title", "core_loop", "primary_mechanics"],
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameIdeaItem {
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub core_loop: String,
    #[serde(default)]
    pub primary_mechanics: TextOrList,
    #[serde(default)]
    pub secondary_mechanics: Option<TextOrList>,
    #[serde(default)]
    pub story_premise: Option<String>,
    #[serde(default)]
    pub level_examples: Option<TextOrList>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub progression_rewards: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub monetization_strategy: String,
}

pub fn game_idea(value: &Value) -> Option<GameIdeaItem> {
    extract_records(value, &SHAPE).into_iter().next()
}
