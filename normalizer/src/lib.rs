//! toolhub response normalizer
//!
//! The automation backend returns JSON whose shape is not fixed: the same
//! list of ideas may arrive bare, wrapped in `output`, under a named field,
//! or JSON-encoded inside `output.sanitized`. This crate turns such values
//! into typed records for each tool. Normalization never fails; a response
//! it cannot make sense of yields an empty list or `None`.

pub mod shape;
pub mod tools;

pub use shape::{classify, extract, extract_records, Shape, ShapeSpec};
pub use tools::chat::{chat_memory, chat_reply, ChatReply, ChatTurn};
pub use tools::game::{game_idea, GameIdeaItem};
pub use tools::ideas::{ideas, IdeaItem};
pub use tools::market::{analyses, MarketAnalysis};
pub use tools::recipe::{recipes, Nutrient, NutrientGroups, Recipe};
pub use tools::status::{backend_status, BackendStatus};
pub use tools::summary::summary;
pub use tools::vacation::{vacation_plan, Holiday, PointOfInterest, VacationPlan};
pub use tools::TextOrList;
