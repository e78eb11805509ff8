//! Webhook Registry — stores and retrieves webhook definitions
//!
//! Built once at startup from `GatewayConfig` and shared read-only. Unknown
//! names are an ordinary `None`.

use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;
use tracing::info;

use crate::config::{GatewayConfig, WebhookEntry};

/// Header names the access gateway in front of n8n expects
pub const ACCESS_CLIENT_ID_HEADER: &str = "CF-Access-Client-Id";
pub const ACCESS_CLIENT_SECRET_HEADER: &str = "CF-Access-Client-Secret";

/// Expected JSON kind of a payload field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    String,
    Number,
    Array,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FieldKind::String => "string",
            FieldKind::Number => "number",
            FieldKind::Array => "array",
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationSchema {
    pub required: Vec<String>,
    pub field_types: Vec<(String, FieldKind)>,
}

impl ValidationSchema {
    fn new(required: &[&str], field_types: &[(&str, FieldKind)]) -> Self {
        Self {
            required: required.iter().map(|f| f.to_string()).collect(),
            field_types: field_types
                .iter()
                .map(|(name, kind)| (name.to_string(), *kind))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookDefinition {
    pub name: String,
    pub external_url: String,
    pub headers: Vec<(String, String)>,
    pub schema: ValidationSchema,
    /// Overrides the upstream default timeout
    pub timeout: Option<Duration>,
}

/// Immutable webhook registry
#[derive(Debug, Clone, Default)]
pub struct Registry {
    webhooks: HashMap<String, WebhookDefinition>,
}

impl Registry {
    /// Build the registry from the built-in table plus config entries
    pub fn from_config(config: &GatewayConfig) -> Self {
        let base_url = config.upstream.base_url.trim_end_matches('/');
        let headers = vec![
            (
                ACCESS_CLIENT_ID_HEADER.to_string(),
                config.upstream.access_client_id.clone(),
            ),
            (
                ACCESS_CLIENT_SECRET_HEADER.to_string(),
                config.upstream.access_client_secret.clone(),
            ),
        ];

        let mut webhooks = HashMap::new();
        let configured = config.webhooks.iter().map(from_entry);

        for (name, schema, timeout) in builtin_webhooks().into_iter().chain(configured) {
            let definition = WebhookDefinition {
                external_url: format!("{base_url}/{name}"),
                name: name.clone(),
                headers: headers.clone(),
                schema,
                timeout,
            };
            info!("Registered webhook: {} -> {}", name, definition.external_url);
            webhooks.insert(name, definition);
        }

        Self { webhooks }
    }

    /// Get a webhook by name
    pub fn lookup(&self, name: &str) -> Option<&WebhookDefinition> {
        self.webhooks.get(name)
    }

    /// Registered webhook names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.webhooks.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.webhooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.webhooks.is_empty()
    }
}

fn from_entry(entry: &WebhookEntry) -> (String, ValidationSchema, Option<Duration>) {
    let schema = ValidationSchema {
        required: entry.required.clone(),
        field_types: entry
            .types
            .iter()
            .map(|(name, kind)| (name.clone(), *kind))
            .collect(),
    };
    (
        entry.name.clone(),
        schema,
        entry.timeout_ms.map(Duration::from_millis),
    )
}

/// Webhooks every deployment has
fn builtin_webhooks() -> Vec<(String, ValidationSchema, Option<Duration>)> {
    use FieldKind::{Array, Number, String as Str};

    vec![
        ("status", ValidationSchema::default(), None),
        (
            "summarizer",
            ValidationSchema::new(&["text"], &[("text", Str), ("attachments", Array)]),
            None,
        ),
        (
            "generate_idea",
            ValidationSchema::new(
                &["context", "my_thoughts"],
                &[("context", Str), ("my_thoughts", Str), ("quantity", Number)],
            ),
            None,
        ),
        (
            "analyzer",
            ValidationSchema::new(
                &["region", "industry", "analysis_depth", "keywords"],
                &[
                    ("region", Str),
                    ("industry", Str),
                    ("analysis_depth", Number),
                    ("keywords", Str),
                ],
            ),
            None,
        ),
        (
            "game_idea_generator",
            ValidationSchema::new(
                &["genre", "platform", "art_style", "monetization"],
                &[
                    ("genre", Str),
                    ("custom_genre", Str),
                    ("platform", Array),
                    ("audience_age", Str),
                    ("audience_skill", Str),
                    ("playstyle", Str),
                    ("art_style", Str),
                    ("monetization", Str),
                    ("themes", Str),
                ],
            ),
            None,
        ),
        (
            "chat-gpt-2",
            ValidationSchema::new(
                &["model", "message", "uuid"],
                &[("model", Str), ("message", Str), ("uuid", Str)],
            ),
            // reasoning models routinely take several minutes
            Some(Duration::from_secs(300)),
        ),
        (
            "chat-gpt-2-memory",
            ValidationSchema::new(&["uuid"], &[("uuid", Str)]),
            None,
        ),
        (
            "plan-vacation",
            ValidationSchema::new(
                &[
                    "country",
                    "location_type",
                    "location_name",
                    "start",
                    "end",
                    "budget",
                    "vacation_type",
                ],
                &[
                    ("country", Str),
                    ("location_type", Str),
                    ("location_name", Str),
                    ("start", Str),
                    ("end", Str),
                    ("budget", Str),
                    ("vacation_type", Str),
                ],
            ),
            None,
        ),
        (
            "recipe_recommender",
            ValidationSchema::new(
                &[],
                &[
                    ("ingredients", Str),
                    ("cuisine", Str),
                    ("meal_time", Str),
                    ("dietary_restrictions", Str),
                    ("recipe_count", Number),
                ],
            ),
            None,
        ),
    ]
    .into_iter()
    .map(|(name, schema, timeout)| (name.to_string(), schema, timeout))
    .collect()
}
