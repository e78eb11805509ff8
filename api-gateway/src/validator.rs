//! Request validation for webhook payloads
//!
//! Checks a JSON payload against a webhook's schema and the upload limits.
//! All violations are collected so the caller sees every problem at once.
//! Validation is pure: it neither mutates the payload nor performs I/O.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::UploadLimits;
use crate::registry::{FieldKind, WebhookDefinition};

/// Longest string accepted in any payload field, in characters
pub const MAX_FIELD_CHARS: usize = 10_000;

const MIB: u64 = 1024 * 1024;

/// A user file embedded in the request body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileAttachment {
    pub filename: String,
    #[serde(rename = "type")]
    pub mime_type: String,
    #[serde(default)]
    pub size: u64,
    /// Base64 encoded file content
    #[serde(alias = "content")]
    pub data: String,
}

impl FileAttachment {
    /// Read an attachment entry; `None` when filename, type or data is
    /// missing or empty, or when `size` is not a number.
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let text = |key: &str| {
            obj.get(key)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        Some(Self {
            filename: text("filename")?,
            mime_type: text("type")?,
            data: text("data").or_else(|| text("content"))?,
            size: match obj.get("size") {
                None | Some(Value::Null) => 0,
                Some(size) => attachment_size(size)?,
            },
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,
}

impl ValidationReport {
    fn from_errors(errors: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }
}

/// Validates payloads against webhook schemas
#[derive(Debug, Clone, Copy, Default)]
pub struct Validator {
    limits: UploadLimits,
}

impl Validator {
    pub fn new(limits: UploadLimits) -> Self {
        Self { limits }
    }

    pub fn validate(&self, definition: &WebhookDefinition, payload: &Value) -> ValidationReport {
        let Some(data) = payload.as_object() else {
            return ValidationReport::from_errors(vec![
                "Request body must be a JSON object".to_string(),
            ]);
        };

        let mut errors = Vec::new();
        check_required(definition, data, &mut errors);
        check_types(definition, data, &mut errors);
        check_lengths(data, &mut errors);
        if let Some(Value::Array(attachments)) = data.get("attachments") {
            self.check_attachments(attachments, &mut errors);
        }

        ValidationReport::from_errors(errors)
    }

    fn check_attachments(&self, attachments: &[Value], errors: &mut Vec<String>) {
        let limits = &self.limits;
        if attachments.len() > limits.max_files {
            errors.push(format!("Maximum {} attachments allowed", limits.max_files));
        }

        let mut total: u64 = 0;
        for entry in attachments {
            let Some(attachment) = FileAttachment::from_value(entry) else {
                errors.push("Invalid attachment format".to_string());
                break;
            };
            if attachment.size > limits.max_file_size_bytes {
                errors.push(format!(
                    "File {} exceeds {} limit",
                    attachment.filename,
                    megabytes(limits.max_file_size_bytes)
                ));
            }
            total = total.saturating_add(attachment.size);
        }

        if total > limits.max_total_size_bytes {
            errors.push(format!(
                "Total attachment size exceeds {} limit",
                megabytes(limits.max_total_size_bytes)
            ));
        }
    }
}

fn check_required(definition: &WebhookDefinition, data: &Map<String, Value>, errors: &mut Vec<String>) {
    for field in &definition.schema.required {
        if is_present(data.get(field)) {
            continue;
        }
        // the summarizer accepts files instead of text
        if field == "text" {
            let has_attachments = data
                .get("attachments")
                .and_then(Value::as_array)
                .map(|a| !a.is_empty())
                .unwrap_or(false);
            if !has_attachments {
                errors.push("Either text or attachments are required".to_string());
            }
        } else {
            errors.push(format!("Missing required field: {field}"));
        }
    }
}

fn check_types(definition: &WebhookDefinition, data: &Map<String, Value>, errors: &mut Vec<String>) {
    for (field, expected) in &definition.schema.field_types {
        let Some(value) = data.get(field) else {
            continue;
        };
        let actual = kind_name(value);
        let matches = match expected {
            FieldKind::String => value.is_string(),
            FieldKind::Number => value.is_number(),
            FieldKind::Array => value.is_array(),
        };
        if !matches {
            errors.push(format!("Field {field} should be {expected}, got {actual}"));
        }
    }
}

fn check_lengths(data: &Map<String, Value>, errors: &mut Vec<String>) {
    for (field, value) in data {
        if let Some(s) = value.as_str() {
            if s.chars().count() > MAX_FIELD_CHARS {
                errors.push(format!(
                    "Field {field} is too long (max {MAX_FIELD_CHARS} characters)"
                ));
            }
        }
    }
}

/// Present and truthy: `null`, `false`, `0` and blank strings are missing
fn is_present(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) | Some(Value::Bool(false)) => false,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|n| n != 0.0),
        Some(Value::String(s)) => !s.trim().is_empty(),
        Some(_) => true,
    }
}

/// Byte count from a number or numeric string; negatives clamp to 0
fn attachment_size(value: &Value) -> Option<u64> {
    let bytes = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    bytes.is_finite().then(|| bytes.max(0.0) as u64)
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn megabytes(bytes: u64) -> String {
    if bytes % MIB == 0 {
        format!("{}MB", bytes / MIB)
    } else {
        format!("{bytes} bytes")
    }
}
