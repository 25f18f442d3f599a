//! Structural validation of the output record.
//!
//! The contract is fixed:
//!
//! ```text
//! { "title": string,
//!   "outline": [ { "level": "H1"|"H2"|"H3", "text": string (len>=1), "page": integer >= 1 }, ... ] }
//! ```
//!
//! No other top-level or per-entry fields are allowed.

use std::fmt;

use serde_json::{Map, Value};

use crate::model::OutlineResult;

const TOP_LEVEL_FIELDS: [&str; 2] = ["title", "outline"];
const ENTRY_FIELDS: [&str; 3] = ["level", "text", "page"];

/// A violation of the output contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// JSON path of the offending value (e.g. `$.outline[2].page`)
    pub path: String,
    /// What is wrong with it
    pub message: String,
}

impl ValidationError {
    /// Create a validation error.
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Validate an assembled result.
pub fn validate_result(result: &OutlineResult) -> Result<(), ValidationError> {
    let value = serde_json::to_value(result)
        .map_err(|e| ValidationError::new("$", format!("not serializable: {}", e)))?;
    validate_value(&value)
}

/// Validate JSON text against the output contract.
pub fn validate_json(json: &str) -> Result<(), ValidationError> {
    let value: Value = serde_json::from_str(json)
        .map_err(|e| ValidationError::new("$", format!("invalid JSON: {}", e)))?;
    validate_value(&value)
}

/// Validate a JSON value against the output contract.
pub fn validate_value(value: &Value) -> Result<(), ValidationError> {
    let root = value
        .as_object()
        .ok_or_else(|| ValidationError::new("$", "expected object"))?;

    check_fields(root, &TOP_LEVEL_FIELDS, "$")?;

    if !root["title"].is_string() {
        return Err(ValidationError::new("$.title", "expected string"));
    }

    let outline = root["outline"]
        .as_array()
        .ok_or_else(|| ValidationError::new("$.outline", "expected array"))?;

    for (i, entry) in outline.iter().enumerate() {
        validate_entry(entry, &format!("$.outline[{}]", i))?;
    }

    Ok(())
}

fn validate_entry(entry: &Value, path: &str) -> Result<(), ValidationError> {
    let obj = entry
        .as_object()
        .ok_or_else(|| ValidationError::new(path, "expected object"))?;

    check_fields(obj, &ENTRY_FIELDS, path)?;

    match obj["level"].as_str() {
        Some(level) if is_valid_level(level) => {}
        Some(level) => {
            return Err(ValidationError::new(
                format!("{}.level", path),
                format!("'{}' does not match ^H[1-3]$", level),
            ))
        }
        None => {
            return Err(ValidationError::new(
                format!("{}.level", path),
                "expected string",
            ))
        }
    }

    match obj["text"].as_str() {
        Some(text) if !text.is_empty() => {}
        Some(_) => {
            return Err(ValidationError::new(
                format!("{}.text", path),
                "must not be empty",
            ))
        }
        None => {
            return Err(ValidationError::new(
                format!("{}.text", path),
                "expected string",
            ))
        }
    }

    // Integers only: 3.0 is rejected like any other float.
    match obj["page"].as_u64() {
        Some(page) if page >= 1 => Ok(()),
        Some(_) => Err(ValidationError::new(
            format!("{}.page", path),
            "must be at least 1",
        )),
        None => Err(ValidationError::new(
            format!("{}.page", path),
            "expected positive integer",
        )),
    }
}

/// Require exactly the given fields.
fn check_fields(
    obj: &Map<String, Value>,
    allowed: &[&str],
    path: &str,
) -> Result<(), ValidationError> {
    for field in allowed {
        if !obj.contains_key(*field) {
            return Err(ValidationError::new(
                path,
                format!("missing required field '{}'", field),
            ));
        }
    }
    if let Some(extra) = obj.keys().find(|k| !allowed.contains(&k.as_str())) {
        return Err(ValidationError::new(
            path,
            format!("additional field '{}' is not allowed", extra),
        ));
    }
    Ok(())
}

fn is_valid_level(level: &str) -> bool {
    matches!(level, "H1" | "H2" | "H3")
}
