//! Business records as written by the collector.
//!
//! ## Observed shape
//!
//! The collector writes one flat snake_case object per establishment:
//! `name`, `address`, `phone`, `website`, `email`, `opening_hours`,
//! `business_type`, `accessibility`, and search metadata (`search_date`,
//! `search_location`, `search_radius`). Coordinates (`latitude`,
//! `longitude`) are present only when the collector resolved them.
//!
//! - Missing values arrive as `null` or as empty strings (`website: ""`,
//!   `email: ""`). Both decode as `None`.
//! - `opening_hours` is one schedule entry per line, or the literal
//!   `"Not Available"`.
//! - `search_date` is a naive ISO-8601 timestamp without offset.
//!
//! Text fields are strict: a number where a string belongs makes the whole
//! record malformed. Coordinates and the accessibility flag are lenient and
//! decode unusable values as absent.

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use thiserror::Error;

/// One scraped establishment.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BusinessRecord {
    /// Supplied or injected identifier. Numbers are kept as their decimal text.
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: Option<String>,

    #[serde(default, deserialize_with = "optional_text")]
    pub name: Option<String>,

    /// Category tag such as `"coffee_shop"`.
    #[serde(default, deserialize_with = "optional_text")]
    pub business_type: Option<String>,

    #[serde(default, deserialize_with = "optional_text")]
    pub address: Option<String>,

    #[serde(default, deserialize_with = "lenient_coordinate")]
    pub latitude: Option<f64>,

    #[serde(default, deserialize_with = "lenient_coordinate")]
    pub longitude: Option<f64>,

    #[serde(default, deserialize_with = "optional_text")]
    pub phone: Option<String>,

    #[serde(default, deserialize_with = "optional_text")]
    pub email: Option<String>,

    #[serde(default, deserialize_with = "optional_text")]
    pub website: Option<String>,

    /// Multi-line schedule text, kept unsplit.
    #[serde(default, deserialize_with = "optional_text")]
    pub opening_hours: Option<String>,

    #[serde(default, deserialize_with = "optional_text")]
    pub search_date: Option<String>,

    #[serde(default, deserialize_with = "optional_text")]
    pub search_location: Option<String>,

    #[serde(default, deserialize_with = "optional_text")]
    pub search_radius: Option<String>,

    /// Wheelchair-accessible entrance, when the provider reported it.
    #[serde(default, deserialize_with = "lenient_flag")]
    pub accessibility: Option<bool>,

    /// Any other collector fields, preserved untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Why a raw JSON element could not be decoded into a [`BusinessRecord`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("record is a JSON {kind}, not an object")]
    NotAnObject { kind: &'static str },

    #[error("malformed record: {0}")]
    Malformed(String),
}

impl BusinessRecord {
    /// Decodes one raw collector element.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::NotAnObject`] for non-object elements and
    /// [`RecordError::Malformed`] when a strict field has the wrong JSON type.
    pub fn from_value(value: &Value) -> Result<Self, RecordError> {
        if !value.is_object() {
            return Err(RecordError::NotAnObject {
                kind: json_kind(value),
            });
        }
        Self::deserialize(value).map_err(|e| RecordError::Malformed(e.to_string()))
    }

    /// Both coordinates, when both are present.
    #[must_use]
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        self.latitude.zip(self.longitude)
    }
}

/// The identifier a raw element carries, if it carries a usable one.
///
/// Non-blank strings and numbers count; `null`, blanks, and other JSON types
/// do not.
#[must_use]
pub fn supplied_id(raw: &Value) -> Option<String> {
    raw.get("id").and_then(id_from_value)
}

/// Best-effort text for `key` on a raw element, used for matching and
/// ordering records that may not decode.
///
/// Strings are returned as-is (blank strings count as absent); other
/// non-null values are returned as their compact JSON text.
#[must_use]
pub fn field_text(raw: &Value, key: &str) -> Option<String> {
    match raw.get(key)? {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn id_from_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

fn lenient_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(id_from_value))
}

fn lenient_coordinate<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let coordinate = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(coordinate.filter(|c| c.is_finite()))
}

fn lenient_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Bool(b)) => Some(b),
        Some(Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" => Some(true),
            "false" | "no" => Some(false),
            _ => None,
        },
        _ => None,
    })
}

#[cfg(test)]
#[path = "business_test.rs"]
mod tests;
