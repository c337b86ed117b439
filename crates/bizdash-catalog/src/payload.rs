//! Payload shape handling.
//!
//! The collector writes a bare array; the collector's HTTP endpoint wraps the
//! same array as `{ "status": ..., "count": ..., "data": [...] }`.

use serde_json::Value;

use crate::error::LoadError;

/// Parses raw payload bytes as JSON.
///
/// # Errors
///
/// Returns [`LoadError::Deserialize`] if `bytes` is not valid JSON.
pub fn parse_payload(bytes: &[u8], context: &str) -> Result<Value, LoadError> {
    serde_json::from_slice(bytes).map_err(|e| LoadError::Deserialize {
        context: context.to_owned(),
        source: e,
    })
}

/// Extracts the record array from a payload.
///
/// Any shape other than an array or an object with a `data` array yields
/// zero records.
#[must_use]
pub fn records_from(payload: Value) -> Vec<Value> {
    match payload {
        Value::Array(items) => items,
        Value::Object(mut map) => {
            if map.get("status").and_then(Value::as_str) == Some("error") {
                let message = map
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("no message");
                tracing::warn!(message, "payload source reported an error");
            }
            match map.remove("data") {
                Some(Value::Array(items)) => items,
                Some(_) => {
                    tracing::warn!("payload `data` field is not an array; treating as empty");
                    Vec::new()
                }
                None => {
                    tracing::warn!("payload object has no `data` field; treating as empty");
                    Vec::new()
                }
            }
        }
        _ => {
            tracing::warn!("payload is neither an array nor an object; treating as empty");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn bare_array_and_wrapped_data_yield_same_records() {
        let records = json!([{"name": "Cafe A"}, {"name": "Bar B"}]);
        let wrapped = json!({"status": "success", "count": 2, "data": records.clone()});
        assert_eq!(records_from(records.clone()), records_from(wrapped));
        assert_eq!(records_from(records).len(), 2);
    }

    #[test]
    fn other_shapes_yield_zero_records() {
        assert!(records_from(json!({"businesses": []})).is_empty());
        assert!(records_from(json!({"data": {"name": "x"}})).is_empty());
        assert!(records_from(json!("text")).is_empty());
        assert!(records_from(json!(null)).is_empty());
    }

    #[test]
    fn error_status_payload_still_uses_data() {
        let payload = json!({"status": "error", "message": "Invalid JSON format", "count": 0, "data": []});
        assert!(records_from(payload).is_empty());
    }

    #[test]
    fn parse_payload_reports_context() {
        let err = parse_payload(b"{not json", "fixture").unwrap_err();
        assert!(
            matches!(err, LoadError::Deserialize { ref context, .. } if context == "fixture"),
            "expected Deserialize, got: {err:?}"
        );
    }
}
