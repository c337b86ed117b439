//! Merging a newly collected batch into the collector artifact.
//!
//! Records are identified by their `(name, address)` pair. Existing records
//! are never modified; only unseen incoming records are appended.

use std::collections::HashSet;
use std::path::Path;

use serde_json::{Map, Value};

use bizdash_core::field_text;

use crate::error::LoadError;
use crate::payload::{parse_payload, records_from};

#[derive(Debug, Clone, PartialEq)]
pub struct MergeOutcome {
    /// Existing records followed by the newly added ones.
    pub records: Vec<Value>,
    pub added: usize,
    pub skipped: usize,
    pub total: usize,
}

/// Compute a stable dedup key for a raw record.
///
/// SHA-256 over `name || address`, each trimmed and lower-cased. Hex-encoded.
#[must_use]
pub fn dedupe_key(raw: &Value) -> String {
    use sha2::{Digest, Sha256};
    let part = |key: &str| {
        field_text(raw, key)
            .unwrap_or_default()
            .trim()
            .to_lowercase()
    };
    let input = format!("{}\x00{}", part("name"), part("address"));
    format!("{:x}", Sha256::digest(input.as_bytes()))
}

/// Appends the records of `incoming` whose key is not already present.
///
/// Duplicates inside `incoming` itself are collapsed to their first
/// occurrence.
#[must_use]
pub fn merge_records(existing: Vec<Value>, incoming: Vec<Value>) -> MergeOutcome {
    let mut seen: HashSet<String> = existing.iter().map(dedupe_key).collect();
    let mut records = existing;
    let mut added = 0usize;
    let mut skipped = 0usize;

    for raw in incoming {
        if seen.insert(dedupe_key(&raw)) {
            records.push(raw);
            added += 1;
        } else {
            skipped += 1;
        }
    }

    MergeOutcome {
        total: records.len(),
        records,
        added,
        skipped,
    }
}

/// Merges `incoming` into the JSON array stored at `path`.
///
/// A missing file starts empty. An existing file that does not decode is
/// treated as empty and logged. Nothing is written when no record is added;
/// otherwise the file is rewritten pretty-printed with sorted keys.
///
/// # Errors
///
/// Returns [`LoadError::Io`] when the existing file cannot be read,
/// [`LoadError::Serialize`] when the merged records cannot be encoded, and
/// [`LoadError::Write`] when the merged file cannot be written.
pub async fn merge_into_file(path: &Path, incoming: Vec<Value>) -> Result<MergeOutcome, LoadError> {
    let existing = match tokio::fs::read(path).await {
        Ok(bytes) => match parse_payload(&bytes, &path.display().to_string()) {
            Ok(payload) => records_from(payload),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "existing data file is not valid JSON; starting empty");
                Vec::new()
            }
        },
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
        Err(e) => {
            return Err(LoadError::Io {
                path: path.display().to_string(),
                source: e,
            })
        }
    };

    let outcome = merge_records(existing, incoming);
    if outcome.added == 0 {
        tracing::info!(path = %path.display(), total = outcome.total, "no new businesses to add");
        return Ok(outcome);
    }

    let document = Value::Array(outcome.records.iter().cloned().map(sort_keys).collect());
    let mut bytes = serde_json::to_vec_pretty(&document).map_err(|e| LoadError::Serialize {
        context: format!("merged records for {}", path.display()),
        source: e,
    })?;
    bytes.push(b'\n');

    tokio::fs::write(path, bytes)
        .await
        .map_err(|e| LoadError::Write {
            path: path.display().to_string(),
            source: e,
        })?;

    tracing::info!(
        path = %path.display(),
        added = outcome.added,
        skipped = outcome.skipped,
        total = outcome.total,
        "merged businesses into data file"
    );
    Ok(outcome)
}

fn sort_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|(a, _), (b, _)| a.cmp(b));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, sort_keys(v)))
                    .collect::<Map<String, Value>>(),
            )
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_keys).collect()),
        other => other,
    }
}

#[cfg(test)]
#[path = "merge_test.rs"]
mod tests;
