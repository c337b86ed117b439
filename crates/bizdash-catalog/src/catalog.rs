//! The authoritative in-memory record list.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use bizdash_core::{
    field_text, parse_search_date, supplied_id, BusinessRecord, RecordError, SortKey,
};

use crate::error::CatalogError;
use crate::query;
use crate::source::{Source, SourceClient};
use crate::view::{build_view, RecordView};

/// Prefix for identifiers assigned to records that arrive without one.
pub const SYNTHETIC_ID_PREFIX: &str = "biz-";

/// One loaded record: its identifier, the raw collector object, and the
/// decoded form (or why it failed to decode).
#[derive(Debug, Clone)]
pub struct Entry {
    id: String,
    raw: Value,
    name: Option<String>,
    business_type: Option<String>,
    searched_at: Option<DateTime<Utc>>,
    record: Result<BusinessRecord, RecordError>,
}

impl Entry {
    fn new(id: String, raw: Value) -> Self {
        let record = BusinessRecord::from_value(&raw);
        Self {
            name: field_text(&raw, "name"),
            business_type: field_text(&raw, "business_type"),
            searched_at: field_text(&raw, "search_date").and_then(|s| parse_search_date(&s)),
            id,
            raw,
            record,
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The collector object, unchanged apart from an injected `id`.
    #[must_use]
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    /// # Errors
    ///
    /// Returns the decode failure for malformed records.
    pub fn record(&self) -> Result<&BusinessRecord, &RecordError> {
        self.record.as_ref()
    }

    pub(crate) fn name_key(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub(crate) fn type_key(&self) -> Option<&str> {
        self.business_type.as_deref()
    }

    pub(crate) fn searched_at(&self) -> Option<DateTime<Utc>> {
        self.searched_at
    }

    /// Whether the record has both fields required for listing.
    #[must_use]
    pub fn is_listable(&self) -> bool {
        self.name.is_some() && self.business_type.is_some()
    }
}

/// Orders loads so a slow load cannot overwrite the result of a later one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct LoadTicket(pub u64);

/// What happened to the catalog after a load attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum LoadOutcome {
    /// The fresh list replaced the previous one.
    Applied { generation: u64, records: usize },
    /// A later load already committed; this result was dropped.
    Superseded { generation: u64 },
    /// Transport or parse failure; the previous list was kept.
    Failed { error: String },
}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: Vec<Entry>,
    generation: u64,
}

impl Catalog {
    /// Builds a catalog from a payload (bare array or `{ "data": [...] }`).
    #[must_use]
    pub fn from_payload(payload: Value) -> Self {
        Self::from_records(crate::payload::records_from(payload))
    }

    /// Builds a catalog from raw collector elements, assigning identifiers to
    /// those that lack one.
    ///
    /// Synthetic ids are positional (`biz-1` for the first element), so they
    /// are only stable while the source order is.
    #[must_use]
    pub fn from_records(raw_records: Vec<Value>) -> Self {
        let supplied: HashSet<String> = raw_records.iter().filter_map(supplied_id).collect();
        let mut used: HashSet<String> = HashSet::with_capacity(raw_records.len());

        let entries = raw_records
            .into_iter()
            .enumerate()
            .map(|(index, mut raw)| {
                let id = if let Some(id) = supplied_id(&raw) {
                    if used.contains(&id) {
                        tracing::warn!(
                            id = %id,
                            "duplicate business id in payload; detail lookups resolve to the first"
                        );
                    }
                    id
                } else {
                    let id = synthetic_id(index, &supplied, &used);
                    inject_id(&mut raw, &id);
                    id
                };
                used.insert(id.clone());
                Entry::new(id, raw)
            })
            .collect();

        Self {
            entries,
            generation: 0,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Generation of the load that produced the current list; `0` before the
    /// first successful load.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Replaces the list with `fresh` unless a load with a later ticket has
    /// already been committed.
    pub fn commit(&mut self, ticket: LoadTicket, fresh: Catalog) -> LoadOutcome {
        if ticket.0 <= self.generation {
            tracing::info!(
                ticket = ticket.0,
                generation = self.generation,
                "dropping out-of-order load result"
            );
            return LoadOutcome::Superseded {
                generation: self.generation,
            };
        }
        self.entries = fresh.entries;
        self.generation = ticket.0;
        tracing::info!(
            generation = self.generation,
            records = self.entries.len(),
            "catalog replaced"
        );
        LoadOutcome::Applied {
            generation: self.generation,
            records: self.entries.len(),
        }
    }

    /// Fetches `source` and replaces the list with its records.
    ///
    /// Never fails: on a transport or parse error the previous list is kept
    /// and the error is logged and reported as [`LoadOutcome::Failed`].
    pub async fn load(&mut self, client: &SourceClient, source: &Source) -> LoadOutcome {
        let ticket = LoadTicket(self.generation + 1);
        match client.fetch(source).await {
            Ok(payload) => self.commit(ticket, Catalog::from_payload(payload)),
            Err(e) => {
                tracing::error!(%source, error = %e, "failed to load businesses; keeping previous list");
                LoadOutcome::Failed {
                    error: e.to_string(),
                }
            }
        }
    }

    /// Filters and orders the listable records and yields their views.
    ///
    /// Always recomputed from the authoritative list; views are built as the
    /// iterator is consumed.
    pub fn query<'a>(
        &'a self,
        filter: &str,
        sort: SortKey,
    ) -> impl Iterator<Item = RecordView> + 'a {
        query::select(&self.entries, filter, sort)
            .into_iter()
            .map(build_view)
    }

    /// Looks up a record by id across the whole list, not the filtered view.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::DetailNotFound`] when `id` is blank or matches
    /// no record.
    pub fn select_detail(&self, id: &str) -> Result<RecordView, CatalogError> {
        let found = if id.trim().is_empty() {
            None
        } else {
            self.entries.iter().find(|entry| entry.id == id)
        };
        found.map(build_view).ok_or_else(|| {
            tracing::warn!(id, "business detail not found");
            CatalogError::DetailNotFound { id: id.to_owned() }
        })
    }

    /// The raw collector objects in input order.
    #[must_use]
    pub fn raw_records(&self) -> Vec<Value> {
        self.entries.iter().map(|e| e.raw.clone()).collect()
    }
}

fn synthetic_id(index: usize, supplied: &HashSet<String>, used: &HashSet<String>) -> String {
    let base = format!("{SYNTHETIC_ID_PREFIX}{}", index + 1);
    let taken = |candidate: &str| supplied.contains(candidate) || used.contains(candidate);
    if !taken(&base) {
        return base;
    }
    let mut suffix = 2usize;
    loop {
        let candidate = format!("{base}-{suffix}");
        if !taken(&candidate) {
            tracing::warn!(id = %candidate, "synthetic id collided with a supplied id");
            return candidate;
        }
        suffix += 1;
    }
}

/// Writes `id` into the raw object when its `id` is absent, null, or blank.
/// Other existing values are never overwritten.
fn inject_id(raw: &mut Value, id: &str) {
    let Value::Object(map) = raw else {
        return;
    };
    let replaceable = match map.get("id") {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(_) => false,
    };
    if replaceable {
        map.insert("id".to_owned(), Value::String(id.to_owned()));
    }
}

#[cfg(test)]
#[path = "catalog_test.rs"]
mod tests;
