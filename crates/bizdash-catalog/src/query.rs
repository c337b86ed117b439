//! Filter and sort over catalog entries.

use std::cmp::Ordering;

use bizdash_core::SortKey;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::catalog::Entry;

/// Listable entries matching `filter`, ordered by `sort`.
///
/// Entries missing `name` or `business_type` are dropped first. Matching is
/// a case-insensitive substring test against either field; an empty filter
/// matches everything. All orderings are stable.
pub(crate) fn select<'a>(entries: &'a [Entry], filter: &str, sort: SortKey) -> Vec<&'a Entry> {
    let needle = filter.trim().to_lowercase();

    let mut selected: Vec<&Entry> = entries
        .iter()
        .filter(|entry| {
            if entry.is_listable() {
                return true;
            }
            tracing::warn!(
                id = entry.id(),
                has_name = entry.name_key().is_some(),
                has_business_type = entry.type_key().is_some(),
                "excluding business without name or business_type"
            );
            false
        })
        .filter(|entry| matches_filter(entry, &needle))
        .collect();

    match sort {
        SortKey::Name => selected.sort_by(|a, b| compare_text(a.name_key(), b.name_key())),
        SortKey::Type => selected.sort_by(|a, b| compare_text(a.type_key(), b.type_key())),
        // `None` sorts below every timestamp, so reversing puts it last.
        SortKey::Date => selected.sort_by(|a, b| b.searched_at().cmp(&a.searched_at())),
        SortKey::None => {}
    }

    selected
}

fn matches_filter(entry: &Entry, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    let contains = |field: Option<&str>| field.is_some_and(|f| f.to_lowercase().contains(needle));
    contains(entry.name_key()) || contains(entry.type_key())
}

fn compare_text(a: Option<&str>, b: Option<&str>) -> Ordering {
    locale_cmp(a.unwrap_or_default(), b.unwrap_or_default())
}

/// Multi-level ordering in the manner of a root-locale collator.
///
/// Base letters are compared first with accents and case ignored, so
/// `"Éclair"` sorts between `"apple"` and `"Zinc"`. Ties are broken by
/// accents (unaccented first), then by case (lower-case first), then by
/// code point.
pub(crate) fn locale_cmp(a: &str, b: &str) -> Ordering {
    base_letters(a)
        .cmp(base_letters(b))
        .then_with(|| accented(a).cmp(accented(b)))
        .then_with(|| upper_marks(a).cmp(upper_marks(b)))
        .then_with(|| a.cmp(b))
}

fn base_letters(s: &str) -> impl Iterator<Item = char> + '_ {
    s.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
}

fn upper_marks(s: &str) -> impl Iterator<Item = bool> + '_ {
    s.nfd().map(char::is_uppercase)
}

fn accented(s: &str) -> impl Iterator<Item = char> + '_ {
    s.nfd().flat_map(char::to_lowercase)
}

#[cfg(test)]
#[path = "query_test.rs"]
mod tests;
