//! Rendering-safe projections of catalog entries.
//!
//! Views carry plain text and pre-built link targets only; escaping for a
//! particular output format is the presenter's job.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Serialize, Serializer};

use bizdash_core::BusinessRecord;

use crate::catalog::Entry;

pub const NO_NAME: &str = "No Name";
pub const NO_ADDRESS: &str = "No Address";
pub const UNKNOWN_TYPE: &str = "unknown";
pub const RENDER_ERROR_LABEL: &str = "Error rendering business";

const MAP_SEARCH_BASE: &str = "https://www.google.com/maps/search/?api=1&query=";

/// Characters left unescaped in a `lat,lng` map query.
const MAP_QUERY: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'.').remove(b',');

/// Characters left unescaped in a `mailto:` address.
const MAILTO: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'@')
    .remove(b'.')
    .remove(b'-')
    .remove(b'_')
    .remove(b'+');

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RecordView {
    Business(BusinessView),
    Error(ErrorView),
}

impl RecordView {
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            RecordView::Business(view) => &view.id,
            RecordView::Error(view) => &view.id,
        }
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(self, RecordView::Error(_))
    }

    #[must_use]
    pub fn as_business(&self) -> Option<&BusinessView> {
        match self {
            RecordView::Business(view) => Some(view),
            RecordView::Error(_) => None,
        }
    }
}

/// Displayable text plus the URI it links to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactLink {
    pub text: String,
    pub href: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BusinessView {
    pub id: String,
    pub name: String,
    /// Raw category tag.
    pub business_type: String,
    /// Tag with underscores shown as spaces.
    pub type_label: String,
    /// Tag reduced to `[a-z0-9-]` for colour/class tagging.
    pub type_class: String,
    pub address: String,
    pub map_link: Option<String>,
    pub phone: Option<ContactLink>,
    pub email: Option<ContactLink>,
    pub website: Option<String>,
    #[serde(rename = "schedule", serialize_with = "serialize_schedule")]
    opening_hours: Option<String>,
    pub accessibility: Option<bool>,
    pub search_date: Option<String>,
    pub search_location: Option<String>,
    pub search_radius: Option<String>,
}

impl BusinessView {
    #[must_use]
    pub fn from_record(id: &str, record: &BusinessRecord) -> Self {
        let business_type = record
            .business_type
            .clone()
            .unwrap_or_else(|| UNKNOWN_TYPE.to_string());

        Self {
            id: id.to_owned(),
            name: record.name.clone().unwrap_or_else(|| NO_NAME.to_string()),
            type_label: business_type.replace('_', " "),
            type_class: type_class(&business_type),
            business_type,
            address: record
                .address
                .clone()
                .unwrap_or_else(|| NO_ADDRESS.to_string()),
            map_link: record
                .coordinates()
                .map(|(lat, lng)| map_link(lat, lng)),
            phone: record.phone.as_deref().map(phone_link),
            email: record.email.as_deref().map(email_link),
            website: record.website.clone(),
            opening_hours: record.opening_hours.clone(),
            accessibility: record.accessibility,
            search_date: record.search_date.clone(),
            search_location: record.search_location.clone(),
            search_radius: record.search_radius.clone(),
        }
    }

    /// Opening hours one entry per line, split on demand.
    #[must_use]
    pub fn schedule(&self) -> Schedule<'_> {
        Schedule::new(self.opening_hours.as_deref())
    }
}

/// Placeholder for a record whose view could not be derived.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorView {
    pub id: String,
    pub label: &'static str,
    pub message: String,
}

/// Lazy iterator over the non-blank lines of an opening-hours text.
#[derive(Debug, Clone)]
pub struct Schedule<'a> {
    lines: Option<std::str::Lines<'a>>,
}

impl<'a> Schedule<'a> {
    #[must_use]
    pub fn new(text: Option<&'a str>) -> Self {
        Self {
            lines: text.map(str::lines),
        }
    }
}

impl<'a> Iterator for Schedule<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        let lines = self.lines.as_mut()?;
        lines.map(str::trim).find(|line| !line.is_empty())
    }
}

/// Derives the view for one entry.
///
/// A malformed entry yields an [`RecordView::Error`] placeholder and an
/// error-level log line; it never affects other entries.
#[must_use]
pub fn build_view(entry: &Entry) -> RecordView {
    match entry.record() {
        Ok(record) => RecordView::Business(BusinessView::from_record(entry.id(), record)),
        Err(e) => {
            tracing::error!(id = entry.id(), error = %e, "failed to render business");
            RecordView::Error(ErrorView {
                id: entry.id().to_owned(),
                label: RENDER_ERROR_LABEL,
                message: e.to_string(),
            })
        }
    }
}

fn map_link(lat: f64, lng: f64) -> String {
    let query = format!("{lat},{lng}");
    format!("{MAP_SEARCH_BASE}{}", utf8_percent_encode(&query, MAP_QUERY))
}

fn phone_link(phone: &str) -> ContactLink {
    let trimmed = phone.trim();
    let dialable: String = trimmed
        .chars()
        .enumerate()
        .filter(|&(i, c)| c.is_ascii_digit() || (i == 0 && c == '+'))
        .map(|(_, c)| c)
        .collect();
    ContactLink {
        text: trimmed.to_owned(),
        href: format!("tel:{dialable}"),
    }
}

fn email_link(email: &str) -> ContactLink {
    let trimmed = email.trim();
    ContactLink {
        text: trimmed.to_owned(),
        href: format!("mailto:{}", utf8_percent_encode(trimmed, MAILTO)),
    }
}

fn type_class(business_type: &str) -> String {
    business_type
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

#[allow(clippy::ref_option)]
fn serialize_schedule<S>(hours: &Option<String>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_seq(Schedule::new(hours.as_deref()))
}

#[cfg(test)]
#[path = "view_test.rs"]
mod tests;
