use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Ordering applied to a catalog query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    /// Locale-style comparison of `name`.
    Name,
    /// Locale-style comparison of `business_type`.
    Type,
    /// Most recent `search_date` first; unparseable dates last.
    Date,
    /// Input order.
    #[default]
    None,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown sort key \"{0}\" (expected name, type, date, or none)")]
pub struct UnknownSortKey(pub String);

impl SortKey {
    /// Maps a dashboard dropdown value to a sort key.
    ///
    /// Unlike [`str::parse`], unrecognized values mean "no reordering".
    #[must_use]
    pub fn from_param(value: &str) -> Self {
        value.parse().unwrap_or(SortKey::None)
    }
}

impl std::str::FromStr for SortKey {
    type Err = UnknownSortKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "name" => Ok(SortKey::Name),
            "type" => Ok(SortKey::Type),
            "date" => Ok(SortKey::Date),
            "none" | "" => Ok(SortKey::None),
            _ => Err(UnknownSortKey(s.to_string())),
        }
    }
}

impl std::fmt::Display for SortKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SortKey::Name => write!(f, "name"),
            SortKey::Type => write!(f, "type"),
            SortKey::Date => write!(f, "date"),
            SortKey::None => write!(f, "none"),
        }
    }
}

/// Parses a `search_date` value.
///
/// Accepts RFC 3339, the collector's naive `YYYY-MM-DDTHH:MM:SS[.f]`
/// (read as UTC), and a bare `YYYY-MM-DD` (midnight UTC).
#[must_use]
pub fn parse_search_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use chrono::{Datelike, Timelike};

    use super::*;

    #[test]
    fn parses_known_sort_keys() {
        assert_eq!("name".parse::<SortKey>().unwrap(), SortKey::Name);
        assert_eq!("TYPE".parse::<SortKey>().unwrap(), SortKey::Type);
        assert_eq!(" date ".parse::<SortKey>().unwrap(), SortKey::Date);
        assert_eq!("none".parse::<SortKey>().unwrap(), SortKey::None);
    }

    #[test]
    fn strict_parse_rejects_unknown_key() {
        let err = "rating".parse::<SortKey>().unwrap_err();
        assert_eq!(err, UnknownSortKey("rating".to_string()));
    }

    #[test]
    fn from_param_maps_unknown_to_none() {
        assert_eq!(SortKey::from_param("rating"), SortKey::None);
        assert_eq!(SortKey::from_param("name"), SortKey::Name);
    }

    #[test]
    fn display_round_trips_through_from_str() {
        for key in [SortKey::Name, SortKey::Type, SortKey::Date, SortKey::None] {
            assert_eq!(key.to_string().parse::<SortKey>().unwrap(), key);
        }
    }

    #[test]
    fn parses_collector_naive_timestamp() {
        let dt = parse_search_date("2024-03-01T09:15:00.123456").expect("naive iso");
        assert_eq!((dt.year(), dt.month(), dt.day()), (2024, 3, 1));
        assert_eq!((dt.hour(), dt.minute()), (9, 15));
    }

    #[test]
    fn parses_rfc3339_with_offset() {
        let dt = parse_search_date("2024-03-01T10:00:00+01:00").expect("rfc3339");
        assert_eq!(dt.hour(), 9);
    }

    #[test]
    fn parses_bare_date() {
        let dt = parse_search_date("2023-12-24").expect("date only");
        assert_eq!((dt.month(), dt.day(), dt.hour()), (12, 24, 0));
    }

    #[test]
    fn rejects_garbage_dates() {
        assert!(parse_search_date("yesterday").is_none());
        assert!(parse_search_date("").is_none());
        assert!(parse_search_date("2024-13-40").is_none());
    }
}
