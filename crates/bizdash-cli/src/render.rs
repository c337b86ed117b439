//! Terminal presenter for record views.

use std::fmt::Write as _;

use bizdash_catalog::{BusinessView, ErrorView, RecordView};

const NAME_WIDTH: usize = 32;

/// One line per view: id, name, type label, and address.
pub(crate) fn render_list(views: &[RecordView]) -> String {
    let mut out = format!("{:<10}{:<34}{:<20}ADDRESS\n", "ID", "NAME", "TYPE");
    for view in views {
        match view {
            RecordView::Business(b) => {
                let _ = writeln!(
                    out,
                    "{:<10}{:<34}{:<20}{}",
                    b.id,
                    truncate(&b.name, NAME_WIDTH),
                    b.type_label,
                    b.address
                );
            }
            RecordView::Error(e) => {
                let _ = writeln!(out, "{:<10}{}", e.id, e.label);
            }
        }
    }
    out
}

/// Multi-line detail panel for one view.
pub(crate) fn render_detail(view: &RecordView) -> String {
    match view {
        RecordView::Business(b) => render_business(b),
        RecordView::Error(e) => render_error(e),
    }
}

fn render_business(b: &BusinessView) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", b.name);
    let _ = writeln!(out, "Type:     {}", b.type_label);
    let _ = writeln!(out, "Address:  {}", b.address);
    if let Some(link) = &b.map_link {
        let _ = writeln!(out, "Map:      {link}");
    }
    if let Some(phone) = &b.phone {
        let _ = writeln!(out, "Phone:    {} <{}>", phone.text, phone.href);
    }
    if let Some(email) = &b.email {
        let _ = writeln!(out, "Email:    {} <{}>", email.text, email.href);
    }
    if let Some(website) = &b.website {
        let _ = writeln!(out, "Website:  {website}");
    }
    if let Some(accessible) = b.accessibility {
        let _ = writeln!(
            out,
            "Wheelchair accessible entrance: {}",
            if accessible { "yes" } else { "no" }
        );
    }

    let mut schedule = b.schedule().peekable();
    if schedule.peek().is_some() {
        let _ = writeln!(out, "Hours:");
        for line in schedule {
            let _ = writeln!(out, "  {line}");
        }
    }

    if let Some(date) = &b.search_date {
        let _ = write!(out, "Searched: {date}");
        if let Some(location) = &b.search_location {
            let _ = write!(out, " near {location}");
        }
        if let Some(radius) = &b.search_radius {
            let _ = write!(out, " (radius {radius})");
        }
        out.push('\n');
    }
    out
}

fn render_error(e: &ErrorView) -> String {
    format!("{} ({})\n{}\n", e.label, e.id, e.message)
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() > width {
        format!("{}...", text.chars().take(width - 3).collect::<String>())
    } else {
        text.to_owned()
    }
}

#[cfg(test)]
mod tests {
    use bizdash_catalog::Catalog;
    use bizdash_core::SortKey;
    use serde_json::json;

    use super::*;

    fn catalog() -> Catalog {
        Catalog::from_records(vec![
            json!({
                "name": "Cafe A",
                "business_type": "coffee_shop",
                "address": "1 Rd",
                "phone": "+1 (555) 010-0000",
                "latitude": 40.5,
                "longitude": -74.25,
                "opening_hours": "Monday: 8 AM-5 PM\r\n\r\nTuesday: Closed",
                "accessibility": true
            }),
            json!({"name": "Broken", "business_type": "bar", "phone": 42}),
        ])
    }

    #[test]
    fn list_shows_placeholder_for_broken_records() {
        let views: Vec<RecordView> = catalog().query("", SortKey::None).collect();
        let text = render_list(&views);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("biz-1"));
        assert!(lines[1].contains("coffee shop"));
        assert!(lines[2].contains("Error rendering business"));
    }

    #[test]
    fn detail_includes_links_and_schedule() {
        let view = catalog().select_detail("biz-1").unwrap();
        let text = render_detail(&view);
        assert!(text.contains("tel:+15550100000"));
        assert!(text.contains("https://www.google.com/maps/search/?api=1&query=40.5,-74.25"));
        assert!(text.contains("Hours:\n  Monday: 8 AM-5 PM\n  Tuesday: Closed\n"));
        assert!(text.contains("Wheelchair accessible entrance: yes"));
    }

    #[test]
    fn truncate_keeps_short_names() {
        assert_eq!(truncate("Cafe", 10), "Cafe");
        assert_eq!(truncate("A very long business name", 10), "A very ...");
    }
}
