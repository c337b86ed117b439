use serde_json::json;

use super::*;

#[test]
fn dedupe_key_ignores_case_and_surrounding_whitespace() {
    let a = json!({"name": "Cafe A", "address": "1 Rd"});
    let b = json!({"name": "  cafe a ", "address": "1 RD", "phone": "123"});
    let c = json!({"name": "Cafe A", "address": "2 Rd"});
    assert_eq!(dedupe_key(&a), dedupe_key(&b));
    assert_ne!(dedupe_key(&a), dedupe_key(&c));
    assert_eq!(dedupe_key(&a).len(), 64);
}

#[test]
fn merge_appends_only_unseen_records() {
    let existing = vec![json!({"name": "Cafe A", "address": "1 Rd"})];
    let incoming = vec![
        json!({"name": "Cafe A", "address": "1 Rd", "phone": "new"}),
        json!({"name": "Bar B", "address": "2 Rd"}),
        json!({"name": "Bar B", "address": "2 Rd"}),
    ];
    let outcome = merge_records(existing, incoming);
    assert_eq!(outcome.added, 1);
    assert_eq!(outcome.skipped, 2);
    assert_eq!(outcome.total, 2);
    assert_eq!(outcome.records[0], json!({"name": "Cafe A", "address": "1 Rd"}));
    assert_eq!(outcome.records[1]["name"], "Bar B");
}

#[test]
fn sort_keys_orders_nested_objects() {
    let sorted = sort_keys(json!({"b": 1, "a": {"d": 2, "c": 3}}));
    let text = serde_json::to_string(&sorted).unwrap();
    assert_eq!(text, r#"{"a":{"c":3,"d":2},"b":1}"#);
}

#[tokio::test]
async fn merge_into_missing_file_creates_it() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("businesses.json");

    let outcome = merge_into_file(&path, vec![json!({"name": "Cafe A", "address": "1 Rd"})])
        .await
        .expect("merge should succeed");
    assert_eq!(outcome.added, 1);

    let written: serde_json::Value =
        serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
    assert_eq!(written, json!([{"address": "1 Rd", "name": "Cafe A"}]));
}

#[tokio::test]
async fn merge_into_existing_file_keeps_old_records_first() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("businesses.json");
    std::fs::write(&path, r#"[{"name": "Old", "address": "9 St"}]"#).unwrap();

    let outcome = merge_into_file(
        &path,
        vec![
            json!({"name": "Old", "address": "9 St"}),
            json!({"name": "New", "address": "10 St"}),
        ],
    )
    .await
    .unwrap();
    assert_eq!((outcome.added, outcome.skipped, outcome.total), (1, 1, 2));

    let written: Vec<serde_json::Value> =
        serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
    assert_eq!(written[0]["name"], "Old");
    assert_eq!(written[1]["name"], "New");
}

#[tokio::test]
async fn merge_without_new_records_leaves_file_untouched() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("businesses.json");
    let original = r#"[{"name":"Old","address":"9 St"}]"#;
    std::fs::write(&path, original).unwrap();

    let outcome = merge_into_file(&path, vec![json!({"name": "old", "address": "9 st"})])
        .await
        .unwrap();
    assert_eq!(outcome.added, 0);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), original);
}

#[tokio::test]
async fn merge_treats_undecodable_file_as_empty() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("businesses.json");
    std::fs::write(&path, "{ truncated").unwrap();

    let outcome = merge_into_file(&path, vec![json!({"name": "Cafe A", "address": "1 Rd"})])
        .await
        .unwrap();
    assert_eq!((outcome.added, outcome.total), (1, 1));
}
