//! Integration tests for loading a catalog over HTTP.
//!
//! Each test stands up a local `wiremock` server playing the collector's
//! `GET /businesses` endpoint.

use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use bizdash_catalog::{Catalog, LoadError, LoadOutcome, Source, SourceClient};
use bizdash_core::SortKey;

fn test_client() -> SourceClient {
    SourceClient::new(5, "bizdash-test/0.1", 0, 0).expect("failed to build test SourceClient")
}

fn test_client_with_retries(max_retries: u32) -> SourceClient {
    SourceClient::new(5, "bizdash-test/0.1", max_retries, 0)
        .expect("failed to build test SourceClient")
}

fn two_businesses() -> serde_json::Value {
    json!([
        {"name": "Cafe A", "business_type": "cafe", "address": "1 Rd"},
        {"name": "Bar B", "business_type": "bar"}
    ])
}

fn source_for(server: &MockServer) -> Source {
    Source::parse(&format!("{}/businesses", server.uri()))
}

#[tokio::test]
async fn loads_bare_array_payload() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/businesses"))
        .and(header("user-agent", "bizdash-test/0.1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(two_businesses()))
        .expect(1)
        .mount(&server)
        .await;

    let mut catalog = Catalog::default();
    let outcome = catalog.load(&test_client(), &source_for(&server)).await;

    assert_eq!(
        outcome,
        LoadOutcome::Applied {
            generation: 1,
            records: 2
        }
    );
    let names: Vec<String> = catalog
        .query("a", SortKey::Name)
        .filter_map(|v| v.as_business().map(|b| b.name.clone()))
        .collect();
    assert_eq!(names, vec!["Bar B", "Cafe A"]);
}

#[tokio::test]
async fn wrapped_payload_matches_bare_array() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/businesses"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "count": 2,
            "data": two_businesses()
        })))
        .mount(&server)
        .await;

    let mut wrapped = Catalog::default();
    wrapped.load(&test_client(), &source_for(&server)).await;
    let bare = Catalog::from_payload(two_businesses());

    assert_eq!(wrapped.len(), 2);
    assert_eq!(wrapped.raw_records(), bare.raw_records());
}

#[tokio::test]
async fn not_found_keeps_previous_list() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/businesses"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let mut catalog = Catalog::default();
    catalog.commit(
        bizdash_catalog::LoadTicket(1),
        Catalog::from_payload(two_businesses()),
    );

    let outcome = catalog
        .load(&test_client_with_retries(3), &source_for(&server))
        .await;

    assert!(
        matches!(outcome, LoadOutcome::Failed { ref error } if error.contains("404")),
        "expected Failed with status, got: {outcome:?}"
    );
    assert_eq!(catalog.len(), 2);
    assert_eq!(catalog.generation(), 1);
}

#[tokio::test]
async fn server_error_is_retried_then_succeeds() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/businesses"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/businesses"))
        .respond_with(ResponseTemplate::new(200).set_body_json(two_businesses()))
        .mount(&server)
        .await;

    let mut catalog = Catalog::default();
    let outcome = catalog
        .load(&test_client_with_retries(1), &source_for(&server))
        .await;

    assert!(matches!(outcome, LoadOutcome::Applied { records: 2, .. }));
}

#[tokio::test]
async fn invalid_json_body_is_a_deserialize_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/businesses"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let result = test_client().fetch(&source_for(&server)).await;
    assert!(
        matches!(result, Err(LoadError::Deserialize { .. })),
        "expected Deserialize error, got: {result:?}"
    );
}

#[tokio::test]
async fn collector_error_envelope_loads_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/businesses"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "error",
            "message": "Invalid JSON format: expected value",
            "count": 0,
            "data": []
        })))
        .mount(&server)
        .await;

    let mut catalog = Catalog::default();
    let outcome = catalog.load(&test_client(), &source_for(&server)).await;

    assert_eq!(
        outcome,
        LoadOutcome::Applied {
            generation: 1,
            records: 0
        }
    );
    assert!(catalog.is_empty());
}
