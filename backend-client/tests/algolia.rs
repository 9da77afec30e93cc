use paperdeck_backend_client::AlgoliaClient;
use paperdeck_core::config::SearchConfig;
use paperdeck_core::error::SearchError;
use paperdeck_core::provider::SearchProvider;
use paperdeck_core::provider::SearchQuery;
use paperdeck_core::record::RawTimestamp;
use pretty_assertions::assert_eq;
use wiremock::Mock;
use wiremock::MockServer;
use wiremock::ResponseTemplate;
use wiremock::matchers::body_json;
use wiremock::matchers::header;
use wiremock::matchers::method;
use wiremock::matchers::path;

fn client(server: &MockServer) -> AlgoliaClient {
    let config = SearchConfig {
        app_id: "APP123".to_string(),
        search_key: "s-456".to_string(),
        index: "whitepapers".to_string(),
    };
    AlgoliaClient::new(reqwest::Client::new(), &config).with_base_url(server.uri())
}

#[tokio::test]
async fn query_sends_credentials_and_filter_expression() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/1/indexes/whitepapers/query"))
        .and(header("X-Algolia-Application-Id", "APP123"))
        .and(header("X-Algolia-API-Key", "s-456"))
        .and(body_json(serde_json::json!({
            "query": "quantum",
            "filters": "topic:\"Quantum Computing\""
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "hits": [{
                "objectID": "wp-3",
                "title": "Quantum Supremacy Using a Programmable Superconducting Processor",
                "summary": "A 53-qubit computation beyond classical reach.",
                "topic": "Quantum Computing",
                "link": "https://www.nature.com/articles/s41586-019-1666-5",
                "publicationDate": 1571788800000i64
            }],
            "nbHits": 1,
            "page": 0
        })))
        .expect(1)
        .mount(&server)
        .await;

    let hits = client(&server)
        .search(&SearchQuery {
            term: "quantum".to_string(),
            topic: Some("Quantum Computing".to_string()),
        })
        .await
        .expect("search should succeed");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].object_id, "wp-3");
    // The raw timestamp is preserved for the core normalizer.
    assert_eq!(
        hits[0].publication_date,
        Some(RawTimestamp::Millis(1_571_788_800_000))
    );
}

#[tokio::test]
async fn unconstrained_query_omits_the_filter() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/1/indexes/whitepapers/query"))
        .and(body_json(serde_json::json!({"query": "bitcoin"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"hits": []})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let hits = client(&server)
        .search(&SearchQuery {
            term: "bitcoin".to_string(),
            topic: None,
        })
        .await
        .expect("search should succeed");
    assert_eq!(hits, Vec::new());
}

#[tokio::test]
async fn a_denied_query_is_a_status_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/1/indexes/whitepapers/query"))
        .respond_with(ResponseTemplate::new(403).set_body_string("invalid key"))
        .mount(&server)
        .await;

    let err = client(&server)
        .search(&SearchQuery {
            term: "bitcoin".to_string(),
            topic: None,
        })
        .await
        .expect_err("search should fail");
    assert!(matches!(err, SearchError::Status { status: 403, .. }));
}
