use std::time::Duration;

use paperdeck_backend_client::FirestoreClient;
use paperdeck_backend_client::NewWhitepaper;
use paperdeck_core::config::StoreConfig;
use paperdeck_core::error::StoreError;
use paperdeck_core::provider::DocumentStore;
use paperdeck_core::provider::Identity;
use paperdeck_core::provider::StoreEvent;
use pretty_assertions::assert_eq;
use tokio::time::timeout;
use wiremock::Mock;
use wiremock::MockServer;
use wiremock::ResponseTemplate;
use wiremock::matchers::body_partial_json;
use wiremock::matchers::header;
use wiremock::matchers::method;
use wiremock::matchers::path;

const COLLECTION: &str = "artifacts/demo-project/public/data/whitepapers";
const DOCUMENTS_PATH: &str =
    "/v1/projects/demo-project/databases/(default)/documents/artifacts/demo-project/public/data/whitepapers";

fn client(server: &MockServer, poll_interval: Duration) -> FirestoreClient {
    let config = StoreConfig {
        project_id: "demo-project".to_string(),
        api_key: "k-123".to_string(),
        poll_interval,
    };
    FirestoreClient::new(reqwest::Client::new(), &config).with_base_url(server.uri())
}

fn identity() -> Identity {
    Identity {
        uid: "anon-9".to_string(),
        token: "tok-abc".to_string(),
    }
}

fn document(id: &str, title: &str, topic: &str) -> serde_json::Value {
    serde_json::json!({
        "name": format!(
            "projects/demo-project/databases/(default)/documents/{COLLECTION}/{id}"
        ),
        "fields": {
            "title": {"stringValue": title},
            "summary": {"stringValue": "A summary."},
            "topic": {"stringValue": topic},
            "link": {"stringValue": "https://example.com/paper.pdf"},
            "publicationDate": {"timestampValue": "2017-06-12T00:00:00Z"}
        },
        "createTime": "2024-01-01T00:00:00Z",
        "updateTime": "2024-01-01T00:00:00Z"
    })
}

#[tokio::test]
async fn listing_decodes_documents_in_store_order() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(DOCUMENTS_PATH))
        .and(header("authorization", "Bearer tok-abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "documents": [
                document("doc-1", "Attention Is All You Need", "AI & Machine Learning"),
                document("doc-2", "Bitcoin", "Decentralized Finance"),
            ]
        })))
        .mount(&server)
        .await;

    let records = client(&server, Duration::from_secs(60))
        .list_documents(COLLECTION, &identity())
        .await
        .expect("listing should succeed");
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].id, "doc-1");
    assert_eq!(records[0].title, "Attention Is All You Need");
    assert_eq!(records[1].id, "doc-2");
    assert_eq!(
        records[0].link.as_deref(),
        Some("https://example.com/paper.pdf")
    );
}

#[tokio::test]
async fn subscribe_fails_fast_on_a_denied_read() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(DOCUMENTS_PATH))
        .respond_with(ResponseTemplate::new(403).set_body_string("permission denied"))
        .mount(&server)
        .await;

    let err = client(&server, Duration::from_secs(60))
        .subscribe(COLLECTION, &identity())
        .await
        .expect_err("subscribe should fail");
    assert!(matches!(err, StoreError::Status { status: 403, .. }));
}

#[tokio::test]
async fn subscription_delivers_initial_snapshot_then_terminal_error() {
    let server = MockServer::start().await;
    // One good read for the initial snapshot, then the store goes away.
    Mock::given(method("GET"))
        .and(path(DOCUMENTS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "documents": [document("doc-1", "Attention Is All You Need", "AI & Machine Learning")]
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(DOCUMENTS_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_string("backend unavailable"))
        .mount(&server)
        .await;

    let mut subscription = client(&server, Duration::from_millis(20))
        .subscribe(COLLECTION, &identity())
        .await
        .expect("subscribe should succeed");

    let first = timeout(Duration::from_secs(5), subscription.next_event())
        .await
        .expect("initial snapshot should arrive")
        .expect("subscription should be open");
    match first {
        StoreEvent::Snapshot(records) => assert_eq!(records.len(), 1),
        StoreEvent::Error(err) => panic!("expected a snapshot, got error {err}"),
    }

    // Three consecutive failed polls end the subscription.
    let second = timeout(Duration::from_secs(5), subscription.next_event())
        .await
        .expect("terminal error should arrive")
        .expect("subscription should deliver the error before closing");
    match second {
        StoreEvent::Error(StoreError::Status { status: 500, .. }) => {}
        other => panic!("expected a terminal status error, got {other:?}"),
    }
    let closed = timeout(Duration::from_secs(5), subscription.next_event())
        .await
        .expect("stream should close");
    assert!(closed.is_none());
}

#[tokio::test]
async fn subscription_delivers_changed_snapshots_only() {
    let server = MockServer::start().await;
    // Two identical reads, then a grown collection.
    Mock::given(method("GET"))
        .and(path(DOCUMENTS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "documents": [document("doc-1", "Attention Is All You Need", "AI & Machine Learning")]
        })))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(DOCUMENTS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "documents": [
                document("doc-1", "Attention Is All You Need", "AI & Machine Learning"),
                document("doc-2", "Bitcoin", "Decentralized Finance"),
            ]
        })))
        .mount(&server)
        .await;

    let mut subscription = client(&server, Duration::from_millis(20))
        .subscribe(COLLECTION, &identity())
        .await
        .expect("subscribe should succeed");

    let first = timeout(Duration::from_secs(5), subscription.next_event())
        .await
        .expect("initial snapshot should arrive")
        .expect("subscription should be open");
    let StoreEvent::Snapshot(records) = first else {
        panic!("expected the initial snapshot");
    };
    assert_eq!(records.len(), 1);

    // The unchanged second read is not re-delivered; the next event is the
    // grown snapshot.
    let next = timeout(Duration::from_secs(5), subscription.next_event())
        .await
        .expect("changed snapshot should arrive")
        .expect("subscription should be open");
    let StoreEvent::Snapshot(records) = next else {
        panic!("expected the changed snapshot");
    };
    assert_eq!(records.len(), 2);
    assert_eq!(records[1].id, "doc-2");
}

#[tokio::test]
async fn create_document_posts_fields_and_returns_the_assigned_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(DOCUMENTS_PATH))
        .and(header("authorization", "Bearer tok-abc"))
        .and(body_partial_json(serde_json::json!({
            "fields": {
                "title": {"stringValue": "Bitcoin: A Peer-to-Peer Electronic Cash System"},
                "topic": {"stringValue": "Decentralized Finance"},
                "publicationDate": {"timestampValue": "2008-10-31T00:00:00Z"}
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "name": format!(
                "projects/demo-project/databases/(default)/documents/{COLLECTION}/new-doc-7"
            ),
            "fields": {},
            "createTime": "2024-01-01T00:00:00Z",
            "updateTime": "2024-01-01T00:00:00Z"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let paper = NewWhitepaper {
        title: "Bitcoin: A Peer-to-Peer Electronic Cash System".to_string(),
        summary: "Electronic cash without a financial institution.".to_string(),
        topic: "Decentralized Finance".to_string(),
        link: Some("https://bitcoin.org/bitcoin.pdf".to_string()),
        publication_date: chrono::DateTime::parse_from_rfc3339("2008-10-31T00:00:00Z")
            .map(|date| date.to_utc())
            .ok(),
    };
    let id = client(&server, Duration::from_secs(60))
        .create_document(COLLECTION, &identity(), &paper)
        .await
        .expect("create should succeed");
    assert_eq!(id, "new-doc-7");
}
