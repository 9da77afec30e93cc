//! Session-level tests against fake providers: the full path from intents
//! and store deliveries to published display state.

use std::sync::Arc;
use std::time::Duration;

use paperdeck_core::DisplayState;
use paperdeck_core::Intent;
use paperdeck_core::SessionHandle;
use paperdeck_core::TopicFilter;
use paperdeck_core::state::DisplayError;
use paperdeck_core::test_support::FakeIdentity;
use paperdeck_core::test_support::FakeSearch;
use paperdeck_core::test_support::FakeStore;
use paperdeck_core::test_support::provider_set;
use paperdeck_core::test_support::sample_store_records;
use paperdeck_core::test_support::search_hit;
use pretty_assertions::assert_eq;
use tokio::sync::watch;
use tokio::time::timeout;

const COLLECTION: &str = "artifacts/demo-project/public/data/whitepapers";

async fn wait_for(
    rx: &mut watch::Receiver<DisplayState>,
    predicate: impl Fn(&DisplayState) -> bool,
) -> DisplayState {
    timeout(Duration::from_secs(5), async {
        loop {
            let state = rx.borrow().clone();
            if predicate(&state) {
                return state;
            }
            rx.changed().await.expect("session stopped unexpectedly");
        }
    })
    .await
    .expect("timed out waiting for display state")
}

fn spawn_session(
    identity: Arc<FakeIdentity>,
    store: Arc<FakeStore>,
    search: Option<Arc<FakeSearch>>,
) -> SessionHandle {
    SessionHandle::spawn(
        COLLECTION.to_string(),
        provider_set(identity, store, search),
    )
}

#[tokio::test]
async fn startup_signs_in_and_mirrors_the_first_snapshot() {
    let identity = Arc::new(FakeIdentity::succeeding("anon-1"));
    let store = Arc::new(FakeStore::with_snapshot(sample_store_records()));
    let session = spawn_session(Arc::clone(&identity), Arc::clone(&store), None);

    let mut state_rx = session.state();
    let state = wait_for(&mut state_rx, |state| !state.is_loading).await;
    assert_eq!(state.active_list.len(), 10);
    assert_eq!(state.active_list, state.source_list);
    assert_eq!(state.session_uid.as_deref(), Some("anon-1"));
    assert_eq!(state.last_error, None);

    assert_eq!(store.subscribed_paths(), vec![COLLECTION.to_string()]);
    assert_eq!(store.subscribed_identities()[0].uid, "anon-1");
    session.shutdown().await;
}

#[tokio::test]
async fn auth_failure_blocks_the_subscription() {
    let identity = Arc::new(FakeIdentity::failing("key revoked"));
    let store = Arc::new(FakeStore::empty());
    let session = spawn_session(identity, Arc::clone(&store), None);

    let mut state_rx = session.state();
    let state = wait_for(&mut state_rx, |state| state.last_error.is_some()).await;
    assert!(matches!(
        state.last_error,
        Some(DisplayError::Authentication(_))
    ));
    assert!(!state.is_loading);
    assert_eq!(store.subscribed_paths(), Vec::<String>::new());
    session.shutdown().await;
}

#[tokio::test]
async fn failed_subscribe_surfaces_as_a_subscription_error() {
    let identity = Arc::new(FakeIdentity::succeeding("anon-1"));
    let store = Arc::new(FakeStore::failing("permission denied"));
    let session = spawn_session(identity, store, None);

    let mut state_rx = session.state();
    let state = wait_for(&mut state_rx, |state| state.last_error.is_some()).await;
    assert!(matches!(
        state.last_error,
        Some(DisplayError::Subscription(_))
    ));
    assert!(!state.is_loading);
    session.shutdown().await;
}

#[tokio::test]
async fn later_snapshots_replace_the_source_list_wholesale() {
    let identity = Arc::new(FakeIdentity::succeeding("anon-1"));
    let store = Arc::new(FakeStore::with_snapshot(sample_store_records()));
    let session = spawn_session(identity, Arc::clone(&store), None);

    let mut state_rx = session.state();
    wait_for(&mut state_rx, |state| state.source_list.len() == 10).await;

    let mut shrunk = sample_store_records();
    shrunk.truncate(4);
    store.push_snapshot(shrunk).await;
    let state = wait_for(&mut state_rx, |state| state.source_list.len() == 4).await;
    assert_eq!(state.active_list.len(), 4);
    session.shutdown().await;
}

#[tokio::test]
async fn listener_error_keeps_the_last_good_snapshot() {
    let identity = Arc::new(FakeIdentity::succeeding("anon-1"));
    let store = Arc::new(FakeStore::with_snapshot(sample_store_records()));
    let session = spawn_session(identity, Arc::clone(&store), None);

    let mut state_rx = session.state();
    wait_for(&mut state_rx, |state| state.source_list.len() == 10).await;

    store.push_error("listener disconnected").await;
    let state = wait_for(&mut state_rx, |state| state.last_error.is_some()).await;
    assert!(matches!(
        state.last_error,
        Some(DisplayError::Subscription(_))
    ));
    assert_eq!(state.source_list.len(), 10);
    assert_eq!(state.active_list.len(), 10);
    session.shutdown().await;
}

#[tokio::test]
async fn topic_intent_filters_locally_without_a_search() {
    let identity = Arc::new(FakeIdentity::succeeding("anon-1"));
    let store = Arc::new(FakeStore::with_snapshot(sample_store_records()));
    let search = Arc::new(FakeSearch::new());
    let session = spawn_session(identity, store, Some(Arc::clone(&search)));

    let mut state_rx = session.state();
    wait_for(&mut state_rx, |state| state.source_list.len() == 10).await;

    session.send(Intent::TopicSelected(TopicFilter::from_label(
        "AI & Machine Learning",
    )));
    let state = wait_for(&mut state_rx, |state| state.active_list.len() == 3).await;
    assert!(
        state
            .active_list
            .iter()
            .all(|paper| paper.topic == "AI & Machine Learning")
    );
    assert_eq!(search.queries(), Vec::new());
    session.shutdown().await;
}

#[tokio::test]
async fn search_intent_round_trips_through_the_provider() {
    let identity = Arc::new(FakeIdentity::succeeding("anon-1"));
    let store = Arc::new(FakeStore::with_snapshot(sample_store_records()));
    let search = Arc::new(FakeSearch::new());
    search.push_hits(vec![search_hit(
        "wp-2",
        "Bitcoin: A Peer-to-Peer Electronic Cash System",
        "Decentralized Finance",
    )]);
    let session = spawn_session(identity, store, Some(Arc::clone(&search)));

    let mut state_rx = session.state();
    wait_for(&mut state_rx, |state| state.source_list.len() == 10).await;

    session.send(Intent::TopicSelected(TopicFilter::from_label(
        "Decentralized Finance",
    )));
    session.send(Intent::SearchTermChanged("bitcoin".to_string()));
    let state = wait_for(&mut state_rx, |state| state.active_list.len() == 1).await;
    assert_eq!(
        state.active_list[0].title,
        "Bitcoin: A Peer-to-Peer Electronic Cash System"
    );
    assert!(!state.is_loading);

    let queries = search.queries();
    assert_eq!(queries.len(), 1);
    assert_eq!(queries[0].term, "bitcoin");
    assert_eq!(queries[0].topic.as_deref(), Some("Decentralized Finance"));
    session.shutdown().await;
}

#[tokio::test]
async fn search_failure_keeps_the_displayed_list() {
    let identity = Arc::new(FakeIdentity::succeeding("anon-1"));
    let store = Arc::new(FakeStore::with_snapshot(sample_store_records()));
    let search = Arc::new(FakeSearch::new());
    search.push_error("index offline");
    let session = spawn_session(identity, store, Some(search));

    let mut state_rx = session.state();
    wait_for(&mut state_rx, |state| state.source_list.len() == 10).await;

    session.send(Intent::SearchTermChanged("bitcoin".to_string()));
    let state = wait_for(&mut state_rx, |state| {
        matches!(state.last_error, Some(DisplayError::Search(_)))
    })
    .await;
    assert_eq!(state.active_list.len(), 10);
    assert!(!state.is_loading);
    session.shutdown().await;
}

#[tokio::test]
async fn long_term_without_a_provider_stays_local() {
    let identity = Arc::new(FakeIdentity::succeeding("anon-1"));
    let store = Arc::new(FakeStore::with_snapshot(sample_store_records()));
    let session = spawn_session(identity, store, None);

    let mut state_rx = session.state();
    wait_for(&mut state_rx, |state| state.source_list.len() == 10).await;

    session.send(Intent::SearchTermChanged("quantum".to_string()));
    let state = wait_for(&mut state_rx, |state| state.search_term == "quantum").await;
    assert!(!state.search_enabled);
    assert_eq!(state.active_list.len(), 10);
    assert!(!state.is_loading);
    session.shutdown().await;
}

#[tokio::test]
async fn shutdown_releases_the_store_listener() {
    let identity = Arc::new(FakeIdentity::succeeding("anon-1"));
    let store = Arc::new(FakeStore::with_snapshot(sample_store_records()));
    let session = spawn_session(identity, Arc::clone(&store), None);

    let mut state_rx = session.state();
    wait_for(&mut state_rx, |state| !state.is_loading).await;
    assert_eq!(store.active_listeners(), 1);

    session.shutdown().await;
    assert_eq!(store.active_listeners(), 0);
}
