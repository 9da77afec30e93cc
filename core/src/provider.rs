//! Seams between the controller and the outside world. Concrete REST
//! adapters live in `paperdeck-backend-client`; tests substitute fakes.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::AuthError;
use crate::error::SearchError;
use crate::error::StoreError;
use crate::record::SearchHit;
use crate::record::StoreRecord;

/// An established anonymous session. The token gates document-store reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub uid: String,
    pub token: String,
}

/// One delivery from an active snapshot subscription.
#[derive(Debug)]
pub enum StoreEvent {
    /// The entire current collection, in store order.
    Snapshot(Vec<StoreRecord>),
    /// Terminal failure; nothing further will arrive.
    Error(StoreError),
}

/// A live snapshot subscription. Dropping it releases the underlying
/// listener.
pub struct Subscription {
    events: mpsc::Receiver<StoreEvent>,
    on_drop: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    /// Wrap a delivery channel plus the hook that releases the listener.
    pub fn new(events: mpsc::Receiver<StoreEvent>, on_drop: impl FnOnce() + Send + 'static) -> Self {
        Self {
            events,
            on_drop: Some(Box::new(on_drop)),
        }
    }

    /// Next delivery, or `None` once the listener is gone.
    pub async fn next_event(&mut self) -> Option<StoreEvent> {
        self.events.recv().await
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(release) = self.on_drop.take() {
            release();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}

/// Issues the anonymous identity that gates store reads.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Identity from an earlier sign-in on this provider, if any.
    fn current_identity(&self) -> Option<Identity>;

    async fn sign_in_anonymously(&self) -> Result<Identity, AuthError>;
}

/// Realtime document store delivering whole ordered snapshots on change.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Open a snapshot subscription on the collection at `path`. Requires
    /// an established identity; the initial snapshot is delivered through
    /// the subscription.
    async fn subscribe(
        &self,
        path: &str,
        identity: &Identity,
    ) -> Result<Subscription, StoreError>;
}

/// Query forwarded to the search provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub term: String,
    /// Category constraint; `None` searches every topic.
    pub topic: Option<String>,
}

/// Hosted full-text search over the whitepaper index.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<SearchHit>, SearchError>;
}

/// Long-lived collaborator handles, constructed once at startup and shared
/// by the session.
#[derive(Clone)]
pub struct ProviderSet {
    pub identity: Arc<dyn IdentityProvider>,
    pub store: Arc<dyn DocumentStore>,
    /// `None` when search credentials are absent; searching degrades to
    /// unavailable while snapshots and local filtering keep working.
    pub search: Option<Arc<dyn SearchProvider>>,
}
