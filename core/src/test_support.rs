//! Fake collaborators and fixtures for exercising sessions without a
//! network. Compiled for this crate's own tests and, behind the
//! `test-support` feature, for downstream crates' tests.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::AuthError;
use crate::error::SearchError;
use crate::error::StoreError;
use crate::provider::DocumentStore;
use crate::provider::Identity;
use crate::provider::IdentityProvider;
use crate::provider::ProviderSet;
use crate::provider::SearchProvider;
use crate::provider::SearchQuery;
use crate::provider::StoreEvent;
use crate::provider::Subscription;
use crate::record::SearchHit;
use crate::record::StoreRecord;
use crate::record::StoreTimestamp;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Ten records in store order: three AI & Machine Learning, two
/// Decentralized Finance, two Quantum Computing, two Biotechnology, one
/// Renewable Energy. The last record carries neither link nor date.
pub fn sample_store_records() -> Vec<StoreRecord> {
    vec![
        record(
            "wp-1",
            "Attention Is All You Need",
            "Introduces the Transformer architecture.",
            "AI & Machine Learning",
            Some("https://arxiv.org/abs/1706.03762"),
            Some(1_497_225_600),
        ),
        record(
            "wp-2",
            "Bitcoin: A Peer-to-Peer Electronic Cash System",
            "Electronic cash without a financial institution.",
            "Decentralized Finance",
            Some("https://bitcoin.org/bitcoin.pdf"),
            Some(1_225_411_200),
        ),
        record(
            "wp-3",
            "Quantum Supremacy Using a Programmable Superconducting Processor",
            "A 53-qubit computation beyond classical reach.",
            "Quantum Computing",
            Some("https://www.nature.com/articles/s41586-019-1666-5"),
            Some(1_571_788_800),
        ),
        record(
            "wp-4",
            "CRISPR-Cas9: A Revolutionary Gene Editing Tool",
            "Programmable genome editing with Cas9.",
            "Biotechnology",
            Some("https://www.science.org/doi/10.1126/science.1225829"),
            Some(1_345_161_600),
        ),
        record(
            "wp-5",
            "High-Efficiency Perovskite Solar Cells: Challenges and Solutions",
            "Stability and encapsulation for perovskite cells.",
            "Renewable Energy",
            Some("https://www.nature.com/articles/s41560-020-0558-0"),
            Some(1_584_230_400),
        ),
        record(
            "wp-6",
            "GPT-3: Language Models are Few-Shot Learners",
            "A 175B parameter model and few-shot learning.",
            "AI & Machine Learning",
            Some("https://arxiv.org/abs/2005.14165"),
            Some(1_590_624_000),
        ),
        record(
            "wp-7",
            "Ethereum: A Secure Decentralised Generalised Transaction Ledger",
            "Smart contracts on a distributed ledger.",
            "Decentralized Finance",
            Some("https://ethereum.github.io/yellowpaper/paper.pdf"),
            Some(1_396_310_400),
        ),
        record(
            "wp-8",
            "Shor's Algorithm: Quantum Integer Factorization",
            "Polynomial-time factoring on a quantum computer.",
            "Quantum Computing",
            Some("https://arxiv.org/abs/quant-ph/9508027"),
            Some(808_876_800),
        ),
        record(
            "wp-9",
            "mRNA Vaccine Technology: Principles and Applications",
            "Synthetic mRNA as a vaccine platform.",
            "Biotechnology",
            Some("https://www.nature.com/articles/nrd.2017.243"),
            Some(1_515_715_200),
        ),
        record(
            "wp-10",
            "Deep Residual Learning for Image Recognition",
            "Residual connections for very deep networks.",
            "AI & Machine Learning",
            None,
            None,
        ),
    ]
}

fn record(
    id: &str,
    title: &str,
    summary: &str,
    topic: &str,
    link: Option<&str>,
    date_seconds: Option<i64>,
) -> StoreRecord {
    StoreRecord {
        id: id.to_string(),
        title: title.to_string(),
        summary: summary.to_string(),
        topic: topic.to_string(),
        link: link.map(str::to_string),
        publication_date: date_seconds.map(|seconds| StoreTimestamp { seconds, nanos: 0 }),
    }
}

/// A hit with just enough shape for dispatch tests.
pub fn search_hit(id: &str, title: &str, topic: &str) -> SearchHit {
    SearchHit {
        object_id: id.to_string(),
        title: title.to_string(),
        summary: format!("Synopsis of {title}."),
        topic: topic.to_string(),
        link: None,
        publication_date: None,
    }
}

/// Bundle fakes into a [`ProviderSet`].
pub fn provider_set(
    identity: Arc<FakeIdentity>,
    store: Arc<FakeStore>,
    search: Option<Arc<FakeSearch>>,
) -> ProviderSet {
    ProviderSet {
        identity,
        store,
        search: search.map(|search| search as Arc<dyn SearchProvider>),
    }
}

/// Identity provider that succeeds with a fixed uid or always fails.
pub struct FakeIdentity {
    uid: String,
    fail_with: Option<String>,
    signed_in: Mutex<Option<Identity>>,
}

impl FakeIdentity {
    pub fn succeeding(uid: &str) -> Self {
        Self {
            uid: uid.to_string(),
            fail_with: None,
            signed_in: Mutex::new(None),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            uid: String::new(),
            fail_with: Some(message.to_string()),
            signed_in: Mutex::new(None),
        }
    }
}

#[async_trait]
impl IdentityProvider for FakeIdentity {
    fn current_identity(&self) -> Option<Identity> {
        lock(&self.signed_in).clone()
    }

    async fn sign_in_anonymously(&self) -> Result<Identity, AuthError> {
        if let Some(message) = &self.fail_with {
            return Err(AuthError::Rejected(message.clone()));
        }
        let identity = Identity {
            uid: self.uid.clone(),
            token: format!("token-{}", self.uid),
        };
        *lock(&self.signed_in) = Some(identity.clone());
        Ok(identity)
    }
}

/// Document store whose snapshots are pushed by the test.
pub struct FakeStore {
    initial: Vec<StoreRecord>,
    fail_with: Option<String>,
    sender: Mutex<Option<mpsc::Sender<StoreEvent>>>,
    active_listeners: Arc<AtomicUsize>,
    subscribed_paths: Mutex<Vec<String>>,
    subscribed_identities: Mutex<Vec<Identity>>,
}

impl FakeStore {
    /// Subscriptions deliver `initial` immediately, then whatever the test
    /// pushes.
    pub fn with_snapshot(initial: Vec<StoreRecord>) -> Self {
        Self {
            initial,
            fail_with: None,
            sender: Mutex::new(None),
            active_listeners: Arc::new(AtomicUsize::new(0)),
            subscribed_paths: Mutex::new(Vec::new()),
            subscribed_identities: Mutex::new(Vec::new()),
        }
    }

    pub fn empty() -> Self {
        Self::with_snapshot(Vec::new())
    }

    /// Every subscribe attempt fails with `message`.
    pub fn failing(message: &str) -> Self {
        let mut store = Self::empty();
        store.fail_with = Some(message.to_string());
        store
    }

    /// Deliver a fresh snapshot through the active subscription.
    pub async fn push_snapshot(&self, records: Vec<StoreRecord>) {
        let sender = lock(&self.sender).clone();
        let Some(sender) = sender else {
            panic!("push_snapshot called with no active subscription");
        };
        if sender.send(StoreEvent::Snapshot(records)).await.is_err() {
            panic!("subscription receiver dropped");
        }
    }

    /// Deliver a terminal listener error and stop the stream.
    pub async fn push_error(&self, message: &str) {
        let sender = lock(&self.sender).take();
        let Some(sender) = sender else {
            panic!("push_error called with no active subscription");
        };
        let event = StoreEvent::Error(StoreError::ListenerStopped(message.to_string()));
        if sender.send(event).await.is_err() {
            panic!("subscription receiver dropped");
        }
    }

    /// Listeners opened and not yet dropped.
    pub fn active_listeners(&self) -> usize {
        self.active_listeners.load(Ordering::SeqCst)
    }

    pub fn subscribed_paths(&self) -> Vec<String> {
        lock(&self.subscribed_paths).clone()
    }

    pub fn subscribed_identities(&self) -> Vec<Identity> {
        lock(&self.subscribed_identities).clone()
    }
}

#[async_trait]
impl DocumentStore for FakeStore {
    async fn subscribe(
        &self,
        path: &str,
        identity: &Identity,
    ) -> Result<Subscription, StoreError> {
        lock(&self.subscribed_paths).push(path.to_string());
        lock(&self.subscribed_identities).push(identity.clone());
        if let Some(message) = &self.fail_with {
            return Err(StoreError::Transport(message.clone()));
        }

        let (tx, rx) = mpsc::channel(8);
        if tx
            .send(StoreEvent::Snapshot(self.initial.clone()))
            .await
            .is_err()
        {
            panic!("freshly created subscription receiver dropped");
        }
        *lock(&self.sender) = Some(tx);

        self.active_listeners.fetch_add(1, Ordering::SeqCst);
        let active = Arc::clone(&self.active_listeners);
        Ok(Subscription::new(rx, move || {
            active.fetch_sub(1, Ordering::SeqCst);
        }))
    }
}

/// Search provider answering from a scripted queue of outcomes; an empty
/// queue answers with no hits.
#[derive(Default)]
pub struct FakeSearch {
    outcomes: Mutex<VecDeque<Result<Vec<SearchHit>, SearchError>>>,
    queries: Mutex<Vec<SearchQuery>>,
}

impl FakeSearch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_hits(&self, hits: Vec<SearchHit>) {
        lock(&self.outcomes).push_back(Ok(hits));
    }

    pub fn push_error(&self, message: &str) {
        lock(&self.outcomes).push_back(Err(SearchError::Transport(message.to_string())));
    }

    /// Queries received so far, in order.
    pub fn queries(&self) -> Vec<SearchQuery> {
        lock(&self.queries).clone()
    }
}

#[async_trait]
impl SearchProvider for FakeSearch {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<SearchHit>, SearchError> {
        lock(&self.queries).push(query.clone());
        match lock(&self.outcomes).pop_front() {
            Some(outcome) => outcome,
            None => Ok(Vec::new()),
        }
    }
}
