//! The session runtime: one task that owns the [`Controller`] and performs
//! the only permitted side effects on its behalf.
//!
//! The presentation layer holds a [`SessionHandle`]: it sends [`Intent`]s
//! in and watches [`DisplayState`] snapshots come out. Inside, a bootstrap
//! task signs in anonymously, opens the snapshot subscription, and forwards
//! store deliveries onto the same event channel the intents arrive on, so
//! the controller sees one serialized stream of events. Search effects are
//! spawned as short-lived tasks whose outcomes are routed back as events;
//! the controller's ticket guard decides whether they still matter.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::controller::Controller;
use crate::controller::ControllerEvent;
use crate::controller::Effect;
use crate::controller::Intent;
use crate::controller::SearchTicket;
use crate::provider::ProviderSet;
use crate::provider::SearchProvider;
use crate::provider::SearchQuery;
use crate::provider::StoreEvent;
use crate::state::DisplayState;

/// Handle to a running session. Dropping it (or calling
/// [`SessionHandle::shutdown`]) tears the session down, releasing the store
/// subscription.
#[derive(Debug)]
pub struct SessionHandle {
    intent_tx: mpsc::UnboundedSender<Intent>,
    state_rx: watch::Receiver<DisplayState>,
    task: JoinHandle<()>,
}

impl SessionHandle {
    /// Spawn the session task. `collection_path` is the store collection to
    /// mirror; the providers come from deployment config (or from fakes in
    /// tests).
    pub fn spawn(collection_path: String, providers: ProviderSet) -> Self {
        let (intent_tx, intent_rx) = mpsc::unbounded_channel();
        let controller = Controller::new(providers.search.is_some());
        let (state_tx, state_rx) = watch::channel(controller.state().clone());
        let task = tokio::spawn(run(
            collection_path,
            providers,
            controller,
            intent_rx,
            state_tx,
        ));
        Self {
            intent_tx,
            state_rx,
            task,
        }
    }

    /// Send a user intent. Silently a no-op once the session has stopped.
    pub fn send(&self, intent: Intent) {
        let _ = self.intent_tx.send(intent);
    }

    /// A fresh watch receiver over the display state. The current value is
    /// always available; `changed()` resolves on every state transition.
    pub fn state(&self) -> watch::Receiver<DisplayState> {
        self.state_rx.clone()
    }

    /// Stop the session and wait until the store subscription is released.
    pub async fn shutdown(self) {
        let Self {
            intent_tx, task, ..
        } = self;
        drop(intent_tx);
        let _ = task.await;
    }
}

async fn run(
    collection_path: String,
    providers: ProviderSet,
    mut controller: Controller,
    mut intent_rx: mpsc::UnboundedReceiver<Intent>,
    state_tx: watch::Sender<DisplayState>,
) {
    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let bootstrap = tokio::spawn(bootstrap(
        collection_path,
        providers.clone(),
        event_tx.clone(),
    ));

    loop {
        let event = tokio::select! {
            maybe_intent = intent_rx.recv() => match maybe_intent {
                Some(intent) => ControllerEvent::Intent(intent),
                // Handle dropped: the session is done.
                None => break,
            },
            // `event_tx` is held by this function, so the channel never
            // closes underneath us.
            Some(event) = event_rx.recv() => event,
        };
        if let Some(effect) = controller.apply(event) {
            execute(effect, &providers, &event_tx);
        }
        if state_tx.send(controller.state().clone()).is_err() {
            break;
        }
    }

    // Cancelling the bootstrap task drops the subscription, which
    // unsubscribes the listener; await so shutdown observes the release.
    bootstrap.abort();
    let _ = bootstrap.await;
}

fn execute(
    effect: Effect,
    providers: &ProviderSet,
    event_tx: &mpsc::UnboundedSender<ControllerEvent>,
) {
    match effect {
        Effect::Search {
            ticket,
            term,
            topic,
        } => {
            // The controller only asks for a search when one is configured.
            let Some(search) = providers.search.clone() else {
                warn!("search effect with no provider configured; dropping");
                return;
            };
            let event_tx = event_tx.clone();
            tokio::spawn(async move {
                let event = run_search(search, SearchQuery { term, topic }, ticket).await;
                let _ = event_tx.send(event);
            });
        }
    }
}

async fn run_search(
    search: Arc<dyn SearchProvider>,
    query: SearchQuery,
    ticket: SearchTicket,
) -> ControllerEvent {
    debug!(term = %query.term, topic = ?query.topic, "dispatching search");
    match search.search(&query).await {
        Ok(hits) => {
            debug!(hits = hits.len(), "search completed");
            ControllerEvent::SearchCompleted { ticket, hits }
        }
        Err(err) => {
            warn!(%err, "search failed");
            ControllerEvent::SearchFailed {
                ticket,
                message: err.to_string(),
            }
        }
    }
}

/// Establish the identity, open the snapshot subscription, and pump its
/// deliveries into the controller's event stream. Runs for the life of the
/// subscription.
async fn bootstrap(
    collection_path: String,
    providers: ProviderSet,
    events: mpsc::UnboundedSender<ControllerEvent>,
) {
    let identity = match providers.identity.current_identity() {
        Some(identity) => identity,
        None => match providers.identity.sign_in_anonymously().await {
            Ok(identity) => identity,
            Err(err) => {
                warn!(%err, "anonymous sign-in failed");
                let _ = events.send(ControllerEvent::AuthFailed(err.to_string()));
                return;
            }
        },
    };
    info!(uid = %identity.uid, "anonymous session established");
    let _ = events.send(ControllerEvent::SignedIn {
        uid: identity.uid.clone(),
    });

    let mut subscription = match providers.store.subscribe(&collection_path, &identity).await {
        Ok(subscription) => subscription,
        Err(err) => {
            warn!(%err, path = %collection_path, "snapshot subscription failed to open");
            let _ = events.send(ControllerEvent::SubscriptionFailed(err.to_string()));
            return;
        }
    };
    info!(path = %collection_path, "snapshot subscription open");

    while let Some(event) = subscription.next_event().await {
        let forwarded = match event {
            StoreEvent::Snapshot(records) => {
                debug!(records = records.len(), "snapshot delivered");
                ControllerEvent::Snapshot(records)
            }
            StoreEvent::Error(err) => {
                warn!(%err, "snapshot listener stopped");
                ControllerEvent::SubscriptionFailed(err.to_string())
            }
        };
        if events.send(forwarded).is_err() {
            break;
        }
    }
}
