//! The query-dispatch controller.
//!
//! A single synchronous transition function reconciles three data sources
//! into one displayed list: realtime snapshots from the document store,
//! on-demand hits from the search provider, and local topic filtering. The
//! controller owns a [`DisplayState`], consumes [`ControllerEvent`]s, and
//! emits at most one [`Effect`] per event. Whoever runs the controller
//! executes the effect asynchronously and feeds the outcome back in as
//! another event, so every state change happens here and nowhere else.

use serde::Deserialize;
use serde::Serialize;

use crate::record::SearchHit;
use crate::record::StoreRecord;
use crate::record::Whitepaper;
use crate::state::DisplayError;
use crate::state::DisplayState;
use crate::topics::TopicFilter;

/// A term must be strictly longer than this many characters before it is
/// sent to the search provider; shorter terms stay local.
pub const SEARCH_MIN_CHARS: usize = 2;

/// Identifies one issued search. Tickets are monotonic; a response is
/// applied only while its ticket is still the outstanding one, so a late
/// response can never overwrite the results of a newer query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SearchTicket(u64);

/// User intents, as emitted by the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// The search box changed; dispatch re-runs on every edit.
    SearchTermChanged(String),
    TopicSelected(TopicFilter),
    /// Reset term, topic, and any displayed error in one step.
    ClearFilters,
}

/// Everything that can advance the controller.
#[derive(Debug, Clone, PartialEq)]
pub enum ControllerEvent {
    Intent(Intent),
    /// The anonymous session is established.
    SignedIn { uid: String },
    /// Anonymous sign-in failed; no snapshot subscription will start.
    AuthFailed(String),
    /// A full ordered snapshot from the document store listener. Always a
    /// whole collection, never a delta.
    Snapshot(Vec<StoreRecord>),
    /// The snapshot listener stopped and will deliver nothing further.
    SubscriptionFailed(String),
    /// A search round trip finished with hits.
    SearchCompleted {
        ticket: SearchTicket,
        hits: Vec<SearchHit>,
    },
    /// A search round trip failed.
    SearchFailed {
        ticket: SearchTicket,
        message: String,
    },
}

/// Side effect requested by the controller. The caller executes it and
/// routes the outcome back as a [`ControllerEvent`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Search {
        ticket: SearchTicket,
        term: String,
        /// Category constraint forwarded to the provider, if one is
        /// selected.
        topic: Option<String>,
    },
}

/// Owns the display state and decides, for each event, what the active
/// list is and whether a remote search goes out.
#[derive(Debug)]
pub struct Controller {
    state: DisplayState,
    /// True until the first snapshot arrives or the bootstrap fails.
    bootstrap_pending: bool,
    next_ticket: u64,
    /// Ticket of the one search whose response is still wanted.
    pending_search: Option<SearchTicket>,
}

impl Controller {
    pub fn new(search_enabled: bool) -> Self {
        Self {
            state: DisplayState::new(search_enabled),
            bootstrap_pending: true,
            next_ticket: 0,
            pending_search: None,
        }
    }

    pub fn state(&self) -> &DisplayState {
        &self.state
    }

    /// Advance the controller by one event.
    pub fn apply(&mut self, event: ControllerEvent) -> Option<Effect> {
        let effect = self.apply_inner(event);
        self.state.is_loading = self.bootstrap_pending || self.pending_search.is_some();
        effect
    }

    fn apply_inner(&mut self, event: ControllerEvent) -> Option<Effect> {
        match event {
            ControllerEvent::Intent(intent) => return self.apply_intent(intent),
            ControllerEvent::SignedIn { uid } => {
                self.state.session_uid = Some(uid);
            }
            ControllerEvent::AuthFailed(message) => {
                self.bootstrap_pending = false;
                self.state.last_error = Some(DisplayError::Authentication(message));
            }
            ControllerEvent::Snapshot(records) => {
                self.bootstrap_pending = false;
                self.state.source_list =
                    records.into_iter().map(Whitepaper::from_store).collect();
                if matches!(self.state.last_error, Some(DisplayError::Subscription(_))) {
                    self.state.last_error = None;
                }
                self.refresh_local_view();
            }
            ControllerEvent::SubscriptionFailed(message) => {
                // The last delivered snapshot stays visible, marked stale
                // only by the error slot.
                self.bootstrap_pending = false;
                self.state.last_error = Some(DisplayError::Subscription(message));
            }
            ControllerEvent::SearchCompleted { ticket, hits } => {
                if self.pending_search != Some(ticket) {
                    return None;
                }
                self.pending_search = None;
                self.state.active_list = hits.into_iter().map(Whitepaper::from_hit).collect();
            }
            ControllerEvent::SearchFailed { ticket, message } => {
                if self.pending_search != Some(ticket) {
                    return None;
                }
                self.pending_search = None;
                self.state.last_error = Some(DisplayError::Search(message));
            }
        }
        None
    }

    fn apply_intent(&mut self, intent: Intent) -> Option<Effect> {
        match intent {
            Intent::SearchTermChanged(term) => {
                self.state.search_term = term;
            }
            Intent::TopicSelected(topic) => {
                self.state.selected_topic = topic;
            }
            Intent::ClearFilters => {
                self.state.search_term.clear();
                self.state.selected_topic = TopicFilter::All;
                self.state.last_error = None;
            }
        }
        self.dispatch()
    }

    /// Decide what governs the active list after a term or topic change:
    ///
    /// 1. Term longer than [`SEARCH_MIN_CHARS`] characters and a provider
    ///    configured: issue a remote search, forwarding any selected topic
    ///    as a constraint.
    /// 2. Empty term and a category selected: filter the snapshot locally.
    /// 3. Otherwise: mirror the snapshot unchanged.
    fn dispatch(&mut self) -> Option<Effect> {
        if self.wants_remote_search() {
            let ticket = self.issue_ticket();
            self.pending_search = Some(ticket);
            if matches!(self.state.last_error, Some(DisplayError::Search(_))) {
                self.state.last_error = None;
            }
            return Some(Effect::Search {
                ticket,
                term: self.state.search_term.clone(),
                topic: self.state.selected_topic.constraint().map(str::to_string),
            });
        }
        // Falling back to a local rule retires any in-flight search; its
        // response must not resurface later.
        self.pending_search = None;
        self.refresh_local_view();
        None
    }

    fn wants_remote_search(&self) -> bool {
        self.state.search_enabled && self.state.search_term.chars().count() > SEARCH_MIN_CHARS
    }

    /// Recompute the active list from the snapshot under rules 2 and 3.
    /// While a search governs the display, snapshot changes accumulate in
    /// `source_list` without disturbing the shown results and without
    /// triggering a new fetch.
    fn refresh_local_view(&mut self) {
        if self.wants_remote_search() {
            return;
        }
        self.state.active_list =
            if self.state.search_term.is_empty() {
                match self.state.selected_topic.constraint() {
                    Some(topic) => self
                        .state
                        .source_list
                        .iter()
                        .filter(|paper| paper.topic == topic)
                        .cloned()
                        .collect(),
                    None => self.state.source_list.clone(),
                }
            } else {
                self.state.source_list.clone()
            };
    }

    fn issue_ticket(&mut self) -> SearchTicket {
        self.next_ticket += 1;
        SearchTicket(self.next_ticket)
    }
}
