use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::record::Whitepaper;
use crate::topics::TopicFilter;

/// User-facing failure descriptor. One slot is kept; the most recent
/// failure wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DisplayError {
    Configuration(String),
    Authentication(String),
    Subscription(String),
    Search(String),
}

impl DisplayError {
    pub fn message(&self) -> &str {
        match self {
            DisplayError::Configuration(message)
            | DisplayError::Authentication(message)
            | DisplayError::Subscription(message)
            | DisplayError::Search(message) => message,
        }
    }
}

impl fmt::Display for DisplayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayError::Configuration(message) => write!(f, "configuration error: {message}"),
            DisplayError::Authentication(message) => write!(f, "sign-in failed: {message}"),
            DisplayError::Subscription(message) => write!(f, "live updates stopped: {message}"),
            DisplayError::Search(message) => write!(f, "search failed: {message}"),
        }
    }
}

/// Everything the presentation layer needs to render one frame.
///
/// `source_list` is the latest full snapshot from the document store;
/// `active_list` is what the user actually sees after the dispatch rule has
/// run. The two are kept separate so search results and local filters never
/// corrupt the snapshot they were derived from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayState {
    pub source_list: Vec<Whitepaper>,
    pub active_list: Vec<Whitepaper>,
    pub search_term: String,
    pub selected_topic: TopicFilter,
    /// True only while an asynchronous fetch (sign-in, first snapshot, or a
    /// search) is outstanding.
    pub is_loading: bool,
    pub last_error: Option<DisplayError>,
    /// False when no search credentials are configured; the search box
    /// degrades while local filtering keeps working.
    pub search_enabled: bool,
    /// Uid of the anonymous session once sign-in completes.
    pub session_uid: Option<String>,
}

impl DisplayState {
    /// Initial state: nothing fetched yet, the bootstrap fetch outstanding.
    pub fn new(search_enabled: bool) -> Self {
        Self {
            source_list: Vec::new(),
            active_list: Vec::new(),
            search_term: String::new(),
            selected_topic: TopicFilter::All,
            is_loading: true,
            last_error: None,
            search_enabled,
            session_uid: None,
        }
    }
}
