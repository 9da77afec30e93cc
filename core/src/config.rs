//! Deployment configuration, read from the environment at startup.
//!
//! Store credentials are required: without a project id and API key there
//! is no document store to browse, so their absence is a fatal
//! [`ConfigError`]. Search credentials are optional: when absent the app
//! runs with search disabled and local filtering intact.

use std::time::Duration;

use tracing::warn;

use crate::error::ConfigError;

pub const PROJECT_ID_ENV: &str = "PAPERDECK_PROJECT_ID";
pub const API_KEY_ENV: &str = "PAPERDECK_API_KEY";
pub const SEARCH_APP_ID_ENV: &str = "PAPERDECK_SEARCH_APP_ID";
pub const SEARCH_KEY_ENV: &str = "PAPERDECK_SEARCH_KEY";
pub const SEARCH_INDEX_ENV: &str = "PAPERDECK_SEARCH_INDEX";
pub const POLL_INTERVAL_ENV: &str = "PAPERDECK_POLL_INTERVAL_MS";

pub const DEFAULT_SEARCH_INDEX: &str = "whitepapers";
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(2_000);

/// Credentials and tuning for the document store and identity endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub project_id: String,
    pub api_key: String,
    /// How often the snapshot listener re-reads the collection.
    pub poll_interval: Duration,
}

/// Credentials for the hosted search index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchConfig {
    pub app_id: String,
    pub search_key: String,
    pub index: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub store: StoreConfig,
    pub search: Option<SearchConfig>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary lookup so tests never touch process-global
    /// environment state.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let project_id = require(&lookup, PROJECT_ID_ENV)?;
        let api_key = require(&lookup, API_KEY_ENV)?;
        let poll_interval = match non_empty(lookup(POLL_INTERVAL_ENV)) {
            Some(raw) => {
                let millis: u64 =
                    raw.trim()
                        .parse()
                        .map_err(|_| ConfigError::InvalidVar {
                            var: POLL_INTERVAL_ENV,
                            reason: format!("expected milliseconds, got {raw:?}"),
                        })?;
                Duration::from_millis(millis)
            }
            None => DEFAULT_POLL_INTERVAL,
        };

        let app_id = non_empty(lookup(SEARCH_APP_ID_ENV));
        let search_key = non_empty(lookup(SEARCH_KEY_ENV));
        let search = match (app_id, search_key) {
            (Some(app_id), Some(search_key)) => Some(SearchConfig {
                app_id,
                search_key,
                index: non_empty(lookup(SEARCH_INDEX_ENV))
                    .unwrap_or_else(|| DEFAULT_SEARCH_INDEX.to_string()),
            }),
            (None, None) => None,
            _ => {
                warn!(
                    "ignoring partial search credentials; set both {SEARCH_APP_ID_ENV} and {SEARCH_KEY_ENV}"
                );
                None
            }
        };

        Ok(Self {
            store: StoreConfig {
                project_id,
                api_key,
                poll_interval,
            },
            search,
        })
    }

    /// Path of the whitepaper collection under this deployment.
    pub fn collection_path(&self) -> String {
        collection_path(&self.store.project_id)
    }
}

/// Collection layout shared by the browser and the seeding utility.
pub fn collection_path(project_id: &str) -> String {
    format!("artifacts/{project_id}/public/data/whitepapers")
}

fn require(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<String, ConfigError> {
    non_empty(lookup(var)).ok_or(ConfigError::MissingVar(var))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}
