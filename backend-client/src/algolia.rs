//! Algolia search adapter. Queries go to the index's `query` endpoint with
//! the search-only key; ranking is entirely the service's concern. A topic
//! constraint becomes a `topic:"<value>"` filter expression.

use async_trait::async_trait;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;

use paperdeck_core::config::SearchConfig;
use paperdeck_core::error::SearchError;
use paperdeck_core::provider::SearchProvider;
use paperdeck_core::provider::SearchQuery;
use paperdeck_core::record::SearchHit;

const APP_ID_HEADER: &str = "X-Algolia-Application-Id";
const API_KEY_HEADER: &str = "X-Algolia-API-Key";

pub struct AlgoliaClient {
    http: reqwest::Client,
    base_url: String,
    app_id: String,
    search_key: String,
    index: String,
}

impl AlgoliaClient {
    pub fn new(http: reqwest::Client, config: &SearchConfig) -> Self {
        Self {
            http,
            base_url: format!("https://{}-dsn.algolia.net", config.app_id),
            app_id: config.app_id.clone(),
            search_key: config.search_key.clone(),
            index: config.index.clone(),
        }
    }

    /// Point the client at a different endpoint (test servers).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[derive(Serialize)]
struct QueryRequest {
    query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    filters: Option<String>,
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    hits: Vec<SearchHit>,
}

/// `topic:"<value>"`, with embedded quotes escaped so a label can never
/// terminate the expression early.
fn topic_filter(topic: &str) -> String {
    format!("topic:\"{}\"", topic.replace('"', "\\\""))
}

#[async_trait]
impl SearchProvider for AlgoliaClient {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<SearchHit>, SearchError> {
        let url = format!("{}/1/indexes/{}/query", self.base_url, self.index);
        let request = QueryRequest {
            query: query.term.clone(),
            filters: query.topic.as_deref().map(topic_filter),
        };
        let resp = self
            .http
            .post(url)
            .header(APP_ID_HEADER, &self.app_id)
            .header(API_KEY_HEADER, &self.search_key)
            .json(&request)
            .send()
            .await
            .map_err(|err| SearchError::Transport(err.to_string()))?;
        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(SearchError::Status { status, body });
        }
        let parsed: QueryResponse = resp
            .json()
            .await
            .map_err(|err| SearchError::Decode(err.to_string()))?;
        debug!(hits = parsed.hits.len(), term = %query.term, "search answered");
        Ok(parsed.hits)
    }
}
