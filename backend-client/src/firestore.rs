//! Firestore REST adapter: one-shot collection reads, document creation
//! for seeding, and a poll-based snapshot subscription.
//!
//! Firestore's own realtime listener rides a gRPC stream; over plain REST
//! the closest faithful rendering of "whole ordered snapshot on every
//! change" is to re-list the collection on an interval and deliver the
//! result only when it differs from the last delivered one. A listener
//! error is terminal for the subscription, matching the upstream contract:
//! after [`MAX_POLL_FAILURES`] consecutive failed polls the subscription
//! reports the error and stops.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::DateTime;
use chrono::SecondsFormat;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::debug;
use tracing::warn;

use paperdeck_core::config::StoreConfig;
use paperdeck_core::error::StoreError;
use paperdeck_core::provider::DocumentStore;
use paperdeck_core::provider::Identity;
use paperdeck_core::provider::StoreEvent;
use paperdeck_core::provider::Subscription;
use paperdeck_core::record::StoreRecord;
use paperdeck_core::record::StoreTimestamp;

const DEFAULT_BASE_URL: &str = "https://firestore.googleapis.com";
const PAGE_SIZE: u32 = 300;
/// Consecutive failed polls before the subscription is declared dead.
const MAX_POLL_FAILURES: u32 = 3;

#[derive(Clone)]
pub struct FirestoreClient {
    http: reqwest::Client,
    base_url: String,
    project_id: String,
    poll_interval: Duration,
}

impl FirestoreClient {
    pub fn new(http: reqwest::Client, config: &StoreConfig) -> Self {
        Self {
            http,
            base_url: DEFAULT_BASE_URL.to_string(),
            project_id: config.project_id.clone(),
            poll_interval: config.poll_interval,
        }
    }

    /// Point the client at a different endpoint (test servers).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn documents_url(&self, collection_path: &str) -> String {
        format!(
            "{}/v1/projects/{}/databases/(default)/documents/{}",
            self.base_url, self.project_id, collection_path
        )
    }

    /// Read the entire collection once, in the store's list order.
    pub async fn list_documents(
        &self,
        collection_path: &str,
        identity: &Identity,
    ) -> Result<Vec<StoreRecord>, StoreError> {
        let resp = self
            .http
            .get(self.documents_url(collection_path))
            .query(&[("pageSize", PAGE_SIZE)])
            .bearer_auth(&identity.token)
            .send()
            .await
            .map_err(|err| StoreError::Transport(err.to_string()))?;
        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(StoreError::Status { status, body });
        }
        let parsed: ListResponse = resp
            .json()
            .await
            .map_err(|err| StoreError::Decode(err.to_string()))?;
        Ok(parsed
            .documents
            .into_iter()
            .map(Document::into_record)
            .collect())
    }

    /// Create one document with a store-assigned id; returns that id.
    pub async fn create_document(
        &self,
        collection_path: &str,
        identity: &Identity,
        paper: &NewWhitepaper,
    ) -> Result<String, StoreError> {
        let resp = self
            .http
            .post(self.documents_url(collection_path))
            .bearer_auth(&identity.token)
            .json(&CreateRequest {
                fields: paper.to_fields(),
            })
            .send()
            .await
            .map_err(|err| StoreError::Transport(err.to_string()))?;
        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(StoreError::Status { status, body });
        }
        let created: Document = resp
            .json()
            .await
            .map_err(|err| StoreError::Decode(err.to_string()))?;
        Ok(created.id())
    }
}

#[async_trait]
impl DocumentStore for FirestoreClient {
    async fn subscribe(
        &self,
        path: &str,
        identity: &Identity,
    ) -> Result<Subscription, StoreError> {
        // Fail fast: a subscription that cannot read the collection once is
        // reported before any polling starts.
        let initial = self.list_documents(path, identity).await?;

        let (tx, rx) = mpsc::channel(8);
        if tx.send(StoreEvent::Snapshot(initial.clone())).await.is_err() {
            return Err(StoreError::ListenerStopped(
                "subscription closed before delivery".to_string(),
            ));
        }

        let client = self.clone();
        let path = path.to_string();
        let identity = identity.clone();
        let task = tokio::spawn(async move {
            let mut last = initial;
            let mut failures = 0u32;
            let mut ticker = tokio::time::interval(client.poll_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick fires immediately; the initial snapshot is
            // already out.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                match client.list_documents(&path, &identity).await {
                    Ok(records) => {
                        failures = 0;
                        if records != last {
                            debug!(records = records.len(), "collection changed");
                            last = records.clone();
                            if tx.send(StoreEvent::Snapshot(records)).await.is_err() {
                                break;
                            }
                        }
                    }
                    Err(err) => {
                        failures += 1;
                        warn!(%err, failures, "poll failed");
                        if failures >= MAX_POLL_FAILURES {
                            let _ = tx.send(StoreEvent::Error(err)).await;
                            break;
                        }
                    }
                }
            }
        });

        Ok(Subscription::new(rx, move || task.abort()))
    }
}

/// A whitepaper to be inserted; the store assigns the document id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewWhitepaper {
    pub title: String,
    pub summary: String,
    pub topic: String,
    pub link: Option<String>,
    pub publication_date: Option<DateTime<Utc>>,
}

impl NewWhitepaper {
    fn to_fields(&self) -> HashMap<String, Value> {
        let mut fields = HashMap::new();
        fields.insert("title".to_string(), Value::string(&self.title));
        fields.insert("summary".to_string(), Value::string(&self.summary));
        fields.insert("topic".to_string(), Value::string(&self.topic));
        if let Some(link) = &self.link {
            fields.insert("link".to_string(), Value::string(link));
        }
        if let Some(date) = self.publication_date {
            fields.insert(
                "publicationDate".to_string(),
                Value::timestamp(date.to_rfc3339_opts(SecondsFormat::Secs, true)),
            );
        }
        fields
    }
}

/// One typed Firestore value. Kinds this app never writes are tolerated on
/// read (both slots stay empty) and ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct Value {
    #[serde(skip_serializing_if = "Option::is_none")]
    string_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    timestamp_value: Option<String>,
}

impl Value {
    fn string(value: &str) -> Self {
        Self {
            string_value: Some(value.to_string()),
            ..Default::default()
        }
    }

    fn timestamp(value: String) -> Self {
        Self {
            timestamp_value: Some(value),
            ..Default::default()
        }
    }
}

#[derive(Serialize)]
struct CreateRequest {
    fields: HashMap<String, Value>,
}

#[derive(Debug, Deserialize)]
struct Document {
    /// Full resource name; the document id is the last path segment.
    name: String,
    #[serde(default)]
    fields: HashMap<String, Value>,
}

#[derive(Deserialize)]
struct ListResponse {
    #[serde(default)]
    documents: Vec<Document>,
}

impl Document {
    fn id(&self) -> String {
        self.name
            .rsplit('/')
            .next()
            .unwrap_or(self.name.as_str())
            .to_string()
    }

    fn into_record(self) -> StoreRecord {
        let id = self.id();
        let mut fields = self.fields;
        let mut take_string =
            |key: &str| fields.remove(key).and_then(|value| value.string_value);
        let title = take_string("title").unwrap_or_default();
        let summary = take_string("summary").unwrap_or_default();
        let topic = take_string("topic").unwrap_or_default();
        let link = take_string("link");
        let publication_date = fields
            .remove("publicationDate")
            .and_then(|value| value.timestamp_value)
            .and_then(|raw| parse_store_timestamp(&raw));
        StoreRecord {
            id,
            title,
            summary,
            topic,
            link,
            publication_date,
        }
    }
}

fn parse_store_timestamp(raw: &str) -> Option<StoreTimestamp> {
    let parsed = DateTime::parse_from_rfc3339(raw).ok()?;
    Some(StoreTimestamp {
        seconds: parsed.timestamp(),
        nanos: parsed.timestamp_subsec_nanos(),
    })
}
