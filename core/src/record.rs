//! Record shapes for the three data sources and their normalization into
//! the single [`Whitepaper`] shape the rest of the app consumes.
//!
//! Snapshot documents and search hits disagree about timestamps: the store
//! hands back a structured seconds/nanos pair while the index stores either
//! epoch milliseconds or a plain text date. Both collapse to
//! `Option<DateTime<Utc>>` here so downstream code never branches on the
//! record's origin.

use chrono::DateTime;
use chrono::NaiveDate;
use chrono::TimeZone;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// One whitepaper as displayed, regardless of which source produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Whitepaper {
    pub id: String,
    pub title: String,
    pub summary: String,
    pub topic: String,
    pub link: Option<String>,
    pub publication_date: Option<DateTime<Utc>>,
}

impl Whitepaper {
    /// Normalize a document delivered by the snapshot listener.
    pub fn from_store(record: StoreRecord) -> Self {
        Self {
            id: record.id,
            title: record.title,
            summary: record.summary,
            topic: record.topic,
            link: record.link,
            publication_date: record.publication_date.and_then(StoreTimestamp::to_utc),
        }
    }

    /// Normalize a hit returned by the search provider.
    pub fn from_hit(hit: SearchHit) -> Self {
        Self {
            id: hit.object_id,
            title: hit.title,
            summary: hit.summary,
            topic: hit.topic,
            link: hit.link,
            publication_date: hit.publication_date.as_ref().and_then(RawTimestamp::to_utc),
        }
    }
}

/// Store-native timestamp: seconds and nanoseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreTimestamp {
    pub seconds: i64,
    pub nanos: u32,
}

impl StoreTimestamp {
    /// `None` when the pair is outside the representable range.
    pub fn to_utc(self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.seconds, self.nanos).single()
    }
}

/// A document as delivered by the document store listener, before
/// normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreRecord {
    pub id: String,
    pub title: String,
    pub summary: String,
    pub topic: String,
    pub link: Option<String>,
    pub publication_date: Option<StoreTimestamp>,
}

/// Timestamp as carried by search hits: epoch milliseconds or a text date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawTimestamp {
    Millis(i64),
    Text(String),
}

impl RawTimestamp {
    /// `None` when the value cannot be read as a date.
    pub fn to_utc(&self) -> Option<DateTime<Utc>> {
        match self {
            RawTimestamp::Millis(millis) => Utc.timestamp_millis_opt(*millis).single(),
            RawTimestamp::Text(text) => parse_text_date(text),
        }
    }
}

/// Hand-maintained indexes carry either RFC 3339 timestamps or bare
/// `YYYY-MM-DD` dates; accept both.
fn parse_text_date(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|datetime| Utc.from_utc_datetime(&datetime))
}

/// A single match from the search provider, in the index's wire shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    #[serde(rename = "objectID")]
    pub object_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub topic: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(
        rename = "publicationDate",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub publication_date: Option<RawTimestamp>,
}
