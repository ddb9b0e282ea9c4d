//! Posting data structures.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::utils::normalize_whitespace;

/// Title used when a source does not expose one.
pub const UNKNOWN_TITLE: &str = "Unknown";

/// Location used when a source does not expose one.
pub const UNSPECIFIED_LOCATION: &str = "Unspecified";

/// A posting as scraped by an adapter, before validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RawPosting {
    /// Employer the posting was scraped from
    pub source: String,

    /// Posting title, if the page exposed one
    pub title: Option<String>,

    /// Posting location, if the page exposed one
    pub location: Option<String>,

    /// Absolute URL of the posting
    pub url: Option<String>,
}

impl RawPosting {
    /// Create a raw posting with every field present.
    pub fn new(
        source: impl Into<String>,
        title: impl Into<String>,
        location: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            title: Some(title.into()),
            location: Some(location.into()),
            url: Some(url.into()),
        }
    }
}

/// A validated posting whose URL is its identity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PostingRecord {
    pub source: String,
    pub title: String,
    pub location: String,
    pub url: String,
}

impl TryFrom<RawPosting> for PostingRecord {
    type Error = AppError;

    fn try_from(raw: RawPosting) -> Result<Self> {
        let source = normalize_whitespace(&raw.source);
        if source.is_empty() {
            return Err(AppError::invalid_record("posting has no source"));
        }

        let url = raw.url.as_deref().map(str::trim).unwrap_or_default();
        if url.is_empty() {
            return Err(AppError::invalid_record(format!(
                "posting from {source} has no url"
            )));
        }

        let parsed = url::Url::parse(url).map_err(|e| {
            AppError::invalid_record(format!("posting from {source} has bad url '{url}': {e}"))
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(AppError::invalid_record(format!(
                "posting from {source} has non-http url '{url}'"
            )));
        }

        Ok(Self {
            title: text_or(raw.title.as_deref(), UNKNOWN_TITLE),
            location: text_or(raw.location.as_deref(), UNSPECIFIED_LOCATION),
            url: url.to_string(),
            source,
        })
    }
}

/// Outcome of ingesting one posting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ingestion {
    /// The URL had never been seen before.
    New,
    /// The URL was already stored; only `last_seen` advanced.
    Seen,
}

/// A posting as persisted by the store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredPosting {
    /// Surrogate key assigned by the store
    pub id: i64,
    pub source: String,
    pub title: String,
    pub location: String,
    pub url: String,
    pub first_seen: NaiveDate,
    pub last_seen: NaiveDate,
}

impl StoredPosting {
    /// View the stored posting as a plain record.
    pub fn record(&self) -> PostingRecord {
        PostingRecord {
            source: self.source.clone(),
            title: self.title.clone(),
            location: self.location.clone(),
            url: self.url.clone(),
        }
    }
}

fn text_or(value: Option<&str>, fallback: &str) -> String {
    let text = value.map(normalize_whitespace).unwrap_or_default();
    if text.is_empty() {
        fallback.to_string()
    } else {
        text
    }
}
