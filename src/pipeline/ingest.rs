// src/pipeline/ingest.rs

//! Ingestion of collected postings into the posting store.

use chrono::NaiveDate;

use crate::error::Result;
use crate::models::{Ingestion, PostingRecord, RawPosting};
use crate::storage::PostingStore;

/// A collected posting that failed validation and never reached the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedRecord {
    pub raw: RawPosting,
    pub reason: String,
}

/// Summary of an ingestion pass.
#[derive(Debug, Default)]
pub struct IngestOutcome {
    /// Postings never seen before, in encounter order
    pub new: Vec<PostingRecord>,
    /// Postings already stored; their `last_seen` was advanced
    pub seen: usize,
    pub rejected: Vec<RejectedRecord>,
}

impl IngestOutcome {
    /// Number of postings handed to the pass.
    pub fn total(&self) -> usize {
        self.new.len() + self.seen + self.rejected.len()
    }
}

/// Feed `records` through `store` in order, all stamped with `as_of`.
///
/// Invalid records are logged and collected in `rejected`. A store error
/// aborts the pass.
pub fn ingest_all(
    store: &dyn PostingStore,
    records: impl IntoIterator<Item = RawPosting>,
    as_of: NaiveDate,
) -> Result<IngestOutcome> {
    let mut outcome = IngestOutcome::default();

    for raw in records {
        let record = match PostingRecord::try_from(raw.clone()) {
            Ok(record) => record,
            Err(error) => {
                log::warn!("Rejected posting from {}: {}", raw.source, error);
                outcome.rejected.push(RejectedRecord {
                    raw,
                    reason: error.to_string(),
                });
                continue;
            }
        };

        match store.ingest(&record, as_of)? {
            Ingestion::New => {
                log::debug!("New posting: [{}] {}", record.source, record.title);
                outcome.new.push(record);
            }
            Ingestion::Seen => outcome.seen += 1,
        }
    }

    log::info!(
        "Ingested {} postings: {} new, {} seen, {} rejected",
        outcome.total(),
        outcome.new.len(),
        outcome.seen,
        outcome.rejected.len()
    );
    Ok(outcome)
}
