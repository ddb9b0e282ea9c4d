//! Storage abstractions for posting persistence.
//!
//! The store is the only state that survives between runs. It is keyed by
//! posting URL and records when each posting was first and last observed.
//!
//! ## Layout
//!
//! ```text
//! internships
//! ├── id          INTEGER PRIMARY KEY AUTOINCREMENT
//! ├── company     TEXT NOT NULL
//! ├── title       TEXT NOT NULL
//! ├── location    TEXT
//! ├── url         TEXT NOT NULL UNIQUE
//! ├── first_seen  DATE NOT NULL
//! └── last_seen   DATE NOT NULL
//! ```

pub mod sqlite;

use chrono::NaiveDate;

use crate::error::Result;
use crate::models::{Ingestion, PostingRecord, StoredPosting};

// Re-export for convenience
pub use sqlite::SqliteStore;

/// Trait for posting store backends.
///
/// Any error returned here is fatal to a run: without durable state the
/// new-versus-seen split cannot be trusted.
pub trait PostingStore {
    /// Ensure the backing structure exists. Never destroys existing data.
    fn initialize(&self) -> Result<()>;

    /// Record an observation of `record` on `as_of`.
    ///
    /// Unknown URLs are inserted with `first_seen = last_seen = as_of`.
    /// Known URLs only have `last_seen` advanced; title and location keep
    /// the values from the first sighting.
    fn ingest(&self, record: &PostingRecord, as_of: NaiveDate) -> Result<Ingestion>;

    /// Postings first seen on `as_of`, ordered by `(source, title)`.
    fn query_new_as_of(&self, as_of: NaiveDate) -> Result<Vec<StoredPosting>>;

    /// Look up a single posting by URL.
    fn get(&self, url: &str) -> Result<Option<StoredPosting>>;

    /// Total number of stored postings.
    fn count(&self) -> Result<usize>;
}
