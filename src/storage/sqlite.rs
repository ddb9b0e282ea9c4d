//! SQLite posting store.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension, Row, params};

use crate::error::Result;
use crate::models::{Ingestion, PostingRecord, StoredPosting, UNSPECIFIED_LOCATION};
use crate::storage::PostingStore;

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS internships (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        company TEXT NOT NULL,
        title TEXT NOT NULL,
        location TEXT,
        url TEXT NOT NULL UNIQUE,
        first_seen DATE NOT NULL,
        last_seen DATE NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_internships_first_seen
        ON internships (first_seen);
"#;

const SELECT_COLUMNS: &str =
    "SELECT id, company, title, location, url, first_seen, last_seen FROM internships";

/// Posting store backed by a single SQLite database file.
#[derive(Debug)]
pub struct SqliteStore {
    path: Option<PathBuf>,
    conn: Connection,
}

impl SqliteStore {
    /// Open (creating if needed) the database at `path` and initialize it.
    ///
    /// Failing to create the parent directory is an `Io` error; anything
    /// SQLite rejects is a `Store` error.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(&path)?;
        let store = Self {
            path: Some(path),
            conn,
        };
        store.initialize()?;
        Ok(store)
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        let store = Self {
            path: None,
            conn: Connection::open_in_memory()?,
        };
        store.initialize()?;
        Ok(store)
    }

    /// Database file, if this store is on disk.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Close the connection, surfacing any error from flushing it.
    pub fn close(self) -> Result<()> {
        self.conn.close().map_err(|(_, e)| e.into())
    }

    fn row_to_posting(row: &Row<'_>) -> rusqlite::Result<StoredPosting> {
        Ok(StoredPosting {
            id: row.get(0)?,
            source: row.get(1)?,
            title: row.get(2)?,
            location: row
                .get::<_, Option<String>>(3)?
                .unwrap_or_else(|| UNSPECIFIED_LOCATION.to_string()),
            url: row.get(4)?,
            first_seen: row.get(5)?,
            last_seen: row.get(6)?,
        })
    }
}

impl PostingStore for SqliteStore {
    fn initialize(&self) -> Result<()> {
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    fn ingest(&self, record: &PostingRecord, as_of: NaiveDate) -> Result<Ingestion> {
        let tx = self.conn.unchecked_transaction()?;

        // The UNIQUE constraint on url decides identity, not a prior lookup.
        let inserted = tx.execute(
            "INSERT INTO internships (company, title, location, url, first_seen, last_seen)
             VALUES (?1, ?2, ?3, ?4, ?5, ?5)
             ON CONFLICT(url) DO NOTHING",
            params![record.source, record.title, record.location, record.url, as_of],
        )?;

        let outcome = if inserted == 1 {
            Ingestion::New
        } else {
            // MAX keeps last_seen monotonic when an older date is replayed.
            tx.execute(
                "UPDATE internships SET last_seen = MAX(last_seen, ?1) WHERE url = ?2",
                params![as_of, record.url],
            )?;
            Ingestion::Seen
        };

        tx.commit()?;
        Ok(outcome)
    }

    fn query_new_as_of(&self, as_of: NaiveDate) -> Result<Vec<StoredPosting>> {
        let mut stmt = self.conn.prepare(&format!(
            "{SELECT_COLUMNS} WHERE first_seen = ?1 ORDER BY company, title"
        ))?;
        let postings = stmt
            .query_map(params![as_of], Self::row_to_posting)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(postings)
    }

    fn get(&self, url: &str) -> Result<Option<StoredPosting>> {
        let posting = self
            .conn
            .query_row(
                &format!("{SELECT_COLUMNS} WHERE url = ?1"),
                params![url],
                Self::row_to_posting,
            )
            .optional()?;
        Ok(posting)
    }

    fn count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM internships", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}
