//! Pipeline entry points.
//!
//! - `collect_all`: fetch every source and merge the postings
//! - `ingest_all`: split postings into new and already seen
//! - `compose`: group new postings into a digest
//! - `run_once`: the three above plus delivery
//! - `run_scheduled`: daily trigger

pub mod collect;
pub mod digest;
pub mod ingest;
pub mod run;
pub mod schedule;

pub use collect::{CollectOptions, CollectOutcome, SourceFailure, collect_all};
pub use digest::{Digest, DigestEntry, DigestGroup, compose, compose_stored};
pub use ingest::{IngestOutcome, RejectedRecord, ingest_all};
pub use run::{RunContext, RunResult, run_once};
pub use schedule::{next_run_after, run_scheduled};
