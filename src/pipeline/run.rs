// src/pipeline/run.rs

//! Single end-to-end run: collect, ingest, compose, deliver.

use chrono::NaiveDate;
use reqwest::Client;
use serde::Serialize;

use crate::error::Result;
use crate::notify::Notifier;
use crate::pipeline::collect::{CollectOptions, collect_all};
use crate::pipeline::digest::compose;
use crate::pipeline::ingest::ingest_all;
use crate::services::SourceRegistry;
use crate::storage::PostingStore;

/// Everything a run needs, injected by the caller.
pub struct RunContext<'a> {
    pub registry: &'a SourceRegistry,
    pub client: &'a Client,
    pub store: &'a dyn PostingStore,
    pub notifier: &'a dyn Notifier,
    pub recipient: &'a str,
    pub options: CollectOptions,
}

/// Outcome of one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunResult {
    pub as_of: NaiveDate,
    /// Postings collected across all sources
    pub total_count: usize,
    /// Postings first seen in this run
    pub new_count: usize,
    pub seen_count: usize,
    pub rejected_count: usize,
    pub failed_sources: Vec<String>,
    pub delivered: bool,
}

/// Run the whole pipeline once with a fixed `as_of` date.
///
/// Adapter failures, invalid records, and delivery failures are logged and
/// reported in the result. A store failure aborts the run before anything
/// is delivered.
pub async fn run_once(ctx: &RunContext<'_>, as_of: NaiveDate) -> Result<RunResult> {
    log::info!(
        "Collecting postings from {} sources for {}...",
        ctx.registry.len(),
        as_of
    );
    let collected = collect_all(ctx.registry, ctx.client, &ctx.options).await;
    let total_count = collected.records.len();
    log::info!("Found {} total internship postings", total_count);

    let ingested = ingest_all(ctx.store, collected.records, as_of)?;
    log::info!("Identified {} new internship(s)", ingested.new.len());

    let digest = compose(as_of, &ingested.new);
    log::info!("Sending digest to {}...", ctx.recipient);
    let delivered = match ctx.notifier.deliver(ctx.recipient, &digest).await {
        Ok(()) => true,
        Err(error) => {
            log::error!("Failed to send digest: {}", error);
            false
        }
    };

    Ok(RunResult {
        as_of,
        total_count,
        new_count: ingested.new.len(),
        seen_count: ingested.seen,
        rejected_count: ingested.rejected.len(),
        failed_sources: collected.failures.into_iter().map(|f| f.source).collect(),
        delivered,
    })
}
