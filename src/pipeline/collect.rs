// src/pipeline/collect.rs

//! Collection orchestration across all registered sources.

use std::time::Duration;

use futures::stream::{self, StreamExt};
use reqwest::Client;

use crate::models::{CrawlerConfig, RawPosting};
use crate::services::SourceRegistry;

/// Knobs for one collection pass.
#[derive(Debug, Clone)]
pub struct CollectOptions {
    /// Maximum postings kept per source
    pub limit: usize,
    /// Politeness delay between sources
    pub delay: Duration,
    /// Sources fetched at once; output order is unaffected
    pub concurrency: usize,
}

impl From<&CrawlerConfig> for CollectOptions {
    fn from(config: &CrawlerConfig) -> Self {
        Self {
            limit: config.max_postings_per_source,
            delay: Duration::from_millis(config.request_delay_ms),
            concurrency: config.max_concurrent,
        }
    }
}

/// A source that contributed nothing because its adapter failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFailure {
    pub source: String,
    pub message: String,
}

/// Summary of a collection pass.
#[derive(Debug, Default)]
pub struct CollectOutcome {
    /// Postings from every source, in registry order
    pub records: Vec<RawPosting>,
    pub source_total: usize,
    pub failures: Vec<SourceFailure>,
}

/// Fetch every registered source and merge the results.
///
/// A failing adapter is logged and contributes no postings; it never aborts
/// the pass.
pub async fn collect_all(
    registry: &SourceRegistry,
    client: &Client,
    options: &CollectOptions,
) -> CollectOutcome {
    let adapters = registry.adapters();
    let mut outcome = CollectOutcome {
        source_total: adapters.len(),
        ..CollectOutcome::default()
    };

    let mut results = stream::iter(adapters)
        .map(|adapter| async move {
            let result = adapter.fetch(client, options.limit).await;
            (adapter.name(), result)
        })
        .buffered(options.concurrency.max(1))
        .enumerate();

    while let Some((index, (name, result))) = results.next().await {
        match result {
            Ok(mut postings) => {
                postings.truncate(options.limit);
                log::info!("{}: {} postings", name, postings.len());
                outcome.records.extend(postings);
            }
            Err(error) => {
                log::warn!("Failed to collect from {}: {}", name, error);
                outcome.failures.push(SourceFailure {
                    source: name.to_string(),
                    message: error.to_string(),
                });
            }
        }

        if index + 1 < outcome.source_total && !options.delay.is_zero() {
            tokio::time::sleep(options.delay).await;
        }
    }

    outcome
}

#[cfg(test)]
pub(crate) mod tests {
    use std::io::Write;
    use std::time::Instant;

    use async_trait::async_trait;

    use super::*;
    use crate::error::{AppError, Result};
    use crate::models::HtmlBoard;
    use crate::services::{HtmlBoardAdapter, SourceAdapter};
    use crate::utils::http;

    /// Adapter returning canned postings after an optional pause.
    pub(crate) struct StaticAdapter {
        pub name: String,
        pub postings: Vec<RawPosting>,
        pub pause: Duration,
    }

    impl StaticAdapter {
        pub fn new(name: &str, entries: &[(&str, &str)]) -> Self {
            Self {
                name: name.to_string(),
                postings: entries
                    .iter()
                    .map(|(title, url)| RawPosting::new(name, *title, "Toronto, ON", *url))
                    .collect(),
                pause: Duration::ZERO,
            }
        }
    }

    #[async_trait]
    impl SourceAdapter for StaticAdapter {
        fn name(&self) -> &str {
            &self.name
        }

        async fn fetch(&self, _client: &Client, limit: usize) -> Result<Vec<RawPosting>> {
            if !self.pause.is_zero() {
                tokio::time::sleep(self.pause).await;
            }
            Ok(self.postings.iter().take(limit).cloned().collect())
        }
    }

    /// Adapter that always fails.
    pub(crate) struct FailingAdapter(pub &'static str);

    #[async_trait]
    impl SourceAdapter for FailingAdapter {
        fn name(&self) -> &str {
            self.0
        }

        async fn fetch(&self, _client: &Client, _limit: usize) -> Result<Vec<RawPosting>> {
            Err(AppError::adapter(self.0, "connection reset"))
        }
    }

    fn options(delay_ms: u64, concurrency: usize) -> CollectOptions {
        CollectOptions {
            limit: 20,
            delay: Duration::from_millis(delay_ms),
            concurrency,
        }
    }

    fn urls(outcome: &CollectOutcome) -> Vec<&str> {
        outcome
            .records
            .iter()
            .filter_map(|r| r.url.as_deref())
            .collect()
    }

    #[tokio::test]
    async fn test_merges_in_registry_order() {
        let mut registry = SourceRegistry::new();
        registry
            .register(Box::new(StaticAdapter::new("A", &[("t1", "https://a/1")])))
            .unwrap();
        registry
            .register(Box::new(StaticAdapter::new(
                "B",
                &[("t2", "https://b/2"), ("t3", "https://b/3")],
            )))
            .unwrap();

        let outcome = collect_all(&registry, &Client::new(), &options(0, 1)).await;
        assert_eq!(outcome.source_total, 2);
        assert!(outcome.failures.is_empty());
        assert_eq!(urls(&outcome), vec!["https://a/1", "https://b/2", "https://b/3"]);
    }

    #[tokio::test]
    async fn test_failing_adapter_is_isolated() {
        let mut registry = SourceRegistry::new();
        registry
            .register(Box::new(StaticAdapter::new("A", &[("t1", "https://a/1")])))
            .unwrap();
        registry.register(Box::new(FailingAdapter("Broken"))).unwrap();
        registry
            .register(Box::new(StaticAdapter::new("C", &[("t3", "https://c/3")])))
            .unwrap();

        let outcome = collect_all(&registry, &Client::new(), &options(0, 1)).await;
        assert_eq!(urls(&outcome), vec!["https://a/1", "https://c/3"]);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].source, "Broken");
    }

    #[tokio::test]
    async fn test_caps_each_source() {
        let entries: Vec<(String, String)> = (0..30)
            .map(|i| (format!("Intern {i}"), format!("https://a/{i}")))
            .collect();
        let borrowed: Vec<(&str, &str)> = entries
            .iter()
            .map(|(t, u)| (t.as_str(), u.as_str()))
            .collect();
        let mut registry = SourceRegistry::new();
        registry
            .register(Box::new(StaticAdapter::new("A", &borrowed)))
            .unwrap();

        let outcome = collect_all(&registry, &Client::new(), &options(0, 1)).await;
        assert_eq!(outcome.records.len(), 20);
    }

    #[tokio::test]
    async fn test_concurrent_fetch_keeps_order() {
        let mut slow = StaticAdapter::new("Slow", &[("t1", "https://slow/1")]);
        slow.pause = Duration::from_millis(50);
        let mut registry = SourceRegistry::new();
        registry.register(Box::new(slow)).unwrap();
        registry
            .register(Box::new(StaticAdapter::new("Fast", &[("t2", "https://fast/2")])))
            .unwrap();

        let outcome = collect_all(&registry, &Client::new(), &options(0, 4)).await;
        assert_eq!(urls(&outcome), vec!["https://slow/1", "https://fast/2"]);
    }

    #[tokio::test]
    async fn test_delay_applied_between_sources_only() {
        let mut registry = SourceRegistry::new();
        for name in ["A", "B", "C"] {
            registry
                .register(Box::new(StaticAdapter::new(name, &[])))
                .unwrap();
        }

        let started = Instant::now();
        collect_all(&registry, &Client::new(), &options(30, 1)).await;
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(60), "{elapsed:?}");
    }

    #[tokio::test]
    async fn test_empty_registry() {
        let outcome = collect_all(&SourceRegistry::new(), &Client::new(), &options(30, 1)).await;
        assert_eq!(outcome.source_total, 0);
        assert!(outcome.records.is_empty());
    }

    #[tokio::test]
    async fn test_timed_out_source_is_a_failure() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/jobs")
            .with_status(200)
            .with_chunked_body(|w| {
                std::thread::sleep(Duration::from_secs(3));
                w.write_all(b"<ul><li><a href=\"/job/1\">Late Intern</a></li></ul>")
            })
            .create_async()
            .await;

        let client = http::create_async_client(&CrawlerConfig {
            timeout_secs: 1,
            ..CrawlerConfig::default()
        })
        .unwrap();
        let slow = || {
            HtmlBoardAdapter::new(
                "Slow",
                HtmlBoard {
                    url: format!("{}/jobs", server.url()),
                    row_selector: "li".to_string(),
                    title_selector: None,
                    location_selector: None,
                    link_selector: Some("a".to_string()),
                    attr_name: "href".to_string(),
                    link_contains: None,
                    min_title_len: 0,
                    fallback_location: None,
                },
            )
        };

        assert!(matches!(
            slow().fetch(&client, 20).await,
            Err(AppError::Adapter { source_name, .. }) if source_name == "Slow"
        ));

        let mut registry = SourceRegistry::new();
        registry
            .register(Box::new(StaticAdapter::new("A", &[("t1", "https://a/1")])))
            .unwrap();
        registry.register(Box::new(slow())).unwrap();
        registry
            .register(Box::new(StaticAdapter::new("C", &[("t3", "https://c/3")])))
            .unwrap();

        let outcome = collect_all(&registry, &client, &options(0, 1)).await;
        assert_eq!(urls(&outcome), vec!["https://a/1", "https://c/3"]);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].source, "Slow");
    }
}
