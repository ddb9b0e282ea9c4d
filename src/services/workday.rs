//! Workday job search adapter.
//!
//! Workday career sites are rendered client-side; the listing comes from a
//! JSON endpoint under `/wday/cxs/{tenant}/{site}/jobs`.

use std::collections::BTreeMap;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AppError, Result};
use crate::models::{RawPosting, WorkdayBoard};
use crate::services::SourceAdapter;

/// Adapter for a Workday `cxs` job search endpoint.
pub struct WorkdayAdapter {
    name: String,
    board: WorkdayBoard,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchRequest<'a> {
    applied_facets: &'a BTreeMap<String, Vec<String>>,
    limit: usize,
    offset: usize,
    search_text: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchResponse {
    #[serde(default)]
    job_postings: Vec<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JobPosting {
    title: Option<String>,
    locations_text: Option<String>,
    external_path: Option<String>,
}

impl WorkdayAdapter {
    /// Create an adapter for `board`, stamping postings with `name`.
    pub fn new(name: impl Into<String>, board: WorkdayBoard) -> Self {
        Self {
            name: name.into(),
            board,
        }
    }

    async fn search(&self, client: &Client, limit: usize) -> Result<Vec<RawPosting>> {
        let request = SearchRequest {
            applied_facets: &self.board.applied_facets,
            limit,
            offset: 0,
            search_text: &self.board.search_text,
        };

        let body = client
            .post(&self.board.api_url)
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        self.parse_response(&body, limit)
    }

    /// Extract up to `limit` postings from a search response body.
    ///
    /// Entries that do not have the expected shape are skipped.
    pub fn parse_response(&self, body: &str, limit: usize) -> Result<Vec<RawPosting>> {
        let response: SearchResponse = serde_json::from_str(body)?;
        let base = self.board.posting_base.trim_end_matches('/');

        let postings = response
            .job_postings
            .into_iter()
            .filter_map(|entry| match serde_json::from_value::<JobPosting>(entry) {
                Ok(job) => Some(job),
                Err(e) => {
                    log::debug!("{}: skipping malformed job posting: {}", self.name, e);
                    None
                }
            })
            .take(limit)
            .map(|job| RawPosting {
                source: self.name.clone(),
                title: job.title,
                location: job.locations_text,
                url: job
                    .external_path
                    .filter(|path| !path.trim().is_empty())
                    .map(|path| format!("{base}{}", path.trim())),
            })
            .collect();
        Ok(postings)
    }
}

#[async_trait]
impl SourceAdapter for WorkdayAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self, client: &Client, limit: usize) -> Result<Vec<RawPosting>> {
        self.search(client, limit)
            .await
            .map_err(|e| AppError::adapter(&self.name, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adapter() -> WorkdayAdapter {
        WorkdayAdapter::new(
            "Nvidia",
            WorkdayBoard {
                api_url: "https://nvidia.wd5.myworkdayjobs.com/wday/cxs/nvidia/Site/jobs"
                    .to_string(),
                posting_base: "https://nvidia.wd5.myworkdayjobs.com/en-US/Site".to_string(),
                search_text: "intern".to_string(),
                applied_facets: BTreeMap::new(),
            },
        )
    }

    #[test]
    fn test_parse_response() {
        let body = r#"{
            "total": 3,
            "jobPostings": [
                {"title": "Deep Learning Intern", "locationsText": "Toronto, Canada",
                 "externalPath": "/job/Toronto/Deep-Learning-Intern_JR1"},
                {"title": 42, "externalPath": "/job/bad"},
                {"title": "Compiler Intern", "externalPath": "/job/Remote/Compiler_JR2"},
                {"title": "Pathless Intern"}
            ]
        }"#;

        let postings = adapter().parse_response(body, 20).unwrap();
        assert_eq!(postings.len(), 3);
        assert_eq!(
            postings[0],
            RawPosting::new(
                "Nvidia",
                "Deep Learning Intern",
                "Toronto, Canada",
                "https://nvidia.wd5.myworkdayjobs.com/en-US/Site/job/Toronto/Deep-Learning-Intern_JR1"
            )
        );
        assert_eq!(postings[1].location, None);
        assert_eq!(postings[2].url, None);
    }

    #[test]
    fn test_parse_response_limit_and_empty() {
        let body = r#"{"jobPostings": [
            {"title": "A", "externalPath": "/job/a"},
            {"title": "B", "externalPath": "/job/b"}
        ]}"#;
        assert_eq!(adapter().parse_response(body, 1).unwrap().len(), 1);
        assert!(adapter().parse_response("{}", 20).unwrap().is_empty());
    }

    #[test]
    fn test_parse_response_rejects_non_json() {
        assert!(adapter().parse_response("<html>blocked</html>", 20).is_err());
    }

    #[test]
    fn test_search_request_shape() {
        let facets = BTreeMap::from([("locationCountry".to_string(), vec!["ca".to_string()])]);
        let request = SearchRequest {
            applied_facets: &facets,
            limit: 20,
            offset: 0,
            search_text: "intern",
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["searchText"], "intern");
        assert_eq!(json["appliedFacets"]["locationCountry"][0], "ca");
        assert_eq!(json["limit"], 20);
    }

    #[tokio::test]
    async fn test_fetch_posts_search() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/wday/cxs/nvidia/Site/jobs")
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                "searchText": "intern",
                "limit": 5,
                "offset": 0
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"jobPostings": [{"title": "GPU Intern", "externalPath": "/job/1"}]}"#)
            .create_async()
            .await;

        let mut adapter = adapter();
        adapter.board.api_url = format!("{}/wday/cxs/nvidia/Site/jobs", server.url());

        let postings = adapter.fetch(&Client::new(), 5).await.unwrap();
        mock.assert_async().await;
        assert_eq!(postings.len(), 1);
        assert_eq!(
            postings[0].url.as_deref(),
            Some("https://nvidia.wd5.myworkdayjobs.com/en-US/Site/job/1")
        );
    }

    #[tokio::test]
    async fn test_fetch_server_error_fails() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/wday/cxs/nvidia/Site/jobs")
            .with_status(500)
            .create_async()
            .await;

        let mut adapter = adapter();
        adapter.board.api_url = format!("{}/wday/cxs/nvidia/Site/jobs", server.url());

        assert!(matches!(
            adapter.fetch(&Client::new(), 5).await,
            Err(AppError::Adapter { source_name, .. }) if source_name == "Nvidia"
        ));
    }
}
