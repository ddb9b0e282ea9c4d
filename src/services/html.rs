// src/services/html.rs

//! Listing page adapter.
//!
//! Fetches a career listing page and extracts postings using configured CSS
//! selectors.

use async_trait::async_trait;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{HtmlBoard, RawPosting};
use crate::services::SourceAdapter;
use crate::utils::{http, normalize_whitespace, resolve_url};

/// Adapter for a server-rendered job listing page.
pub struct HtmlBoardAdapter {
    name: String,
    board: HtmlBoard,
}

/// Compiled selectors for one parse pass.
struct RowSelectors {
    row: Selector,
    title: Option<Selector>,
    location: Option<Selector>,
    link: Option<Selector>,
}

impl HtmlBoardAdapter {
    /// Create an adapter for `board`, stamping postings with `name`.
    pub fn new(name: impl Into<String>, board: HtmlBoard) -> Self {
        Self {
            name: name.into(),
            board,
        }
    }

    /// Extract up to `limit` postings from a listing page body.
    pub fn parse_listing(&self, html: &str, limit: usize) -> Result<Vec<RawPosting>> {
        let selectors = RowSelectors {
            row: Self::parse_selector(&self.board.row_selector)?,
            title: Self::parse_optional(self.board.title_selector.as_deref())?,
            location: Self::parse_optional(self.board.location_selector.as_deref())?,
            link: Self::parse_optional(self.board.link_selector.as_deref())?,
        };
        let base_url = Url::parse(&self.board.url)?;
        let document = Html::parse_document(html);

        let postings: Vec<RawPosting> = document
            .select(&selectors.row)
            .filter_map(|row| self.parse_row(row, &selectors, &base_url))
            .take(limit)
            .collect();

        log::debug!(
            "{}: parsed {} postings from {}",
            self.name,
            postings.len(),
            self.board.url
        );
        Ok(postings)
    }

    fn parse_row(
        &self,
        row: ElementRef<'_>,
        selectors: &RowSelectors,
        base_url: &Url,
    ) -> Option<RawPosting> {
        let title_elem = match &selectors.title {
            Some(sel) => row.select(sel).next()?,
            None => row,
        };
        let title = normalize_whitespace(&title_elem.text().collect::<String>());
        if title.is_empty() || title.chars().count() < self.board.min_title_len {
            return None;
        }

        let location = selectors
            .location
            .as_ref()
            .and_then(|sel| row.select(sel).next())
            .map(|el| normalize_whitespace(&el.text().collect::<String>()))
            .filter(|text| !text.is_empty())
            .or_else(|| self.board.fallback_location.clone());

        let attr = self.board.attr_name.as_str();
        let href = selectors
            .link
            .as_ref()
            .and_then(|sel| row.select(sel).next())
            .or_else(|| {
                [title_elem, row]
                    .into_iter()
                    .find(|el| el.value().attr(attr).is_some())
            })
            .and_then(|el| el.value().attr(attr))
            .map(str::trim)
            .filter(|href| !href.is_empty());

        if let Some(needle) = &self.board.link_contains {
            let needle = needle.to_lowercase();
            if !href.is_some_and(|h| h.to_lowercase().contains(&needle)) {
                return None;
            }
        }

        Some(RawPosting {
            source: self.name.clone(),
            title: Some(title),
            location,
            url: href.map(|h| resolve_url(base_url, h)),
        })
    }

    fn parse_selector(s: &str) -> Result<Selector> {
        Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
    }

    fn parse_optional(s: Option<&str>) -> Result<Option<Selector>> {
        s.map(Self::parse_selector).transpose()
    }
}

#[async_trait]
impl SourceAdapter for HtmlBoardAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self, client: &Client, limit: usize) -> Result<Vec<RawPosting>> {
        let html = http::fetch_text(client, &self.board.url)
            .await
            .map_err(|e| AppError::adapter(&self.name, e))?;
        self.parse_listing(&html, limit)
            .map_err(|e| AppError::adapter(&self.name, e))
    }
}
