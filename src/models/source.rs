//! Source definitions: which career pages to poll and how to read them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One employer whose career page is polled.
///
/// Exactly one of `html` or `workday` describes how postings are read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Employer name, used as the posting's `source`
    pub name: String,

    /// Disabled sources stay in the config but are never fetched
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Server-rendered listing page scraped with CSS selectors
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html: Option<HtmlBoard>,

    /// Workday `cxs` job search API
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workday: Option<WorkdayBoard>,
}

fn default_enabled() -> bool {
    true
}

/// CSS selectors for scraping a job listing page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HtmlBoard {
    /// Listing page URL
    pub url: String,

    /// Selector for each posting card/row
    pub row_selector: String,

    /// Selector for the title element within a row (defaults to the row itself)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_selector: Option<String>,

    /// Selector for the location element within a row
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_selector: Option<String>,

    /// Selector for the link element (defaults to the title, then the row)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_selector: Option<String>,

    /// HTML attribute holding the posting link
    #[serde(default = "default_attr_name")]
    pub attr_name: String,

    /// Only keep rows whose link contains this text (case-insensitive)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_contains: Option<String>,

    /// Skip rows whose title is shorter than this many characters
    #[serde(default)]
    pub min_title_len: usize,

    /// Location reported when the row has none
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_location: Option<String>,
}

fn default_attr_name() -> String {
    "href".to_string()
}

impl HtmlBoard {
    /// All selector strings this board uses, for validation.
    pub fn selectors(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.row_selector.as_str()).chain(
            [
                &self.title_selector,
                &self.location_selector,
                &self.link_selector,
            ]
            .into_iter()
            .filter_map(|s| s.as_deref()),
        )
    }
}

/// Workday job search endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkdayBoard {
    /// `.../wday/cxs/{tenant}/{site}/jobs` endpoint
    pub api_url: String,

    /// Prefix joined with each posting's `externalPath`
    pub posting_base: String,

    /// Free-text search
    #[serde(default = "default_search_text")]
    pub search_text: String,

    /// Facet filters, e.g. `locationCountry = ["..."]`
    #[serde(default)]
    pub applied_facets: BTreeMap<String, Vec<String>>,
}

fn default_search_text() -> String {
    "intern".to_string()
}

/// The employers polled out of the box.
pub fn default_sources() -> Vec<SourceConfig> {
    vec![
        SourceConfig {
            name: "Nvidia".to_string(),
            enabled: true,
            html: None,
            workday: Some(WorkdayBoard {
                api_url: "https://nvidia.wd5.myworkdayjobs.com/wday/cxs/nvidia/NVIDIAExternalCareerSite/jobs"
                    .to_string(),
                posting_base: "https://nvidia.wd5.myworkdayjobs.com/en-US/NVIDIAExternalCareerSite"
                    .to_string(),
                search_text: default_search_text(),
                applied_facets: BTreeMap::from([(
                    "locationCountry".to_string(),
                    vec!["bc33aa3152ec42d4995f4791a106ed09".to_string()],
                )]),
            }),
        },
        html_source(
            "AMD",
            HtmlBoard {
                url: "https://careers.amd.com/careers-home/jobs?tags3=Intern%2FCo-op".to_string(),
                row_selector: "a.jobs-list-item".to_string(),
                title_selector: Some("h3".to_string()),
                location_selector: Some("span.location".to_string()),
                ..blank_board()
            },
        ),
        html_source(
            "Google",
            HtmlBoard {
                url: "https://www.google.com/about/careers/applications/jobs/results/?q=intern"
                    .to_string(),
                row_selector: "div.gc-card".to_string(),
                title_selector: Some("h2".to_string()),
                location_selector: Some("span.gc-job-tags__location".to_string()),
                link_selector: Some("a".to_string()),
                ..blank_board()
            },
        ),
        html_source(
            "RBC",
            HtmlBoard {
                url: "https://jobs.rbc.com/ca/en/search-results?keywords=intern".to_string(),
                row_selector: "li.jobs-list-item".to_string(),
                title_selector: Some("a.job-title".to_string()),
                location_selector: Some("span.job-location".to_string()),
                ..blank_board()
            },
        ),
        html_source(
            "TD Bank",
            HtmlBoard {
                url: "https://jobs.td.com/en-CA/search/?searchby=keyword&createNewAlert=false&q=intern"
                    .to_string(),
                row_selector: "tr.data-row".to_string(),
                title_selector: Some("a.jobTitle-link".to_string()),
                location_selector: Some("span.jobLocation".to_string()),
                ..blank_board()
            },
        ),
        html_source(
            "BMO",
            HtmlBoard {
                url: "https://jobs.bmo.com/ca/en/search-results?keywords=intern".to_string(),
                row_selector: "li.jobs-list-item".to_string(),
                title_selector: Some("a".to_string()),
                location_selector: Some("span.job-location".to_string()),
                ..blank_board()
            },
        ),
        html_source(
            "Scotiabank",
            HtmlBoard {
                url: "https://jobs.scotiabank.com/search/?q=intern".to_string(),
                row_selector: "tr.data-row".to_string(),
                title_selector: Some("a.jobTitle".to_string()),
                location_selector: Some("span.jobLocation".to_string()),
                ..blank_board()
            },
        ),
        html_source(
            "CIBC",
            HtmlBoard {
                url: "https://cibc.wd3.myworkdayjobs.com/campus".to_string(),
                row_selector: "a[href]".to_string(),
                link_contains: Some("job".to_string()),
                min_title_len: 6,
                fallback_location: Some("Various".to_string()),
                ..blank_board()
            },
        ),
    ]
}

fn html_source(name: &str, board: HtmlBoard) -> SourceConfig {
    SourceConfig {
        name: name.to_string(),
        enabled: true,
        html: Some(board),
        workday: None,
    }
}

fn blank_board() -> HtmlBoard {
    HtmlBoard {
        url: String::new(),
        row_selector: String::new(),
        title_selector: None,
        location_selector: None,
        link_selector: None,
        attr_name: default_attr_name(),
        link_contains: None,
        min_title_len: 0,
        fallback_location: None,
    }
}
