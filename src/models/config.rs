//! Application configuration structures.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveTime;
use scraper::Selector;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::source::{SourceConfig, default_sources};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP and collection behavior settings
    #[serde(default)]
    pub crawler: CrawlerConfig,

    /// Posting store location
    #[serde(default)]
    pub storage: StorageConfig,

    /// Daily trigger settings
    #[serde(default)]
    pub schedule: ScheduleConfig,

    /// Career pages to poll, in fetch order
    #[serde(default = "default_sources")]
    pub sources: Vec<SourceConfig>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration, or return defaults if the file does not exist.
    ///
    /// A file that exists but cannot be read or parsed is an error.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            log::warn!("Config not found at {:?}. Using defaults.", path);
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.crawler.user_agent.trim().is_empty() {
            return Err(AppError::validation("crawler.user_agent is empty"));
        }
        if self.crawler.timeout_secs == 0 {
            return Err(AppError::validation("crawler.timeout_secs must be > 0"));
        }
        if self.crawler.max_concurrent == 0 {
            return Err(AppError::validation("crawler.max_concurrent must be > 0"));
        }
        if self.crawler.max_postings_per_source == 0 {
            return Err(AppError::validation(
                "crawler.max_postings_per_source must be > 0",
            ));
        }
        if self.storage.database.as_os_str().is_empty() {
            return Err(AppError::validation("storage.database is empty"));
        }
        self.schedule.daily_time()?;

        if !self.sources.iter().any(|s| s.enabled) {
            return Err(AppError::validation("No enabled sources defined"));
        }

        let mut names = HashSet::new();
        for source in &self.sources {
            if source.name.trim().is_empty() {
                return Err(AppError::validation("Source with empty name"));
            }
            if !names.insert(source.name.as_str()) {
                return Err(AppError::validation(format!(
                    "Duplicate source '{}'",
                    source.name
                )));
            }
            match (&source.html, &source.workday) {
                (Some(board), None) => {
                    url::Url::parse(&board.url)?;
                    for selector in board.selectors() {
                        Selector::parse(selector)
                            .map_err(|e| AppError::selector(selector, format!("{e:?}")))?;
                    }
                }
                (None, Some(board)) => {
                    url::Url::parse(&board.api_url)?;
                    url::Url::parse(&board.posting_base)?;
                }
                _ => {
                    return Err(AppError::validation(format!(
                        "Source '{}' must define exactly one of [html] or [workday]",
                        source.name
                    )));
                }
            }
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            crawler: CrawlerConfig::default(),
            storage: StorageConfig::default(),
            schedule: ScheduleConfig::default(),
            sources: default_sources(),
        }
    }
}

/// HTTP client and collection behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlerConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Politeness delay between sources in milliseconds
    #[serde(default = "defaults::request_delay")]
    pub request_delay_ms: u64,

    /// Maximum sources fetched at once
    #[serde(default = "defaults::max_concurrent")]
    pub max_concurrent: usize,

    /// Upper bound on postings taken from one source per run
    #[serde(default = "defaults::max_postings_per_source")]
    pub max_postings_per_source: usize,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            request_delay_ms: defaults::request_delay(),
            max_concurrent: defaults::max_concurrent(),
            max_postings_per_source: defaults::max_postings_per_source(),
        }
    }
}

/// Posting store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// SQLite database file
    #[serde(default = "defaults::database")]
    pub database: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database: defaults::database(),
        }
    }
}

/// Daily trigger settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Local wall-clock time of the daily run, `HH:MM`
    #[serde(default = "defaults::daily_at")]
    pub daily_at: String,

    /// Run once immediately when the scheduler starts
    #[serde(default = "defaults::run_on_start")]
    pub run_on_start: bool,
}

impl ScheduleConfig {
    /// Parse `daily_at`.
    pub fn daily_time(&self) -> Result<NaiveTime> {
        NaiveTime::parse_from_str(self.daily_at.trim(), "%H:%M").map_err(|e| {
            AppError::validation(format!(
                "schedule.daily_at '{}' is not HH:MM: {e}",
                self.daily_at
            ))
        })
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            daily_at: defaults::daily_at(),
            run_on_start: defaults::run_on_start(),
        }
    }
}

/// Outbound mail settings, read from the environment.
#[derive(Debug, Clone)]
pub struct MailConfig {
    pub smtp_server: String,
    pub smtp_port: u16,
    pub sender_email: String,
    pub sender_password: String,
    pub recipient_email: String,
}

impl MailConfig {
    /// Read mail settings from process environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read mail settings through `lookup`, reporting every missing variable.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let mut missing = Vec::new();
        let mut required = |key: &'static str| {
            get(key).unwrap_or_else(|| {
                missing.push(key);
                String::new()
            })
        };
        let sender_email = required("SENDER_EMAIL");
        let sender_password = required("SENDER_PASSWORD");
        let recipient_email = required("RECIPIENT_EMAIL");

        if !missing.is_empty() {
            return Err(AppError::config(format!(
                "Missing required environment variables: {}",
                missing.join(", ")
            )));
        }

        let smtp_port = match get("SMTP_PORT") {
            Some(port) => port.trim().parse().map_err(|_| {
                AppError::config(format!("SMTP_PORT '{port}' is not a valid port"))
            })?,
            None => defaults::smtp_port(),
        };

        Ok(Self {
            smtp_server: get("SMTP_SERVER").unwrap_or_else(defaults::smtp_server),
            smtp_port,
            sender_email,
            sender_password,
            recipient_email,
        })
    }
}

mod defaults {
    use std::path::PathBuf;

    // Crawler defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36".into()
    }
    pub fn timeout() -> u64 {
        10
    }
    pub fn request_delay() -> u64 {
        2000
    }
    pub fn max_concurrent() -> usize {
        1
    }
    pub fn max_postings_per_source() -> usize {
        20
    }

    // Storage defaults
    pub fn database() -> PathBuf {
        PathBuf::from("internships.db")
    }

    // Schedule defaults
    pub fn daily_at() -> String {
        "08:00".into()
    }
    pub fn run_on_start() -> bool {
        true
    }

    // Mail defaults
    pub fn smtp_server() -> String {
        "smtp.gmail.com".into()
    }
    pub fn smtp_port() -> u16 {
        587
    }
}
