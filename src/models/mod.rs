// src/models/mod.rs

//! Domain models for the digest application.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod posting;
mod source;

// Re-export all public types
pub use config::{Config, CrawlerConfig, MailConfig, ScheduleConfig, StorageConfig};
pub use posting::{
    Ingestion, PostingRecord, RawPosting, StoredPosting, UNKNOWN_TITLE, UNSPECIFIED_LOCATION,
};
pub use source::{HtmlBoard, SourceConfig, WorkdayBoard, default_sources};
