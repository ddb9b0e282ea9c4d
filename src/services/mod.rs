//! Service layer: collection adapters for each career page.
//!
//! - `SourceAdapter`: capability every source implements
//! - `HtmlBoardAdapter`: server-rendered listing pages scraped with CSS selectors
//! - `WorkdayAdapter`: Workday job search JSON API
//! - `SourceRegistry`: source name to adapter table, in fetch order

mod html;
mod registry;
mod workday;

use async_trait::async_trait;
use reqwest::Client;

use crate::error::Result;
use crate::models::RawPosting;

pub use html::HtmlBoardAdapter;
pub use registry::SourceRegistry;
pub use workday::WorkdayAdapter;

/// A producer of raw postings for one source.
///
/// Adapters are stateless and restartable. They return at most `limit`
/// postings per call and skip individual items they cannot parse; a failed
/// request or an unreadable page fails the whole call.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Source name stamped on every posting.
    fn name(&self) -> &str;

    /// Fetch up to `limit` postings.
    async fn fetch(&self, client: &Client, limit: usize) -> Result<Vec<RawPosting>>;
}
