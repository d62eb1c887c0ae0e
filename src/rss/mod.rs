//! Feed fetching.
//!
//! The monitor depends only on [`FeedFetcher`]; [`RssFetcher`] is the
//! HTTP implementation used in production.

pub mod fetcher;
pub mod types;

use async_trait::async_trait;

use crate::Result;

pub use fetcher::{validate_url, RssFetcher};
pub use types::{sort_newest_first, Article, MAX_DESCRIPTION_LENGTH, MAX_FEED_SIZE};

/// Fetches the current items of a feed.
#[async_trait]
pub trait FeedFetcher: Send + Sync {
    /// Fetch the items at `url`, newest first.
    async fn fetch_articles(&self, url: &str) -> Result<Vec<Article>>;
}
