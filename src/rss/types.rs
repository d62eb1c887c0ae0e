//! Feed item types.

use chrono::{DateTime, Utc};

/// Maximum length for an item description.
pub const MAX_DESCRIPTION_LENGTH: usize = 2000;

/// Maximum feed size in bytes (5MB).
pub const MAX_FEED_SIZE: u64 = 5 * 1024 * 1024;

/// One item of a fetched feed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Article {
    /// Link to the original article. Items without one are never published.
    pub link: Option<String>,
    /// Item title.
    pub title: String,
    /// Summary or content with HTML stripped.
    pub description: Option<String>,
    /// Author name.
    pub author: Option<String>,
    /// When the item was published.
    pub published_at: Option<DateTime<Utc>>,
}

impl Article {
    /// Create an article with a link and title.
    pub fn new(link: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            link: Some(link.into()),
            title: title.into(),
            ..Self::default()
        }
    }

    /// Create an article without a link.
    pub fn without_link(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the author.
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    /// Set the publication time.
    pub fn with_published_at(mut self, published_at: DateTime<Utc>) -> Self {
        self.published_at = Some(published_at);
        self
    }

    /// The link, if present and non-blank.
    pub fn link(&self) -> Option<&str> {
        self.link.as_deref().filter(|l| !l.trim().is_empty())
    }
}

/// Order items newest first.
///
/// Only applied when every item carries a date; otherwise document order
/// is kept, which for RSS and Atom is conventionally newest first.
pub fn sort_newest_first(items: &mut [Article]) {
    if items.iter().all(|item| item.published_at.is_some()) {
        items.sort_by(|a, b| b.published_at.cmp(&a.published_at));
    }
}
