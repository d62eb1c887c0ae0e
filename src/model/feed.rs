//! Feed subscriptions.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::canonical::NormalizedKey;

/// Default bound on a feed's local history.
pub const DEFAULT_FEED_HISTORY: usize = 100;

/// One subscription: a source URL relayed into one channel of a tenant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feed {
    /// Source URL of the RSS/Atom feed.
    pub url: String,
    /// Channel the items are published to.
    pub channel_id: String,
    /// Role mentioned alongside each published item.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_id: Option<String>,
    /// Skip the global-history check for this feed. Items already seen by
    /// other feeds are still published here.
    #[serde(default)]
    pub exclusive_feed: bool,
    /// Never record this feed's items into global history.
    #[serde(default)]
    pub exclude_from_global_history: bool,
    /// Keys already published by this feed, oldest first.
    #[serde(default)]
    history: VecDeque<NormalizedKey>,
}

impl Feed {
    /// Create a new feed with empty history.
    pub fn new(url: impl Into<String>, channel_id: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            channel_id: channel_id.into(),
            role_id: None,
            exclusive_feed: false,
            exclude_from_global_history: false,
            history: VecDeque::new(),
        }
    }

    /// Mention a role when publishing.
    pub fn with_role(mut self, role_id: impl Into<String>) -> Self {
        self.role_id = Some(role_id.into());
        self
    }

    /// Mark the feed as exclusive.
    pub fn exclusive(mut self) -> Self {
        self.exclusive_feed = true;
        self
    }

    /// Keep this feed's items out of global history.
    pub fn excluded_from_global_history(mut self) -> Self {
        self.exclude_from_global_history = true;
        self
    }

    /// Check whether `key` was already published by this feed.
    pub fn is_link_in_history(&self, key: &NormalizedKey) -> bool {
        self.history.contains(key)
    }

    /// Record `key` as published, dropping the oldest entries beyond `limit`.
    pub fn push_history(&mut self, key: NormalizedKey, limit: usize) {
        if !self.is_link_in_history(&key) {
            self.history.push_back(key);
        }
        while self.history.len() > limit {
            self.history.pop_front();
        }
    }

    /// Keys in this feed's history, oldest first.
    pub fn history(&self) -> impl Iterator<Item = &NormalizedKey> {
        self.history.iter()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canonical::{Canonicalizer, UrlCanonicalizer};

    fn key(s: &str) -> NormalizedKey {
        UrlCanonicalizer.canonicalize(s)
    }

    #[test]
    fn test_feed_new() {
        let feed = Feed::new("https://example.com/rss", "100");
        assert_eq!(feed.url, "https://example.com/rss");
        assert_eq!(feed.channel_id, "100");
        assert!(feed.role_id.is_none());
        assert!(!feed.exclusive_feed);
        assert!(!feed.exclude_from_global_history);
        assert_eq!(feed.history_len(), 0);
    }

    #[test]
    fn test_builder() {
        let feed = Feed::new("u", "c")
            .with_role("42")
            .exclusive()
            .excluded_from_global_history();
        assert_eq!(feed.role_id.as_deref(), Some("42"));
        assert!(feed.exclusive_feed);
        assert!(feed.exclude_from_global_history);
    }

    #[test]
    fn test_push_history() {
        let mut feed = Feed::new("u", "c");
        feed.push_history(key("https://example.com/1"), 10);
        assert!(feed.is_link_in_history(&key("https://example.com/1")));
        assert!(feed.is_link_in_history(&key("http://www.example.com/1/")));
        assert!(!feed.is_link_in_history(&key("https://example.com/2")));
    }

    #[test]
    fn test_push_history_no_duplicates() {
        let mut feed = Feed::new("u", "c");
        feed.push_history(key("https://example.com/1"), 10);
        feed.push_history(key("https://example.com/1"), 10);
        assert_eq!(feed.history_len(), 1);
    }

    #[test]
    fn test_push_history_bounded() {
        let mut feed = Feed::new("u", "c");
        for i in 0..5 {
            feed.push_history(key(&format!("https://example.com/{i}")), 3);
        }
        let keys: Vec<&str> = feed.history().map(|k| k.as_str()).collect();
        assert_eq!(
            keys,
            vec!["example.com/2", "example.com/3", "example.com/4"]
        );
    }

    #[test]
    fn test_deserialize_defaults() {
        let json = r#"{"url": "https://example.com/rss", "channel_id": "7"}"#;
        let feed: Feed = serde_json::from_str(json).unwrap();
        assert_eq!(feed, Feed::new("https://example.com/rss", "7"));
    }

    #[test]
    fn test_history_survives_serde() {
        let mut feed = Feed::new("u", "c").with_role("1");
        feed.push_history(key("https://example.com/a"), 10);
        let json = serde_json::to_string(&feed).unwrap();
        assert!(json.contains("example.com/a"));
        let back: Feed = serde_json::from_str(&json).unwrap();
        assert_eq!(back, feed);
    }
}
