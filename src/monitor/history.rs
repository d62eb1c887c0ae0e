//! Bounded global history of published links.
//!
//! Shared by every feed of every tenant. Membership is a hash lookup; a
//! queue beside the set remembers insertion order so the oldest keys are
//! evicted first once the capacity is exceeded.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use crate::canonical::{Canonicalizer, NormalizedKey, UrlCanonicalizer};

/// Default number of keys kept.
pub const DEFAULT_HISTORY_CAPACITY: usize = 100_000;

/// Insertion-ordered, capacity-bounded set of [`NormalizedKey`]s.
///
/// Owned by the monitor and only mutated from its loop, so it carries no
/// lock.
pub struct GlobalHistory {
    keys: HashSet<NormalizedKey>,
    order: VecDeque<NormalizedKey>,
    capacity: usize,
    canonicalizer: Arc<dyn Canonicalizer>,
}

impl GlobalHistory {
    /// Create an empty history using `canonicalizer` for raw links.
    pub fn new(capacity: usize, canonicalizer: Arc<dyn Canonicalizer>) -> Self {
        Self {
            keys: HashSet::new(),
            order: VecDeque::new(),
            capacity,
            canonicalizer,
        }
    }

    /// Create an empty history with the default URL canonicalizer.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::new(capacity, Arc::new(UrlCanonicalizer))
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Check whether `key` is present.
    pub fn contains(&self, key: &NormalizedKey) -> bool {
        self.keys.contains(key)
    }

    /// Canonicalize `link` and check whether it is present.
    pub fn contains_link(&self, link: &str) -> bool {
        self.contains(&self.canonicalizer.canonicalize(link))
    }

    /// Canonicalize and append `links`, then evict down to capacity.
    ///
    /// Links already present (or repeated within `links`) are not appended
    /// again and keep their original position. Returns the number of keys
    /// added.
    pub fn record<I, S>(&mut self, links: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let canonicalizer = Arc::clone(&self.canonicalizer);
        self.record_keys(
            links
                .into_iter()
                .map(|link| canonicalizer.canonicalize(link.as_ref())),
        )
    }

    /// Append already canonical keys, then evict down to capacity.
    pub fn record_keys<I>(&mut self, keys: I) -> usize
    where
        I: IntoIterator<Item = NormalizedKey>,
    {
        let mut added = 0;
        for key in keys {
            if self.keys.insert(key.clone()) {
                self.order.push_back(key);
                added += 1;
            }
        }
        self.trim();
        added
    }

    /// Keys from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &NormalizedKey> {
        self.order.iter()
    }

    fn trim(&mut self) {
        while self.order.len() > self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.keys.remove(&oldest);
            }
        }
    }
}

impl Default for GlobalHistory {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }
}

impl std::fmt::Debug for GlobalHistory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlobalHistory")
            .field("len", &self.len())
            .field("capacity", &self.capacity)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contents(history: &GlobalHistory) -> Vec<&str> {
        history.iter().map(|k| k.as_str()).collect()
    }

    #[test]
    fn test_record_then_contains() {
        let mut history = GlobalHistory::with_capacity(10);
        assert!(!history.contains_link("https://example.com/a"));

        history.record(["https://example.com/a"]);
        assert!(history.contains_link("https://example.com/a"));
        assert!(history.contains_link("http://www.example.com/a/"));
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_fifo_eviction() {
        let mut history = GlobalHistory::with_capacity(3);
        for link in ["a", "b", "c", "d", "e"] {
            history.record([format!("https://example.com/{link}")]);
        }

        assert_eq!(history.len(), 3);
        assert!(!history.contains_link("https://example.com/a"));
        assert!(!history.contains_link("https://example.com/b"));
        assert!(history.contains_link("https://example.com/c"));
        assert!(history.contains_link("https://example.com/e"));
        assert_eq!(
            contents(&history),
            vec!["example.com/c", "example.com/d", "example.com/e"]
        );
    }

    #[test]
    fn test_batch_larger_than_capacity() {
        let mut history = GlobalHistory::with_capacity(3);
        let added = history.record(["a", "b", "c", "d", "e"].map(|s| format!("https://x.org/{s}")));

        assert_eq!(added, 5);
        assert_eq!(contents(&history), vec!["x.org/c", "x.org/d", "x.org/e"]);
    }

    #[test]
    fn test_idempotent_within_batch() {
        let mut history = GlobalHistory::with_capacity(10);
        let added = history.record(["https://example.com/k", "https://example.com/k"]);
        assert_eq!(added, 1);
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_idempotent_across_calls() {
        let mut history = GlobalHistory::with_capacity(10);
        history.record(["https://example.com/k"]);
        let added = history.record(["http://example.com/k/"]);
        assert_eq!(added, 0);
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_duplicate_keeps_original_position() {
        let mut history = GlobalHistory::with_capacity(3);
        history.record(["https://e.com/a", "https://e.com/b", "https://e.com/c"]);
        // re-recording "a" must not refresh it
        history.record(["https://e.com/a", "https://e.com/d"]);

        assert_eq!(contents(&history), vec!["e.com/b", "e.com/c", "e.com/d"]);
        assert!(!history.contains_link("https://e.com/a"));
    }

    #[test]
    fn test_zero_capacity_keeps_nothing() {
        let mut history = GlobalHistory::with_capacity(0);
        history.record(["https://example.com/a"]);
        assert!(history.is_empty());
        assert!(!history.contains_link("https://example.com/a"));
    }

    #[test]
    fn test_default_capacity() {
        let history = GlobalHistory::default();
        assert_eq!(history.capacity(), 100_000);
        assert!(history.is_empty());
    }

    #[test]
    fn test_custom_canonicalizer() {
        struct Lowercase;
        impl Canonicalizer for Lowercase {
            fn canonicalize(&self, raw: &str) -> NormalizedKey {
                UrlCanonicalizer.canonicalize(&raw.to_lowercase())
            }
        }

        let mut history = GlobalHistory::new(10, Arc::new(Lowercase));
        history.record(["https://example.com/Post"]);
        assert!(history.contains_link("https://example.com/post"));
    }
}
