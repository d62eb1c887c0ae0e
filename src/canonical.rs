//! Link canonicalization.
//!
//! Every dedup decision is made on a [`NormalizedKey`], never on the raw
//! link, so that `https://www.example.com/a/` and `http://example.com/a`
//! count as the same item.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Canonical form of an item link.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NormalizedKey(String);

impl NormalizedKey {
    /// Borrow the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the key, returning the inner string.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for NormalizedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NormalizedKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Maps a raw link to its cache key.
pub trait Canonicalizer: Send + Sync {
    /// Produce the canonical key for `raw`.
    fn canonicalize(&self, raw: &str) -> NormalizedKey;
}

/// Default URL canonicalizer.
///
/// Drops the scheme, a leading `www.`, the fragment, default ports and a
/// trailing slash. The host is lowercased; path and query keep their case.
#[derive(Debug, Clone, Copy, Default)]
pub struct UrlCanonicalizer;

impl UrlCanonicalizer {
    /// Create a new canonicalizer.
    pub fn new() -> Self {
        Self
    }
}

impl Canonicalizer for UrlCanonicalizer {
    fn canonicalize(&self, raw: &str) -> NormalizedKey {
        let trimmed = raw.trim();
        match url::Url::parse(trimmed) {
            Ok(parsed) if parsed.has_host() => NormalizedKey(from_url(&parsed)),
            _ => NormalizedKey(fallback(trimmed)),
        }
    }
}

fn from_url(parsed: &url::Url) -> String {
    let host = parsed.host_str().unwrap_or_default().to_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host);

    let mut key = String::with_capacity(parsed.as_str().len());
    key.push_str(host);
    // port() is None for the scheme's default port
    if let Some(port) = parsed.port() {
        key.push(':');
        key.push_str(&port.to_string());
    }
    key.push_str(parsed.path().trim_end_matches('/'));
    if let Some(query) = parsed.query() {
        if !query.is_empty() {
            key.push('?');
            key.push_str(query);
        }
    }
    key
}

/// Used for links `url` cannot parse, and for keys that were already
/// canonicalized (no scheme).
fn fallback(raw: &str) -> String {
    let rest = raw.split('#').next().unwrap_or_default();
    let rest = strip_prefix_ignore_case(rest, "https://")
        .or_else(|| strip_prefix_ignore_case(rest, "http://"))
        .unwrap_or(rest);
    let rest = strip_prefix_ignore_case(rest, "www.").unwrap_or(rest);

    let host_len = rest.find(['/', '?']).unwrap_or(rest.len());
    let (host, tail) = rest.split_at(host_len);
    let (path, query) = match tail.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (tail, None),
    };

    let mut key = host.to_lowercase();
    key.push_str(path.trim_end_matches('/'));
    if let Some(query) = query.filter(|q| !q.is_empty()) {
        key.push('?');
        key.push_str(query);
    }
    key
}

fn strip_prefix_ignore_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    s.get(..prefix.len())
        .filter(|head| head.eq_ignore_ascii_case(prefix))
        .map(|_| &s[prefix.len()..])
}
