//! HTTP feed fetcher.
//!
//! Fetches RSS/Atom documents with `reqwest`, parses them with `feed-rs`
//! and maps entries to [`Article`]s. Feed URLs are user supplied, so
//! requests to loopback, private and link-local hosts are refused.

use std::net::IpAddr;
use std::time::Duration;

use async_trait::async_trait;
use feed_rs::parser;
use reqwest::Client;
use tracing::debug;

use crate::config::FetchConfig;
use crate::error::{MonitorError, Result};
use crate::rss::types::{sort_newest_first, Article};
use crate::rss::FeedFetcher;

/// Feed fetcher backed by a shared HTTP client.
#[derive(Debug, Clone)]
pub struct RssFetcher {
    client: Client,
    max_feed_size: u64,
    max_description_length: usize,
    allow_private_hosts: bool,
}

impl RssFetcher {
    /// Create a fetcher from the `[fetch]` configuration.
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .read_timeout(Duration::from_secs(config.read_timeout_secs))
            .timeout(Duration::from_secs(config.total_timeout_secs))
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| MonitorError::Init(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            max_feed_size: config.max_feed_size_bytes,
            max_description_length: config.max_description_length,
            allow_private_hosts: config.allow_private_hosts,
        })
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| MonitorError::Fetch(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MonitorError::Fetch(format!("HTTP error: {}", status)));
        }

        if let Some(length) = response.content_length() {
            self.check_size(length)?;
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| MonitorError::Fetch(format!("failed to read response: {}", e)))?;
        self.check_size(bytes.len() as u64)?;

        Ok(bytes.to_vec())
    }

    fn check_size(&self, size: u64) -> Result<()> {
        if size > self.max_feed_size {
            return Err(MonitorError::Fetch(format!(
                "feed too large: {} bytes (max {} bytes)",
                size, self.max_feed_size
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl FeedFetcher for RssFetcher {
    async fn fetch_articles(&self, url: &str) -> Result<Vec<Article>> {
        if !self.allow_private_hosts {
            validate_url(url)?;
        }

        let body = self.download(url).await?;
        let articles = parse_articles(&body, self.max_description_length)?;
        debug!(url, items = articles.len(), "Fetched feed");
        Ok(articles)
    }
}

/// Check that `url` is an http(s) URL pointing at a public host.
pub fn validate_url(url: &str) -> Result<()> {
    let parsed = url::Url::parse(url)
        .map_err(|e| MonitorError::Validation(format!("invalid URL: {}", e)))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(MonitorError::Validation(format!(
            "unsupported URL scheme: {}",
            parsed.scheme()
        )));
    }

    match parsed.host() {
        None => Err(MonitorError::Validation("URL has no host".to_string())),
        Some(url::Host::Domain(domain)) if is_forbidden_hostname(domain) => Err(
            MonitorError::Validation(format!("forbidden host: {}", domain)),
        ),
        Some(url::Host::Ipv4(v4)) if is_private_ip(IpAddr::V4(v4)) => Err(
            MonitorError::Validation(format!("private IP address not allowed: {}", v4)),
        ),
        Some(url::Host::Ipv6(v6)) if is_private_ip(IpAddr::V6(v6)) => Err(
            MonitorError::Validation(format!("private IP address not allowed: {}", v6)),
        ),
        Some(_) => Ok(()),
    }
}

const FORBIDDEN_SUFFIXES: [&str; 7] = [
    ".local",
    ".localhost",
    ".internal",
    ".intranet",
    ".corp",
    ".home",
    ".lan",
];

fn is_forbidden_hostname(host: &str) -> bool {
    let host = host.to_lowercase();
    host == "localhost" || FORBIDDEN_SUFFIXES.iter().any(|s| host.ends_with(s))
}

fn is_private_ip(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            let [a, b, c, _] = v4.octets();
            v4.is_loopback()
                || v4.is_private()
                || v4.is_link_local()
                || v4.is_broadcast()
                || v4.is_unspecified()
                // TEST-NET-1/2/3
                || (a, b, c) == (192, 0, 2)
                || (a, b, c) == (198, 51, 100)
                || (a, b, c) == (203, 0, 113)
        }
        IpAddr::V6(v6) => {
            let first = v6.segments()[0];
            v6.is_loopback()
                || v6.is_unspecified()
                || (first & 0xfe00) == 0xfc00
                || (first & 0xffc0) == 0xfe80
        }
    }
}

/// Parse a feed document into articles, newest first.
pub fn parse_articles(bytes: &[u8], max_description_length: usize) -> Result<Vec<Article>> {
    let feed = parser::parse(bytes)
        .map_err(|e| MonitorError::Fetch(format!("failed to parse feed: {}", e)))?;

    let mut articles: Vec<Article> = feed
        .entries
        .into_iter()
        .map(|entry| {
            let description = entry
                .summary
                .map(|t| t.content)
                .or_else(|| entry.content.and_then(|c| c.body))
                .map(|d| truncate(&strip_html(&d), max_description_length))
                .filter(|d| !d.is_empty());

            Article {
                link: entry.links.first().map(|l| l.href.clone()),
                title: entry
                    .title
                    .map(|t| t.content)
                    .unwrap_or_else(|| "Untitled".to_string()),
                description,
                author: entry.authors.first().map(|a| a.name.clone()),
                published_at: entry.published.or(entry.updated),
            }
        })
        .collect();

    sort_newest_first(&mut articles);
    Ok(articles)
}

/// Remove tags and decode the common entities, collapsing whitespace.
fn strip_html(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut chars = html.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '<' => {
                for c in chars.by_ref() {
                    if c == '>' {
                        break;
                    }
                }
                text.push(' ');
            }
            '&' => {
                let mut entity = String::new();
                while let Some(&c) = chars.peek() {
                    if c == ';' || entity.len() > 10 {
                        break;
                    }
                    entity.push(c);
                    chars.next();
                }
                if chars.peek() == Some(&';') {
                    chars.next();
                    match decode_entity(&entity) {
                        Some(decoded) => text.push(decoded),
                        None => {
                            text.push('&');
                            text.push_str(&entity);
                            text.push(';');
                        }
                    }
                } else {
                    text.push('&');
                    text.push_str(&entity);
                }
            }
            _ => text.push(ch),
        }
    }

    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn decode_entity(entity: &str) -> Option<char> {
    match entity {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some(' '),
        _ => {
            let code = if let Some(hex) = entity
                .strip_prefix("#x")
                .or_else(|| entity.strip_prefix("#X"))
            {
                u32::from_str_radix(hex, 16).ok()?
            } else {
                entity.strip_prefix('#')?.parse().ok()?
            };
            char::from_u32(code)
        }
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}…", text[..idx].trim_end()),
        None => text.to_string(),
    }
}
