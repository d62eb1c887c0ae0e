//! Per-feed inclusion decisions and publication.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, error, info};

use crate::canonical::Canonicalizer;
use crate::model::{Feed, Tenant, TenantInfo};
use crate::monitor::history::GlobalHistory;
use crate::publish::Publisher;
use crate::rss::FeedFetcher;
use crate::{MonitorError, Result};

/// Result of processing one feed for one cycle.
#[derive(Debug)]
pub enum FeedOutcome {
    /// The target channel no longer exists; nothing was fetched.
    ChannelMissing,
    /// The feed was fetched and `published` items went out.
    Processed { published: usize },
    /// Fetching or publishing failed. Items recorded before the failure
    /// (`recorded`, including the one that failed to publish) stay marked
    /// as seen.
    Failed {
        published: usize,
        recorded: usize,
        error: MonitorError,
    },
}

impl FeedOutcome {
    /// Whether this feed counts as having produced new content.
    ///
    /// A failed feed never does, even if some items went out first.
    pub fn has_new_items(&self) -> bool {
        matches!(self, FeedOutcome::Processed { published } if *published > 0)
    }

    /// Whether the feed's local history gained keys, so the tenant
    /// document must be saved.
    pub fn history_changed(&self) -> bool {
        match self {
            FeedOutcome::ChannelMissing => false,
            FeedOutcome::Processed { published } => *published > 0,
            FeedOutcome::Failed { recorded, .. } => *recorded > 0,
        }
    }

    pub fn published(&self) -> usize {
        match self {
            FeedOutcome::ChannelMissing => 0,
            FeedOutcome::Processed { published } | FeedOutcome::Failed { published, .. } => {
                *published
            }
        }
    }
}

/// Aggregate over all feeds of a tenant.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TenantOutcome {
    /// At least one feed produced new content.
    pub has_new_items: bool,
    /// At least one feed's local history changed, failed feeds included.
    pub history_changed: bool,
    pub published: usize,
    pub failed_feeds: usize,
}

/// Decides which fetched items are new and publishes them.
pub struct FeedProcessor {
    fetcher: Arc<dyn FeedFetcher>,
    publisher: Arc<dyn Publisher>,
    canonicalizer: Arc<dyn Canonicalizer>,
    max_feed_history: usize,
    excluded_channels: HashSet<String>,
}

impl FeedProcessor {
    pub fn new(
        fetcher: Arc<dyn FeedFetcher>,
        publisher: Arc<dyn Publisher>,
        canonicalizer: Arc<dyn Canonicalizer>,
        max_feed_history: usize,
    ) -> Self {
        Self {
            fetcher,
            publisher,
            canonicalizer,
            max_feed_history,
            excluded_channels: HashSet::new(),
        }
    }

    /// Feeds targeting a channel with one of these names never record into
    /// global history.
    pub fn with_excluded_channels<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded_channels = names.into_iter().map(Into::into).collect();
        self
    }

    /// Process every feed of `tenant` in order.
    ///
    /// A failing feed is logged and does not affect its siblings.
    pub async fn process_tenant_feeds(
        &self,
        history: &mut GlobalHistory,
        tenant: &mut Tenant,
    ) -> TenantOutcome {
        let mut outcome = TenantOutcome::default();
        let (info, feeds) = tenant.parts_mut();

        for feed in feeds.iter_mut() {
            let result = self.process_feed(history, info, feed).await;
            outcome.published += result.published();
            outcome.has_new_items |= result.has_new_items();
            outcome.history_changed |= result.history_changed();
            if let FeedOutcome::Failed { error, .. } = &result {
                outcome.failed_feeds += 1;
                error!(
                    tenant = %info.name,
                    feed = %feed.url,
                    error = %error,
                    "Error processing feed"
                );
            }
        }

        outcome
    }

    /// Fetch one feed and publish the items not seen before.
    pub async fn process_feed(
        &self,
        history: &mut GlobalHistory,
        tenant: &TenantInfo,
        feed: &mut Feed,
    ) -> FeedOutcome {
        if !tenant.has_channel(&feed.channel_id) {
            debug!(tenant = %tenant.name, feed = %feed.url, channel = %feed.channel_id, "Target channel missing, skipping feed");
            return FeedOutcome::ChannelMissing;
        }

        let mut published = 0;
        let mut recorded = 0;
        match self
            .fetch_and_publish(history, tenant, feed, &mut published, &mut recorded)
            .await
        {
            Ok(()) => {
                if published > 0 {
                    info!(tenant = %tenant.name, feed = %feed.url, published, "Published new items");
                }
                FeedOutcome::Processed { published }
            }
            Err(error) => FeedOutcome::Failed {
                published,
                recorded,
                error,
            },
        }
    }

    async fn fetch_and_publish(
        &self,
        history: &mut GlobalHistory,
        tenant: &TenantInfo,
        feed: &mut Feed,
        published: &mut usize,
        recorded: &mut usize,
    ) -> Result<()> {
        let articles = self.fetcher.fetch_articles(&feed.url).await?;
        if articles.is_empty() {
            return Ok(());
        }

        // Keys of the current window are never evicted during the pass.
        let history_limit = self.max_feed_history.max(articles.len());

        let record_globally = !self.excluded_from_global_history(tenant, feed);

        // Fetch results are newest first; publish oldest first.
        for article in articles.iter().rev() {
            let Some(link) = article.link() else {
                continue;
            };
            let key = self.canonicalizer.canonicalize(link);

            if feed.is_link_in_history(&key) {
                continue;
            }
            if !feed.exclusive_feed && history.contains(&key) {
                debug!(feed = %feed.url, link, "Already published by another feed");
                continue;
            }

            feed.push_history(key.clone(), history_limit);
            *recorded += 1;
            if record_globally {
                history.record_keys([key]);
            }

            self.publisher
                .publish(tenant, &feed.channel_id, article, feed.role_id.as_deref())
                .await?;
            *published += 1;
        }

        Ok(())
    }

    fn excluded_from_global_history(&self, tenant: &TenantInfo, feed: &Feed) -> bool {
        feed.exclude_from_global_history
            || tenant
                .channel(&feed.channel_id)
                .is_some_and(|c| self.excluded_channels.contains(&c.name))
    }
}
