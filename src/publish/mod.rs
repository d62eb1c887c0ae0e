//! Delivery of new items to tenant channels.

pub mod webhook;

use async_trait::async_trait;

use crate::model::TenantInfo;
use crate::rss::Article;
use crate::Result;

pub use webhook::WebhookPublisher;

/// Delivers one item into a channel.
///
/// Called at most once per item: the monitor never retries a failed
/// delivery.
#[async_trait]
pub trait Publisher: Send + Sync {
    async fn publish(
        &self,
        tenant: &TenantInfo,
        channel_id: &str,
        article: &Article,
        role_id: Option<&str>,
    ) -> Result<()>;
}
