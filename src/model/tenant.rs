//! Tenants (guilds) and their persisted documents.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::model::{Feed, Permissions};
use crate::store::TenantStore;
use crate::Result;

/// A delivery channel on a tenant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Channel {
    pub id: String,
    pub name: String,
    /// Webhook used to deliver into this channel.
    pub webhook_url: Option<String>,
}

impl Channel {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            webhook_url: None,
        }
    }

    pub fn with_webhook(mut self, url: impl Into<String>) -> Self {
        self.webhook_url = Some(url.into());
        self
    }
}

/// Live view of a tenant as reported by the connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantInfo {
    pub id: String,
    pub name: String,
    /// Channels keyed by channel ID.
    pub channels: HashMap<String, Channel>,
    /// Capabilities granted to the bot on this tenant.
    pub permissions: Permissions,
}

impl TenantInfo {
    pub fn new(id: impl Into<String>, name: impl Into<String>, permissions: Permissions) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            channels: HashMap::new(),
            permissions,
        }
    }

    pub fn with_channel(mut self, channel: Channel) -> Self {
        self.channels.insert(channel.id.clone(), channel);
        self
    }

    pub fn has_channel(&self, channel_id: &str) -> bool {
        self.channels.contains_key(channel_id)
    }

    pub fn channel(&self, channel_id: &str) -> Option<&Channel> {
        self.channels.get(channel_id)
    }

    /// Check whether every capability in `required` is granted.
    pub fn has_permissions(&self, required: Permissions) -> bool {
        self.permissions.contains(required)
    }
}

/// Persisted per-tenant state: the feed subscriptions and their histories.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantDocument {
    pub tenant_id: String,
    #[serde(default)]
    pub feeds: Vec<Feed>,
}

impl TenantDocument {
    /// Create an empty document.
    pub fn new(tenant_id: impl Into<String>) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            feeds: Vec::new(),
        }
    }

    pub fn with_feed(mut self, feed: Feed) -> Self {
        self.feeds.push(feed);
        self
    }
}

/// A tenant with its document loaded.
#[derive(Debug, Clone)]
pub struct Tenant {
    info: TenantInfo,
    document: TenantDocument,
}

impl Tenant {
    pub fn new(info: TenantInfo, document: TenantDocument) -> Self {
        Self { info, document }
    }

    /// Load the tenant's document from `store`.
    pub async fn load(info: TenantInfo, store: &dyn TenantStore) -> Result<Self> {
        let document = store.load(&info).await?;
        Ok(Self { info, document })
    }

    /// Persist the tenant's document to `store`.
    pub async fn save(&self, store: &dyn TenantStore) -> Result<()> {
        store.save(&self.document).await
    }

    pub fn info(&self) -> &TenantInfo {
        &self.info
    }

    pub fn name(&self) -> &str {
        &self.info.name
    }

    pub fn document(&self) -> &TenantDocument {
        &self.document
    }

    pub fn feeds(&self) -> &[Feed] {
        &self.document.feeds
    }

    /// Split borrow: the live info alongside mutable feeds.
    pub fn parts_mut(&mut self) -> (&TenantInfo, &mut [Feed]) {
        (&self.info, &mut self.document.feeds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info() -> TenantInfo {
        TenantInfo::new("1", "Test Guild", Permissions::VIEW_CHANNEL)
            .with_channel(Channel::new("10", "news"))
    }

    #[test]
    fn test_has_channel() {
        let info = info();
        assert!(info.has_channel("10"));
        assert!(!info.has_channel("11"));
        assert_eq!(info.channel("10").unwrap().name, "news");
    }

    #[test]
    fn test_has_permissions() {
        let info = info();
        assert!(info.has_permissions(Permissions::VIEW_CHANNEL));
        assert!(!info.has_permissions(Permissions::VIEW_CHANNEL | Permissions::SEND_MESSAGES));
    }

    #[test]
    fn test_document_serde() {
        let doc = TenantDocument::new("1").with_feed(Feed::new("https://example.com/rss", "10"));
        let json = serde_json::to_string(&doc).unwrap();
        let back: TenantDocument = serde_json::from_str(&json).unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn test_document_without_feeds() {
        let doc: TenantDocument = serde_json::from_str(r#"{"tenant_id": "9"}"#).unwrap();
        assert_eq!(doc.tenant_id, "9");
        assert!(doc.feeds.is_empty());
    }

    #[test]
    fn test_parts_mut() {
        let doc = TenantDocument::new("1").with_feed(Feed::new("u", "10"));
        let mut tenant = Tenant::new(info(), doc);
        let (info, feeds) = tenant.parts_mut();
        assert_eq!(info.name, "Test Guild");
        feeds[0].exclusive_feed = true;
        assert!(tenant.feeds()[0].exclusive_feed);
    }
}
