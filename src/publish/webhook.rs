//! Webhook publisher.
//!
//! Posts a Discord-style embed to the webhook configured for the target
//! channel.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::debug;

use crate::config::PublisherConfig;
use crate::model::TenantInfo;
use crate::publish::Publisher;
use crate::rss::Article;
use crate::{MonitorError, Result};

/// Embed titles longer than this are rejected by the platform.
const MAX_EMBED_TITLE: usize = 256;

/// Publishes articles through channel webhooks.
#[derive(Debug, Clone)]
pub struct WebhookPublisher {
    client: Client,
    timeout: Duration,
    username: Option<String>,
}

impl WebhookPublisher {
    pub fn new(config: &PublisherConfig) -> Result<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| MonitorError::Init(format!("failed to create HTTP client: {}", e)))?;
        Ok(Self {
            client,
            timeout: Duration::from_secs(config.timeout_secs),
            username: config.username.clone().filter(|u| !u.is_empty()),
        })
    }
}

#[async_trait]
impl Publisher for WebhookPublisher {
    async fn publish(
        &self,
        tenant: &TenantInfo,
        channel_id: &str,
        article: &Article,
        role_id: Option<&str>,
    ) -> Result<()> {
        let webhook = tenant
            .channel(channel_id)
            .and_then(|c| c.webhook_url.as_deref())
            .ok_or_else(|| {
                MonitorError::Publish(format!(
                    "no webhook configured for channel {} in {}",
                    channel_id, tenant.name
                ))
            })?;

        let payload = WebhookPayload::from_article(article, role_id, self.username.as_deref());
        let response = self
            .client
            .post(webhook)
            .timeout(self.timeout)
            .json(&payload)
            .send()
            .await
            .map_err(|e| MonitorError::Publish(format!("webhook request failed: {}", e)))?;

        response
            .error_for_status_ref()
            .map_err(|e| MonitorError::Publish(format!("webhook HTTP error: {}", e)))?;

        debug!(tenant = %tenant.name, channel = channel_id, link = ?article.link(), "Published article");
        Ok(())
    }
}

#[derive(Debug, Serialize, PartialEq)]
struct EmbedAuthor {
    name: String,
}

#[derive(Debug, Serialize, PartialEq)]
struct Embed {
    title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    author: Option<EmbedAuthor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    timestamp: Option<String>,
}

#[derive(Debug, Serialize, PartialEq)]
struct AllowedMentions {
    roles: Vec<String>,
}

#[derive(Debug, Serialize, PartialEq)]
struct WebhookPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    username: Option<String>,
    embeds: Vec<Embed>,
    allowed_mentions: AllowedMentions,
}

impl WebhookPayload {
    fn from_article(article: &Article, role_id: Option<&str>, username: Option<&str>) -> Self {
        let title: String = article.title.chars().take(MAX_EMBED_TITLE).collect();

        Self {
            // the link goes in content too so the platform unfurls it
            content: Some(match role_id {
                Some(role) => format!("<@&{}> {}", role, article.link().unwrap_or_default()),
                None => article.link().unwrap_or_default().to_string(),
            })
            .filter(|c| !c.trim().is_empty()),
            username: username.map(str::to_string),
            embeds: vec![Embed {
                title,
                url: article.link().map(str::to_string),
                description: article.description.clone(),
                author: article.author.clone().map(|name| EmbedAuthor { name }),
                timestamp: article.published_at.map(|t| t.to_rfc3339()),
            }],
            allowed_mentions: AllowedMentions {
                roles: role_id.map(|r| vec![r.to_string()]).unwrap_or_default(),
            },
        }
    }
}
