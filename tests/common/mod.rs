//! Test doubles for driving the feed monitor end to end.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use feedmon::config::MonitorConfig;
use feedmon::{
    Article, Channel, Connection, ConnectionStatus, FeedFetcher, FeedMonitor, MemoryTenantStore,
    MonitorError, Permissions, Publisher, Result, TenantInfo,
};

/// Permissions satisfying the default requirement.
pub fn full_permissions() -> Permissions {
    Permissions::VIEW_CHANNEL | Permissions::SEND_MESSAGES | Permissions::EMBED_LINKS
}

/// A tenant with the given channels (id, name) and full permissions.
pub fn tenant(id: &str, name: &str, channels: &[(&str, &str)]) -> TenantInfo {
    channels.iter().fold(
        TenantInfo::new(id, name, full_permissions()),
        |info, (cid, cname)| info.with_channel(Channel::new(*cid, *cname)),
    )
}

/// Monitor config with the given pacing and a one second idle pause.
pub fn monitor_config(pacing_secs: u64) -> MonitorConfig {
    MonitorConfig {
        pacing_interval_secs: pacing_secs,
        idle_interval_secs: 1,
        ..MonitorConfig::default()
    }
}

/// Connection that stays alive for a fixed number of status checks.
pub struct FakeConnection {
    tenants: Vec<TenantInfo>,
    alive_checks: AtomicUsize,
    checks: AtomicUsize,
}

impl FakeConnection {
    pub fn new(tenants: Vec<TenantInfo>) -> Self {
        Self::alive_for(tenants, usize::MAX)
    }

    pub fn alive_for(tenants: Vec<TenantInfo>, checks: usize) -> Self {
        Self {
            tenants,
            alive_checks: AtomicUsize::new(checks),
            checks: AtomicUsize::new(0),
        }
    }

    pub fn status_checks(&self) -> usize {
        self.checks.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Connection for FakeConnection {
    async fn login(&self) -> Result<()> {
        Ok(())
    }

    fn status(&self) -> ConnectionStatus {
        self.checks.fetch_add(1, Ordering::SeqCst);
        let remaining = self.alive_checks.load(Ordering::SeqCst);
        if remaining == 0 {
            return ConnectionStatus::Disconnected;
        }
        if remaining != usize::MAX {
            self.alive_checks.store(remaining - 1, Ordering::SeqCst);
        }
        ConnectionStatus::Alive
    }

    fn tenants(&self) -> Vec<TenantInfo> {
        self.tenants.clone()
    }
}

/// Fetcher serving scripted results per URL.
#[derive(Default)]
pub struct FakeFetcher {
    feeds: Mutex<HashMap<String, Result<Vec<Article>>>>,
    calls: Mutex<Vec<String>>,
}

impl FakeFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `articles` (newest first) for `url`.
    pub fn serve(&self, url: &str, articles: Vec<Article>) {
        self.feeds
            .lock()
            .unwrap()
            .insert(url.to_string(), Ok(articles));
    }

    /// Fail every fetch of `url`.
    pub fn fail(&self, url: &str) {
        self.feeds.lock().unwrap().insert(
            url.to_string(),
            Err(MonitorError::Fetch("connection refused".to_string())),
        );
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl FeedFetcher for FakeFetcher {
    async fn fetch_articles(&self, url: &str) -> Result<Vec<Article>> {
        self.calls.lock().unwrap().push(url.to_string());
        match self.feeds.lock().unwrap().get(url) {
            Some(Ok(articles)) => Ok(articles.clone()),
            Some(Err(e)) => Err(MonitorError::Fetch(e.to_string())),
            None => Ok(Vec::new()),
        }
    }
}

/// One recorded publish call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub tenant: String,
    pub channel_id: String,
    pub link: String,
    pub role_id: Option<String>,
}

/// Publisher that records deliveries and can reject chosen links.
#[derive(Default)]
pub struct FakePublisher {
    deliveries: Mutex<Vec<Delivery>>,
    reject: Mutex<Vec<String>>,
}

impl FakePublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reject(&self, link: &str) {
        self.reject.lock().unwrap().push(link.to_string());
    }

    pub fn deliveries(&self) -> Vec<Delivery> {
        self.deliveries.lock().unwrap().clone()
    }

    pub fn links(&self) -> Vec<String> {
        self.deliveries().into_iter().map(|d| d.link).collect()
    }
}

#[async_trait]
impl Publisher for FakePublisher {
    async fn publish(
        &self,
        tenant: &TenantInfo,
        channel_id: &str,
        article: &Article,
        role_id: Option<&str>,
    ) -> Result<()> {
        let link = article.link().unwrap_or_default().to_string();
        if self.reject.lock().unwrap().contains(&link) {
            return Err(MonitorError::Publish(format!("rejected {link}")));
        }
        self.deliveries.lock().unwrap().push(Delivery {
            tenant: tenant.id.clone(),
            channel_id: channel_id.to_string(),
            link,
            role_id: role_id.map(str::to_string),
        });
        Ok(())
    }
}

/// Everything a test needs to drive and inspect a monitor.
pub struct Harness {
    pub connection: Arc<FakeConnection>,
    pub store: Arc<MemoryTenantStore>,
    pub fetcher: Arc<FakeFetcher>,
    pub publisher: Arc<FakePublisher>,
}

impl Harness {
    pub fn new(connection: FakeConnection) -> Self {
        Self {
            connection: Arc::new(connection),
            store: Arc::new(MemoryTenantStore::new()),
            fetcher: Arc::new(FakeFetcher::new()),
            publisher: Arc::new(FakePublisher::new()),
        }
    }

    pub fn monitor(&self, config: &MonitorConfig) -> FeedMonitor {
        FeedMonitor::new(
            config,
            self.connection.clone(),
            self.store.clone(),
            self.fetcher.clone(),
            self.publisher.clone(),
        )
        .expect("valid monitor config")
    }
}
