//! feedmon - multi-tenant feed monitor.
//!
//! Polls the RSS/Atom feeds configured by each tenant, drops items that
//! were already published (by the same feed, or by any feed through the
//! bounded global history) and relays the rest to the tenant's channels.

pub mod canonical;
pub mod config;
pub mod connection;
pub mod error;
pub mod logging;
pub mod model;
pub mod monitor;
pub mod publish;
pub mod rss;
pub mod store;

pub use canonical::{Canonicalizer, NormalizedKey, UrlCanonicalizer};
pub use config::Config;
pub use connection::{ConfiguredConnection, Connection, ConnectionStatus, DisconnectHandle};
pub use error::{MonitorError, Result};
pub use model::{Channel, Feed, Permissions, Tenant, TenantDocument, TenantInfo};
pub use monitor::{
    CycleReport, FeedMonitor, FeedOutcome, FeedProcessor, GlobalHistory, MonitorState,
    TenantOutcome,
};
pub use publish::{Publisher, WebhookPublisher};
pub use rss::{Article, FeedFetcher, RssFetcher};
pub use store::{JsonTenantStore, MemoryTenantStore, TenantStore};
