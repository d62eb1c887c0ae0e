//! The feed monitor loop.
//!
//! One task walks every tenant the connection knows about, processes its
//! feeds in order, pauses for the pacing interval and saves the tenant's
//! document when a feed's local history changed. It owns the global history; no
//! other task touches it.
//!
//! The loop has no reconnect logic. When the connection drops, the monitor
//! moves to [`MonitorState::Terminated`] and [`FeedMonitor::run`] returns
//! an error; restarting the process is up to the supervisor.

pub mod history;
pub mod processor;

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::canonical::{Canonicalizer, UrlCanonicalizer};
use crate::config::MonitorConfig;
use crate::connection::Connection;
use crate::model::{Permissions, Tenant};
use crate::publish::Publisher;
use crate::rss::FeedFetcher;
use crate::store::TenantStore;
use crate::{MonitorError, Result};

pub use history::{GlobalHistory, DEFAULT_HISTORY_CAPACITY};
pub use processor::{FeedOutcome, FeedProcessor, TenantOutcome};

/// Monitor lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    /// Connection alive; cycles keep running.
    Running,
    /// Connection lost. Terminal.
    Terminated,
}

/// Counters for one traversal of all tenants.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CycleReport {
    /// Tenants whose feeds were processed (and paced).
    pub tenants_processed: usize,
    /// Tenants skipped for missing permissions.
    pub tenants_skipped: usize,
    /// Tenants whose document was saved.
    pub tenants_saved: usize,
    /// Tenants whose document failed to load or save.
    pub store_errors: usize,
    pub feeds_failed: usize,
    pub items_published: usize,
}

/// Drives polling for every tenant.
pub struct FeedMonitor {
    connection: Arc<dyn Connection>,
    store: Arc<dyn TenantStore>,
    processor: FeedProcessor,
    history: GlobalHistory,
    required_permissions: Permissions,
    pacing_interval: Duration,
    idle_interval: Duration,
    state: MonitorState,
}

impl FeedMonitor {
    /// Create a monitor with the default URL canonicalizer.
    pub fn new(
        config: &MonitorConfig,
        connection: Arc<dyn Connection>,
        store: Arc<dyn TenantStore>,
        fetcher: Arc<dyn FeedFetcher>,
        publisher: Arc<dyn Publisher>,
    ) -> Result<Self> {
        Self::with_canonicalizer(
            config,
            connection,
            store,
            fetcher,
            publisher,
            Arc::new(UrlCanonicalizer),
        )
    }

    /// Create a monitor using `canonicalizer` for every dedup key.
    pub fn with_canonicalizer(
        config: &MonitorConfig,
        connection: Arc<dyn Connection>,
        store: Arc<dyn TenantStore>,
        fetcher: Arc<dyn FeedFetcher>,
        publisher: Arc<dyn Publisher>,
        canonicalizer: Arc<dyn Canonicalizer>,
    ) -> Result<Self> {
        let required_permissions = config.required_permissions()?;
        let history = GlobalHistory::new(config.history_capacity, Arc::clone(&canonicalizer));
        let processor =
            FeedProcessor::new(fetcher, publisher, canonicalizer, config.max_feed_history)
                .with_excluded_channels(config.global_history_excluded_channels.iter().cloned());

        Ok(Self {
            connection,
            store,
            processor,
            history,
            required_permissions,
            pacing_interval: config.pacing_interval(),
            idle_interval: config.idle_interval(),
            state: MonitorState::Running,
        })
    }

    pub fn state(&self) -> MonitorState {
        self.state
    }

    pub fn history(&self) -> &GlobalHistory {
        &self.history
    }

    /// Run cycles until the connection is lost.
    ///
    /// Never returns `Ok`; the error is always [`MonitorError::Connection`].
    pub async fn run(&mut self) -> Result<()> {
        info!(
            pacing_secs = self.pacing_interval.as_secs(),
            history_capacity = self.history.capacity(),
            "Feed monitor started"
        );

        while self.check_connection() {
            let report = self.run_cycle().await;
            debug!(?report, "Cycle finished");

            // Nothing was paced this cycle; don't spin.
            if report.tenants_processed == 0 && self.state == MonitorState::Running {
                tokio::time::sleep(self.idle_interval).await;
            }
        }

        error!(event = "FeedMonitorDisconnect", "Feed monitor disconnected");
        Err(MonitorError::Connection(
            "feed monitor disconnected".to_string(),
        ))
    }

    /// Walk every tenant once.
    ///
    /// Stops early if the connection drops between tenants.
    pub async fn run_cycle(&mut self) -> CycleReport {
        let mut report = CycleReport::default();

        for info in self.connection.tenants() {
            if !self.check_connection() {
                break;
            }

            if !info.has_permissions(self.required_permissions) {
                debug!(tenant = %info.name, "Missing permissions, skipping tenant");
                report.tenants_skipped += 1;
                tokio::task::yield_now().await;
                continue;
            }

            let name = info.name.clone();
            let mut tenant = match Tenant::load(info, self.store.as_ref()).await {
                Ok(tenant) => tenant,
                Err(e) => {
                    error!(tenant = %name, error = %e, "Failed to load tenant document");
                    report.store_errors += 1;
                    continue;
                }
            };

            let outcome = self
                .processor
                .process_tenant_feeds(&mut self.history, &mut tenant)
                .await;
            report.tenants_processed += 1;
            report.items_published += outcome.published;
            report.feeds_failed += outcome.failed_feeds;

            tokio::time::sleep(self.pacing_interval).await;

            if outcome.history_changed {
                match tenant.save(self.store.as_ref()).await {
                    Ok(()) => report.tenants_saved += 1,
                    Err(e) => {
                        report.store_errors += 1;
                        error!(tenant = %tenant.name(), error = %e, "Failed to save tenant document");
                    }
                }
            }
        }

        report
    }

    /// Move to `Terminated` if the connection is gone.
    fn check_connection(&mut self) -> bool {
        if self.state == MonitorState::Terminated {
            return false;
        }
        if !self.connection.status().is_alive() {
            warn!("Connection reported disconnected");
            self.state = MonitorState::Terminated;
            return false;
        }
        true
    }
}
