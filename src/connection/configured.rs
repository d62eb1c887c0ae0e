//! Connection whose tenants and channels come from the configuration file.
//!
//! Channels are delivered to through webhooks, so no gateway session is
//! held; "logging in" validates the configured tenant set.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::config::TenantConfig;
use crate::connection::{Connection, ConnectionStatus};
use crate::model::{Channel, Permissions, TenantInfo};
use crate::{MonitorError, Result};

/// Flips a [`ConfiguredConnection`] to disconnected.
#[derive(Debug, Clone)]
pub struct DisconnectHandle {
    alive: Arc<AtomicBool>,
}

impl DisconnectHandle {
    /// Mark the connection as lost.
    pub fn disconnect(&self, reason: &str) {
        if self.alive.swap(false, Ordering::SeqCst) {
            warn!(reason, "Connection marked as disconnected");
        }
    }
}

/// Connection over a fixed, configured set of tenants.
#[derive(Debug)]
pub struct ConfiguredConnection {
    tenants: Vec<TenantInfo>,
    alive: Arc<AtomicBool>,
}

impl ConfiguredConnection {
    /// Build the connection from `[[tenants]]` entries.
    pub fn from_config(tenants: &[TenantConfig]) -> Result<Self> {
        let tenants = tenants
            .iter()
            .map(tenant_info)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(tenants))
    }

    pub fn new(tenants: Vec<TenantInfo>) -> Self {
        Self {
            tenants,
            alive: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Handle used to report a lost connection, e.g. from a signal handler.
    pub fn disconnect_handle(&self) -> DisconnectHandle {
        DisconnectHandle {
            alive: Arc::clone(&self.alive),
        }
    }
}

fn tenant_info(config: &TenantConfig) -> Result<TenantInfo> {
    let permissions = Permissions::from_names(&config.permissions)?;
    let info = config.channels.iter().fold(
        TenantInfo::new(config.id.clone(), config.name.clone(), permissions),
        |info, ch| {
            let mut channel = Channel::new(ch.id.clone(), ch.name.clone());
            channel.webhook_url = ch.webhook_url.clone();
            info.with_channel(channel)
        },
    );
    Ok(info)
}

#[async_trait]
impl Connection for ConfiguredConnection {
    async fn login(&self) -> Result<()> {
        if self.tenants.is_empty() {
            return Err(MonitorError::Init("no tenants configured".to_string()));
        }
        for tenant in &self.tenants {
            if !tenant.channels.values().any(|c| c.webhook_url.is_some()) {
                warn!(tenant = %tenant.name, "Tenant has no channel with a webhook");
            }
        }

        self.alive.store(true, Ordering::SeqCst);
        info!(tenants = self.tenants.len(), "Connection established");
        Ok(())
    }

    fn status(&self) -> ConnectionStatus {
        if self.alive.load(Ordering::SeqCst) {
            ConnectionStatus::Alive
        } else {
            ConnectionStatus::Disconnected
        }
    }

    fn tenants(&self) -> Vec<TenantInfo> {
        self.tenants.clone()
    }
}
