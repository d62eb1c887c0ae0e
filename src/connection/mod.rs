//! Connection to the chat platform.
//!
//! The monitor only needs to know whether the connection is alive and
//! which tenants it currently sees.

pub mod configured;

use async_trait::async_trait;

use crate::model::TenantInfo;
use crate::Result;

pub use configured::{ConfiguredConnection, DisconnectHandle};

/// Connection status as seen by the monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    /// Logged in and usable.
    Alive,
    /// Not logged in, or the session was lost.
    Disconnected,
}

impl ConnectionStatus {
    pub fn is_alive(self) -> bool {
        self == ConnectionStatus::Alive
    }
}

/// Platform connection consumed by the monitor.
#[async_trait]
pub trait Connection: Send + Sync {
    /// Establish the session. Failure here is fatal for the process.
    async fn login(&self) -> Result<()>;

    /// Current status.
    fn status(&self) -> ConnectionStatus;

    /// Tenants currently known to the connection.
    fn tenants(&self) -> Vec<TenantInfo>;
}
