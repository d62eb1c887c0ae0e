//! Persistence of tenant documents.

pub mod json;
pub mod memory;

use async_trait::async_trait;

use crate::model::{TenantDocument, TenantInfo};
use crate::Result;

pub use json::JsonTenantStore;
pub use memory::MemoryTenantStore;

/// Loads and saves per-tenant documents.
#[async_trait]
pub trait TenantStore: Send + Sync {
    /// Load the document for `tenant`. A tenant with no stored document
    /// gets an empty one.
    async fn load(&self, tenant: &TenantInfo) -> Result<TenantDocument>;

    /// Persist `document`, replacing any previous version.
    async fn save(&self, document: &TenantDocument) -> Result<()>;
}
