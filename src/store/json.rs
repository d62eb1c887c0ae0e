//! File-backed tenant store: one JSON document per tenant.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::debug;

use crate::model::{TenantDocument, TenantInfo};
use crate::store::TenantStore;
use crate::{MonitorError, Result};

/// Stores each tenant document at `<dir>/<tenant id>.json`.
#[derive(Debug, Clone)]
pub struct JsonTenantStore {
    dir: PathBuf,
}

impl JsonTenantStore {
    /// Create a store rooted at `dir`. The directory is created on first save.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, tenant_id: &str) -> Result<PathBuf> {
        // Tenant IDs become file names
        if tenant_id.is_empty()
            || !tenant_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(MonitorError::Store(format!(
                "invalid tenant id: {:?}",
                tenant_id
            )));
        }
        Ok(self.dir.join(format!("{}.json", tenant_id)))
    }
}

#[async_trait]
impl TenantStore for JsonTenantStore {
    async fn load(&self, tenant: &TenantInfo) -> Result<TenantDocument> {
        let path = self.path_for(&tenant.id)?;
        let content = match fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(tenant = %tenant.name, "No stored document, starting empty");
                return Ok(TenantDocument::new(tenant.id.clone()));
            }
            Err(e) => return Err(e.into()),
        };

        let mut document: TenantDocument = serde_json::from_str(&content).map_err(|e| {
            MonitorError::Store(format!("failed to parse {}: {}", path.display(), e))
        })?;
        if document.tenant_id.is_empty() {
            document.tenant_id = tenant.id.clone();
        }
        Ok(document)
    }

    async fn save(&self, document: &TenantDocument) -> Result<()> {
        let path = self.path_for(&document.tenant_id)?;
        fs::create_dir_all(&self.dir).await?;

        let json = serde_json::to_vec_pretty(document)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json).await?;
        fs::rename(&tmp, &path).await?;

        debug!(tenant_id = %document.tenant_id, path = %path.display(), "Saved tenant document");
        Ok(())
    }
}
