//! In-memory tenant store.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::model::{TenantDocument, TenantInfo};
use crate::store::TenantStore;
use crate::Result;

/// Keeps documents in memory. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryTenantStore {
    documents: Mutex<HashMap<String, TenantDocument>>,
    loads: Mutex<Vec<String>>,
    saves: Mutex<Vec<String>>,
}

impl MemoryTenantStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with a document.
    pub fn insert(&self, document: TenantDocument) {
        if let Ok(mut documents) = self.documents.lock() {
            documents.insert(document.tenant_id.clone(), document);
        }
    }

    /// The stored document for `tenant_id`, if any.
    pub fn get(&self, tenant_id: &str) -> Option<TenantDocument> {
        self.documents
            .lock()
            .ok()
            .and_then(|documents| documents.get(tenant_id).cloned())
    }

    /// Tenant IDs passed to `load`, in call order.
    pub fn loaded_tenants(&self) -> Vec<String> {
        self.loads.lock().map(|l| l.clone()).unwrap_or_default()
    }

    /// Tenant IDs passed to `save`, in call order.
    pub fn saved_tenants(&self) -> Vec<String> {
        self.saves.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl TenantStore for MemoryTenantStore {
    async fn load(&self, tenant: &TenantInfo) -> Result<TenantDocument> {
        if let Ok(mut loads) = self.loads.lock() {
            loads.push(tenant.id.clone());
        }
        Ok(self
            .get(&tenant.id)
            .unwrap_or_else(|| TenantDocument::new(tenant.id.clone())))
    }

    async fn save(&self, document: &TenantDocument) -> Result<()> {
        if let Ok(mut saves) = self.saves.lock() {
            saves.push(document.tenant_id.clone());
        }
        self.insert(document.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Feed, Permissions};

    #[tokio::test]
    async fn test_load_unknown_is_empty() {
        let store = MemoryTenantStore::new();
        let info = TenantInfo::new("7", "Guild", Permissions::empty());
        assert_eq!(store.load(&info).await.unwrap(), TenantDocument::new("7"));
        assert_eq!(store.loaded_tenants(), vec!["7".to_string()]);
    }

    #[tokio::test]
    async fn test_save_records_call() {
        let store = MemoryTenantStore::new();
        let doc = TenantDocument::new("7").with_feed(Feed::new("u", "c"));
        store.save(&doc).await.unwrap();

        assert_eq!(store.saved_tenants(), vec!["7".to_string()]);
        assert_eq!(store.get("7"), Some(doc));
    }
}
