//! In-memory tenant-isolated store for tests/dev.

use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;

use tenantdesk_core::TenantId;

use super::{RecordStore, StoreError, StorePing, TenantRecord, ensure_tenant_key};

/// BTreeMap keyed by the full storage key, so listings come back in key order
/// like a DynamoDB prefix scan.
#[derive(Debug)]
pub struct InMemoryStore<R> {
    inner: RwLock<BTreeMap<String, R>>,
}

impl<R> InMemoryStore<R> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(BTreeMap::new()),
        }
    }
}

impl<R> Default for InMemoryStore<R> {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned() -> StoreError {
    StoreError::Other("store lock poisoned".to_string())
}

#[async_trait]
impl<R: TenantRecord> RecordStore<R> for InMemoryStore<R> {
    async fn list(&self, tenant_id: &TenantId) -> Result<Vec<R>, StoreError> {
        let prefix = format!("{tenant_id}#");
        let map = self.inner.read().map_err(|_| poisoned())?;
        Ok(map
            .range(prefix.clone()..)
            .take_while(|(k, _)| k.starts_with(&prefix))
            .map(|(_, v)| v.clone())
            .collect())
    }

    async fn get(&self, tenant_id: &TenantId, storage_key: &str) -> Result<Option<R>, StoreError> {
        ensure_tenant_key(tenant_id, storage_key)?;
        let map = self.inner.read().map_err(|_| poisoned())?;
        Ok(map.get(storage_key).cloned())
    }

    async fn create(&self, record: R) -> Result<R, StoreError> {
        let key = record.storage_key();
        ensure_tenant_key(record.tenant_id(), &key)?;
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        if map.contains_key(&key) {
            return Err(StoreError::Conflict(format!(
                "{} '{key}' already exists",
                R::KIND
            )));
        }
        map.insert(key, record.clone());
        Ok(record)
    }

    async fn put(&self, record: R) -> Result<R, StoreError> {
        let key = record.storage_key();
        ensure_tenant_key(record.tenant_id(), &key)?;
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        map.insert(key, record.clone());
        Ok(record)
    }

    async fn delete(&self, tenant_id: &TenantId, storage_key: &str) -> Result<(), StoreError> {
        ensure_tenant_key(tenant_id, storage_key)?;
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        map.remove(storage_key);
        Ok(())
    }
}

#[async_trait]
impl<R: TenantRecord> StorePing for InMemoryStore<R> {
    async fn ping(&self) -> Result<(), StoreError> {
        self.inner.read().map_err(|_| poisoned()).map(|_| ())
    }
}
