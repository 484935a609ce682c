//! Tenant-isolated record storage.
//!
//! Records live in a single table keyed by `"{tenant_id}#{suffix}"`; a listing
//! is a prefix scan and every point operation carries the caller's tenant.
//! The trait makes no storage assumptions: the in-memory implementation backs
//! tests/dev, the DynamoDB implementation backs production.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use tenantdesk_core::TenantId;

pub mod memory;

#[cfg(feature = "dynamodb")]
pub mod dynamodb;

/// Storage operation error, classified so the API can map each case to a
/// stable HTTP status.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store access denied: {0}")]
    AccessDenied(String),

    #[error("storage table not found: {0}")]
    TableNotFound(String),

    #[error("store throttled: {0}")]
    Throttled(String),

    #[error("store capacity exceeded: {0}")]
    CapacityExceeded(String),

    #[error("invalid store request: {0}")]
    Validation(String),

    #[error("conditional check failed: {0}")]
    Conflict(String),

    #[error("stored record could not be decoded: {0}")]
    Decode(String),

    #[error("store unreachable: {0}")]
    Unavailable(String),

    #[error("store error: {0}")]
    Other(String),
}

impl StoreError {
    /// Classify an AWS service error by its error code.
    ///
    /// The codes are the DynamoDB exception names; anything unrecognized is
    /// `Other` and surfaces as a 500.
    pub fn from_aws_code(code: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        match code {
            "AccessDeniedException" | "UnrecognizedClientException" => Self::AccessDenied(message),
            "ResourceNotFoundException" => Self::TableNotFound(message),
            "ThrottlingException" => Self::Throttled(message),
            "ProvisionedThroughputExceededException" => Self::CapacityExceeded(message),
            "ValidationException" => Self::Validation(message),
            "ConditionalCheckFailedException" => Self::Conflict(message),
            _ => Self::Other(format!("{code}: {message}")),
        }
    }

    /// Whether a retry can plausibly succeed.
    ///
    /// Permission, schema and validation failures are permanent; so is a
    /// failed conditional check (the record state will not change by itself).
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Throttled(_) | Self::CapacityExceeded(_) | Self::Unavailable(_) | Self::Other(_)
        )
    }
}

/// A record that can live in the tenant-keyed table.
pub trait TenantRecord: Clone + Send + Sync + 'static {
    /// Record kind for logs ("product", "order").
    const KIND: &'static str;

    fn tenant_id(&self) -> &TenantId;

    /// Full storage key, including the tenant prefix.
    fn storage_key(&self) -> String;
}

/// Reject keys that do not belong to the calling tenant.
///
/// The API derives keys from the caller's tenant context, so a mismatch here
/// is a bug or a forged key, not a lookup miss.
pub(crate) fn ensure_tenant_key(tenant_id: &TenantId, storage_key: &str) -> Result<(), StoreError> {
    let prefix_len = tenant_id.as_str().len();
    let matches = storage_key.len() > prefix_len + 1
        && storage_key.starts_with(tenant_id.as_str())
        && storage_key.as_bytes()[prefix_len] == b'#';
    if matches {
        Ok(())
    } else {
        Err(StoreError::Validation(format!(
            "key '{storage_key}' is not scoped to tenant '{tenant_id}'"
        )))
    }
}

/// Tenant-isolated CRUD over one record kind.
#[async_trait]
pub trait RecordStore<R: TenantRecord>: Send + Sync {
    /// All records for a tenant (prefix scan).
    async fn list(&self, tenant_id: &TenantId) -> Result<Vec<R>, StoreError>;

    /// Point lookup by full storage key.
    async fn get(&self, tenant_id: &TenantId, storage_key: &str) -> Result<Option<R>, StoreError>;

    /// Insert a new record; fails with [`StoreError::Conflict`] when the key
    /// already exists.
    async fn create(&self, record: R) -> Result<R, StoreError>;

    /// Unconditional upsert.
    async fn put(&self, record: R) -> Result<R, StoreError>;

    async fn delete(&self, tenant_id: &TenantId, storage_key: &str) -> Result<(), StoreError>;
}

#[async_trait]
impl<R, S> RecordStore<R> for Arc<S>
where
    R: TenantRecord,
    S: RecordStore<R> + ?Sized,
{
    async fn list(&self, tenant_id: &TenantId) -> Result<Vec<R>, StoreError> {
        (**self).list(tenant_id).await
    }

    async fn get(&self, tenant_id: &TenantId, storage_key: &str) -> Result<Option<R>, StoreError> {
        (**self).get(tenant_id, storage_key).await
    }

    async fn create(&self, record: R) -> Result<R, StoreError> {
        (**self).create(record).await
    }

    async fn put(&self, record: R) -> Result<R, StoreError> {
        (**self).put(record).await
    }

    async fn delete(&self, tenant_id: &TenantId, storage_key: &str) -> Result<(), StoreError> {
        (**self).delete(tenant_id, storage_key).await
    }
}

/// Cheap reachability probe, used by the health endpoint.
#[async_trait]
pub trait StorePing: Send + Sync {
    async fn ping(&self) -> Result<(), StoreError>;
}

// ─── record mappings ────────────────────────────────────────────────────────

impl TenantRecord for tenantdesk_products::Product {
    const KIND: &'static str = "product";

    fn tenant_id(&self) -> &TenantId {
        &self.tenant_id
    }

    fn storage_key(&self) -> String {
        self.id.storage_key()
    }
}

impl TenantRecord for tenantdesk_orders::Order {
    const KIND: &'static str = "order";

    fn tenant_id(&self) -> &TenantId {
        &self.tenant_id
    }

    fn storage_key(&self) -> String {
        format!("{}#{}", self.tenant_id, self.id)
    }
}
