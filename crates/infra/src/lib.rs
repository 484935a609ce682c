//! `tenantdesk-infra` — storage, external clients and process plumbing.
//!
//! Domain crates stay IO-free; everything that talks to DynamoDB, the control
//! plane or the environment lives here.

pub mod config;
pub mod control_plane;
pub mod health;
pub mod retry;
pub mod store;

pub use config::AppConfig;
pub use control_plane::{ControlPlaneClient, ControlPlaneError};
pub use health::{HealthChecks, HealthReport, HealthStatus, run_health_check};
pub use retry::{RetryPolicy, with_retry};
pub use store::{RecordStore, StoreError, StorePing, TenantRecord, memory::InMemoryStore};
