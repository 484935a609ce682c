//! `tenantdesk-tenants` — tenant identity, configuration and onboarding flow.
//!
//! Everything the app needs to answer "which tenant is this request for, and
//! how does that tenant authenticate": the tenant/registration entities served
//! by the control plane, the per-tenant OIDC configuration records, the
//! tenant-id resolution precedence and the auth-bootstrap reconciliation.

pub mod bootstrap;
pub mod config;
pub mod resolve;
pub mod tenant;

pub use bootstrap::{BootstrapAction, BootstrapState, next_action};
pub use config::{ConfigParams, OidcClientSettings, TenantConfig};
pub use resolve::{DomainMode, ResolutionInput, ResolvedTenant, TenantSource, resolve_tenant};
pub use tenant::{
    CreateTenantRequest, RegistrationStatus, Tenant, TenantData, TenantRegistration,
    TenantRegistrationData, TenantStats,
};
