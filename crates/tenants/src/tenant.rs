use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tenantdesk_core::{DomainError, DomainResult, Entity, TenantId};

/// Registration lifecycle of a tenant in the control plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum RegistrationStatus {
    Pending,
    Active,
    Inactive,
}

impl RegistrationStatus {
    pub fn is_active(self) -> bool {
        matches!(self, RegistrationStatus::Active)
    }
}

/// Descriptive tenant attributes captured at registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantData {
    pub tenant_name: String,
    pub company_name: String,
    pub tier: String,
    pub email: String,
}

/// Registration state attached to a tenant record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantRegistrationData {
    pub registration_status: RegistrationStatus,
}

/// A provisioned tenant as served by the control plane.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tenant {
    pub tenant_id: TenantId,
    pub tenant_data: TenantData,
    pub tenant_registration_data: TenantRegistrationData,
}

impl Entity for Tenant {
    type Id = TenantId;

    fn id(&self) -> &Self::Id {
        &self.tenant_id
    }
}

/// A pending onboarding request, keyed separately from the tenant itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantRegistration {
    pub registration_id: String,
    pub tenant_name: String,
    pub company_name: String,
    pub tier: String,
    pub email: String,
    pub registration_status: RegistrationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for registering a new tenant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTenantRequest {
    pub tenant_name: String,
    pub company_name: String,
    pub tier: String,
    pub email: String,
}

impl CreateTenantRequest {
    /// Presence checks for the registration form fields.
    pub fn validate(&self) -> DomainResult<()> {
        if self.tenant_name.trim().is_empty() {
            return Err(DomainError::validation("tenantName cannot be empty"));
        }
        if self.company_name.trim().is_empty() {
            return Err(DomainError::validation("companyName cannot be empty"));
        }
        if self.tier.trim().is_empty() {
            return Err(DomainError::validation("tier cannot be empty"));
        }
        if !self.email.contains('@') {
            return Err(DomainError::validation("email must contain '@'"));
        }
        Ok(())
    }

    /// Tenant URL slug derived from the company name.
    pub fn tenant_url(&self) -> DomainResult<TenantId> {
        TenantId::slugify(&self.company_name)
    }
}

/// Fleet-level tenant statistics for the admin dashboard.
// TODO: replace the per-tenant user/revenue estimates once the control plane
// exposes real usage metrics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantStats {
    pub total_tenants: usize,
    pub active_tenants: usize,
    pub total_users: usize,
    pub monthly_revenue: String,
}

impl TenantStats {
    pub fn from_tenants(tenants: &[Tenant]) -> Self {
        let total_tenants = tenants.len();
        let active_tenants = tenants
            .iter()
            .filter(|t| t.tenant_registration_data.registration_status.is_active())
            .count();

        Self {
            total_tenants,
            active_tenants,
            total_users: total_tenants * 5,
            monthly_revenue: format!("${}", total_tenants * 99),
        }
    }
}
