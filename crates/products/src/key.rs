use core::str::FromStr;

use serde::{Deserialize, Serialize};

use tenantdesk_core::{DomainError, DomainResult, TenantId};

/// Composite product identifier: `"{tenant_id}#{product_name}"`.
///
/// The tenant prefix is what makes the single-table layout tenant-isolated:
/// listings are a prefix scan and every point lookup carries the tenant. The
/// separator is reserved, so product names cannot contain `#`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProductKey {
    tenant_id: TenantId,
    name: String,
}

impl ProductKey {
    pub const SEPARATOR: char = '#';

    pub fn new(tenant_id: TenantId, name: impl Into<String>) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("product name cannot be empty"));
        }
        if name.contains(Self::SEPARATOR) {
            return Err(DomainError::validation(format!(
                "product name cannot contain '{}'",
                Self::SEPARATOR
            )));
        }
        Ok(Self { tenant_id, name })
    }

    /// Parse a fully-qualified key (`tenant#name`).
    pub fn parse(raw: &str) -> DomainResult<Self> {
        let (tenant, name) = raw
            .split_once(Self::SEPARATOR)
            .ok_or_else(|| DomainError::invalid_id(format!("'{raw}' is not a qualified key")))?;
        Self::new(TenantId::new(tenant)?, name)
    }

    /// Qualify a path identifier with the caller's tenant.
    ///
    /// A bare name gets the caller's tenant prefix; an already-qualified key
    /// is accepted only when its prefix matches the caller (cross-tenant keys
    /// are rejected, they are not a lookup miss).
    pub fn qualify(tenant_id: &TenantId, raw: &str) -> DomainResult<Self> {
        if raw.contains(Self::SEPARATOR) {
            let key = Self::parse(raw)?;
            if key.tenant_id != *tenant_id {
                return Err(DomainError::Unauthorized);
            }
            Ok(key)
        } else {
            Self::new(tenant_id.clone(), raw)
        }
    }

    pub fn tenant_id(&self) -> &TenantId {
        &self.tenant_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The storage representation, also used as the wire id.
    pub fn storage_key(&self) -> String {
        format!("{}{}{}", self.tenant_id, Self::SEPARATOR, self.name)
    }
}

impl core::fmt::Display for ProductKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}{}{}", self.tenant_id, Self::SEPARATOR, self.name)
    }
}

impl FromStr for ProductKey {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ProductKey {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ProductKey> for String {
    fn from(value: ProductKey) -> Self {
        value.storage_key()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tenant(id: &str) -> TenantId {
        TenantId::new(id).unwrap()
    }

    #[test]
    fn storage_key_joins_tenant_and_name() {
        let key = ProductKey::new(tenant("acme"), "Savings Plus").unwrap();
        assert_eq!(key.storage_key(), "acme#Savings Plus");
    }

    #[test]
    fn parse_round_trips_storage_key() {
        let key = ProductKey::new(tenant("acme"), "Savings Plus").unwrap();
        assert_eq!(ProductKey::parse(&key.storage_key()).unwrap(), key);
    }

    #[test]
    fn qualify_prefixes_bare_names() {
        let key = ProductKey::qualify(&tenant("acme"), "Savings Plus").unwrap();
        assert_eq!(key.tenant_id().as_str(), "acme");
        assert_eq!(key.name(), "Savings Plus");
    }

    #[test]
    fn qualify_accepts_matching_qualified_keys() {
        let key = ProductKey::qualify(&tenant("acme"), "acme#Savings Plus").unwrap();
        assert_eq!(key.name(), "Savings Plus");
    }

    #[test]
    fn qualify_rejects_cross_tenant_keys() {
        assert_eq!(
            ProductKey::qualify(&tenant("acme"), "globex#Savings Plus"),
            Err(DomainError::Unauthorized)
        );
    }

    #[test]
    fn rejects_empty_and_separator_names() {
        assert!(ProductKey::new(tenant("acme"), "").is_err());
        assert!(ProductKey::new(tenant("acme"), "   ").is_err());
        assert!(ProductKey::new(tenant("acme"), "a#b").is_err());
    }

    #[test]
    fn serde_uses_the_qualified_string_form() {
        let key = ProductKey::new(tenant("acme"), "Savings").unwrap();
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, "\"acme#Savings\"");
        let back: ProductKey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, key);
    }
}
