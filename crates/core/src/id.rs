//! Strongly-typed tenant identifier.

use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Maximum accepted tenant slug length.
const MAX_LEN: usize = 64;

/// Identifier of a tenant (the multi-tenant isolation boundary).
///
/// Tenant ids are opaque slugs minted by the control plane, not UUIDs: they
/// appear in URLs, subdomains and storage key prefixes, so the accepted
/// alphabet is restricted to lowercase ASCII alphanumerics with interior
/// hyphens (the same shape [`TenantId::slugify`] produces).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TenantId(String);

impl TenantId {
    /// Parse and validate a tenant slug.
    pub fn new(raw: impl Into<String>) -> Result<Self, DomainError> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(DomainError::invalid_id("tenant id is empty"));
        }
        if raw.len() > MAX_LEN {
            return Err(DomainError::invalid_id(format!(
                "tenant id exceeds {MAX_LEN} characters"
            )));
        }
        if raw.starts_with('-') || raw.ends_with('-') {
            return Err(DomainError::invalid_id(
                "tenant id must not start or end with '-'",
            ));
        }
        if !raw
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
        {
            return Err(DomainError::invalid_id(format!(
                "tenant id '{raw}' contains characters outside [a-z0-9-]"
            )));
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Derive a tenant slug from a free-form company name.
    ///
    /// Lowercases, collapses every run of non-alphanumeric characters into a
    /// single hyphen and trims leading/trailing hyphens. Returns an error when
    /// nothing usable remains.
    pub fn slugify(company_name: &str) -> Result<Self, DomainError> {
        let mut slug = String::with_capacity(company_name.len());
        for ch in company_name.chars() {
            let lower = ch.to_ascii_lowercase();
            if lower.is_ascii_lowercase() || lower.is_ascii_digit() {
                slug.push(lower);
            } else if !slug.ends_with('-') && !slug.is_empty() {
                slug.push('-');
            }
        }
        let slug = slug.trim_end_matches('-');
        Self::new(slug)
    }
}

impl core::fmt::Display for TenantId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for TenantId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for TenantId {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TenantId> for String {
    fn from(value: TenantId) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_simple_slugs() {
        for raw in ["acme", "acme-corp", "tenant1", "a1-b2-c3"] {
            assert_eq!(TenantId::new(raw).unwrap().as_str(), raw);
        }
    }

    #[test]
    fn rejects_empty_and_malformed_slugs() {
        for raw in ["", "Acme", "acme corp", "-acme", "acme-", "a#b", "ümlaut"] {
            assert!(
                matches!(TenantId::new(raw), Err(DomainError::InvalidId(_))),
                "expected {raw:?} to be rejected"
            );
        }
    }

    #[test]
    fn rejects_overlong_slugs() {
        let raw = "a".repeat(MAX_LEN + 1);
        assert!(TenantId::new(raw).is_err());
    }

    #[test]
    fn slugify_collapses_punctuation_runs() {
        assert_eq!(
            TenantId::slugify("Acme Corp., Ltd.").unwrap().as_str(),
            "acme-corp-ltd"
        );
        assert_eq!(TenantId::slugify("  Tenant #1 ").unwrap().as_str(), "tenant-1");
    }

    #[test]
    fn slugify_rejects_names_with_no_usable_characters() {
        assert!(TenantId::slugify("!!!").is_err());
        assert!(TenantId::slugify("").is_err());
    }

    #[test]
    fn serde_round_trip_validates_on_deserialize() {
        let id = TenantId::new("acme").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"acme\"");
        let back: TenantId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);

        let bad: Result<TenantId, _> = serde_json::from_str("\"Not A Slug\"");
        assert!(bad.is_err());
    }
}
