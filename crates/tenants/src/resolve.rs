//! Tenant-id resolution.
//!
//! A request can carry its tenant in several places; resolution walks them in
//! a fixed precedence order and returns the first syntactically valid slug.
//! Invalid candidates are skipped rather than failing the whole resolution, so
//! a stale hash cannot shadow a good query parameter.

use tenantdesk_core::TenantId;

/// Where a resolved tenant id came from (kept for logging and tests).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TenantSource {
    QueryParam,
    UrlHash,
    Storage,
    Subdomain,
}

/// How the deployment maps hosts to tenants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomainMode {
    /// Shared domain: tenant travels in the query string, hash or storage.
    Shared,
    /// Custom domains: the tenant is the first hostname label.
    CustomDomain,
}

/// Candidate values collected from one request/page load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolutionInput<'a> {
    /// Raw `tenantId` query parameter, if present.
    pub query_param: Option<&'a str>,
    /// Raw location hash, e.g. `#/acme/dashboard`.
    pub url_hash: Option<&'a str>,
    /// Previously stored tenant id (session/local storage).
    pub stored: Option<&'a str>,
    /// Request hostname, for custom-domain deployments.
    pub hostname: Option<&'a str>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTenant {
    pub tenant_id: TenantId,
    pub source: TenantSource,
}

/// Extract the tenant segment from a hash route (`#/acme/dashboard` → `acme`).
pub fn hash_tenant(hash: &str) -> Option<&str> {
    let mut segments = hash.trim_start_matches('#').split('/');
    // The route starts with '/', so the first segment is empty.
    segments.next()?;
    segments.next().filter(|s| !s.is_empty())
}

/// Extract the tenant label from a custom-domain hostname.
pub fn subdomain_tenant(hostname: &str) -> Option<&str> {
    hostname.split('.').next().filter(|s| !s.is_empty())
}

/// Resolve the tenant id for a page load.
///
/// Shared-domain precedence: query parameter over url hash over stored value.
/// Custom-domain precedence: subdomain over stored value.
pub fn resolve_tenant(input: &ResolutionInput<'_>, mode: DomainMode) -> Option<ResolvedTenant> {
    let candidates: Vec<(Option<&str>, TenantSource)> = match mode {
        DomainMode::Shared => vec![
            (input.query_param, TenantSource::QueryParam),
            (input.url_hash.and_then(hash_tenant), TenantSource::UrlHash),
            (input.stored, TenantSource::Storage),
        ],
        DomainMode::CustomDomain => vec![
            (input.hostname.and_then(subdomain_tenant), TenantSource::Subdomain),
            (input.stored, TenantSource::Storage),
        ],
    };

    for (candidate, source) in candidates {
        let Some(raw) = candidate else { continue };
        match TenantId::new(raw) {
            Ok(tenant_id) => return Some(ResolvedTenant { tenant_id, source }),
            Err(err) => {
                tracing::debug!(candidate = raw, ?source, %err, "skipping invalid tenant candidate");
            }
        }
    }

    None
}
