//! API-side authorization guard.
//!
//! Enforced at the route boundary, keeping domain and infra auth-agnostic.

use tenantdesk_auth::{AuthzError, Permission, Principal, TenantMembership, authorize};

use crate::context::{PrincipalContext, TenantContext};

/// Check a required permission in the current request context.
pub fn require_permission(
    tenant: &TenantContext,
    principal: &PrincipalContext,
    required: &Permission,
) -> Result<(), AuthzError> {
    let membership = TenantMembership {
        tenant_id: tenant.tenant_id().clone(),
        roles: principal.roles().to_vec(),
        permissions: permissions_from_roles(principal.roles()),
    };

    let principal = Principal {
        principal_id: principal.principal_id(),
        active_tenant_id: tenant.tenant_id().clone(),
        membership,
    };

    authorize(&principal, required)
}

/// Static role→permission policy.
///
/// "admin" gets everything (including the control-plane admin surface);
/// "member" gets read/write on the data plane; "viewer" is read-only.
fn permissions_from_roles(roles: &[tenantdesk_auth::Role]) -> Vec<Permission> {
    let mut permissions = Vec::new();

    for role in roles {
        match role.as_str() {
            "admin" => return vec![Permission::new("*")],
            "member" => permissions.extend([
                Permission::new("products.read"),
                Permission::new("products.write"),
                Permission::new("orders.read"),
                Permission::new("orders.write"),
            ]),
            "viewer" => permissions.extend([
                Permission::new("products.read"),
                Permission::new("orders.read"),
            ]),
            _ => {}
        }
    }

    permissions
}

#[cfg(test)]
mod tests {
    use super::*;
    use tenantdesk_auth::{PrincipalId, Role};
    use tenantdesk_core::TenantId;

    fn contexts(roles: Vec<Role>) -> (TenantContext, PrincipalContext) {
        (
            TenantContext::new(TenantId::new("acme").unwrap()),
            PrincipalContext::new(PrincipalId::new(), roles),
        )
    }

    #[test]
    fn admin_can_do_anything() {
        let (tenant, principal) = contexts(vec![Role::new("admin")]);
        assert!(require_permission(&tenant, &principal, &Permission::new("tenants.admin")).is_ok());
        assert!(require_permission(&tenant, &principal, &Permission::new("products.write")).is_ok());
    }

    #[test]
    fn member_can_write_the_data_plane_but_not_admin() {
        let (tenant, principal) = contexts(vec![Role::new("member")]);
        assert!(require_permission(&tenant, &principal, &Permission::new("orders.write")).is_ok());
        assert!(matches!(
            require_permission(&tenant, &principal, &Permission::new("tenants.admin")),
            Err(AuthzError::Forbidden(_))
        ));
    }

    #[test]
    fn viewer_is_read_only() {
        let (tenant, principal) = contexts(vec![Role::new("viewer")]);
        assert!(require_permission(&tenant, &principal, &Permission::new("products.read")).is_ok());
        assert!(require_permission(&tenant, &principal, &Permission::new("products.write")).is_err());
    }

    #[test]
    fn unknown_roles_grant_nothing() {
        let (tenant, principal) = contexts(vec![Role::new("intern")]);
        assert!(require_permission(&tenant, &principal, &Permission::new("products.read")).is_err());
    }
}
