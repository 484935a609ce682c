//! Auth-bootstrap reconciliation.
//!
//! App startup reconciles three facts (do we know the tenant, do we have its
//! OIDC configuration, is the session authenticated) into exactly one next
//! step. The decision is a pure function over [`BootstrapState`] so every
//! combination is table-testable.

use tenantdesk_core::TenantId;

/// Snapshot of the bootstrap facts for one reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BootstrapState {
    pub tenant_id: Option<TenantId>,
    pub has_config: bool,
    pub is_authenticated: bool,
    pub is_loading: bool,
}

impl BootstrapState {
    /// Drop tenant-derived state after a failed config load; the flow
    /// restarts at tenant selection.
    pub fn clear_tenant(&mut self) {
        self.tenant_id = None;
        self.has_config = false;
        self.is_authenticated = false;
    }
}

/// The single next step the app should take.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapAction {
    /// An async step is in flight; do nothing yet.
    Wait,
    /// No tenant id could be resolved; show tenant selection.
    SelectTenant,
    /// Tenant known but its OIDC configuration is not loaded yet.
    LoadConfig,
    /// Configuration present but no session; start the login redirect.
    RedirectToLogin,
    /// Fully bootstrapped; enter the dashboard.
    EnterDashboard,
}

/// Decide the next bootstrap step.
///
/// Facts are checked in dependency order: nothing can proceed while loading,
/// config needs a tenant, login needs config.
pub fn next_action(state: &BootstrapState) -> BootstrapAction {
    if state.is_loading {
        return BootstrapAction::Wait;
    }
    if state.tenant_id.is_none() {
        return BootstrapAction::SelectTenant;
    }
    if !state.has_config {
        return BootstrapAction::LoadConfig;
    }
    if !state.is_authenticated {
        return BootstrapAction::RedirectToLogin;
    }
    BootstrapAction::EnterDashboard
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(
        tenant: Option<&str>,
        has_config: bool,
        is_authenticated: bool,
        is_loading: bool,
    ) -> BootstrapState {
        BootstrapState {
            tenant_id: tenant.map(|t| TenantId::new(t).unwrap()),
            has_config,
            is_authenticated,
            is_loading,
        }
    }

    #[test]
    fn loading_always_waits() {
        for (tenant, config, auth) in [
            (None, false, false),
            (Some("acme"), false, false),
            (Some("acme"), true, false),
            (Some("acme"), true, true),
        ] {
            assert_eq!(
                next_action(&state(tenant, config, auth, true)),
                BootstrapAction::Wait
            );
        }
    }

    #[test]
    fn missing_tenant_selects_tenant_regardless_of_other_flags() {
        for (config, auth) in [(false, false), (true, false), (false, true), (true, true)] {
            assert_eq!(
                next_action(&state(None, config, auth, false)),
                BootstrapAction::SelectTenant
            );
        }
    }

    #[test]
    fn tenant_without_config_loads_config() {
        assert_eq!(
            next_action(&state(Some("acme"), false, false, false)),
            BootstrapAction::LoadConfig
        );
        // Even a (stale) authenticated flag cannot skip config loading.
        assert_eq!(
            next_action(&state(Some("acme"), false, true, false)),
            BootstrapAction::LoadConfig
        );
    }

    #[test]
    fn config_without_session_redirects_to_login() {
        assert_eq!(
            next_action(&state(Some("acme"), true, false, false)),
            BootstrapAction::RedirectToLogin
        );
    }

    #[test]
    fn fully_bootstrapped_enters_dashboard() {
        assert_eq!(
            next_action(&state(Some("acme"), true, true, false)),
            BootstrapAction::EnterDashboard
        );
    }

    #[test]
    fn clear_tenant_restarts_the_flow() {
        let mut s = state(Some("acme"), true, true, false);
        s.clear_tenant();
        assert_eq!(next_action(&s), BootstrapAction::SelectTenant);
        assert_eq!(s, state(None, false, false, false));
    }
}
