use serde::{Deserialize, Serialize};

use tenantdesk_core::{TenantId, ValueObject};

/// Minimal OIDC bootstrap record served per tenant id.
///
/// This is the unauthenticated payload the app fetches before any login can
/// happen; everything else in [`TenantConfig`] is admin-plane detail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigParams {
    pub auth_server: String,
    pub app_client_id: String,
    pub redirect_url: String,
}

impl ValueObject for ConfigParams {}

/// Full per-tenant authentication configuration record.
///
/// The control plane stores this in DynamoDB attribute-value form; the infra
/// layer decodes the wire format into this plain representation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantConfig {
    pub tenant_id: TenantId,
    pub auth_server: String,
    pub client_id: String,
    pub redirect_uri: String,
    pub silent_redirect_uri: String,
    /// Silent-renew request timeout in milliseconds.
    pub silent_renew_timeout: u32,
    pub use_silent_renew: bool,
    pub session_checks_enabled: bool,
    pub clear_hash_after_login: bool,
    pub show_debug_info: bool,
    pub timeout_factor: f64,
    pub cognito_domain: String,
    pub company_name: String,
    pub plan: String,
    pub tenant_email: String,
}

impl TenantConfig {
    /// Project the bootstrap subset handed out pre-authentication.
    pub fn bootstrap_params(&self) -> ConfigParams {
        ConfigParams {
            auth_server: self.auth_server.clone(),
            app_client_id: self.client_id.clone(),
            redirect_url: self.redirect_uri.clone(),
        }
    }
}

/// OIDC client settings in the shape the authorization-code flow consumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OidcClientSettings {
    pub authority: String,
    pub client_id: String,
    pub redirect_uri: String,
    pub silent_redirect_uri: String,
    pub response_type: String,
    pub scope: String,
    pub load_user_info: bool,
    pub automatic_silent_renew: bool,
    pub silent_request_timeout: u32,
    pub monitor_session: bool,
    pub clear_hash_after_login: bool,
    pub debug: bool,
}

impl OidcClientSettings {
    /// Build the settings record for a tenant's app client.
    ///
    /// Always the authorization-code flow with the standard identity scopes;
    /// everything tunable comes from the tenant's configuration.
    pub fn for_tenant(config: &TenantConfig) -> Self {
        Self {
            authority: config.auth_server.clone(),
            client_id: config.client_id.clone(),
            redirect_uri: config.redirect_uri.clone(),
            silent_redirect_uri: config.silent_redirect_uri.clone(),
            response_type: "code".to_string(),
            scope: "openid profile email".to_string(),
            load_user_info: true,
            automatic_silent_renew: config.use_silent_renew,
            silent_request_timeout: config.silent_renew_timeout,
            monitor_session: config.session_checks_enabled,
            clear_hash_after_login: config.clear_hash_after_login,
            debug: config.show_debug_info,
        }
    }
}
