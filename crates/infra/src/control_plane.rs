//! HTTP client for the external control plane.
//!
//! The control plane (API Gateway + Lambda in the reference deployment) owns
//! tenant onboarding and per-tenant auth configuration. This client wraps its
//! REST surface: `tenant-config`, `tenants` and `tenant-registrations`.

use std::time::Duration;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use tenantdesk_core::TenantId;
use tenantdesk_tenants::{
    ConfigParams, CreateTenantRequest, RegistrationStatus, Tenant, TenantConfig, TenantData,
    TenantRegistration, TenantRegistrationData,
};

/// Whole-request timeout for control-plane calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Tighter budget for the health probe.
const HEALTH_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum ControlPlaneError {
    #[error("control plane request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("control plane returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("control plane payload could not be decoded: {0}")]
    Decode(String),
}

impl ControlPlaneError {
    /// Upstream HTTP status, when the failure carries one.
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[derive(Clone)]
pub struct ControlPlaneClient {
    http: reqwest::Client,
    base_url: String,
}

impl ControlPlaneClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ControlPlaneError> {
        let http = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    fn authed(&self, req: reqwest::RequestBuilder, token: Option<&str>) -> reqwest::RequestBuilder {
        match token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    // ── tenant-config ───────────────────────────────────────────────────

    /// Bootstrap `ConfigParams` for a tenant (unauthenticated, app init path).
    pub async fn get_config_params(
        &self,
        tenant_id: &TenantId,
    ) -> Result<ConfigParams, ControlPlaneError> {
        let resp = self
            .http
            .get(self.url("tenant-config"))
            .query(&[("tenantId", tenant_id.as_str())])
            .send()
            .await?;
        expect_json(resp).await
    }

    /// Full tenant configuration (admin path). The control plane serves this
    /// in DynamoDB attribute-value form.
    pub async fn get_tenant_config(
        &self,
        tenant_id: &TenantId,
        token: Option<&str>,
    ) -> Result<TenantConfig, ControlPlaneError> {
        let req = self
            .http
            .get(self.url(&format!("tenant-config/{tenant_id}")));
        let raw: RawTenantConfig = expect_json(self.authed(req, token).send().await?).await?;
        raw.try_into()
    }

    pub async fn update_tenant_config(
        &self,
        tenant_id: &TenantId,
        patch: &Value,
        token: Option<&str>,
    ) -> Result<TenantConfig, ControlPlaneError> {
        let req = self
            .http
            .put(self.url(&format!("tenant-config/{tenant_id}")))
            .json(patch);
        let raw: RawTenantConfig = expect_json(self.authed(req, token).send().await?).await?;
        raw.try_into()
    }

    pub async fn delete_tenant_config(
        &self,
        tenant_id: &TenantId,
        token: Option<&str>,
    ) -> Result<(), ControlPlaneError> {
        let req = self
            .http
            .delete(self.url(&format!("tenant-config/{tenant_id}")));
        expect_ok(self.authed(req, token).send().await?).await
    }

    // ── tenants ─────────────────────────────────────────────────────────

    pub async fn list_tenants(&self, token: Option<&str>) -> Result<Vec<Tenant>, ControlPlaneError> {
        let req = self.http.get(self.url("tenants"));
        let value: Value = expect_json(self.authed(req, token).send().await?).await?;
        collection(value)?
            .into_iter()
            .map(tenant_from_value)
            .collect()
    }

    pub async fn get_tenant(
        &self,
        tenant_id: &TenantId,
        token: Option<&str>,
    ) -> Result<Tenant, ControlPlaneError> {
        let req = self.http.get(self.url(&format!("tenants/{tenant_id}")));
        let value: Value = expect_json(self.authed(req, token).send().await?).await?;
        tenant_from_value(value)
    }

    pub async fn update_tenant(
        &self,
        tenant_id: &TenantId,
        patch: &Value,
        token: Option<&str>,
    ) -> Result<Tenant, ControlPlaneError> {
        let req = self
            .http
            .put(self.url(&format!("tenants/{tenant_id}")))
            .json(patch);
        let value: Value = expect_json(self.authed(req, token).send().await?).await?;
        tenant_from_value(value)
    }

    pub async fn delete_tenant(
        &self,
        tenant_id: &TenantId,
        token: Option<&str>,
    ) -> Result<(), ControlPlaneError> {
        let req = self.http.delete(self.url(&format!("tenants/{tenant_id}")));
        expect_ok(self.authed(req, token).send().await?).await
    }

    // ── tenant-registrations ────────────────────────────────────────────

    pub async fn list_registrations(
        &self,
        token: Option<&str>,
    ) -> Result<Vec<TenantRegistration>, ControlPlaneError> {
        let req = self.http.get(self.url("tenant-registrations"));
        let value: Value = expect_json(self.authed(req, token).send().await?).await?;
        collection(value)?
            .into_iter()
            .map(|v| serde_json::from_value(v).map_err(|e| ControlPlaneError::Decode(e.to_string())))
            .collect()
    }

    pub async fn get_registration(
        &self,
        registration_id: &str,
        token: Option<&str>,
    ) -> Result<TenantRegistration, ControlPlaneError> {
        let req = self
            .http
            .get(self.url(&format!("tenant-registrations/{registration_id}")));
        expect_json(self.authed(req, token).send().await?).await
    }

    /// Register a new tenant; the control plane answers with the provisioned
    /// tenant record.
    pub async fn create_registration(
        &self,
        request: &CreateTenantRequest,
        token: Option<&str>,
    ) -> Result<Tenant, ControlPlaneError> {
        let req = self.http.post(self.url("tenant-registrations")).json(request);
        let value: Value = expect_json(self.authed(req, token).send().await?).await?;
        tenant_from_value(value)
    }

    pub async fn update_registration(
        &self,
        registration_id: &str,
        patch: &Value,
        token: Option<&str>,
    ) -> Result<TenantRegistration, ControlPlaneError> {
        let req = self
            .http
            .patch(self.url(&format!("tenant-registrations/{registration_id}")))
            .json(patch);
        expect_json(self.authed(req, token).send().await?).await
    }

    pub async fn delete_registration(
        &self,
        registration_id: &str,
        token: Option<&str>,
    ) -> Result<(), ControlPlaneError> {
        let req = self
            .http
            .delete(self.url(&format!("tenant-registrations/{registration_id}")));
        expect_ok(self.authed(req, token).send().await?).await
    }

    // ── health ──────────────────────────────────────────────────────────

    pub async fn health(&self) -> Result<(), ControlPlaneError> {
        let resp = self
            .http
            .get(self.url("health"))
            .timeout(HEALTH_TIMEOUT)
            .send()
            .await?;
        expect_ok(resp).await
    }
}

async fn expect_ok(resp: reqwest::Response) -> Result<(), ControlPlaneError> {
    let status = resp.status();
    if status.is_success() {
        Ok(())
    } else {
        let body = resp.text().await.unwrap_or_default();
        Err(ControlPlaneError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

async fn expect_json<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, ControlPlaneError> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(ControlPlaneError::Status {
            status: status.as_u16(),
            body,
        });
    }
    resp.json()
        .await
        .map_err(|e| ControlPlaneError::Decode(e.to_string()))
}

/// List payloads arrive either as a bare array or wrapped in `{"data": [...]}`.
fn collection(value: Value) -> Result<Vec<Value>, ControlPlaneError> {
    match value {
        Value::Array(items) => Ok(items),
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Array(items)) => Ok(items),
            _ => Err(ControlPlaneError::Decode(
                "expected an array or a 'data' array".to_string(),
            )),
        },
        _ => Err(ControlPlaneError::Decode(
            "expected an array or a 'data' array".to_string(),
        )),
    }
}

/// The control plane serves tenants flat; nest them into the domain shape.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTenant {
    tenant_id: TenantId,
    tenant_name: String,
    company_name: String,
    tier: String,
    email: String,
    registration_status: RegistrationStatus,
}

fn tenant_from_value(value: Value) -> Result<Tenant, ControlPlaneError> {
    let raw: RawTenant =
        serde_json::from_value(value).map_err(|e| ControlPlaneError::Decode(e.to_string()))?;
    Ok(Tenant {
        tenant_id: raw.tenant_id,
        tenant_data: TenantData {
            tenant_name: raw.tenant_name,
            company_name: raw.company_name,
            tier: raw.tier,
            email: raw.email,
        },
        tenant_registration_data: TenantRegistrationData {
            registration_status: raw.registration_status,
        },
    })
}

// ── tenant-config wire format ───────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct AttrS {
    #[serde(rename = "S")]
    value: String,
}

#[derive(Debug, Deserialize)]
struct AttrBool {
    #[serde(rename = "BOOL")]
    value: bool,
}

#[derive(Debug, Deserialize)]
struct AttrN {
    #[serde(rename = "N")]
    value: String,
}

/// DynamoDB attribute-value form of a tenant-config record, exactly as the
/// control plane emits it.
#[derive(Debug, Deserialize)]
struct RawTenantConfig {
    #[serde(rename = "TENANT_ID")]
    tenant_id: AttrS,
    #[serde(rename = "AUTH_SERVER")]
    auth_server: AttrS,
    #[serde(rename = "AUTH_CLIENT_ID")]
    client_id: AttrS,
    #[serde(rename = "AUTH_REDIRECT_URI")]
    redirect_uri: AttrS,
    #[serde(rename = "AUTH_SR_REDIRECT_URI")]
    silent_redirect_uri: AttrS,
    #[serde(rename = "AUTH_SR_TIMEOUT")]
    silent_renew_timeout: AttrN,
    #[serde(rename = "AUTH_USE_SR")]
    use_silent_renew: AttrBool,
    #[serde(rename = "AUTH_SESSION_CHECKS_ENABLED")]
    session_checks_enabled: AttrBool,
    #[serde(rename = "AUTH_CLEAR_HASH_AFTER_LOGIN")]
    clear_hash_after_login: AttrBool,
    #[serde(rename = "AUTH_SHOW_DEBUG_INFO")]
    show_debug_info: AttrBool,
    #[serde(rename = "AUTH_TIMEOUT_FACTOR")]
    timeout_factor: AttrN,
    #[serde(rename = "COGNITO_DOMAIN")]
    cognito_domain: AttrS,
    #[serde(rename = "COMPANY_NAME")]
    company_name: AttrS,
    #[serde(rename = "PLAN")]
    plan: AttrS,
    #[serde(rename = "TENANT_EMAIL")]
    tenant_email: AttrS,
}

impl TryFrom<RawTenantConfig> for TenantConfig {
    type Error = ControlPlaneError;

    fn try_from(raw: RawTenantConfig) -> Result<Self, Self::Error> {
        let decode = |field: &str, err: String| {
            ControlPlaneError::Decode(format!("tenant-config field {field}: {err}"))
        };

        Ok(TenantConfig {
            tenant_id: TenantId::new(raw.tenant_id.value)
                .map_err(|e| decode("TENANT_ID", e.to_string()))?,
            auth_server: raw.auth_server.value,
            client_id: raw.client_id.value,
            redirect_uri: raw.redirect_uri.value,
            silent_redirect_uri: raw.silent_redirect_uri.value,
            silent_renew_timeout: raw
                .silent_renew_timeout
                .value
                .parse()
                .map_err(|e: std::num::ParseIntError| decode("AUTH_SR_TIMEOUT", e.to_string()))?,
            use_silent_renew: raw.use_silent_renew.value,
            session_checks_enabled: raw.session_checks_enabled.value,
            clear_hash_after_login: raw.clear_hash_after_login.value,
            show_debug_info: raw.show_debug_info.value,
            timeout_factor: raw
                .timeout_factor
                .value
                .parse()
                .map_err(|e: std::num::ParseFloatError| decode("AUTH_TIMEOUT_FACTOR", e.to_string()))?,
            cognito_domain: raw.cognito_domain.value,
            company_name: raw.company_name.value,
            plan: raw.plan.value,
            tenant_email: raw.tenant_email.value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn tenant(id: &str) -> TenantId {
        TenantId::new(id).unwrap()
    }

    fn raw_config_json(tenant_id: &str) -> Value {
        json!({
            "TENANT_ID": { "S": tenant_id },
            "AUTH_SERVER": { "S": "https://cognito-idp.example.com/pool" },
            "AUTH_CLIENT_ID": { "S": "client-123" },
            "AUTH_REDIRECT_URI": { "S": "https://app.example.com/auth/callback" },
            "AUTH_SR_REDIRECT_URI": { "S": "https://app.example.com/auth/silent" },
            "AUTH_SR_TIMEOUT": { "N": "10000" },
            "AUTH_USE_SR": { "BOOL": true },
            "AUTH_SESSION_CHECKS_ENABLED": { "BOOL": false },
            "AUTH_CLEAR_HASH_AFTER_LOGIN": { "BOOL": true },
            "AUTH_SHOW_DEBUG_INFO": { "BOOL": false },
            "AUTH_TIMEOUT_FACTOR": { "N": "0.75" },
            "COGNITO_DOMAIN": { "S": "acme.auth.example.com" },
            "COMPANY_NAME": { "S": "Acme Corp" },
            "PLAN": { "S": "standard" },
            "TENANT_EMAIL": { "S": "ops@acme.example" }
        })
    }

    #[tokio::test]
    async fn fetches_config_params_by_tenant_query() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/tenant-config")
                .query_param("tenantId", "acme");
            then.status(200).json_body(json!({
                "authServer": "https://cognito-idp.example.com/pool",
                "appClientId": "client-123",
                "redirectUrl": "https://app.example.com/auth/callback"
            }));
        });

        let client = ControlPlaneClient::new(server.base_url()).unwrap();
        let params = client.get_config_params(&tenant("acme")).await.unwrap();

        mock.assert();
        assert_eq!(params.app_client_id, "client-123");
    }

    #[tokio::test]
    async fn surfaces_upstream_error_status() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/tenant-config");
            then.status(404).body("tenant not found");
        });

        let client = ControlPlaneClient::new(server.base_url()).unwrap();
        let err = client.get_config_params(&tenant("ghost")).await.unwrap_err();

        assert_eq!(err.upstream_status(), Some(404));
        assert!(err.to_string().contains("tenant not found"));
    }

    #[tokio::test]
    async fn decodes_attribute_value_tenant_config() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/tenant-config/acme");
            then.status(200).json_body(raw_config_json("acme"));
        });

        let client = ControlPlaneClient::new(server.base_url()).unwrap();
        let config = client.get_tenant_config(&tenant("acme"), None).await.unwrap();

        assert_eq!(config.tenant_id.as_str(), "acme");
        assert_eq!(config.silent_renew_timeout, 10_000);
        assert_eq!(config.timeout_factor, 0.75);
        assert!(config.use_silent_renew);
        assert_eq!(config.company_name, "Acme Corp");
    }

    #[tokio::test]
    async fn lists_tenants_from_bare_and_enveloped_arrays() {
        let tenant_json = json!({
            "tenantId": "acme",
            "tenantName": "Acme",
            "companyName": "Acme Corp",
            "tier": "standard",
            "email": "ops@acme.example",
            "registrationStatus": "Active"
        });

        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/tenants");
            then.status(200).json_body(json!({ "data": [tenant_json] }));
        });

        let client = ControlPlaneClient::new(server.base_url()).unwrap();
        let tenants = client.list_tenants(None).await.unwrap();

        assert_eq!(tenants.len(), 1);
        assert_eq!(tenants[0].tenant_id.as_str(), "acme");
        assert_eq!(tenants[0].tenant_data.company_name, "Acme Corp");
        assert!(tenants[0]
            .tenant_registration_data
            .registration_status
            .is_active());
    }

    #[tokio::test]
    async fn forwards_bearer_tokens_on_admin_calls() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(DELETE)
                .path("/tenants/acme")
                .header("authorization", "Bearer sekrit");
            then.status(204);
        });

        let client = ControlPlaneClient::new(server.base_url()).unwrap();
        client.delete_tenant(&tenant("acme"), Some("sekrit")).await.unwrap();
        mock.assert();
    }

    #[tokio::test]
    async fn registration_create_posts_the_request_body() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/tenant-registrations")
                .json_body_partial(r#"{ "companyName": "Acme Corp" }"#);
            then.status(201).json_body(json!({
                "tenantId": "acme-corp",
                "tenantName": "Acme",
                "companyName": "Acme Corp",
                "tier": "basic",
                "email": "ops@acme.example",
                "registrationStatus": "Pending"
            }));
        });

        let client = ControlPlaneClient::new(server.base_url()).unwrap();
        let request = CreateTenantRequest {
            tenant_name: "Acme".to_string(),
            company_name: "Acme Corp".to_string(),
            tier: "basic".to_string(),
            email: "ops@acme.example".to_string(),
        };
        let created = client.create_registration(&request, None).await.unwrap();

        mock.assert();
        assert_eq!(created.tenant_id.as_str(), "acme-corp");
    }
}
