//! Control-plane admin surface (tenants, registrations, full tenant-config).
//!
//! These routes proxy to the external control plane with the caller's bearer
//! token forwarded, so the control plane still sees the real principal.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};

use tenantdesk_auth::Permission;
use tenantdesk_core::TenantId;
use tenantdesk_tenants::{CreateTenantRequest, TenantStats};

use crate::app::errors;
use crate::app::services::AppServices;
use crate::context::{BearerToken, PrincipalContext, TenantContext};

pub fn router() -> Router {
    Router::new()
        .route("/tenants", get(list_tenants))
        .route("/tenants/stats", get(tenant_stats))
        .route(
            "/tenants/:id",
            get(get_tenant).put(update_tenant).delete(delete_tenant),
        )
        .route("/registrations", get(list_registrations).post(create_registration))
        .route(
            "/registrations/:id",
            get(get_registration)
                .patch(update_registration)
                .delete(delete_registration),
        )
        .route(
            "/tenant-config/:id",
            get(get_tenant_config)
                .put(update_tenant_config)
                .delete(delete_tenant_config),
        )
}

fn guard(
    tenant: &TenantContext,
    principal: &PrincipalContext,
) -> Result<(), axum::response::Response> {
    crate::authz::require_permission(tenant, principal, &Permission::new("tenants.admin"))
        .map_err(|e| errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string()))
}

fn parse_tenant(raw: &str) -> Result<TenantId, axum::response::Response> {
    TenantId::new(raw)
        .map_err(|e| errors::json_error(StatusCode::BAD_REQUEST, "invalid_tenant", e.to_string()))
}

pub async fn list_tenants(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Extension(token): Extension<BearerToken>,
) -> axum::response::Response {
    if let Err(resp) = guard(&tenant, &principal) {
        return resp;
    }

    match services.control_plane.list_tenants(Some(token.as_str())).await {
        Ok(tenants) => (StatusCode::OK, Json(serde_json::json!({ "items": tenants }))).into_response(),
        Err(e) => errors::control_plane_error_to_response(e),
    }
}

pub async fn tenant_stats(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Extension(token): Extension<BearerToken>,
) -> axum::response::Response {
    if let Err(resp) = guard(&tenant, &principal) {
        return resp;
    }

    match services.control_plane.list_tenants(Some(token.as_str())).await {
        Ok(tenants) => {
            let stats = TenantStats::from_tenants(&tenants);
            (StatusCode::OK, Json(stats)).into_response()
        }
        Err(e) => errors::control_plane_error_to_response(e),
    }
}

pub async fn get_tenant(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Extension(token): Extension<BearerToken>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(resp) = guard(&tenant, &principal) {
        return resp;
    }
    let target = match parse_tenant(&id) {
        Ok(target) => target,
        Err(resp) => return resp,
    };

    match services.control_plane.get_tenant(&target, Some(token.as_str())).await {
        Ok(found) => (StatusCode::OK, Json(found)).into_response(),
        Err(e) => errors::control_plane_error_to_response(e),
    }
}

pub async fn update_tenant(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Extension(token): Extension<BearerToken>,
    Path(id): Path<String>,
    Json(patch): Json<serde_json::Value>,
) -> axum::response::Response {
    if let Err(resp) = guard(&tenant, &principal) {
        return resp;
    }
    let target = match parse_tenant(&id) {
        Ok(target) => target,
        Err(resp) => return resp,
    };

    match services
        .control_plane
        .update_tenant(&target, &patch, Some(token.as_str()))
        .await
    {
        Ok(updated) => (StatusCode::OK, Json(updated)).into_response(),
        Err(e) => errors::control_plane_error_to_response(e),
    }
}

pub async fn delete_tenant(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Extension(token): Extension<BearerToken>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(resp) = guard(&tenant, &principal) {
        return resp;
    }
    let target = match parse_tenant(&id) {
        Ok(target) => target,
        Err(resp) => return resp,
    };

    match services
        .control_plane
        .delete_tenant(&target, Some(token.as_str()))
        .await
    {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::control_plane_error_to_response(e),
    }
}

pub async fn list_registrations(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Extension(token): Extension<BearerToken>,
) -> axum::response::Response {
    if let Err(resp) = guard(&tenant, &principal) {
        return resp;
    }

    match services
        .control_plane
        .list_registrations(Some(token.as_str()))
        .await
    {
        Ok(items) => (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response(),
        Err(e) => errors::control_plane_error_to_response(e),
    }
}

pub async fn create_registration(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Extension(token): Extension<BearerToken>,
    Json(body): Json<CreateTenantRequest>,
) -> axum::response::Response {
    if let Err(resp) = guard(&tenant, &principal) {
        return resp;
    }
    if let Err(e) = body.validate() {
        return errors::domain_error_to_response(e);
    }

    match services
        .control_plane
        .create_registration(&body, Some(token.as_str()))
        .await
    {
        Ok(created) => (StatusCode::CREATED, Json(created)).into_response(),
        Err(e) => errors::control_plane_error_to_response(e),
    }
}

pub async fn get_registration(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Extension(token): Extension<BearerToken>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(resp) = guard(&tenant, &principal) {
        return resp;
    }

    match services
        .control_plane
        .get_registration(&id, Some(token.as_str()))
        .await
    {
        Ok(found) => (StatusCode::OK, Json(found)).into_response(),
        Err(e) => errors::control_plane_error_to_response(e),
    }
}

pub async fn update_registration(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Extension(token): Extension<BearerToken>,
    Path(id): Path<String>,
    Json(patch): Json<serde_json::Value>,
) -> axum::response::Response {
    if let Err(resp) = guard(&tenant, &principal) {
        return resp;
    }

    match services
        .control_plane
        .update_registration(&id, &patch, Some(token.as_str()))
        .await
    {
        Ok(updated) => (StatusCode::OK, Json(updated)).into_response(),
        Err(e) => errors::control_plane_error_to_response(e),
    }
}

pub async fn delete_registration(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Extension(token): Extension<BearerToken>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(resp) = guard(&tenant, &principal) {
        return resp;
    }

    match services
        .control_plane
        .delete_registration(&id, Some(token.as_str()))
        .await
    {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::control_plane_error_to_response(e),
    }
}

pub async fn get_tenant_config(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Extension(token): Extension<BearerToken>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(resp) = guard(&tenant, &principal) {
        return resp;
    }
    let target = match parse_tenant(&id) {
        Ok(target) => target,
        Err(resp) => return resp,
    };

    match services
        .control_plane
        .get_tenant_config(&target, Some(token.as_str()))
        .await
    {
        Ok(config) => (StatusCode::OK, Json(config)).into_response(),
        Err(e) => errors::control_plane_error_to_response(e),
    }
}

pub async fn update_tenant_config(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Extension(token): Extension<BearerToken>,
    Path(id): Path<String>,
    Json(patch): Json<serde_json::Value>,
) -> axum::response::Response {
    if let Err(resp) = guard(&tenant, &principal) {
        return resp;
    }
    let target = match parse_tenant(&id) {
        Ok(target) => target,
        Err(resp) => return resp,
    };

    match services
        .control_plane
        .update_tenant_config(&target, &patch, Some(token.as_str()))
        .await
    {
        Ok(updated) => (StatusCode::OK, Json(updated)).into_response(),
        Err(e) => errors::control_plane_error_to_response(e),
    }
}

pub async fn delete_tenant_config(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Extension(token): Extension<BearerToken>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(resp) = guard(&tenant, &principal) {
        return resp;
    }
    let target = match parse_tenant(&id) {
        Ok(target) => target,
        Err(resp) => return resp,
    };

    match services
        .control_plane
        .delete_tenant_config(&target, Some(token.as_str()))
        .await
    {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::control_plane_error_to_response(e),
    }
}
