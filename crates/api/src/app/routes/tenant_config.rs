//! Pre-auth tenant-config bootstrap proxy.
//!
//! The browser calls this before any login exists, so it is unauthenticated
//! by design; it only hands out the public OIDC bootstrap record.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Query},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;

use tenantdesk_core::TenantId;

use crate::app::errors;
use crate::app::services::AppServices;

#[derive(Debug, Deserialize)]
pub struct TenantQuery {
    #[serde(rename = "tenantId")]
    tenant_id: Option<String>,
}

pub async fn get_config_params(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<TenantQuery>,
) -> axum::response::Response {
    let Some(raw) = query.tenant_id else {
        return errors::json_error(StatusCode::BAD_REQUEST, "missing_tenant", "tenantId is required");
    };

    let tenant_id = match TenantId::new(raw) {
        Ok(tenant_id) => tenant_id,
        Err(e) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_tenant", e.to_string()),
    };

    tracing::debug!(tenant = %tenant_id, "proxying tenant-config request");

    match services.control_plane.get_config_params(&tenant_id).await {
        Ok(params) => (StatusCode::OK, Json(params)).into_response(),
        Err(e) => errors::control_plane_error_to_response(e),
    }
}
