use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use chrono::Utc;

use tenantdesk_auth::Permission;
use tenantdesk_core::TenantId;
use tenantdesk_infra::with_retry;
use tenantdesk_orders::{CreateOrder, OrderId, OrderStats, UpdateOrder};

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::{PrincipalContext, TenantContext};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_orders).post(create_order))
        .route("/stats", get(order_stats))
        .route("/:id", get(get_order).put(update_order).delete(delete_order))
}

fn order_storage_key(tenant_id: &TenantId, raw: &str) -> Result<String, axum::response::Response> {
    let order_id: OrderId = raw
        .parse()
        .map_err(|_| errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid order id"))?;
    Ok(format!("{tenant_id}#{order_id}"))
}

pub async fn list_orders(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    if let Err(e) = crate::authz::require_permission(&tenant, &principal, &Permission::new("orders.read")) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }

    match with_retry("orders.list", services.retry, || {
        services.orders.list(tenant.tenant_id())
    })
    .await
    {
        Ok(items) => {
            let items = items.iter().map(dto::order_to_json).collect::<Vec<_>>();
            (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn create_order(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<CreateOrder>,
) -> axum::response::Response {
    if let Err(e) = crate::authz::require_permission(&tenant, &principal, &Permission::new("orders.write")) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }

    let order = match body.into_order(tenant.tenant_id().clone(), Utc::now()) {
        Ok(order) => order,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match with_retry("orders.create", services.retry, || {
        services.orders.create(order.clone())
    })
    .await
    {
        Ok(stored) => (StatusCode::CREATED, Json(dto::order_to_json(&stored))).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn get_order(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(e) = crate::authz::require_permission(&tenant, &principal, &Permission::new("orders.read")) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }

    let key = match order_storage_key(tenant.tenant_id(), &id) {
        Ok(key) => key,
        Err(resp) => return resp,
    };

    match with_retry("orders.get", services.retry, || {
        services.orders.get(tenant.tenant_id(), &key)
    })
    .await
    {
        Ok(Some(order)) => (StatusCode::OK, Json(dto::order_to_json(&order))).into_response(),
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "Order not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn update_order(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<UpdateOrder>,
) -> axum::response::Response {
    if let Err(e) = crate::authz::require_permission(&tenant, &principal, &Permission::new("orders.write")) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }

    let key = match order_storage_key(tenant.tenant_id(), &id) {
        Ok(key) => key,
        Err(resp) => return resp,
    };

    let existing = match with_retry("orders.get", services.retry, || {
        services.orders.get(tenant.tenant_id(), &key)
    })
    .await
    {
        Ok(Some(order)) => order,
        Ok(None) => return errors::json_error(StatusCode::NOT_FOUND, "not_found", "Order not found"),
        Err(e) => return errors::store_error_to_response(e),
    };

    let mut updated = existing;
    if let Err(e) = body.apply_to(&mut updated, Utc::now()) {
        return errors::domain_error_to_response(e);
    }

    match with_retry("orders.put", services.retry, || {
        services.orders.put(updated.clone())
    })
    .await
    {
        Ok(stored) => (StatusCode::OK, Json(dto::order_to_json(&stored))).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn delete_order(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(e) = crate::authz::require_permission(&tenant, &principal, &Permission::new("orders.write")) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }

    let key = match order_storage_key(tenant.tenant_id(), &id) {
        Ok(key) => key,
        Err(resp) => return resp,
    };

    match with_retry("orders.delete", services.retry, || {
        services.orders.delete(tenant.tenant_id(), &key)
    })
    .await
    {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({ "message": "Order deleted successfully" })),
        )
            .into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn order_stats(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    if let Err(e) = crate::authz::require_permission(&tenant, &principal, &Permission::new("orders.read")) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }

    match with_retry("orders.list", services.retry, || {
        services.orders.list(tenant.tenant_id())
    })
    .await
    {
        Ok(items) => {
            let stats = OrderStats::from_orders(&items);
            (StatusCode::OK, Json(dto::order_stats_to_json(&stats))).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}
