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
use tenantdesk_infra::with_retry;
use tenantdesk_products::{CreateProduct, ProductKey, ProductStats, UpdateProduct};

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::{PrincipalContext, TenantContext};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route("/stats", get(product_stats))
        .route(
            "/:id",
            get(get_product).put(update_product).delete(delete_product),
        )
}

pub async fn list_products(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    if let Err(e) = crate::authz::require_permission(&tenant, &principal, &Permission::new("products.read")) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }

    let items = match with_retry("products.list", services.retry, || {
        services.products.list(tenant.tenant_id())
    })
    .await
    {
        Ok(items) => items,
        Err(e) => return errors::store_error_to_response(e),
    };

    let items = items.iter().map(dto::product_to_json).collect::<Vec<_>>();
    (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
}

pub async fn create_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<CreateProduct>,
) -> axum::response::Response {
    if let Err(e) = crate::authz::require_permission(&tenant, &principal, &Permission::new("products.write")) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }

    let product = match body.into_product(tenant.tenant_id().clone(), Utc::now()) {
        Ok(product) => product,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match with_retry("products.create", services.retry, || {
        services.products.create(product.clone())
    })
    .await
    {
        Ok(stored) => (StatusCode::CREATED, Json(dto::product_to_json(&stored))).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn get_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(e) = crate::authz::require_permission(&tenant, &principal, &Permission::new("products.read")) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }

    let key = match ProductKey::qualify(tenant.tenant_id(), &id) {
        Ok(key) => key.storage_key(),
        Err(e) => return errors::domain_error_to_response(e),
    };

    match with_retry("products.get", services.retry, || {
        services.products.get(tenant.tenant_id(), &key)
    })
    .await
    {
        Ok(Some(product)) => (StatusCode::OK, Json(dto::product_to_json(&product))).into_response(),
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "Product not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn update_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<UpdateProduct>,
) -> axum::response::Response {
    if let Err(e) = crate::authz::require_permission(&tenant, &principal, &Permission::new("products.write")) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }

    let key = match ProductKey::qualify(tenant.tenant_id(), &id) {
        Ok(key) => key.storage_key(),
        Err(e) => return errors::domain_error_to_response(e),
    };

    let existing = match with_retry("products.get", services.retry, || {
        services.products.get(tenant.tenant_id(), &key)
    })
    .await
    {
        Ok(Some(product)) => product,
        Ok(None) => return errors::json_error(StatusCode::NOT_FOUND, "not_found", "Product not found"),
        Err(e) => return errors::store_error_to_response(e),
    };

    let mut updated = existing;
    if let Err(e) = body.apply_to(&mut updated, Utc::now()) {
        return errors::domain_error_to_response(e);
    }

    match with_retry("products.put", services.retry, || {
        services.products.put(updated.clone())
    })
    .await
    {
        Ok(stored) => (StatusCode::OK, Json(dto::product_to_json(&stored))).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn delete_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(e) = crate::authz::require_permission(&tenant, &principal, &Permission::new("products.write")) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }

    let key = match ProductKey::qualify(tenant.tenant_id(), &id) {
        Ok(key) => key.storage_key(),
        Err(e) => return errors::domain_error_to_response(e),
    };

    match with_retry("products.delete", services.retry, || {
        services.products.delete(tenant.tenant_id(), &key)
    })
    .await
    {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({ "message": "Product deleted successfully" })),
        )
            .into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn product_stats(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    if let Err(e) = crate::authz::require_permission(&tenant, &principal, &Permission::new("products.read")) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }

    match with_retry("products.list", services.retry, || {
        services.products.list(tenant.tenant_id())
    })
    .await
    {
        Ok(items) => {
            let stats = ProductStats::from_products(&items);
            (StatusCode::OK, Json(dto::product_stats_to_json(&stats))).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}
