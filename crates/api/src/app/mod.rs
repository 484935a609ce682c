//! HTTP API application wiring (Axum router + service wiring).
//!
//! Layout:
//! - `services.rs`: infrastructure wiring (stores, control-plane client)
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: response JSON mapping helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router, routing::get};
use tower::ServiceBuilder;

use tenantdesk_infra::AppConfig;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub async fn build_app(config: AppConfig) -> Router {
    let services = Arc::new(services::build_services(config).await);
    build_app_with_services(services)
}

/// Router over pre-built services; tests inject in-memory stores and a mocked
/// control plane here.
pub fn build_app_with_services(services: Arc<services::AppServices>) -> Router {
    let jwt = Arc::new(tenantdesk_auth::Hs256JwtValidator::new(
        services.config.jwt_secret.as_bytes(),
    ));
    let auth_state = middleware::AuthState { jwt };

    // Protected routes: require auth + tenant context.
    let protected = routes::router()
        .layer(Extension(services.clone()))
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            middleware::auth_middleware,
        ));

    // Public routes: health + the pre-auth tenant-config bootstrap proxy.
    Router::new()
        .route("/health", get(routes::system::health))
        .route("/tenant-config", get(routes::tenant_config::get_config_params))
        .layer(Extension(services))
        .merge(protected)
        .layer(ServiceBuilder::new().layer(axum::middleware::from_fn(middleware::cors_middleware)))
}
