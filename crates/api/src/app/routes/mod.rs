use axum::{Router, routing::get};

pub mod admin;
pub mod orders;
pub mod products;
pub mod system;
pub mod tenant_config;

/// Router for all authenticated (tenant-scoped) endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .nest("/products", products::router())
        .nest("/orders", orders::router())
        .nest("/admin", admin::router())
}
