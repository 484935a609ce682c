#[tokio::main]
async fn main() {
    tenantdesk_observability::init();

    let config = tenantdesk_infra::AppConfig::from_env();
    if !config.missing_env().is_empty() {
        tracing::warn!(
            missing = ?config.missing_env(),
            "running with defaults for missing environment variables"
        );
    }

    let bind_addr = config.bind_addr.clone();
    let app = tenantdesk_api::app::build_app(config).await;

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {bind_addr}: {e}"));

    tracing::info!("listening on {}", bind_addr);

    axum::serve(listener, app).await.expect("server error");
}
