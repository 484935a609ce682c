//! Infrastructure wiring for the API process.

use std::sync::Arc;

use tenantdesk_infra::{AppConfig, ControlPlaneClient, RecordStore, RetryPolicy, StorePing};
use tenantdesk_orders::Order;
use tenantdesk_products::Product;

/// Shared service handles, one instance per process.
pub struct AppServices {
    pub config: AppConfig,
    pub products: Arc<dyn RecordStore<Product>>,
    pub orders: Arc<dyn RecordStore<Order>>,
    pub store_ping: Arc<dyn StorePing>,
    pub control_plane: ControlPlaneClient,
    pub retry: RetryPolicy,
}

/// Wire the production services.
///
/// With the `dynamodb` feature the stores talk to DynamoDB through the default
/// credential chain; without it (dev/test builds) everything is in-memory.
pub async fn build_services(config: AppConfig) -> AppServices {
    let control_plane = ControlPlaneClient::new(config.control_plane_url.clone())
        .expect("failed to build control-plane client");

    #[cfg(feature = "dynamodb")]
    let (products, orders, store_ping) = {
        let (products, orders) =
            tenantdesk_infra::store::dynamodb::stores_from_env(&config.table_name).await;
        let products = Arc::new(products);
        let orders = Arc::new(orders);
        (
            products.clone() as Arc<dyn RecordStore<Product>>,
            orders as Arc<dyn RecordStore<Order>>,
            products as Arc<dyn StorePing>,
        )
    };

    #[cfg(not(feature = "dynamodb"))]
    let (products, orders, store_ping) = {
        let products = Arc::new(tenantdesk_infra::InMemoryStore::<Product>::new());
        let orders = Arc::new(tenantdesk_infra::InMemoryStore::<Order>::new());
        (
            products.clone() as Arc<dyn RecordStore<Product>>,
            orders as Arc<dyn RecordStore<Order>>,
            products as Arc<dyn StorePing>,
        )
    };

    AppServices {
        config,
        products,
        orders,
        store_ping,
        control_plane,
        retry: RetryPolicy::default(),
    }
}
