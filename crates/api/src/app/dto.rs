//! Response JSON mapping helpers.
//!
//! Request payloads deserialize straight into the domain request types
//! (`CreateProduct`, `UpdateOrder`, ...); responses are mapped here so derived
//! fields (order totals) and wire names stay in one place.

use serde_json::{Value, json};

use tenantdesk_orders::{Order, OrderStats};
use tenantdesk_products::{Product, ProductStats};

pub fn product_to_json(product: &Product) -> Value {
    json!({
        "id": product.id.storage_key(),
        "name": product.name,
        "description": product.description,
        "currency": product.currency.as_str(),
        "interestRate": product.interest_rate,
        "tenantId": product.tenant_id.as_str(),
        "createdAt": product.created_at.to_rfc3339(),
        "updatedAt": product.updated_at.to_rfc3339(),
    })
}

pub fn product_stats_to_json(stats: &ProductStats) -> Value {
    json!({
        "totalProducts": stats.total_products,
        "averageInterestRate": stats.average_interest_rate,
    })
}

pub fn order_to_json(order: &Order) -> Value {
    json!({
        "id": order.id.to_string(),
        "name": order.name,
        "status": order.status.as_str(),
        "totalAmount": order.total_amount(),
        "lines": order.lines.iter().map(|l| json!({
            "productId": l.product_id.storage_key(),
            "productName": l.product_name,
            "price": l.price,
            "quantity": l.quantity,
        })).collect::<Vec<_>>(),
        "tenantId": order.tenant_id.as_str(),
        "createdAt": order.created_at.to_rfc3339(),
        "updatedAt": order.updated_at.to_rfc3339(),
    })
}

pub fn order_stats_to_json(stats: &OrderStats) -> Value {
    json!({
        "totalOrders": stats.total_orders,
        "totalRevenue": stats.total_revenue,
        "averageOrderValue": stats.average_order_value,
        "pendingOrders": stats.pending_orders,
        "completedOrders": stats.completed_orders,
    })
}
