//! `tenantdesk-orders` — tenant-scoped orders over the product catalog.

pub mod order;

pub use order::{
    CreateOrder, Order, OrderId, OrderLine, OrderLineRequest, OrderStats, OrderStatus, UpdateOrder,
};
