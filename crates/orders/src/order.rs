use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use tenantdesk_core::{DomainError, DomainResult, Entity, TenantId};
use tenantdesk_products::ProductKey;

/// Order identifier (tenant-scoped via the order's `tenant_id`).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(Uuid);

impl OrderId {
    /// Mint a new identifier (UUIDv7, time-ordered).
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for OrderId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for OrderId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for OrderId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let uuid =
            Uuid::from_str(s).map_err(|e| DomainError::invalid_id(format!("OrderId: {e}")))?;
        Ok(Self(uuid))
    }
}

/// Order status lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Processing,
    Completed,
    Cancelled,
}

impl OrderStatus {
    /// Legal forward transitions; completed/cancelled are terminal.
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        match self {
            Pending => matches!(next, Processing | Completed | Cancelled),
            Processing => matches!(next, Completed | Cancelled),
            Completed | Cancelled => false,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl FromStr for OrderStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OrderStatus::Pending),
            "processing" => Ok(OrderStatus::Processing),
            "completed" => Ok(OrderStatus::Completed),
            "cancelled" => Ok(OrderStatus::Cancelled),
            other => Err(DomainError::validation(format!(
                "unknown order status '{other}'"
            ))),
        }
    }
}

/// Order line: product, unit price, quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub product_id: ProductKey,
    pub product_name: String,
    /// Unit price in the smallest currency unit (e.g. cents).
    pub price: u64,
    pub quantity: u32,
}

impl OrderLine {
    pub fn subtotal(&self) -> u64 {
        self.price.saturating_mul(u64::from(self.quantity))
    }
}

/// A tenant's order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub name: String,
    pub lines: Vec<OrderLine>,
    pub status: OrderStatus,
    pub tenant_id: TenantId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Order total, derived from the lines (never stored).
    pub fn total_amount(&self) -> u64 {
        self.lines.iter().fold(0u64, |acc, l| acc.saturating_add(l.subtotal()))
    }
}

impl Entity for Order {
    type Id = OrderId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// One requested line; `product_id` may be bare or tenant-qualified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineRequest {
    pub product_id: String,
    pub product_name: String,
    pub price: u64,
    pub quantity: u32,
}

/// Payload for creating an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrder {
    pub name: String,
    pub lines: Vec<OrderLineRequest>,
}

fn build_lines(tenant_id: &TenantId, requests: Vec<OrderLineRequest>) -> DomainResult<Vec<OrderLine>> {
    if requests.is_empty() {
        return Err(DomainError::validation("order must contain at least one line"));
    }

    let mut lines = Vec::with_capacity(requests.len());
    for (idx, req) in requests.into_iter().enumerate() {
        if req.quantity == 0 {
            return Err(DomainError::validation(format!(
                "line {idx}: quantity must be at least 1"
            )));
        }
        if req.product_name.trim().is_empty() {
            return Err(DomainError::validation(format!(
                "line {idx}: productName cannot be empty"
            )));
        }
        lines.push(OrderLine {
            product_id: ProductKey::qualify(tenant_id, &req.product_id)?,
            product_name: req.product_name,
            price: req.price,
            quantity: req.quantity,
        });
    }
    Ok(lines)
}

impl CreateOrder {
    /// Validate and build the order for `tenant_id`. New orders start pending.
    pub fn into_order(self, tenant_id: TenantId, now: DateTime<Utc>) -> DomainResult<Order> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("order name cannot be empty"));
        }
        let lines = build_lines(&tenant_id, self.lines)?;

        Ok(Order {
            id: OrderId::new(),
            name: self.name.trim().to_string(),
            lines,
            status: OrderStatus::Pending,
            tenant_id,
            created_at: now,
            updated_at: now,
        })
    }
}

/// Partial update of an order; absent fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrder {
    pub name: Option<String>,
    pub lines: Option<Vec<OrderLineRequest>>,
    pub status: Option<OrderStatus>,
}

impl UpdateOrder {
    pub fn apply_to(self, order: &mut Order, now: DateTime<Utc>) -> DomainResult<()> {
        if let Some(status) = self.status {
            if status != order.status && !order.status.can_transition_to(status) {
                return Err(DomainError::invariant(format!(
                    "cannot move order from {:?} to {:?}",
                    order.status, status
                )));
            }
        }
        if order.status.is_terminal() && (self.name.is_some() || self.lines.is_some()) {
            return Err(DomainError::invariant(
                "completed or cancelled orders cannot be edited",
            ));
        }

        if let Some(name) = self.name {
            if name.trim().is_empty() {
                return Err(DomainError::validation("order name cannot be empty"));
            }
            order.name = name.trim().to_string();
        }
        if let Some(lines) = self.lines {
            order.lines = build_lines(&order.tenant_id, lines)?;
        }
        if let Some(status) = self.status {
            order.status = status;
        }
        order.updated_at = now;
        Ok(())
    }
}

/// Order-book statistics for a tenant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderStats {
    pub total_orders: usize,
    pub total_revenue: u64,
    pub average_order_value: f64,
    pub pending_orders: usize,
    pub completed_orders: usize,
}

impl OrderStats {
    pub fn from_orders(orders: &[Order]) -> Self {
        let total_orders = orders.len();
        let total_revenue = orders
            .iter()
            .fold(0u64, |acc, o| acc.saturating_add(o.total_amount()));
        let average_order_value = if total_orders == 0 {
            0.0
        } else {
            total_revenue as f64 / total_orders as f64
        };

        Self {
            total_orders,
            total_revenue,
            average_order_value,
            pending_orders: orders
                .iter()
                .filter(|o| o.status == OrderStatus::Pending)
                .count(),
            completed_orders: orders
                .iter()
                .filter(|o| o.status == OrderStatus::Completed)
                .count(),
        }
    }
}
