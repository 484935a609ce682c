//! DynamoDB-backed record store.
//!
//! Single-table layout: every record is an item whose `id` attribute is the
//! tenant-prefixed storage key. Listing a tenant is a `begins_with` filter
//! scan over that prefix; creates are conditional puts on `id`.

use std::collections::HashMap;
use std::marker::PhantomData;

use async_trait::async_trait;
use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::error::{ProvideErrorMetadata, SdkError};
use aws_sdk_dynamodb::types::AttributeValue;
use chrono::{DateTime, Utc};

use tenantdesk_core::TenantId;
use tenantdesk_orders::{Order, OrderLine, OrderStatus};
use tenantdesk_products::Product;

use super::{RecordStore, StoreError, StorePing, TenantRecord, ensure_tenant_key};

type Item = HashMap<String, AttributeValue>;

/// Marshalling between a record and a DynamoDB item.
pub trait DynamoItem: Sized {
    fn to_item(&self) -> Item;
    fn from_item(item: &Item) -> Result<Self, StoreError>;
}

/// DynamoDB store for one record kind.
pub struct DynamoStore<R> {
    client: Client,
    table_name: String,
    _record: PhantomData<fn() -> R>,
}

impl<R> DynamoStore<R> {
    pub fn new(client: Client, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
            _record: PhantomData,
        }
    }

    /// Build a client from the default credential/region chain (env vars,
    /// profile, instance role).
    pub async fn from_env(table_name: impl Into<String>) -> Self {
        let config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .load()
            .await;
        Self::new(Client::new(&config), table_name)
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }
}

/// Build the product and order stores over one shared client.
pub async fn stores_from_env(
    table_name: &str,
) -> (DynamoStore<Product>, DynamoStore<Order>) {
    let config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .load()
        .await;
    let client = Client::new(&config);
    (
        DynamoStore::new(client.clone(), table_name),
        DynamoStore::new(client, table_name),
    )
}

fn map_sdk_error<E, H>(err: SdkError<E, H>) -> StoreError
where
    E: ProvideErrorMetadata + std::fmt::Debug,
    H: std::fmt::Debug,
{
    match &err {
        SdkError::ServiceError(ctx) => {
            let service_err = ctx.err();
            let code = service_err.code().unwrap_or("Unknown");
            let message = service_err.message().unwrap_or("no message");
            StoreError::from_aws_code(code, message)
        }
        SdkError::TimeoutError(_) | SdkError::DispatchFailure(_) => {
            StoreError::Unavailable(format!("{err:?}"))
        }
        _ => StoreError::Other(format!("{err:?}")),
    }
}

#[async_trait]
impl<R> RecordStore<R> for DynamoStore<R>
where
    R: TenantRecord + DynamoItem,
{
    async fn list(&self, tenant_id: &TenantId) -> Result<Vec<R>, StoreError> {
        let prefix = format!("{tenant_id}#");
        let mut records = Vec::new();
        let mut start_key: Option<Item> = None;

        loop {
            let resp = self
                .client
                .scan()
                .table_name(&self.table_name)
                .filter_expression("begins_with(id, :tenantPrefix)")
                .expression_attribute_values(":tenantPrefix", AttributeValue::S(prefix.clone()))
                .set_exclusive_start_key(start_key.take())
                .send()
                .await
                .map_err(map_sdk_error)?;

            for item in resp.items() {
                records.push(R::from_item(item)?);
            }

            start_key = resp.last_evaluated_key().cloned();
            if start_key.is_none() {
                break;
            }
        }

        tracing::debug!(kind = R::KIND, tenant = %tenant_id, count = records.len(), "scanned records");
        Ok(records)
    }

    async fn get(&self, tenant_id: &TenantId, storage_key: &str) -> Result<Option<R>, StoreError> {
        ensure_tenant_key(tenant_id, storage_key)?;
        let resp = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key("id", AttributeValue::S(storage_key.to_string()))
            .send()
            .await
            .map_err(map_sdk_error)?;

        resp.item().map(R::from_item).transpose()
    }

    async fn create(&self, record: R) -> Result<R, StoreError> {
        let key = record.storage_key();
        ensure_tenant_key(record.tenant_id(), &key)?;
        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(record.to_item()))
            .condition_expression("attribute_not_exists(id)")
            .send()
            .await
            .map_err(map_sdk_error)?;

        tracing::debug!(kind = R::KIND, key, "created record");
        Ok(record)
    }

    async fn put(&self, record: R) -> Result<R, StoreError> {
        let key = record.storage_key();
        ensure_tenant_key(record.tenant_id(), &key)?;
        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(record.to_item()))
            .send()
            .await
            .map_err(map_sdk_error)?;

        tracing::debug!(kind = R::KIND, key, "stored record");
        Ok(record)
    }

    async fn delete(&self, tenant_id: &TenantId, storage_key: &str) -> Result<(), StoreError> {
        ensure_tenant_key(tenant_id, storage_key)?;
        self.client
            .delete_item()
            .table_name(&self.table_name)
            .key("id", AttributeValue::S(storage_key.to_string()))
            .send()
            .await
            .map_err(map_sdk_error)?;

        tracing::debug!(kind = R::KIND, key = storage_key, "deleted record");
        Ok(())
    }
}

#[async_trait]
impl<R> StorePing for DynamoStore<R>
where
    R: TenantRecord + DynamoItem,
{
    async fn ping(&self) -> Result<(), StoreError> {
        self.client
            .describe_table()
            .table_name(&self.table_name)
            .send()
            .await
            .map_err(map_sdk_error)?;
        Ok(())
    }
}

// ─── attribute helpers ──────────────────────────────────────────────────────

fn missing(name: &str) -> StoreError {
    StoreError::Decode(format!("missing attribute '{name}'"))
}

fn req_s(item: &Item, name: &str) -> Result<String, StoreError> {
    item.get(name)
        .ok_or_else(|| missing(name))?
        .as_s()
        .map(|s| s.to_string())
        .map_err(|_| StoreError::Decode(format!("attribute '{name}' is not a string")))
}

fn req_n(item: &Item, name: &str) -> Result<String, StoreError> {
    item.get(name)
        .ok_or_else(|| missing(name))?
        .as_n()
        .map(|n| n.to_string())
        .map_err(|_| StoreError::Decode(format!("attribute '{name}' is not a number")))
}

fn req_f64(item: &Item, name: &str) -> Result<f64, StoreError> {
    req_n(item, name)?
        .parse()
        .map_err(|e| StoreError::Decode(format!("attribute '{name}': {e}")))
}

fn req_u64(item: &Item, name: &str) -> Result<u64, StoreError> {
    req_n(item, name)?
        .parse()
        .map_err(|e| StoreError::Decode(format!("attribute '{name}': {e}")))
}

fn req_u32(item: &Item, name: &str) -> Result<u32, StoreError> {
    req_n(item, name)?
        .parse()
        .map_err(|e| StoreError::Decode(format!("attribute '{name}': {e}")))
}

fn req_time(item: &Item, name: &str) -> Result<DateTime<Utc>, StoreError> {
    let raw = req_s(item, name)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| StoreError::Decode(format!("attribute '{name}': {e}")))
}

fn time_attr(time: DateTime<Utc>) -> AttributeValue {
    AttributeValue::S(time.to_rfc3339())
}

fn decode(err: impl std::fmt::Display) -> StoreError {
    StoreError::Decode(err.to_string())
}

// ─── record marshalling ─────────────────────────────────────────────────────

impl DynamoItem for Product {
    fn to_item(&self) -> Item {
        Item::from([
            ("id".to_string(), AttributeValue::S(self.id.storage_key())),
            ("name".to_string(), AttributeValue::S(self.name.clone())),
            (
                "description".to_string(),
                AttributeValue::S(self.description.clone()),
            ),
            (
                "currency".to_string(),
                AttributeValue::S(self.currency.as_str().to_string()),
            ),
            (
                "interestRate".to_string(),
                AttributeValue::N(self.interest_rate.to_string()),
            ),
            (
                "tenantId".to_string(),
                AttributeValue::S(self.tenant_id.to_string()),
            ),
            ("createdAt".to_string(), time_attr(self.created_at)),
            ("updatedAt".to_string(), time_attr(self.updated_at)),
        ])
    }

    fn from_item(item: &Item) -> Result<Self, StoreError> {
        use tenantdesk_products::{Currency, ProductKey};

        Ok(Product {
            id: ProductKey::parse(&req_s(item, "id")?).map_err(decode)?,
            name: req_s(item, "name")?,
            description: req_s(item, "description")?,
            currency: Currency::new(req_s(item, "currency")?).map_err(decode)?,
            interest_rate: req_f64(item, "interestRate")?,
            tenant_id: TenantId::new(req_s(item, "tenantId")?).map_err(decode)?,
            created_at: req_time(item, "createdAt")?,
            updated_at: req_time(item, "updatedAt")?,
        })
    }
}

fn line_to_attr(line: &OrderLine) -> AttributeValue {
    AttributeValue::M(Item::from([
        (
            "productId".to_string(),
            AttributeValue::S(line.product_id.storage_key()),
        ),
        (
            "productName".to_string(),
            AttributeValue::S(line.product_name.clone()),
        ),
        ("price".to_string(), AttributeValue::N(line.price.to_string())),
        (
            "quantity".to_string(),
            AttributeValue::N(line.quantity.to_string()),
        ),
    ]))
}

fn line_from_attr(value: &AttributeValue) -> Result<OrderLine, StoreError> {
    use tenantdesk_products::ProductKey;

    let item = value
        .as_m()
        .map_err(|_| StoreError::Decode("order line is not a map".to_string()))?;

    Ok(OrderLine {
        product_id: ProductKey::parse(&req_s(item, "productId")?).map_err(decode)?,
        product_name: req_s(item, "productName")?,
        price: req_u64(item, "price")?,
        quantity: req_u32(item, "quantity")?,
    })
}

impl DynamoItem for Order {
    fn to_item(&self) -> Item {
        let lines = self.lines.iter().map(line_to_attr).collect();

        Item::from([
            ("id".to_string(), AttributeValue::S(self.storage_key())),
            (
                "orderId".to_string(),
                AttributeValue::S(self.id.to_string()),
            ),
            ("name".to_string(), AttributeValue::S(self.name.clone())),
            (
                "status".to_string(),
                AttributeValue::S(self.status.as_str().to_string()),
            ),
            ("lines".to_string(), AttributeValue::L(lines)),
            (
                "tenantId".to_string(),
                AttributeValue::S(self.tenant_id.to_string()),
            ),
            ("createdAt".to_string(), time_attr(self.created_at)),
            ("updatedAt".to_string(), time_attr(self.updated_at)),
        ])
    }

    fn from_item(item: &Item) -> Result<Self, StoreError> {
        let lines = item
            .get("lines")
            .ok_or_else(|| missing("lines"))?
            .as_l()
            .map_err(|_| StoreError::Decode("attribute 'lines' is not a list".to_string()))?
            .iter()
            .map(line_from_attr)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Order {
            id: req_s(item, "orderId")?.parse().map_err(decode)?,
            name: req_s(item, "name")?,
            status: req_s(item, "status")?
                .parse::<OrderStatus>()
                .map_err(decode)?,
            lines,
            tenant_id: TenantId::new(req_s(item, "tenantId")?).map_err(decode)?,
            created_at: req_time(item, "createdAt")?,
            updated_at: req_time(item, "updatedAt")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    use tenantdesk_orders::{CreateOrder, OrderLineRequest};
    use tenantdesk_products::CreateProduct;

    fn tenant() -> TenantId {
        TenantId::new("acme").unwrap()
    }

    #[test]
    fn product_marshalling_round_trips() {
        let product = CreateProduct {
            name: "Savings Plus".to_string(),
            description: "A steady saver".to_string(),
            currency: "USD".to_string(),
            interest_rate: 2.5,
        }
        .into_product(tenant(), Utc::now())
        .unwrap();

        let item = product.to_item();
        assert_eq!(item["id"].as_s().unwrap(), "acme#Savings Plus");
        assert_eq!(item["interestRate"].as_n().unwrap(), "2.5");

        let back = Product::from_item(&item).unwrap();
        assert_eq!(back, product);
    }

    #[test]
    fn order_marshalling_round_trips() {
        let order = CreateOrder {
            name: "Bundle".to_string(),
            lines: vec![OrderLineRequest {
                product_id: "Savings".to_string(),
                product_name: "Savings".to_string(),
                price: 1000,
                quantity: 2,
            }],
        }
        .into_order(tenant(), Utc::now())
        .unwrap();

        let item = order.to_item();
        assert_eq!(item["status"].as_s().unwrap(), "pending");
        assert!(item["id"].as_s().unwrap().starts_with("acme#"));

        let back = Order::from_item(&item).unwrap();
        assert_eq!(back, order);
    }

    #[test]
    fn from_item_reports_missing_attributes() {
        let err = Product::from_item(&Item::new()).unwrap_err();
        assert!(matches!(err, StoreError::Decode(_)));
    }
}
