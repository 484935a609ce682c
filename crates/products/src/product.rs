use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tenantdesk_core::{DomainError, DomainResult, Entity, TenantId, ValueObject};

use crate::key::ProductKey;

/// ISO-4217 alphabetic currency code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Currency(String);

impl Currency {
    pub fn new(code: impl Into<String>) -> DomainResult<Self> {
        let code = code.into();
        if code.len() != 3 || !code.bytes().all(|b| b.is_ascii_uppercase()) {
            return Err(DomainError::validation(format!(
                "currency must be a three-letter uppercase code, got '{code}'"
            )));
        }
        Ok(Self(code))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl ValueObject for Currency {}

impl core::fmt::Display for Currency {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Currency {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Currency> for String {
    fn from(value: Currency) -> Self {
        value.0
    }
}

/// A tenant's financial product.
///
/// The id doubles as the storage key; its name component and `name` must stay
/// in sync (enforced by the create/update paths).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductKey,
    pub name: String,
    pub description: String,
    pub currency: Currency,
    /// Annual interest rate as a percentage.
    pub interest_rate: f64,
    pub tenant_id: TenantId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for Product {
    type Id = ProductKey;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

fn validate_interest_rate(rate: f64) -> DomainResult<()> {
    if !rate.is_finite() {
        return Err(DomainError::validation("interestRate must be a finite number"));
    }
    if !(0.0..=100.0).contains(&rate) {
        return Err(DomainError::validation(format!(
            "interestRate must be between 0 and 100, got {rate}"
        )));
    }
    Ok(())
}

/// Payload for creating a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProduct {
    pub name: String,
    pub description: String,
    pub currency: String,
    pub interest_rate: f64,
}

impl CreateProduct {
    /// Validate and build the product for `tenant_id`.
    pub fn into_product(self, tenant_id: TenantId, now: DateTime<Utc>) -> DomainResult<Product> {
        if self.description.trim().is_empty() {
            return Err(DomainError::validation("description cannot be empty"));
        }
        validate_interest_rate(self.interest_rate)?;
        let currency = Currency::new(self.currency)?;
        // ProductKey::new rejects empty names and the '#' separator.
        let id = ProductKey::new(tenant_id.clone(), self.name.trim())?;

        Ok(Product {
            name: id.name().to_string(),
            id,
            description: self.description,
            currency,
            interest_rate: self.interest_rate,
            tenant_id,
            created_at: now,
            updated_at: now,
        })
    }
}

/// Partial update of a product; absent fields keep their current value.
///
/// The name is part of the key, so it cannot change here; renaming is a
/// delete + create at the API level.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProduct {
    pub description: Option<String>,
    pub currency: Option<String>,
    pub interest_rate: Option<f64>,
}

impl UpdateProduct {
    pub fn apply_to(self, product: &mut Product, now: DateTime<Utc>) -> DomainResult<()> {
        if let Some(description) = self.description {
            if description.trim().is_empty() {
                return Err(DomainError::validation("description cannot be empty"));
            }
            product.description = description;
        }
        if let Some(currency) = self.currency {
            product.currency = Currency::new(currency)?;
        }
        if let Some(rate) = self.interest_rate {
            validate_interest_rate(rate)?;
            product.interest_rate = rate;
        }
        product.updated_at = now;
        Ok(())
    }
}

/// Catalog statistics for a tenant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductStats {
    pub total_products: usize,
    pub average_interest_rate: f64,
}

impl ProductStats {
    pub fn from_products(products: &[Product]) -> Self {
        let total_products = products.len();
        let average_interest_rate = if total_products == 0 {
            0.0
        } else {
            products.iter().map(|p| p.interest_rate).sum::<f64>() / total_products as f64
        };

        Self {
            total_products,
            average_interest_rate,
        }
    }
}
