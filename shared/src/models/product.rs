//! Product Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use super::Category;

/// Stock at or below this level counts as low stock
pub const LOW_STOCK_THRESHOLD: i64 = 10;

/// Product entity
///
/// `price` is a two-decimal fixed-point value (stored as integer cents).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub category_id: i64,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub stock_quantity: i64,
    /// Unit label, e.g. "kg", "pack"
    pub unit: Option<String>,
    pub weight: Option<f64>,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
}

impl Product {
    pub fn stock_status(&self) -> StockStatus {
        StockStatus::for_quantity(self.stock_quantity)
    }
}

/// Product with review aggregates (public detail page)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: Product,
    pub average_rating: Option<f64>,
    pub review_count: i64,
}

/// Inventory bucket of a product
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    InStock,
    Low,
    Out,
}

impl StockStatus {
    pub fn for_quantity(quantity: i64) -> Self {
        if quantity <= 0 {
            Self::Out
        } else if quantity <= LOW_STOCK_THRESHOLD {
            Self::Low
        } else {
            Self::InStock
        }
    }
}

/// Stock filter used by admin listings
///
/// `low` matches stock ≤ 10 (including out of stock), `out` matches stock = 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StockFilter {
    Low,
    Out,
}

/// Product listing filter
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductFilter {
    pub category_id: Option<i64>,
    pub search: Option<String>,
    pub stock_status: Option<StockFilter>,
    /// Include inactive products (admin only)
    #[serde(default)]
    pub include_inactive: bool,
}

/// Prices must be non-negative with at most two decimal places
pub fn validate_money(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() {
        return Err(ValidationError::new("range").with_message("must not be negative".into()));
    }
    if value.normalize().scale() > 2 {
        return Err(ValidationError::new("precision")
            .with_message("must have at most two decimal places".into()));
    }
    Ok(())
}

/// Create product payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ProductCreate {
    pub category_id: i64,
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    #[validate(custom(function = "validate_money"))]
    pub price: Decimal,
    #[validate(range(min = 0))]
    pub stock_quantity: i64,
    #[validate(length(max = 50))]
    pub unit: Option<String>,
    #[validate(range(min = 0.0))]
    pub weight: Option<f64>,
    pub is_active: Option<bool>,
}

/// Update product payload
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ProductUpdate {
    pub category_id: Option<i64>,
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    #[validate(custom(function = "validate_money"))]
    pub price: Option<Decimal>,
    #[validate(range(min = 0))]
    pub stock_quantity: Option<i64>,
    #[validate(length(max = 50))]
    pub unit: Option<String>,
    #[validate(range(min = 0.0))]
    pub weight: Option<f64>,
    pub is_active: Option<bool>,
}

/// Direct stock overwrite payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct StockUpdate {
    #[validate(range(min = 0))]
    pub stock_quantity: i64,
}
