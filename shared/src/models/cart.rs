//! Cart Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::Product;

/// One (user, product) line of a customer's cart
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct CartItem {
    pub id: i64,
    pub user_id: i64,
    pub product_id: i64,
    pub quantity: i64,
    pub created_at: i64,
    pub updated_at: i64,
    #[cfg_attr(feature = "db", sqlx(skip))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product: Option<Product>,
}

/// Cart contents with live totals
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartView {
    pub items: Vec<CartItem>,
    /// Sum of live price × quantity
    pub total: Decimal,
    /// Sum of quantities
    pub item_count: i64,
}

/// Add-to-cart payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CartAdd {
    pub product_id: i64,
    #[validate(range(min = 1, max = 9999))]
    pub quantity: i64,
}

/// Update cart line payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CartUpdate {
    #[validate(range(min = 1, max = 9999))]
    pub quantity: i64,
}
