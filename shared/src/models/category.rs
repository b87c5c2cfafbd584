//! Category Model

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Category entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    /// Products of this category may be ordered for delivery
    pub allows_delivery: bool,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
    /// Number of active products (listing queries only)
    #[cfg_attr(feature = "db", sqlx(default))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_count: Option<i64>,
}

/// Create category payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CategoryCreate {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    pub allows_delivery: Option<bool>,
    pub is_active: Option<bool>,
}

/// Update category payload
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct CategoryUpdate {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    pub allows_delivery: Option<bool>,
    pub is_active: Option<bool>,
}
