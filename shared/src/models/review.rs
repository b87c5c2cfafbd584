//! Review Model

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Product review; one per (user, product)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Review {
    pub id: i64,
    pub user_id: i64,
    pub product_id: i64,
    /// Qualifying order, when one was given
    pub order_id: Option<i64>,
    pub rating: i64,
    pub comment: Option<String>,
    /// Verified purchase
    pub is_verified: bool,
    pub created_at: i64,
    #[cfg_attr(feature = "db", sqlx(default))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewer_name: Option<String>,
}

/// Create review payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ReviewCreate {
    pub product_id: i64,
    pub order_id: Option<i64>,
    #[validate(range(min = 1, max = 5))]
    pub rating: i64,
    #[validate(length(max = 1000))]
    pub comment: Option<String>,
}
