//! Dashboard / Report Models

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Order, Product};

/// Headline counts
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_orders: i64,
    /// Σ total_amount over non-cancelled orders
    pub total_revenue: Decimal,
    pub total_products: i64,
    pub active_products: i64,
    pub total_categories: i64,
    pub total_customers: i64,
    /// Active, stock ≤ 10 (out of stock included)
    pub low_stock_count: i64,
    /// Active, stock = 0
    pub out_of_stock_count: i64,
    /// Active, stock > 10
    pub in_stock_count: i64,
}

/// Order count per status
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderStatusCounts {
    pub pending: i64,
    pub confirmed: i64,
    pub start_preparing: i64,
    pub mark_ready: i64,
    pub out_for_delivery: i64,
    pub delivered: i64,
    pub processed: i64,
    pub cancelled: i64,
}

/// Sales per category over non-cancelled orders
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategorySales {
    pub category_id: i64,
    pub category_name: String,
    pub product_count: i64,
    pub quantity_sold: i64,
    pub revenue: Decimal,
}

/// Best sellers by quantity (non-cancelled orders)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FastMovingProduct {
    pub product_id: i64,
    pub name: String,
    pub quantity_sold: i64,
    pub revenue: Decimal,
    pub stock_quantity: i64,
}

/// `GET /api/admin/dashboard`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dashboard {
    pub stats: DashboardStats,
    pub status_counts: OrderStatusCounts,
    pub recent_orders: Vec<Order>,
    pub low_stock_products: Vec<Product>,
    pub sales_by_category: Vec<CategorySales>,
    pub fast_moving: Vec<FastMovingProduct>,
}
