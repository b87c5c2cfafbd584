//! Report Repository
//!
//! Read-only aggregates for the admin dashboard. Revenue and sales figures
//! exclude cancelled orders.

use super::{RepoResult, order, product, user};
use crate::orders::money::from_cents;
use shared::models::{
    CategorySales, Dashboard, DashboardStats, FastMovingProduct, LOW_STOCK_THRESHOLD,
    OrderStatus, OrderStatusCounts,
};
use sqlx::SqlitePool;

/// Recent orders shown on the dashboard
pub const RECENT_ORDERS: i64 = 15;

/// Fast-moving products shown on the dashboard
pub const FAST_MOVING_LIMIT: i64 = 10;

#[derive(sqlx::FromRow)]
struct ProductCounts {
    total: i64,
    active: i64,
    low: i64,
    out: i64,
    in_stock: i64,
}

pub async fn stats(pool: &SqlitePool) -> RepoResult<DashboardStats> {
    let (total_orders, revenue_cents) = sqlx::query_as::<_, (i64, i64)>(
        "SELECT COUNT(*), COALESCE(SUM(CASE WHEN status != ?1 THEN total_amount ELSE 0 END), 0) FROM orders",
    )
    .bind(OrderStatus::Cancelled)
    .fetch_one(pool)
    .await?;

    let products = sqlx::query_as::<_, ProductCounts>(
        r#"
        SELECT COUNT(*) AS total,
               COALESCE(SUM(is_active = 1), 0) AS active,
               COALESCE(SUM(is_active = 1 AND stock_quantity <= ?1), 0) AS low,
               COALESCE(SUM(is_active = 1 AND stock_quantity = 0), 0) AS out,
               COALESCE(SUM(is_active = 1 AND stock_quantity > ?1), 0) AS in_stock
        FROM product
        "#,
    )
    .bind(LOW_STOCK_THRESHOLD)
    .fetch_one(pool)
    .await?;

    let total_categories = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM category")
        .fetch_one(pool)
        .await?;

    Ok(DashboardStats {
        total_orders,
        total_revenue: from_cents(revenue_cents),
        total_products: products.total,
        active_products: products.active,
        total_categories,
        total_customers: user::count_customers(pool).await?,
        low_stock_count: products.low,
        out_of_stock_count: products.out,
        in_stock_count: products.in_stock,
    })
}

pub async fn status_counts(pool: &SqlitePool) -> RepoResult<OrderStatusCounts> {
    let rows = sqlx::query_as::<_, (OrderStatus, i64)>(
        "SELECT status, COUNT(*) FROM orders GROUP BY status",
    )
    .fetch_all(pool)
    .await?;

    let mut counts = OrderStatusCounts::default();
    for (status, count) in rows {
        let slot = match status {
            OrderStatus::Pending => &mut counts.pending,
            OrderStatus::Confirmed => &mut counts.confirmed,
            OrderStatus::StartPreparing => &mut counts.start_preparing,
            OrderStatus::MarkReady => &mut counts.mark_ready,
            OrderStatus::OutForDelivery => &mut counts.out_for_delivery,
            OrderStatus::Delivered => &mut counts.delivered,
            OrderStatus::Processed => &mut counts.processed,
            OrderStatus::Cancelled => &mut counts.cancelled,
        };
        *slot = count;
    }
    Ok(counts)
}

#[derive(sqlx::FromRow)]
struct CategorySalesRow {
    category_id: i64,
    category_name: String,
    product_count: i64,
    quantity_sold: i64,
    revenue: i64,
}

/// Every category, including ones without sales
pub async fn sales_by_category(pool: &SqlitePool) -> RepoResult<Vec<CategorySales>> {
    let rows = sqlx::query_as::<_, CategorySalesRow>(
        r#"
        SELECT c.id AS category_id,
               c.name AS category_name,
               (SELECT COUNT(*) FROM product p WHERE p.category_id = c.id) AS product_count,
               COALESCE(SUM(s.quantity), 0) AS quantity_sold,
               COALESCE(SUM(s.line_total), 0) AS revenue
        FROM category c
        LEFT JOIN (
            SELECT p.category_id, oi.quantity, oi.line_total
            FROM order_item oi
            JOIN orders o ON o.id = oi.order_id
            JOIN product p ON p.id = oi.product_id
            WHERE o.status != ?1
        ) s ON s.category_id = c.id
        GROUP BY c.id, c.name
        ORDER BY revenue DESC, c.name
        "#,
    )
    .bind(OrderStatus::Cancelled)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| CategorySales {
            category_id: row.category_id,
            category_name: row.category_name,
            product_count: row.product_count,
            quantity_sold: row.quantity_sold,
            revenue: from_cents(row.revenue),
        })
        .collect())
}

#[derive(sqlx::FromRow)]
struct FastMovingRow {
    product_id: i64,
    name: String,
    quantity_sold: i64,
    revenue: i64,
    stock_quantity: i64,
}

/// Top sellers by quantity
pub async fn fast_moving(pool: &SqlitePool, limit: i64) -> RepoResult<Vec<FastMovingProduct>> {
    let rows = sqlx::query_as::<_, FastMovingRow>(
        r#"
        SELECT p.id AS product_id, p.name, SUM(oi.quantity) AS quantity_sold,
               SUM(oi.line_total) AS revenue, p.stock_quantity
        FROM order_item oi
        JOIN orders o ON o.id = oi.order_id
        JOIN product p ON p.id = oi.product_id
        WHERE o.status != ?1
        GROUP BY p.id, p.name, p.stock_quantity
        ORDER BY quantity_sold DESC, p.name
        LIMIT ?2
        "#,
    )
    .bind(OrderStatus::Cancelled)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| FastMovingProduct {
            product_id: row.product_id,
            name: row.name,
            quantity_sold: row.quantity_sold,
            revenue: from_cents(row.revenue),
            stock_quantity: row.stock_quantity,
        })
        .collect())
}

/// Full dashboard payload
pub async fn dashboard(pool: &SqlitePool) -> RepoResult<Dashboard> {
    Ok(Dashboard {
        stats: stats(pool).await?,
        status_counts: status_counts(pool).await?,
        recent_orders: order::find_recent(pool, RECENT_ORDERS).await?,
        low_stock_products: product::find_low_stock(pool).await?,
        sales_by_category: sales_by_category(pool).await?,
        fast_moving: fast_moving(pool, FAST_MOVING_LIMIT).await?,
    })
}
