//! Order Repository
//!
//! Money columns are integer cents. Writes take a connection so callers can
//! group them into one transaction.

use super::{RepoResult, like_pattern, product};
use crate::orders::money::from_cents;
use shared::models::{DeliveryMethod, Order, OrderItem, OrderStatus, PaymentMethod};
use shared::pagination::PageQuery;
use shared::util::now_millis;
use sqlx::{SqliteConnection, SqlitePool};

const SELECT: &str = r#"
    SELECT o.id, o.order_number, o.user_id, o.total_amount, o.delivery_method, o.payment_method,
           o.status, o.delivery_address, o.delivery_date, o.contact_phone, o.notes,
           o.cancellation_reason, o.created_at, o.updated_at, u.name AS customer_name
    FROM orders o
    JOIN user u ON u.id = o.user_id
"#;

/// ?1 user, ?2 status, ?3 from (inclusive millis), ?4 to (exclusive millis), ?5 search
const FILTER: &str = r#"
    WHERE (?1 IS NULL OR o.user_id = ?1)
      AND (?2 IS NULL OR o.status = ?2)
      AND (?3 IS NULL OR o.created_at >= ?3)
      AND (?4 IS NULL OR o.created_at < ?4)
      AND (?5 IS NULL OR o.order_number LIKE ?5 ESCAPE '\' OR u.name LIKE ?5 ESCAPE '\')
"#;

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: i64,
    order_number: String,
    user_id: i64,
    total_amount: i64,
    delivery_method: DeliveryMethod,
    payment_method: PaymentMethod,
    status: OrderStatus,
    delivery_address: Option<String>,
    delivery_date: Option<i64>,
    contact_phone: String,
    notes: Option<String>,
    cancellation_reason: Option<String>,
    created_at: i64,
    updated_at: i64,
    customer_name: Option<String>,
}

impl From<OrderRow> for Order {
    fn from(row: OrderRow) -> Self {
        Order {
            id: row.id,
            order_number: row.order_number,
            user_id: row.user_id,
            total_amount: from_cents(row.total_amount),
            delivery_method: row.delivery_method,
            payment_method: row.payment_method,
            status: row.status,
            delivery_address: row.delivery_address,
            delivery_date: row.delivery_date,
            contact_phone: row.contact_phone,
            notes: row.notes,
            cancellation_reason: row.cancellation_reason,
            created_at: row.created_at,
            updated_at: row.updated_at,
            customer_name: row.customer_name,
            items: Vec::new(),
        }
    }
}

#[derive(sqlx::FromRow)]
struct OrderItemRow {
    id: i64,
    order_id: i64,
    product_id: i64,
    product_name: String,
    quantity: i64,
    unit_price: i64,
    line_total: i64,
}

impl From<OrderItemRow> for OrderItem {
    fn from(row: OrderItemRow) -> Self {
        OrderItem {
            id: row.id,
            order_id: row.order_id,
            product_id: row.product_id,
            product_name: row.product_name,
            quantity: row.quantity,
            unit_price: from_cents(row.unit_price),
            line_total: from_cents(row.line_total),
            product: None,
        }
    }
}

/// Header of a new order (amounts in cents)
#[derive(Debug, Clone)]
pub struct NewOrder<'a> {
    pub order_number: &'a str,
    pub user_id: i64,
    pub total_cents: i64,
    pub delivery_method: DeliveryMethod,
    pub payment_method: PaymentMethod,
    pub delivery_address: Option<&'a str>,
    pub delivery_date: Option<i64>,
    pub contact_phone: &'a str,
    pub notes: Option<&'a str>,
}

/// Line of a new order (amounts in cents)
#[derive(Debug, Clone)]
pub struct NewOrderItem<'a> {
    pub product_id: i64,
    pub product_name: &'a str,
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub line_total_cents: i64,
}

/// Listing window; `from`/`to` are epoch millis (`to` exclusive)
#[derive(Debug, Clone, Default)]
pub struct OrderListParams<'a> {
    pub user_id: Option<i64>,
    pub status: Option<OrderStatus>,
    pub from: Option<i64>,
    pub to: Option<i64>,
    pub search: Option<&'a str>,
}

pub async fn number_exists(conn: &mut SqliteConnection, order_number: &str) -> RepoResult<bool> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM orders WHERE order_number = ?")
        .bind(order_number)
        .fetch_one(conn)
        .await?;
    Ok(count > 0)
}

pub async fn insert(conn: &mut SqliteConnection, order: &NewOrder<'_>) -> RepoResult<i64> {
    let now = now_millis();
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO orders (order_number, user_id, total_amount, delivery_method, payment_method, status, delivery_address, delivery_date, contact_phone, notes, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, 'pending', ?6, ?7, ?8, ?9, ?10, ?10) RETURNING id",
    )
    .bind(order.order_number)
    .bind(order.user_id)
    .bind(order.total_cents)
    .bind(order.delivery_method)
    .bind(order.payment_method)
    .bind(order.delivery_address)
    .bind(order.delivery_date)
    .bind(order.contact_phone)
    .bind(order.notes)
    .bind(now)
    .fetch_one(conn)
    .await?;
    Ok(id)
}

pub async fn insert_item(conn: &mut SqliteConnection, order_id: i64, item: &NewOrderItem<'_>) -> RepoResult<i64> {
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO order_item (order_id, product_id, product_name, quantity, unit_price, line_total) VALUES (?, ?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(order_id)
    .bind(item.product_id)
    .bind(item.product_name)
    .bind(item.quantity)
    .bind(item.unit_price_cents)
    .bind(item.line_total_cents)
    .fetch_one(conn)
    .await?;
    Ok(id)
}

pub async fn find_items(conn: &mut SqliteConnection, order_id: i64) -> RepoResult<Vec<OrderItem>> {
    let rows = sqlx::query_as::<_, OrderItemRow>(
        "SELECT id, order_id, product_id, product_name, quantity, unit_price, line_total FROM order_item WHERE order_id = ? ORDER BY id",
    )
    .bind(order_id)
    .fetch_all(conn)
    .await?;
    Ok(rows.into_iter().map(OrderItem::from).collect())
}

/// Order with its lines, inside an open transaction
pub async fn find_by_id_tx(conn: &mut SqliteConnection, id: i64) -> RepoResult<Option<Order>> {
    let row = sqlx::query_as::<_, OrderRow>(&format!("{SELECT} WHERE o.id = ?"))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    let Some(row) = row else {
        return Ok(None);
    };
    let mut order = Order::from(row);
    order.items = find_items(conn, id).await?;
    Ok(Some(order))
}

/// Attach current product rows to each line
pub async fn attach_products(conn: &mut SqliteConnection, order: &mut Order) -> RepoResult<()> {
    for item in &mut order.items {
        item.product = product::find_by_id_tx(&mut *conn, item.product_id).await?;
    }
    Ok(())
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Order>> {
    let mut conn = pool.acquire().await?;
    find_by_id_tx(&mut conn, id).await
}

/// Newest first. Returns (page items with lines, total matches).
pub async fn find_page(
    pool: &SqlitePool,
    params: &OrderListParams<'_>,
    page: &PageQuery,
) -> RepoResult<(Vec<Order>, i64)> {
    let search = params
        .search
        .filter(|s| !s.trim().is_empty())
        .map(like_pattern);

    let mut conn = pool.acquire().await?;
    let total = sqlx::query_scalar::<_, i64>(&format!(
        "SELECT COUNT(*) FROM orders o JOIN user u ON u.id = o.user_id {FILTER}"
    ))
    .bind(params.user_id)
    .bind(params.status)
    .bind(params.from)
    .bind(params.to)
    .bind(search.as_deref())
    .fetch_one(&mut *conn)
    .await?;

    let rows = sqlx::query_as::<_, OrderRow>(&format!(
        "{SELECT} {FILTER} ORDER BY o.created_at DESC, o.id DESC LIMIT ?6 OFFSET ?7"
    ))
    .bind(params.user_id)
    .bind(params.status)
    .bind(params.from)
    .bind(params.to)
    .bind(search.as_deref())
    .bind(page.limit())
    .bind(page.offset())
    .fetch_all(&mut *conn)
    .await?;

    let mut orders = Vec::with_capacity(rows.len());
    for row in rows {
        let mut order = Order::from(row);
        order.items = find_items(&mut conn, order.id).await?;
        orders.push(order);
    }
    Ok((orders, total))
}

/// Most recent orders without lines (dashboard)
pub async fn find_recent(pool: &SqlitePool, limit: i64) -> RepoResult<Vec<Order>> {
    let rows = sqlx::query_as::<_, OrderRow>(&format!(
        "{SELECT} ORDER BY o.created_at DESC, o.id DESC LIMIT ?"
    ))
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(Order::from).collect())
}

/// Set status and cancellation reason. `reason` is written as given
/// (`None` clears it).
pub async fn update_status(
    conn: &mut SqliteConnection,
    id: i64,
    status: OrderStatus,
    reason: Option<&str>,
) -> RepoResult<()> {
    sqlx::query("UPDATE orders SET status = ?, cancellation_reason = ?, updated_at = ? WHERE id = ?")
        .bind(status)
        .bind(reason)
        .bind(now_millis())
        .bind(id)
        .execute(conn)
        .await?;
    Ok(())
}
