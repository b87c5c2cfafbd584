//! Product Repository
//!
//! `price` is stored as integer cents and mapped to `Decimal` here.

use super::{RepoError, RepoResult, like_pattern};
use crate::orders::money::{from_cents, to_cents};
use shared::models::{
    Category, LOW_STOCK_THRESHOLD, Product, ProductCreate, ProductFilter, ProductUpdate, StockFilter,
};
use shared::pagination::PageQuery;
use shared::util::{now_millis, slugify};
use sqlx::{SqliteConnection, SqlitePool};

const SELECT: &str = r#"
    SELECT p.id, p.category_id, p.name, p.slug, p.description, p.price, p.stock_quantity,
           p.unit, p.weight, p.is_active, p.created_at, p.updated_at,
           c.name AS c_name, c.slug AS c_slug, c.description AS c_description,
           c.allows_delivery AS c_allows_delivery, c.is_active AS c_is_active,
           c.created_at AS c_created_at, c.updated_at AS c_updated_at
    FROM product p
    JOIN category c ON c.id = p.category_id
"#;

/// Shared WHERE clause for listings; binds ?1 category, ?2 search, ?3 max stock, ?4 include inactive
const FILTER: &str = r#"
    WHERE (?1 IS NULL OR p.category_id = ?1)
      AND (?2 IS NULL OR p.name LIKE ?2 ESCAPE '\' OR p.description LIKE ?2 ESCAPE '\')
      AND (?3 IS NULL OR p.stock_quantity <= ?3)
      AND (?4 = 1 OR (p.is_active = 1 AND c.is_active = 1))
"#;

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: i64,
    category_id: i64,
    name: String,
    slug: String,
    description: Option<String>,
    price: i64,
    stock_quantity: i64,
    unit: Option<String>,
    weight: Option<f64>,
    is_active: bool,
    created_at: i64,
    updated_at: i64,
    c_name: String,
    c_slug: String,
    c_description: Option<String>,
    c_allows_delivery: bool,
    c_is_active: bool,
    c_created_at: i64,
    c_updated_at: i64,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.id,
            category_id: row.category_id,
            name: row.name,
            slug: row.slug,
            description: row.description,
            price: from_cents(row.price),
            stock_quantity: row.stock_quantity,
            unit: row.unit,
            weight: row.weight,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
            category: Some(Category {
                id: row.category_id,
                name: row.c_name,
                slug: row.c_slug,
                description: row.c_description,
                allows_delivery: row.c_allows_delivery,
                is_active: row.c_is_active,
                created_at: row.c_created_at,
                updated_at: row.c_updated_at,
                product_count: None,
            }),
        }
    }
}

fn stock_ceiling(filter: Option<StockFilter>) -> Option<i64> {
    match filter {
        Some(StockFilter::Low) => Some(LOW_STOCK_THRESHOLD),
        Some(StockFilter::Out) => Some(0),
        None => None,
    }
}

/// Filtered, paginated listing. Returns (page items, total matches).
pub async fn find_page(
    pool: &SqlitePool,
    filter: &ProductFilter,
    page: &PageQuery,
) -> RepoResult<(Vec<Product>, i64)> {
    let search = filter
        .search
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .map(like_pattern);
    let ceiling = stock_ceiling(filter.stock_status);

    let total = sqlx::query_scalar::<_, i64>(&format!(
        "SELECT COUNT(*) FROM product p JOIN category c ON c.id = p.category_id {FILTER}"
    ))
    .bind(filter.category_id)
    .bind(search.as_deref())
    .bind(ceiling)
    .bind(filter.include_inactive)
    .fetch_one(pool)
    .await?;

    let rows = sqlx::query_as::<_, ProductRow>(&format!(
        "{SELECT} {FILTER} ORDER BY p.name, p.id LIMIT ?5 OFFSET ?6"
    ))
    .bind(filter.category_id)
    .bind(search.as_deref())
    .bind(ceiling)
    .bind(filter.include_inactive)
    .bind(page.limit())
    .bind(page.offset())
    .fetch_all(pool)
    .await?;

    Ok((rows.into_iter().map(Product::from).collect(), total))
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Product>> {
    let row = sqlx::query_as::<_, ProductRow>(&format!("{SELECT} WHERE p.id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(Product::from))
}

/// Same as [`find_by_id`] but inside an open transaction
pub async fn find_by_id_tx(conn: &mut SqliteConnection, id: i64) -> RepoResult<Option<Product>> {
    let row = sqlx::query_as::<_, ProductRow>(&format!("{SELECT} WHERE p.id = ?"))
        .bind(id)
        .fetch_optional(conn)
        .await?;
    Ok(row.map(Product::from))
}

/// Newest active, in-stock products of active categories
pub async fn find_featured(pool: &SqlitePool, limit: i64) -> RepoResult<Vec<Product>> {
    let rows = sqlx::query_as::<_, ProductRow>(&format!(
        "{SELECT} WHERE p.is_active = 1 AND c.is_active = 1 AND p.stock_quantity > 0 \
         ORDER BY p.created_at DESC, p.id DESC LIMIT ?"
    ))
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(Product::from).collect())
}

/// Active products at or below the low-stock threshold, lowest first
pub async fn find_low_stock(pool: &SqlitePool) -> RepoResult<Vec<Product>> {
    let rows = sqlx::query_as::<_, ProductRow>(&format!(
        "{SELECT} WHERE p.is_active = 1 AND p.stock_quantity <= ? ORDER BY p.stock_quantity, p.name"
    ))
    .bind(LOW_STOCK_THRESHOLD)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(Product::from).collect())
}

async fn category_exists(pool: &SqlitePool, category_id: i64) -> RepoResult<bool> {
    let exists = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM category WHERE id = ?")
        .bind(category_id)
        .fetch_one(pool)
        .await?;
    Ok(exists > 0)
}

/// Slug derived from the name; `-2`, `-3` ... appended on collision
async fn unique_slug(pool: &SqlitePool, name: &str, exclude_id: Option<i64>) -> RepoResult<String> {
    let base = slugify(name);
    if base.is_empty() {
        return Err(RepoError::Validation("Product name must contain letters or digits".into()));
    }
    let mut candidate = base.clone();
    let mut n = 1;
    loop {
        let taken = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM product WHERE slug = ? AND (? IS NULL OR id != ?)",
        )
        .bind(&candidate)
        .bind(exclude_id)
        .bind(exclude_id)
        .fetch_one(pool)
        .await?;
        if taken == 0 {
            return Ok(candidate);
        }
        n += 1;
        candidate = format!("{base}-{n}");
    }
}

fn price_cents(price: rust_decimal::Decimal) -> RepoResult<i64> {
    to_cents(price).ok_or_else(|| RepoError::Validation("price is out of range".into()))
}

pub async fn create(pool: &SqlitePool, data: ProductCreate) -> RepoResult<Product> {
    if !category_exists(pool, data.category_id).await? {
        return Err(RepoError::NotFound(format!("Category {} not found", data.category_id)));
    }
    let name = data.name.trim().to_string();
    let slug = unique_slug(pool, &name, None).await?;
    let now = now_millis();
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO product (category_id, name, slug, description, price, stock_quantity, unit, weight, is_active, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(data.category_id)
    .bind(&name)
    .bind(&slug)
    .bind(data.description)
    .bind(price_cents(data.price)?)
    .bind(data.stock_quantity)
    .bind(data.unit)
    .bind(data.weight)
    .bind(data.is_active.unwrap_or(true))
    .bind(now)
    .bind(now)
    .fetch_one(pool)
    .await?;
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create product".into()))
}

pub async fn update(pool: &SqlitePool, id: i64, data: ProductUpdate) -> RepoResult<Product> {
    if find_by_id(pool, id).await?.is_none() {
        return Err(RepoError::NotFound(format!("Product {id} not found")));
    }
    if let Some(category_id) = data.category_id
        && !category_exists(pool, category_id).await?
    {
        return Err(RepoError::NotFound(format!("Category {category_id} not found")));
    }
    let name = data.name.as_deref().map(|n| n.trim().to_string());
    let slug = match &name {
        Some(n) => Some(unique_slug(pool, n, Some(id)).await?),
        None => None,
    };
    let price = data.price.map(price_cents).transpose()?;

    sqlx::query(
        "UPDATE product SET category_id = COALESCE(?1, category_id), name = COALESCE(?2, name), slug = COALESCE(?3, slug), description = COALESCE(?4, description), price = COALESCE(?5, price), stock_quantity = COALESCE(?6, stock_quantity), unit = COALESCE(?7, unit), weight = COALESCE(?8, weight), is_active = COALESCE(?9, is_active), updated_at = ?10 WHERE id = ?11",
    )
    .bind(data.category_id)
    .bind(name)
    .bind(slug)
    .bind(data.description)
    .bind(price)
    .bind(data.stock_quantity)
    .bind(data.unit)
    .bind(data.weight)
    .bind(data.is_active)
    .bind(now_millis())
    .bind(id)
    .execute(pool)
    .await?;
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Product {id} not found")))
}

/// Outcome of a product delete request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    /// Referenced by orders: kept and marked inactive
    Deactivated,
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<DeleteOutcome> {
    let referenced = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM order_item WHERE product_id = ?")
        .bind(id)
        .fetch_one(pool)
        .await?;
    if referenced > 0 {
        let rows = sqlx::query("UPDATE product SET is_active = 0, updated_at = ? WHERE id = ?")
            .bind(now_millis())
            .bind(id)
            .execute(pool)
            .await?;
        if rows.rows_affected() == 0 {
            return Err(RepoError::NotFound(format!("Product {id} not found")));
        }
        return Ok(DeleteOutcome::Deactivated);
    }
    let rows = sqlx::query("DELETE FROM product WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Product {id} not found")));
    }
    Ok(DeleteOutcome::Deleted)
}

/// Direct stock overwrite (admin)
pub async fn set_stock(pool: &SqlitePool, id: i64, quantity: i64) -> RepoResult<Product> {
    if quantity < 0 {
        return Err(RepoError::Validation("stock_quantity must not be negative".into()));
    }
    let rows = sqlx::query("UPDATE product SET stock_quantity = ?, updated_at = ? WHERE id = ?")
        .bind(quantity)
        .bind(now_millis())
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Product {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Product {id} not found")))
}

/// Take `quantity` units if available. Returns `false` without touching
/// the row when stock is insufficient.
pub async fn reserve_stock(conn: &mut SqliteConnection, id: i64, quantity: i64) -> RepoResult<bool> {
    let rows = sqlx::query(
        "UPDATE product SET stock_quantity = stock_quantity - ?1, updated_at = ?2 WHERE id = ?3 AND stock_quantity >= ?1",
    )
    .bind(quantity)
    .bind(now_millis())
    .bind(id)
    .execute(conn)
    .await?;
    Ok(rows.rows_affected() == 1)
}

/// Return `quantity` units to stock
pub async fn restore_stock(conn: &mut SqliteConnection, id: i64, quantity: i64) -> RepoResult<()> {
    sqlx::query("UPDATE product SET stock_quantity = stock_quantity + ?, updated_at = ? WHERE id = ?")
        .bind(quantity)
        .bind(now_millis())
        .bind(id)
        .execute(conn)
        .await?;
    Ok(())
}
