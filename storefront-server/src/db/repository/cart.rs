//! Cart Repository

use super::{RepoError, RepoResult, product};
use shared::models::CartItem;
use shared::util::now_millis;
use sqlx::{SqliteConnection, SqlitePool};

const COLUMNS: &str = "id, user_id, product_id, quantity, created_at, updated_at";

/// Cart lines of a user with their products attached, oldest first
pub async fn find_by_user(pool: &SqlitePool, user_id: i64) -> RepoResult<Vec<CartItem>> {
    let mut conn = pool.acquire().await?;
    find_by_user_tx(&mut conn, user_id).await
}

/// Same as [`find_by_user`] inside an open transaction
pub async fn find_by_user_tx(conn: &mut SqliteConnection, user_id: i64) -> RepoResult<Vec<CartItem>> {
    let mut items = sqlx::query_as::<_, CartItem>(&format!(
        "SELECT {COLUMNS} FROM cart_item WHERE user_id = ? ORDER BY created_at, id"
    ))
    .bind(user_id)
    .fetch_all(&mut *conn)
    .await?;
    for item in &mut items {
        item.product = product::find_by_id_tx(&mut *conn, item.product_id).await?;
    }
    Ok(items)
}

pub async fn find_item(pool: &SqlitePool, user_id: i64, item_id: i64) -> RepoResult<Option<CartItem>> {
    let item = sqlx::query_as::<_, CartItem>(&format!(
        "SELECT {COLUMNS} FROM cart_item WHERE id = ? AND user_id = ?"
    ))
    .bind(item_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;
    Ok(item)
}

/// Quantity already in the cart for a product (0 when absent)
pub async fn quantity_of(pool: &SqlitePool, user_id: i64, product_id: i64) -> RepoResult<i64> {
    let quantity = sqlx::query_scalar::<_, i64>(
        "SELECT COALESCE(SUM(quantity), 0) FROM cart_item WHERE user_id = ? AND product_id = ?",
    )
    .bind(user_id)
    .bind(product_id)
    .fetch_one(pool)
    .await?;
    Ok(quantity)
}

/// Add to an existing line or create a new one
pub async fn add(pool: &SqlitePool, user_id: i64, product_id: i64, quantity: i64) -> RepoResult<()> {
    let now = now_millis();
    sqlx::query(
        "INSERT INTO cart_item (user_id, product_id, quantity, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?4) ON CONFLICT (user_id, product_id) DO UPDATE SET quantity = quantity + excluded.quantity, updated_at = excluded.updated_at",
    )
    .bind(user_id)
    .bind(product_id)
    .bind(quantity)
    .bind(now)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn update_quantity(pool: &SqlitePool, user_id: i64, item_id: i64, quantity: i64) -> RepoResult<()> {
    let rows = sqlx::query("UPDATE cart_item SET quantity = ?, updated_at = ? WHERE id = ? AND user_id = ?")
        .bind(quantity)
        .bind(now_millis())
        .bind(item_id)
        .bind(user_id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Cart item {item_id} not found")));
    }
    Ok(())
}

pub async fn remove(pool: &SqlitePool, user_id: i64, item_id: i64) -> RepoResult<()> {
    let rows = sqlx::query("DELETE FROM cart_item WHERE id = ? AND user_id = ?")
        .bind(item_id)
        .bind(user_id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Cart item {item_id} not found")));
    }
    Ok(())
}

pub async fn clear(conn: &mut SqliteConnection, user_id: i64) -> RepoResult<u64> {
    let rows = sqlx::query("DELETE FROM cart_item WHERE user_id = ?")
        .bind(user_id)
        .execute(conn)
        .await?;
    Ok(rows.rows_affected())
}
