//! Review Repository

use super::{RepoError, RepoResult};
use shared::models::{OrderStatus, Review, ReviewCreate};
use shared::pagination::PageQuery;
use shared::util::now_millis;
use sqlx::SqlitePool;

const SELECT: &str = r#"
    SELECT r.id, r.user_id, r.product_id, r.order_id, r.rating, r.comment, r.is_verified,
           r.created_at, u.name AS reviewer_name
    FROM review r
    JOIN user u ON u.id = r.user_id
"#;

/// Newest first. Returns (page items, total).
pub async fn find_by_product(
    pool: &SqlitePool,
    product_id: i64,
    page: &PageQuery,
) -> RepoResult<(Vec<Review>, i64)> {
    let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM review WHERE product_id = ?")
        .bind(product_id)
        .fetch_one(pool)
        .await?;
    let reviews = sqlx::query_as::<_, Review>(&format!(
        "{SELECT} WHERE r.product_id = ? ORDER BY r.created_at DESC, r.id DESC LIMIT ? OFFSET ?"
    ))
    .bind(product_id)
    .bind(page.limit())
    .bind(page.offset())
    .fetch_all(pool)
    .await?;
    Ok((reviews, total))
}

/// (average rating, review count); average is `None` without reviews
pub async fn rating_summary(pool: &SqlitePool, product_id: i64) -> RepoResult<(Option<f64>, i64)> {
    let summary = sqlx::query_as::<_, (Option<f64>, i64)>(
        "SELECT AVG(rating), COUNT(*) FROM review WHERE product_id = ?",
    )
    .bind(product_id)
    .fetch_one(pool)
    .await?;
    Ok(summary)
}

pub async fn exists(pool: &SqlitePool, user_id: i64, product_id: i64) -> RepoResult<bool> {
    let count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM review WHERE user_id = ? AND product_id = ?",
    )
    .bind(user_id)
    .bind(product_id)
    .fetch_one(pool)
    .await?;
    Ok(count > 0)
}

/// Order belongs to the reviewer, is fulfilled, and contains the product
pub async fn order_qualifies(
    pool: &SqlitePool,
    user_id: i64,
    order_id: i64,
    product_id: i64,
) -> RepoResult<bool> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM orders o
        WHERE o.id = ?1 AND o.user_id = ?2 AND o.status IN (?3, ?4)
          AND EXISTS (SELECT 1 FROM order_item oi WHERE oi.order_id = o.id AND oi.product_id = ?5)
        "#,
    )
    .bind(order_id)
    .bind(user_id)
    .bind(OrderStatus::Delivered)
    .bind(OrderStatus::Processed)
    .bind(product_id)
    .fetch_one(pool)
    .await?;
    Ok(count > 0)
}

pub async fn create(
    pool: &SqlitePool,
    user_id: i64,
    data: &ReviewCreate,
    is_verified: bool,
) -> RepoResult<Review> {
    let comment = data
        .comment
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty());
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO review (user_id, product_id, order_id, rating, comment, is_verified, created_at) VALUES (?, ?, ?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(user_id)
    .bind(data.product_id)
    .bind(data.order_id)
    .bind(data.rating)
    .bind(comment)
    .bind(is_verified)
    .bind(now_millis())
    .fetch_one(pool)
    .await?;

    let review = sqlx::query_as::<_, Review>(&format!("{SELECT} WHERE r.id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    review.ok_or_else(|| RepoError::Database("Failed to create review".into()))
}
