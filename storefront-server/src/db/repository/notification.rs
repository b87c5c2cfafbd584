//! Notification Repository
//!
//! `data` is stored as a JSON text column.

use super::{RepoError, RepoResult};
use shared::models::{Notification, NotificationKind, NotificationPayload};
use shared::pagination::PageQuery;
use shared::util::now_millis;
use sqlx::SqlitePool;

#[derive(sqlx::FromRow)]
struct NotificationRow {
    id: i64,
    user_id: i64,
    kind: NotificationKind,
    data: String,
    read_at: Option<i64>,
    created_at: i64,
}

impl TryFrom<NotificationRow> for Notification {
    type Error = RepoError;

    fn try_from(row: NotificationRow) -> Result<Self, Self::Error> {
        let data: NotificationPayload = serde_json::from_str(&row.data)
            .map_err(|e| RepoError::Database(format!("Corrupt notification {}: {e}", row.id)))?;
        Ok(Notification {
            id: row.id,
            user_id: row.user_id,
            kind: row.kind,
            data,
            read_at: row.read_at,
            created_at: row.created_at,
        })
    }
}

pub async fn insert(
    pool: &SqlitePool,
    user_id: i64,
    kind: NotificationKind,
    payload: &NotificationPayload,
) -> RepoResult<i64> {
    let data = serde_json::to_string(payload)
        .map_err(|e| RepoError::Validation(format!("Unserializable payload: {e}")))?;
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO notification (user_id, kind, data, created_at) VALUES (?, ?, ?, ?) RETURNING id",
    )
    .bind(user_id)
    .bind(kind)
    .bind(data)
    .bind(now_millis())
    .fetch_one(pool)
    .await?;
    Ok(id)
}

/// Newest first. Returns (page items, total).
pub async fn find_page(
    pool: &SqlitePool,
    user_id: i64,
    unread_only: bool,
    page: &PageQuery,
) -> RepoResult<(Vec<Notification>, i64)> {
    let total = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM notification WHERE user_id = ?1 AND (?2 = 0 OR read_at IS NULL)",
    )
    .bind(user_id)
    .bind(unread_only)
    .fetch_one(pool)
    .await?;

    let rows = sqlx::query_as::<_, NotificationRow>(
        "SELECT id, user_id, kind, data, read_at, created_at FROM notification WHERE user_id = ?1 AND (?2 = 0 OR read_at IS NULL) ORDER BY created_at DESC, id DESC LIMIT ?3 OFFSET ?4",
    )
    .bind(user_id)
    .bind(unread_only)
    .bind(page.limit())
    .bind(page.offset())
    .fetch_all(pool)
    .await?;

    let items = rows
        .into_iter()
        .map(Notification::try_from)
        .collect::<RepoResult<Vec<_>>>()?;
    Ok((items, total))
}

pub async fn unread_count(pool: &SqlitePool, user_id: i64) -> RepoResult<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM notification WHERE user_id = ? AND read_at IS NULL",
    )
    .bind(user_id)
    .fetch_one(pool)
    .await?;
    Ok(count)
}

/// Mark one notification read; already-read ones keep their first timestamp
pub async fn mark_read(pool: &SqlitePool, user_id: i64, id: i64) -> RepoResult<()> {
    let rows = sqlx::query(
        "UPDATE notification SET read_at = COALESCE(read_at, ?) WHERE id = ? AND user_id = ?",
    )
    .bind(now_millis())
    .bind(id)
    .bind(user_id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Notification {id} not found")));
    }
    Ok(())
}

pub async fn mark_all_read(pool: &SqlitePool, user_id: i64) -> RepoResult<u64> {
    let rows = sqlx::query("UPDATE notification SET read_at = ? WHERE user_id = ? AND read_at IS NULL")
        .bind(now_millis())
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected())
}

pub async fn delete(pool: &SqlitePool, user_id: i64, id: i64) -> RepoResult<()> {
    let rows = sqlx::query("DELETE FROM notification WHERE id = ? AND user_id = ?")
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Notification {id} not found")));
    }
    Ok(())
}
