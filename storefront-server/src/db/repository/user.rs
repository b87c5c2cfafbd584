//! User Repository

use super::{RepoError, RepoResult};
use shared::models::{User, UserCreate};
use shared::util::now_millis;
use sqlx::{SqliteConnection, SqlitePool};

const COLUMNS: &str = "id, name, email, phone, role, is_active, created_at";

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<User>> {
    let user = sqlx::query_as::<_, User>(&format!("SELECT {COLUMNS} FROM user WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

pub async fn find_by_email(pool: &SqlitePool, email: &str) -> RepoResult<Option<User>> {
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {COLUMNS} FROM user WHERE email = ? COLLATE NOCASE LIMIT 1"
    ))
    .bind(email)
    .fetch_optional(pool)
    .await?;
    Ok(user)
}

/// Active admin IDs (new order fan-out)
pub async fn find_admin_ids(conn: &mut SqliteConnection) -> RepoResult<Vec<i64>> {
    let ids = sqlx::query_scalar::<_, i64>(
        "SELECT id FROM user WHERE role = 'admin' AND is_active = 1 ORDER BY id",
    )
    .fetch_all(conn)
    .await?;
    Ok(ids)
}

pub async fn count_customers(pool: &SqlitePool) -> RepoResult<i64> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM user WHERE role = 'customer'")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

pub async fn create(pool: &SqlitePool, data: UserCreate) -> RepoResult<User> {
    if data.name.trim().is_empty() || data.email.trim().is_empty() {
        return Err(RepoError::Validation("name and email are required".into()));
    }
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO user (name, email, phone, role, created_at) VALUES (?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(data.name.trim())
    .bind(data.email.trim())
    .bind(data.phone)
    .bind(data.role)
    .bind(now_millis())
    .fetch_one(pool)
    .await?;
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create user".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;
    use shared::models::UserRole;

    #[tokio::test]
    async fn test_create_and_find() {
        let pool = test_pool().await;
        let user = create(
            &pool,
            UserCreate {
                name: "Ana Cruz".into(),
                email: "ana@example.com".into(),
                phone: None,
                role: UserRole::Customer,
            },
        )
        .await
        .unwrap();
        assert_eq!(user.role, UserRole::Customer);
        assert!(user.is_active);

        let found = find_by_email(&pool, "ANA@example.com").await.unwrap().unwrap();
        assert_eq!(found.id, user.id);

        let dup = create(
            &pool,
            UserCreate {
                name: "Ana Again".into(),
                email: "ana@example.com".into(),
                phone: None,
                role: UserRole::Customer,
            },
        )
        .await;
        assert!(matches!(dup, Err(RepoError::Duplicate(_))));
    }

    #[tokio::test]
    async fn test_admin_ids_excludes_customers_and_inactive() {
        let pool = test_pool().await;
        let a1 = crate::db::repository::fixtures::user(&pool, "Admin One", "admin").await;
        let a2 = crate::db::repository::fixtures::user(&pool, "Admin Two", "admin").await;
        crate::db::repository::fixtures::user(&pool, "Shopper", "customer").await;
        sqlx::query("UPDATE user SET is_active = 0 WHERE id = ?")
            .bind(a2)
            .execute(&pool)
            .await
            .unwrap();

        let mut conn = pool.acquire().await.unwrap();
        assert_eq!(find_admin_ids(&mut conn).await.unwrap(), vec![a1]);
        drop(conn);
        assert_eq!(count_customers(&pool).await.unwrap(), 1);
    }
}
