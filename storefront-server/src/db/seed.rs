//! 开发环境默认数据
//!
//! 分类表为空时写入三个零售分类；没有管理员时创建一个本地管理员账号。

use shared::models::{CategoryCreate, UserCreate, UserRole};
use sqlx::SqlitePool;

use super::repository::{RepoResult, category, user};

/// (name, description, allows_delivery)
const DEFAULT_CATEGORIES: [(&str, &str, bool); 3] = [
    ("Grocery", "Everyday groceries", true),
    ("Dry Goods", "Bulk dry goods, pickup only", false),
    ("Farm Supply", "Feeds and farm supplies", true),
];

pub const DEFAULT_ADMIN_EMAIL: &str = "admin@storefront.local";

/// Returns the number of rows inserted
pub async fn seed_defaults(pool: &SqlitePool) -> RepoResult<usize> {
    let mut inserted = 0;

    let categories = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM category")
        .fetch_one(pool)
        .await?;
    if categories == 0 {
        for (name, description, allows_delivery) in DEFAULT_CATEGORIES {
            category::create(
                pool,
                CategoryCreate {
                    name: name.to_string(),
                    description: Some(description.to_string()),
                    allows_delivery: Some(allows_delivery),
                    is_active: Some(true),
                },
            )
            .await?;
            inserted += 1;
        }
        tracing::info!(count = DEFAULT_CATEGORIES.len(), "Seeded default categories");
    }

    let admins = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM user WHERE role = 'admin'")
        .fetch_one(pool)
        .await?;
    if admins == 0 {
        let admin = user::create(
            pool,
            UserCreate {
                name: "Store Admin".to_string(),
                email: DEFAULT_ADMIN_EMAIL.to_string(),
                phone: None,
                role: UserRole::Admin,
            },
        )
        .await?;
        inserted += 1;
        tracing::info!(user_id = admin.id, email = DEFAULT_ADMIN_EMAIL, "Seeded admin account");
    }

    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    #[tokio::test]
    async fn test_seed_is_idempotent() {
        let pool = test_pool().await;
        assert_eq!(seed_defaults(&pool).await.unwrap(), 4);
        assert_eq!(seed_defaults(&pool).await.unwrap(), 0);

        let categories = category::find_all(&pool, true).await.unwrap();
        let dry = categories.iter().find(|c| c.slug == "dry-goods").unwrap();
        assert!(!dry.allows_delivery);
        assert!(categories.iter().filter(|c| c.allows_delivery).count() == 2);

        let admin = user::find_by_email(&pool, DEFAULT_ADMIN_EMAIL).await.unwrap().unwrap();
        assert!(admin.is_admin());
    }
}
