//! Category Repository

use super::{RepoError, RepoResult};
use shared::models::{Category, CategoryCreate, CategoryUpdate};
use shared::util::{now_millis, slugify};
use sqlx::SqlitePool;

const SELECT_WITH_COUNT: &str = "SELECT c.id, c.name, c.slug, c.description, c.allows_delivery, c.is_active, c.created_at, c.updated_at, (SELECT COUNT(*) FROM product p WHERE p.category_id = c.id AND p.is_active = 1) AS product_count FROM category c";

/// All categories; inactive ones only when `include_inactive`
pub async fn find_all(pool: &SqlitePool, include_inactive: bool) -> RepoResult<Vec<Category>> {
    let sql = if include_inactive {
        format!("{SELECT_WITH_COUNT} ORDER BY c.name")
    } else {
        format!("{SELECT_WITH_COUNT} WHERE c.is_active = 1 ORDER BY c.name")
    };
    let categories = sqlx::query_as::<_, Category>(&sql).fetch_all(pool).await?;
    Ok(categories)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Category>> {
    let category = sqlx::query_as::<_, Category>(&format!("{SELECT_WITH_COUNT} WHERE c.id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(category)
}

pub async fn create(pool: &SqlitePool, data: CategoryCreate) -> RepoResult<Category> {
    let name = data.name.trim();
    let slug = slugify(name);
    if slug.is_empty() {
        return Err(RepoError::Validation("Category name must contain letters or digits".into()));
    }
    let now = now_millis();
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO category (name, slug, description, allows_delivery, is_active, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(name)
    .bind(&slug)
    .bind(data.description)
    .bind(data.allows_delivery.unwrap_or(true))
    .bind(data.is_active.unwrap_or(true))
    .bind(now)
    .bind(now)
    .fetch_one(pool)
    .await
    .map_err(|e| match RepoError::from(e) {
        RepoError::Duplicate(_) => RepoError::Duplicate(format!("Category '{name}' already exists")),
        other => other,
    })?;
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create category".into()))
}

pub async fn update(pool: &SqlitePool, id: i64, data: CategoryUpdate) -> RepoResult<Category> {
    let name = data.name.as_deref().map(str::trim);
    let slug = name.map(slugify);
    if slug.as_deref() == Some("") {
        return Err(RepoError::Validation("Category name must contain letters or digits".into()));
    }
    let rows = sqlx::query(
        "UPDATE category SET name = COALESCE(?1, name), slug = COALESCE(?2, slug), description = COALESCE(?3, description), allows_delivery = COALESCE(?4, allows_delivery), is_active = COALESCE(?5, is_active), updated_at = ?6 WHERE id = ?7",
    )
    .bind(name)
    .bind(slug)
    .bind(data.description)
    .bind(data.allows_delivery)
    .bind(data.is_active)
    .bind(now_millis())
    .bind(id)
    .execute(pool)
    .await
    .map_err(|e| match RepoError::from(e) {
        RepoError::Duplicate(_) => RepoError::Duplicate("Category name already exists".into()),
        other => other,
    })?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Category {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Category {id} not found")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::fixtures;
    use crate::db::test_pool;

    #[tokio::test]
    async fn test_create_and_list_with_counts() {
        let pool = test_pool().await;
        let grocery = create(
            &pool,
            CategoryCreate {
                name: "Grocery".into(),
                description: None,
                allows_delivery: None,
                is_active: None,
            },
        )
        .await
        .unwrap();
        assert_eq!(grocery.slug, "grocery");
        assert!(grocery.allows_delivery);

        fixtures::product(&pool, grocery.id, "Rice 5kg", 4500, 20).await;
        fixtures::product(&pool, grocery.id, "Sugar 1kg", 5500, 5).await;

        let all = find_all(&pool, false).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].product_count, Some(2));
    }

    #[tokio::test]
    async fn test_duplicate_name_rejected() {
        let pool = test_pool().await;
        let payload = CategoryCreate {
            name: "Dry Goods".into(),
            description: None,
            allows_delivery: Some(false),
            is_active: None,
        };
        create(&pool, payload.clone()).await.unwrap();
        assert!(matches!(create(&pool, payload).await, Err(RepoError::Duplicate(_))));
    }

    #[tokio::test]
    async fn test_update_toggles_delivery_and_hides_inactive() {
        let pool = test_pool().await;
        let id = fixtures::category(&pool, "Farm Supply", true).await;

        let updated = update(
            &pool,
            id,
            CategoryUpdate {
                allows_delivery: Some(false),
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert!(!updated.allows_delivery);
        assert_eq!(updated.name, "Farm Supply");

        assert!(find_all(&pool, false).await.unwrap().is_empty());
        assert_eq!(find_all(&pool, true).await.unwrap().len(), 1);

        assert!(matches!(
            update(&pool, 999, CategoryUpdate::default()).await,
            Err(RepoError::NotFound(_))
        ));
    }
}
