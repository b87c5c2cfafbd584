//! Admin category handlers

use axum::{
    Json,
    extract::{Path, State},
};
use http::StatusCode;
use shared::models::{Category, CategoryCreate, CategoryUpdate};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::{RepoError, category};
use crate::utils::{AppError, AppResult, ErrorCode, ValidatedJson};

fn category_error(err: RepoError) -> AppError {
    match err {
        RepoError::NotFound(msg) => AppError::with_message(ErrorCode::CategoryNotFound, msg),
        RepoError::Duplicate(msg) => AppError::with_message(ErrorCode::CategoryNameExists, msg),
        other => other.into(),
    }
}

/// GET /api/admin/categories - 含停用分类
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Category>>> {
    Ok(Json(category::find_all(&state.pool, true).await?))
}

/// POST /api/admin/categories
pub async fn create(
    State(state): State<ServerState>,
    admin: CurrentUser,
    ValidatedJson(payload): ValidatedJson<CategoryCreate>,
) -> AppResult<(StatusCode, Json<Category>)> {
    let created = category::create(&state.pool, payload)
        .await
        .map_err(category_error)?;
    tracing::info!(admin_id = admin.id, category_id = created.id, "Category created");
    Ok((StatusCode::CREATED, Json(created)))
}

/// PUT /api/admin/categories/{id}
pub async fn update(
    State(state): State<ServerState>,
    admin: CurrentUser,
    Path(id): Path<i64>,
    ValidatedJson(payload): ValidatedJson<CategoryUpdate>,
) -> AppResult<Json<Category>> {
    let updated = category::update(&state.pool, id, payload)
        .await
        .map_err(category_error)?;
    tracing::info!(
        admin_id = admin.id,
        category_id = id,
        allows_delivery = updated.allows_delivery,
        "Category updated"
    );
    Ok(Json(updated))
}
