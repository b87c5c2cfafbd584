//! Admin product handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use http::StatusCode;
use serde::Serialize;
use shared::models::{Product, ProductCreate, ProductFilter, ProductUpdate, StockUpdate};
use shared::pagination::{PageQuery, PaginatedResponse};

use crate::api::not_found_as;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::product::{self, DeleteOutcome};
use crate::utils::{AppError, AppResult, ErrorCode, ValidatedJson};

fn product_not_found(id: i64) -> AppError {
    AppError::with_message(ErrorCode::ProductNotFound, format!("Product {id} not found"))
}

async fn ensure_exists(state: &ServerState, id: i64) -> AppResult<()> {
    product::find_by_id(&state.pool, id)
        .await?
        .map(|_| ())
        .ok_or_else(|| product_not_found(id))
}

/// GET /api/admin/products - 含停用商品，支持 `stock_status=low|out`
pub async fn list(
    State(state): State<ServerState>,
    Query(filter): Query<ProductFilter>,
    Query(page): Query<PageQuery>,
) -> AppResult<Json<PaginatedResponse<Product>>> {
    let filter = ProductFilter {
        include_inactive: true,
        ..filter
    };
    let (products, total) = product::find_page(&state.pool, &filter, &page).await?;
    Ok(Json(PaginatedResponse::from_query(products, total, &page)))
}

/// GET /api/admin/products/low-stock
pub async fn low_stock(State(state): State<ServerState>) -> AppResult<Json<Vec<Product>>> {
    Ok(Json(product::find_low_stock(&state.pool).await?))
}

/// POST /api/admin/products
pub async fn create(
    State(state): State<ServerState>,
    admin: CurrentUser,
    ValidatedJson(payload): ValidatedJson<ProductCreate>,
) -> AppResult<(StatusCode, Json<Product>)> {
    let created = product::create(&state.pool, payload)
        .await
        .map_err(not_found_as(ErrorCode::CategoryNotFound))?;
    tracing::info!(admin_id = admin.id, product_id = created.id, slug = %created.slug, "Product created");
    Ok((StatusCode::CREATED, Json(created)))
}

/// PUT /api/admin/products/{id}
pub async fn update(
    State(state): State<ServerState>,
    admin: CurrentUser,
    Path(id): Path<i64>,
    ValidatedJson(payload): ValidatedJson<ProductUpdate>,
) -> AppResult<Json<Product>> {
    ensure_exists(&state, id).await?;
    // 商品已确认存在，此处的 NotFound 只可能来自分类
    let updated = product::update(&state.pool, id, payload)
        .await
        .map_err(not_found_as(ErrorCode::CategoryNotFound))?;
    tracing::info!(admin_id = admin.id, product_id = id, "Product updated");
    Ok(Json(updated))
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub id: i64,
    /// deleted | deactivated
    pub outcome: &'static str,
}

/// DELETE /api/admin/products/{id} - 被订单引用的商品改为停用
pub async fn delete(
    State(state): State<ServerState>,
    admin: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<DeleteResponse>> {
    let outcome = product::delete(&state.pool, id)
        .await
        .map_err(not_found_as(ErrorCode::ProductNotFound))?;
    let outcome = match outcome {
        DeleteOutcome::Deleted => "deleted",
        DeleteOutcome::Deactivated => "deactivated",
    };
    tracing::info!(admin_id = admin.id, product_id = id, outcome, "Product removed");
    Ok(Json(DeleteResponse { id, outcome }))
}

/// PUT /api/admin/products/{id}/stock - 直接覆盖库存
pub async fn update_stock(
    State(state): State<ServerState>,
    admin: CurrentUser,
    Path(id): Path<i64>,
    ValidatedJson(payload): ValidatedJson<StockUpdate>,
) -> AppResult<Json<Product>> {
    let updated = product::set_stock(&state.pool, id, payload.stock_quantity)
        .await
        .map_err(not_found_as(ErrorCode::ProductNotFound))?;
    tracing::info!(
        admin_id = admin.id,
        product_id = id,
        stock_quantity = updated.stock_quantity,
        "Stock overwritten"
    );
    Ok(Json(updated))
}
