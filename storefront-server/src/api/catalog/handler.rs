//! Catalog API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use shared::models::{Category, Product, ProductDetail, ProductFilter, Review};
use shared::pagination::{PageQuery, PaginatedResponse};

use crate::core::ServerState;
use crate::db::repository::{category, product, review};
use crate::utils::{AppError, AppResult, ErrorCode};

/// 公开可见: 商品与所属分类均启用
fn is_visible(product: &Product) -> bool {
    product.is_active && product.category.as_ref().is_none_or(|c| c.is_active)
}

async fn visible_product(state: &ServerState, id: i64) -> AppResult<Product> {
    product::find_by_id(&state.pool, id)
        .await?
        .filter(is_visible)
        .ok_or_else(|| AppError::with_message(ErrorCode::ProductNotFound, format!("Product {id} not found")))
}

/// GET /api/categories - 启用的分类
pub async fn list_categories(State(state): State<ServerState>) -> AppResult<Json<Vec<Category>>> {
    let categories = category::find_all(&state.pool, false).await?;
    Ok(Json(categories))
}

/// GET /api/categories/{id}
pub async fn get_category(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Category>> {
    let category = category::find_by_id(&state.pool, id)
        .await?
        .filter(|c| c.is_active)
        .ok_or_else(|| AppError::with_message(ErrorCode::CategoryNotFound, format!("Category {id} not found")))?;
    Ok(Json(category))
}

/// GET /api/products - 启用商品，支持 category_id / search 过滤
pub async fn list_products(
    State(state): State<ServerState>,
    Query(filter): Query<ProductFilter>,
    Query(page): Query<PageQuery>,
) -> AppResult<Json<PaginatedResponse<Product>>> {
    let filter = ProductFilter {
        include_inactive: false,
        stock_status: None,
        ..filter
    };
    let (products, total) = product::find_page(&state.pool, &filter, &page).await?;
    Ok(Json(PaginatedResponse::from_query(products, total, &page)))
}

/// 首页推荐数量
pub const FEATURED_LIMIT: i64 = 8;

/// GET /api/products/featured - 最新上架且有货的商品
pub async fn featured_products(State(state): State<ServerState>) -> AppResult<Json<Vec<Product>>> {
    Ok(Json(product::find_featured(&state.pool, FEATURED_LIMIT).await?))
}

/// GET /api/products/{id} - 商品详情，停用商品返回 404
pub async fn get_product(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ProductDetail>> {
    let product = visible_product(&state, id).await?;
    let (average_rating, review_count) = review::rating_summary(&state.pool, id).await?;
    Ok(Json(ProductDetail {
        product,
        average_rating,
        review_count,
    }))
}

/// GET /api/products/{id}/reviews - 评价，最新在前
pub async fn list_reviews(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Query(page): Query<PageQuery>,
) -> AppResult<Json<PaginatedResponse<Review>>> {
    visible_product(&state, id).await?;
    let (reviews, total) = review::find_by_product(&state.pool, id, &page).await?;
    Ok(Json(PaginatedResponse::from_query(reviews, total, &page)))
}
