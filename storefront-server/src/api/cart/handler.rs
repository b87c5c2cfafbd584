//! Cart API Handlers
//!
//! 所有操作只作用于当前用户自己的购物车行。

use axum::{
    Json,
    extract::{Path, State},
};
use http::StatusCode;
use shared::models::{CartAdd, CartItem, CartUpdate, CartView, Product};

use crate::api::not_found_as;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::{RepoError, cart, product};
use crate::orders::money;
use crate::utils::{AppError, AppResult, ErrorCode, ValidatedJson};

/// 实时价格合计
fn cart_view(items: Vec<CartItem>) -> CartView {
    let total = money::sum(items.iter().filter_map(|item| {
        item.product
            .as_ref()
            .map(|p| money::line_total(p.price, item.quantity))
    }));
    let item_count = items.iter().map(|item| item.quantity).sum();
    CartView {
        items,
        total,
        item_count,
    }
}

async fn load_view(state: &ServerState, user_id: i64) -> AppResult<Json<CartView>> {
    let items = cart::find_by_user(&state.pool, user_id).await?;
    Ok(Json(cart_view(items)))
}

/// 商品存在、启用且分类启用
async fn purchasable(state: &ServerState, product_id: i64) -> AppResult<Product> {
    let product = product::find_by_id(&state.pool, product_id)
        .await?
        .ok_or_else(|| {
            AppError::with_message(ErrorCode::ProductNotFound, format!("Product {product_id} not found"))
        })?;
    let category_active = product.category.as_ref().is_none_or(|c| c.is_active);
    if !product.is_active || !category_active {
        return Err(AppError::with_message(
            ErrorCode::ProductUnavailable,
            format!("{} is not available", product.name),
        )
        .with_detail("product_id", product.id));
    }
    Ok(product)
}

fn ensure_stock(product: &Product, quantity: i64) -> AppResult<()> {
    if quantity > product.stock_quantity {
        return Err(AppError::with_message(
            ErrorCode::CartQuantityExceedsStock,
            format!(
                "Only {} of {} in stock",
                product.stock_quantity, product.name
            ),
        )
        .with_detail("product_id", product.id)
        .with_detail("requested", quantity)
        .with_detail("available", product.stock_quantity));
    }
    Ok(())
}

/// GET /api/cart
pub async fn show(State(state): State<ServerState>, user: CurrentUser) -> AppResult<Json<CartView>> {
    load_view(&state, user.id).await
}

/// POST /api/cart - 加入商品，已在购物车中则累加数量
pub async fn add(
    State(state): State<ServerState>,
    user: CurrentUser,
    ValidatedJson(payload): ValidatedJson<CartAdd>,
) -> AppResult<(StatusCode, Json<CartView>)> {
    let product = purchasable(&state, payload.product_id).await?;
    let existing = cart::quantity_of(&state.pool, user.id, product.id).await?;
    ensure_stock(&product, existing + payload.quantity)?;

    cart::add(&state.pool, user.id, product.id, payload.quantity).await?;
    tracing::debug!(user_id = user.id, product_id = product.id, quantity = payload.quantity, "Cart line added");

    Ok((StatusCode::CREATED, load_view(&state, user.id).await?))
}

/// PUT /api/cart/{item_id} - 修改数量
pub async fn update(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(item_id): Path<i64>,
    ValidatedJson(payload): ValidatedJson<CartUpdate>,
) -> AppResult<Json<CartView>> {
    let item = cart::find_item(&state.pool, user.id, item_id)
        .await?
        .ok_or_else(|| AppError::with_message(ErrorCode::CartItemNotFound, format!("Cart item {item_id} not found")))?;
    let product = purchasable(&state, item.product_id).await?;
    ensure_stock(&product, payload.quantity)?;

    cart::update_quantity(&state.pool, user.id, item_id, payload.quantity)
        .await
        .map_err(not_found_as(ErrorCode::CartItemNotFound))?;
    load_view(&state, user.id).await
}

/// DELETE /api/cart/{item_id}
pub async fn remove(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(item_id): Path<i64>,
) -> AppResult<Json<CartView>> {
    cart::remove(&state.pool, user.id, item_id)
        .await
        .map_err(not_found_as(ErrorCode::CartItemNotFound))?;
    load_view(&state, user.id).await
}

/// DELETE /api/cart - 清空
pub async fn clear(State(state): State<ServerState>, user: CurrentUser) -> AppResult<Json<CartView>> {
    let mut conn = state.pool.acquire().await.map_err(RepoError::from)?;
    let removed = cart::clear(&mut conn, user.id).await?;
    tracing::debug!(user_id = user.id, removed, "Cart cleared");
    Ok(Json(cart_view(Vec::new())))
}
