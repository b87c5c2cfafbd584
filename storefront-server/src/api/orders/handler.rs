//! Order API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use http::StatusCode;
use shared::models::{Order, PlaceOrderRequest};
use shared::pagination::{PageQuery, PaginatedResponse};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::RepoError;
use crate::db::repository::order::{self, OrderListParams};
use crate::utils::{AppError, AppResult, ErrorCode, ValidatedJson};

/// POST /api/orders - 结算当前购物车
pub async fn place(
    State(state): State<ServerState>,
    user: CurrentUser,
    ValidatedJson(payload): ValidatedJson<PlaceOrderRequest>,
) -> AppResult<(StatusCode, Json<Order>)> {
    let order = state.orders.place_order(user.id, payload).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// GET /api/orders - 我的订单，最新在前
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(page): Query<PageQuery>,
) -> AppResult<Json<PaginatedResponse<Order>>> {
    let params = OrderListParams {
        user_id: Some(user.id),
        ..Default::default()
    };
    let (orders, total) = order::find_page(&state.pool, &params, &page).await?;
    Ok(Json(PaginatedResponse::from_query(orders, total, &page)))
}

/// GET /api/orders/{id} - 仅限本人订单
pub async fn get_by_id(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<Order>> {
    let mut order = order::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::with_message(ErrorCode::OrderNotFound, format!("Order {id} not found")))?;
    if order.user_id != user.id {
        crate::security_log!("WARN", "order_access_denied", user_id = user.id, order_id = id);
        return Err(AppError::new(ErrorCode::NotResourceOwner));
    }
    let mut conn = state.pool.acquire().await.map_err(RepoError::from)?;
    order::attach_products(&mut conn, &mut order).await?;
    Ok(Json(order))
}

/// POST /api/orders/{id}/cancel - 取消本人的待处理订单并归还库存
pub async fn cancel(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<Order>> {
    let order = state.orders.cancel_by_customer(user.id, id).await?;
    Ok(Json(order))
}
