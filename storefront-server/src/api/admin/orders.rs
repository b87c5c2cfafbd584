//! Admin order handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use shared::models::{Order, OrderFilter, UpdateOrderStatusRequest};
use shared::pagination::{PageQuery, PaginatedResponse};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::RepoError;
use crate::db::repository::order::{self, OrderListParams};
use crate::orders::StatusUpdate;
use crate::utils::time::day_range_millis;
use crate::utils::{AppError, AppResult, ErrorCode, ValidatedJson};

/// GET /api/admin/orders - `status`、`date_from`/`date_to` (含当天)、`search`
pub async fn list(
    State(state): State<ServerState>,
    Query(filter): Query<OrderFilter>,
    Query(page): Query<PageQuery>,
) -> AppResult<Json<PaginatedResponse<Order>>> {
    let (from, to) = day_range_millis(filter.date_from, filter.date_to, state.config.business_tz)?;
    let params = OrderListParams {
        user_id: None,
        status: filter.status,
        from,
        to,
        search: filter.search.as_deref(),
    };
    let (orders, total) = order::find_page(&state.pool, &params, &page).await?;
    Ok(Json(PaginatedResponse::from_query(orders, total, &page)))
}

/// GET /api/admin/orders/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Order>> {
    let mut order = order::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::with_message(ErrorCode::OrderNotFound, format!("Order {id} not found")))?;
    let mut conn = state.pool.acquire().await.map_err(RepoError::from)?;
    order::attach_products(&mut conn, &mut order).await?;
    Ok(Json(order))
}

/// PUT /api/admin/orders/{id}/status - 取消时必须填写原因
pub async fn update_status(
    State(state): State<ServerState>,
    admin: CurrentUser,
    Path(id): Path<i64>,
    ValidatedJson(payload): ValidatedJson<UpdateOrderStatusRequest>,
) -> AppResult<Json<Order>> {
    let update = StatusUpdate::try_from(payload)?;
    let target = update.status;
    let order = state.orders.update_status(id, update).await?;
    tracing::info!(
        admin_id = admin.id,
        order_id = id,
        status = %target,
        "Order status updated by admin"
    );
    Ok(Json(order))
}
