//! Admin dashboard handler

use axum::{Json, extract::State};
use shared::models::Dashboard;

use crate::core::ServerState;
use crate::db::repository::report;
use crate::utils::AppResult;

/// GET /api/admin/dashboard - 统计、状态分布、近期订单、低库存、分类销售、畅销商品
pub async fn show(State(state): State<ServerState>) -> AppResult<Json<Dashboard>> {
    Ok(Json(report::dashboard(&state.pool).await?))
}
