//! Review API 模块
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/reviews | POST | 提交商品评价 (每人每商品一条) |
//!
//! 商品评价列表见 `GET /api/products/{id}/reviews`。

mod handler;

use axum::{Router, routing::post};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/reviews", post(handler::create))
}
