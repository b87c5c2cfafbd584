//! Order API 模块 (客户)
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/orders | POST | 购物车结算下单 |
//! | /api/orders | GET | 我的订单 |
//! | /api/orders/{id} | GET | 订单详情 |
//! | /api/orders/{id}/cancel | POST | 取消待处理订单 |

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", post(handler::place).get(handler::list))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/cancel", post(handler::cancel))
}
