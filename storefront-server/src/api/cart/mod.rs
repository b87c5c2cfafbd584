//! Cart API 模块
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/cart | GET | 购物车及合计 |
//! | /api/cart | POST | 加入商品 (已有则累加) |
//! | /api/cart | DELETE | 清空 |
//! | /api/cart/{item_id} | PUT | 修改数量 |
//! | /api/cart/{item_id} | DELETE | 删除一行 |

mod handler;

use axum::{
    Router,
    routing::{get, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/cart", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::show).post(handler::add).delete(handler::clear))
        .route("/{item_id}", put(handler::update).delete(handler::remove))
}
