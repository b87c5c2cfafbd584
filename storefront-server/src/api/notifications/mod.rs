//! Notification API 模块
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/notifications | GET | 收件箱 (`unread_only` 可选) |
//! | /api/notifications/unread-count | GET | 未读数 |
//! | /api/notifications/read-all | POST | 全部标记已读 |
//! | /api/notifications/stream | GET | SSE 实时推送 |
//! | /api/notifications/{id}/read | POST | 标记已读 |
//! | /api/notifications/{id} | DELETE | 删除 |

mod handler;

use axum::{
    Router,
    routing::{delete, get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/notifications", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list))
        .route("/unread-count", get(handler::unread_count))
        .route("/read-all", post(handler::mark_all_read))
        .route("/stream", get(handler::stream))
        .route("/{id}/read", post(handler::mark_read))
        .route("/{id}", delete(handler::delete))
}
