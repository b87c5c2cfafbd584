//! Admin API 模块
//!
//! 所有路由位于 `/api/admin` 下，并经过 [`require_admin`] 校验。
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/admin/orders | GET | 订单列表 (状态、日期、关键字) |
//! | /api/admin/orders/{id} | GET | 订单详情 |
//! | /api/admin/orders/{id}/status | PUT | 更新状态 |
//! | /api/admin/products | GET / POST | 商品列表 (含停用) / 创建 |
//! | /api/admin/products/low-stock | GET | 低库存商品 |
//! | /api/admin/products/{id} | PUT / DELETE | 更新 / 删除 |
//! | /api/admin/products/{id}/stock | PUT | 直接设置库存 |
//! | /api/admin/categories | GET / POST | 分类列表 / 创建 |
//! | /api/admin/categories/{id} | PUT | 更新分类 |
//! | /api/admin/dashboard | GET | 仪表盘汇总 |

mod categories;
mod dashboard;
mod orders;
mod products;

use axum::{
    Router, middleware,
    routing::{get, put},
};

use crate::auth::require_admin;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest(
        "/api/admin",
        routes().route_layer(middleware::from_fn(require_admin)),
    )
}

fn routes() -> Router<ServerState> {
    Router::new()
        // Orders
        .route("/orders", get(orders::list))
        .route("/orders/{id}", get(orders::get_by_id))
        .route("/orders/{id}/status", put(orders::update_status))
        // Products (static paths before /{id})
        .route("/products", get(products::list).post(products::create))
        .route("/products/low-stock", get(products::low_stock))
        .route("/products/{id}", put(products::update).delete(products::delete))
        .route("/products/{id}/stock", put(products::update_stock))
        // Categories
        .route("/categories", get(categories::list).post(categories::create))
        .route("/categories/{id}", put(categories::update))
        // Dashboard
        .route("/dashboard", get(dashboard::show))
}
