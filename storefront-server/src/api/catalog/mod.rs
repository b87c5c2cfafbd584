//! Catalog API 模块 (公开只读)
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/categories | GET | 启用的分类及商品数 |
//! | /api/categories/{id} | GET | 单个分类 |
//! | /api/products | GET | 启用商品分页列表 |
//! | /api/products/featured | GET | 最新有货商品 (8 个) |
//! | /api/products/{id} | GET | 商品详情 (含评分) |
//! | /api/products/{id}/reviews | GET | 商品评价 |

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .nest("/api/categories", category_routes())
        .nest("/api/products", product_routes())
}

fn category_routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list_categories))
        .route("/{id}", get(handler::get_category))
}

fn product_routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list_products))
        .route("/featured", get(handler::featured_products))
        .route("/{id}", get(handler::get_product))
        .route("/{id}/reviews", get(handler::list_reviews))
}
