//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`catalog`] - 分类与商品浏览 (公开)
//! - [`cart`] - 购物车
//! - [`orders`] - 下单、订单查询与取消
//! - [`reviews`] - 商品评价
//! - [`notifications`] - 通知收件箱与 SSE 推送
//! - [`admin`] - 管理后台 (订单、商品、分类、仪表盘)

pub mod admin;
pub mod cart;
pub mod catalog;
pub mod health;
pub mod notifications;
pub mod orders;
pub mod reviews;

use crate::db::repository::RepoError;
use crate::utils::{AppError, ErrorCode};

// Re-export common types for handlers
pub use crate::utils::{AppResult, ValidatedJson};

/// 仓储 `NotFound` → 指定业务错误码，其余错误照常转换
pub(crate) fn not_found_as(code: ErrorCode) -> impl Fn(RepoError) -> AppError {
    move |err| match err {
        RepoError::NotFound(msg) => AppError::with_message(code, msg),
        other => other.into(),
    }
}
