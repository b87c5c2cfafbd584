//! Storefront Server - 杂货店在线商城后端
//!
//! # 架构概述
//!
//! - **订单** (`orders`): 购物车结算、库存预留、订单号生成、状态流转
//! - **通知** (`notifications`): 订单事件的多通道通知
//! - **数据库** (`db`): SQLite (sqlx) 存储与仓储函数
//! - **认证** (`auth`): JWT 认证、管理员校验
//! - **HTTP API** (`api`): RESTful API 接口
//!
//! # 模块结构
//!
//! ```text
//! storefront-server/src/
//! ├── core/           # 配置、状态、服务器
//! ├── auth/           # JWT 认证
//! ├── api/            # HTTP 路由和处理器
//! ├── db/             # 连接池、迁移、仓储
//! ├── orders/         # 下单与状态流转
//! ├── notifications/  # 通知分发
//! └── utils/          # 日志、校验、时间
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod notifications;
pub mod orders;
pub mod utils;

// Re-export 公共类型
pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState};
pub use utils::{AppError, AppResult};

// Re-export unified error types from shared
pub use utils::{ErrorBody, ErrorCategory, ErrorCode};

// Re-export logger functions
pub use utils::logger::init_logger;

// Security logging macro - 支持 tracing 格式说明符
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

/// 初始化日志，返回的 guard 需持有到进程退出
pub fn setup_environment(
    config: &Config,
) -> anyhow::Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    utils::logger::init_logger(&config.log)
}

pub fn print_banner() {
    println!(
        r#"
   _____ __                  ____                 __
  / ___// /_____  ________  / __/________  ____  / /_
  \__ \/ __/ __ \/ ___/ _ \/ /_/ ___/ __ \/ __ \/ __/
 ___/ / /_/ /_/ / /  /  __/ __/ /  / /_/ / / / / /_
/____/\__/\____/_/   \___/_/ /_/   \____/_/ /_/\__/
    "#
    );
}
