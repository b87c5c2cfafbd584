//! 服务器状态
//!
//! [`ServerState`] 持有所有请求共享的服务，克隆成本为若干 `Arc` / 连接池句柄。

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::auth::JwtService;
use crate::core::{Config, Result};
use crate::db::{DbService, seed};
use crate::notifications::Notifier;
use crate::orders::{OrderNumberGenerator, OrderWorkflow};
use crate::utils::AppError;

/// 服务器状态 - 所有 handler 通过 `State<ServerState>` 访问
///
/// | 字段 | 说明 |
/// |------|------|
/// | config | 启动配置 |
/// | pool | SQLite 连接池 |
/// | jwt_service | 令牌校验 |
/// | notifier | 通知分发 (含 SSE 广播) |
/// | orders | 下单与状态流转 |
#[derive(Clone, Debug)]
pub struct ServerState {
    pub config: Arc<Config>,
    pub pool: SqlitePool,
    pub jwt_service: Arc<JwtService>,
    pub notifier: Arc<Notifier>,
    pub orders: OrderWorkflow,
}

impl ServerState {
    /// 打开数据库、执行迁移与种子数据，然后装配服务
    pub async fn initialize(config: &Config) -> Result<Self> {
        let db = DbService::new(&config.database_url, config.db_max_connections).await?;

        if config.seed_demo_data {
            let inserted = seed::seed_defaults(&db.pool).await.map_err(AppError::from)?;
            if inserted > 0 {
                tracing::info!(inserted, "Seeded default data");
            }
        }

        Ok(Self::with_pool(config.clone(), db.pool))
    }

    /// 基于已就绪的连接池装配 (测试中使用临时数据库)
    pub fn with_pool(config: Config, pool: SqlitePool) -> Self {
        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));
        let notifier = Arc::new(Notifier::from_config(&config.notification_channels, pool.clone()));
        let numbers = Arc::new(OrderNumberGenerator::new(
            config.order_number_prefix.clone(),
            config.business_tz,
        ));
        let orders = OrderWorkflow::new(pool.clone(), numbers, notifier.clone());

        tracing::debug!(
            channels = ?config.notification_channels,
            prefix = %config.order_number_prefix,
            "Server state assembled"
        );

        Self {
            config: Arc::new(config),
            pool,
            jwt_service,
            notifier,
            orders,
        }
    }
}
