use async_trait::async_trait;
use serde::Serialize;
use shared::models::{NotificationKind, NotificationPayload};
use shared::util::now_millis;
use sqlx::SqlitePool;
use tokio::sync::broadcast;

use super::{NotificationChannel, NotificationEvent, NotifyError};
use crate::db::repository::notification;

/// 收件箱通道: 写入 notification 表
pub struct DatabaseChannel {
    pool: SqlitePool,
}

impl DatabaseChannel {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationChannel for DatabaseChannel {
    fn name(&self) -> &'static str {
        "database"
    }

    async fn deliver(&self, event: &NotificationEvent) -> Result<(), NotifyError> {
        notification::insert(&self.pool, event.recipient_id, event.kind, &event.payload)
            .await
            .map_err(|e| NotifyError::Storage(e.to_string()))?;
        Ok(())
    }
}

/// 实时推送的通知
#[derive(Debug, Clone, Serialize)]
pub struct LiveNotification {
    pub user_id: i64,
    pub kind: NotificationKind,
    pub data: NotificationPayload,
    pub created_at: i64,
}

/// 进程内广播通道
pub struct BroadcastChannel {
    tx: broadcast::Sender<LiveNotification>,
}

impl BroadcastChannel {
    pub fn new(tx: broadcast::Sender<LiveNotification>) -> Self {
        Self { tx }
    }
}

#[async_trait]
impl NotificationChannel for BroadcastChannel {
    fn name(&self) -> &'static str {
        "broadcast"
    }

    async fn deliver(&self, event: &NotificationEvent) -> Result<(), NotifyError> {
        // 没有订阅者时 send 返回 Err，属于正常情况
        let _ = self.tx.send(LiveNotification {
            user_id: event.recipient_id,
            kind: event.kind,
            data: event.payload.clone(),
            created_at: now_millis(),
        });
        Ok(())
    }
}

/// 日志通道
pub struct LogChannel;

#[async_trait]
impl NotificationChannel for LogChannel {
    fn name(&self) -> &'static str {
        "log"
    }

    async fn deliver(&self, event: &NotificationEvent) -> Result<(), NotifyError> {
        tracing::info!(
            target: "notification",
            recipient_id = event.recipient_id,
            kind = event.kind.as_str(),
            order_number = %event.payload.order_number,
            status = %event.payload.status,
            "{}",
            event.payload.message
        );
        Ok(())
    }
}
