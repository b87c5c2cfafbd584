//! 订单通知
//!
//! 订单事件 (新订单、已接收、状态变更) 在事务提交后分发到配置的通道。
//! 单个通道失败只记录警告，不影响其他通道，也不回滚订单。
//!
//! | 通道 | 说明 |
//! |------|------|
//! | `database` | 写入 notification 表 (收件箱) |
//! | `broadcast` | 进程内广播，供 SSE 订阅 |
//! | `log` | 写入 tracing 日志 |

mod channels;

pub use channels::{BroadcastChannel, DatabaseChannel, LiveNotification, LogChannel};

use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use shared::models::{NotificationKind, NotificationPayload};
use sqlx::SqlitePool;
use thiserror::Error;
use tokio::sync::broadcast;

/// 广播通道容量
pub const BROADCAST_CAPACITY: usize = 1024;

/// 通知通道类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelKind {
    Database,
    Broadcast,
    Log,
}

impl FromStr for ChannelKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "database" => Ok(Self::Database),
            "broadcast" => Ok(Self::Broadcast),
            "log" => Ok(Self::Log),
            other => Err(format!("Unknown notification channel: {other}")),
        }
    }
}

impl ChannelKind {
    /// 解析逗号分隔列表，忽略空项和重复项
    pub fn parse_list(list: &str) -> Result<Vec<Self>, String> {
        let mut kinds = Vec::new();
        for item in list.split(',').filter(|s| !s.trim().is_empty()) {
            let kind = item.parse()?;
            if !kinds.contains(&kind) {
                kinds.push(kind);
            }
        }
        Ok(kinds)
    }
}

/// 一条待投递的通知
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationEvent {
    pub recipient_id: i64,
    pub kind: NotificationKind,
    pub payload: NotificationPayload,
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("通知写入失败: {0}")]
    Storage(String),

    #[error("通知投递失败: {0}")]
    Delivery(String),
}

impl From<sqlx::Error> for NotifyError {
    fn from(err: sqlx::Error) -> Self {
        NotifyError::Storage(err.to_string())
    }
}

/// 通知通道
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    fn name(&self) -> &'static str;

    async fn deliver(&self, event: &NotificationEvent) -> Result<(), NotifyError>;
}

/// 通知分发器
#[derive(Clone)]
pub struct Notifier {
    channels: Vec<Arc<dyn NotificationChannel>>,
    live: broadcast::Sender<LiveNotification>,
}

impl std::fmt::Debug for Notifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<_> = self.channels.iter().map(|c| c.name()).collect();
        f.debug_struct("Notifier").field("channels", &names).finish()
    }
}

impl Notifier {
    /// 按配置装配通道
    pub fn from_config(kinds: &[ChannelKind], pool: SqlitePool) -> Self {
        let (live, _) = broadcast::channel(BROADCAST_CAPACITY);
        let channels = kinds
            .iter()
            .map(|kind| -> Arc<dyn NotificationChannel> {
                match kind {
                    ChannelKind::Database => Arc::new(DatabaseChannel::new(pool.clone())),
                    ChannelKind::Broadcast => Arc::new(BroadcastChannel::new(live.clone())),
                    ChannelKind::Log => Arc::new(LogChannel),
                }
            })
            .collect();
        Self { channels, live }
    }

    /// 自定义通道 (测试)
    pub fn with_channels(channels: Vec<Arc<dyn NotificationChannel>>) -> Self {
        let (live, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self { channels, live }
    }

    /// 订阅进程内广播 (SSE)
    pub fn subscribe(&self) -> broadcast::Receiver<LiveNotification> {
        self.live.subscribe()
    }

    /// 投递单条通知到所有通道
    pub async fn notify(&self, event: &NotificationEvent) {
        for channel in &self.channels {
            if let Err(e) = channel.deliver(event).await {
                tracing::warn!(
                    channel = channel.name(),
                    recipient_id = event.recipient_id,
                    kind = event.kind.as_str(),
                    order_number = %event.payload.order_number,
                    error = %e,
                    "Notification delivery failed"
                );
            }
        }
    }

    pub async fn notify_all(&self, events: &[NotificationEvent]) {
        for event in events {
            self.notify(event).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::fixtures::sample_order;
    use shared::models::OrderStatus;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FailingChannel;

    #[async_trait]
    impl NotificationChannel for FailingChannel {
        fn name(&self) -> &'static str {
            "failing"
        }

        async fn deliver(&self, _event: &NotificationEvent) -> Result<(), NotifyError> {
            Err(NotifyError::Delivery("mail server down".into()))
        }
    }

    #[derive(Default)]
    struct RecordingChannel {
        seen: Mutex<Vec<i64>>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl NotificationChannel for RecordingChannel {
        fn name(&self) -> &'static str {
            "recording"
        }

        async fn deliver(&self, event: &NotificationEvent) -> Result<(), NotifyError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen.lock().unwrap().push(event.recipient_id);
            Ok(())
        }
    }

    fn event(recipient_id: i64) -> NotificationEvent {
        NotificationEvent {
            recipient_id,
            kind: NotificationKind::OrderStatusChanged,
            payload: NotificationPayload::status_changed(&sample_order(1, "RB202401010001", OrderStatus::Confirmed)),
        }
    }

    #[test]
    fn test_parse_channel_list() {
        assert_eq!(
            ChannelKind::parse_list("database, log,database").unwrap(),
            vec![ChannelKind::Database, ChannelKind::Log]
        );
        assert_eq!(ChannelKind::parse_list("").unwrap(), vec![]);
        assert!(ChannelKind::parse_list("sms").is_err());
    }

    #[tokio::test]
    async fn test_failing_channel_does_not_block_others() {
        let recorder = Arc::new(RecordingChannel::default());
        let channels: Vec<Arc<dyn NotificationChannel>> = vec![Arc::new(FailingChannel), recorder.clone()];
        let notifier = Notifier::with_channels(channels);

        notifier.notify_all(&[event(1), event(2)]).await;

        assert_eq!(recorder.calls.load(Ordering::SeqCst), 2);
        assert_eq!(*recorder.seen.lock().unwrap(), vec![1, 2]);
    }
}
