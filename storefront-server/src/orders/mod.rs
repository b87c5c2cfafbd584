//! 订单流程
//!
//! - **placement**: 购物车结算，预留库存并生成订单号
//! - **lifecycle**: 客户取消、管理员状态流转
//! - **status**: 状态转换表
//! - **number**: 订单号生成
//! - **money**: 金额计算 (Decimal / 分)
//!
//! # 数据流
//!
//! ```text
//! CartItem ──┐
//!            ├─ BEGIN ─ reserve stock ─ insert order/items ─ clear cart ─ COMMIT ─→ Notifier
//! Request  ──┘
//! ```
//!
//! 每个写操作都在单个事务内完成；通知在提交之后发送，失败不影响订单。

mod error;
mod lifecycle;
pub mod money;
pub mod number;
mod placement;
pub mod status;

pub use error::{OrderError, ProductRef};
pub use lifecycle::{MAX_REASON_CHARS, StatusUpdate};
pub use number::{OrderNumberGenerator, RandomSuffix, SuffixSource};
pub use status::{StockEffect, Transition, check_transition};

use std::sync::Arc;

use shared::models::{NotificationKind, NotificationPayload, Order, OrderItem};
use sqlx::{SqliteConnection, SqlitePool};

use crate::db::repository::product;
use crate::notifications::{NotificationEvent, Notifier};

/// Result type for workflow operations
pub type OrderResult<T> = Result<T, OrderError>;

/// 订单流程服务
#[derive(Debug, Clone)]
pub struct OrderWorkflow {
    pool: SqlitePool,
    numbers: Arc<OrderNumberGenerator>,
    notifier: Arc<Notifier>,
}

impl OrderWorkflow {
    pub fn new(pool: SqlitePool, numbers: Arc<OrderNumberGenerator>, notifier: Arc<Notifier>) -> Self {
        Self {
            pool,
            numbers,
            notifier,
        }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Status change message to the owner
    async fn notify_status_changed(&self, order: &Order) {
        let event = NotificationEvent {
            recipient_id: order.user_id,
            kind: NotificationKind::OrderStatusChanged,
            payload: NotificationPayload::status_changed(order),
        };
        self.notifier.notify(&event).await;
    }
}

/// Put every line's quantity back on its product
async fn release_items(conn: &mut SqliteConnection, items: &[OrderItem]) -> OrderResult<()> {
    for item in items {
        product::restore_stock(&mut *conn, item.product_id, item.quantity).await?;
    }
    Ok(())
}

/// Take every line's quantity again; fails on the first short product
async fn reserve_items(conn: &mut SqliteConnection, items: &[OrderItem]) -> OrderResult<()> {
    for item in items {
        if !product::reserve_stock(&mut *conn, item.product_id, item.quantity).await? {
            let available = product::find_by_id_tx(&mut *conn, item.product_id)
                .await?
                .map(|p| p.stock_quantity)
                .unwrap_or(0);
            return Err(OrderError::InsufficientStock {
                product: ProductRef {
                    id: item.product_id,
                    name: item.product_name.clone(),
                },
                requested: item.quantity,
                available,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod testing {
    //! Workflow wired to recording notifications

    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use sqlx::SqlitePool;

    use super::number::SequenceSuffix;
    use super::{OrderNumberGenerator, OrderWorkflow};
    use crate::notifications::{NotificationChannel, NotificationEvent, Notifier, NotifyError};

    #[derive(Default)]
    pub struct Recorder {
        pub events: Mutex<Vec<NotificationEvent>>,
    }

    impl Recorder {
        pub fn take(&self) -> Vec<NotificationEvent> {
            std::mem::take(&mut *self.events.lock().unwrap())
        }
    }

    #[async_trait]
    impl NotificationChannel for Recorder {
        fn name(&self) -> &'static str {
            "recorder"
        }

        async fn deliver(&self, event: &NotificationEvent) -> Result<(), NotifyError> {
            self.events.lock().unwrap().push(event.clone());
            Ok(())
        }
    }

    pub fn workflow(pool: &SqlitePool, suffixes: Vec<u16>) -> (OrderWorkflow, Arc<Recorder>) {
        let recorder = Arc::new(Recorder::default());
        let channel: Arc<dyn NotificationChannel> = recorder.clone();
        let notifier = Notifier::with_channels(vec![channel]);
        let numbers = OrderNumberGenerator::with_source(
            "RB",
            chrono_tz::Asia::Manila,
            Arc::new(SequenceSuffix::new(suffixes)),
        );
        (
            OrderWorkflow::new(pool.clone(), Arc::new(numbers), Arc::new(notifier)),
            recorder,
        )
    }
}
