//! 订单状态流转

use shared::models::{Order, OrderStatus, UpdateOrderStatusRequest};

use super::status::{StockEffect, Transition, check_transition};
use super::{OrderError, OrderResult, OrderWorkflow, release_items, reserve_items};
use crate::db;
use crate::db::repository::order;

/// Longest accepted cancellation reason (characters)
pub const MAX_REASON_CHARS: usize = 1000;

/// Parsed admin status update
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusUpdate {
    pub status: OrderStatus,
    /// Set only for `cancelled`
    pub reason: Option<String>,
}

impl TryFrom<UpdateOrderStatusRequest> for StatusUpdate {
    type Error = OrderError;

    fn try_from(request: UpdateOrderStatusRequest) -> Result<Self, Self::Error> {
        let status = request
            .status
            .trim()
            .parse::<OrderStatus>()
            .map_err(|e| OrderError::Validation {
                field: "status",
                message: e.to_string(),
            })?;

        if status != OrderStatus::Cancelled {
            return Ok(Self { status, reason: None });
        }

        let reason = request
            .cancellation_reason
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .ok_or(OrderError::ReasonRequired)?;
        if reason.chars().count() > MAX_REASON_CHARS {
            return Err(OrderError::Validation {
                field: "cancellation_reason",
                message: format!("Cancellation reason must be at most {MAX_REASON_CHARS} characters"),
            });
        }
        Ok(Self {
            status,
            reason: Some(reason.to_string()),
        })
    }
}

impl OrderWorkflow {
    /// Customer cancellation; owner only, `pending` only
    pub async fn cancel_by_customer(&self, user_id: i64, order_id: i64) -> OrderResult<Order> {
        let mut tx = db::begin_write(&self.pool).await?;

        let current = order::find_by_id_tx(&mut *tx, order_id)
            .await?
            .ok_or(OrderError::NotFound(order_id))?;
        if current.user_id != user_id {
            return Err(OrderError::NotOwner(order_id));
        }
        if current.status != OrderStatus::Pending {
            return Err(OrderError::NotPending(current.status));
        }

        release_items(&mut *tx, &current.items).await?;
        order::update_status(&mut *tx, order_id, OrderStatus::Cancelled, None).await?;

        let mut cancelled = order::find_by_id_tx(&mut *tx, order_id)
            .await?
            .ok_or(OrderError::NotFound(order_id))?;
        order::attach_products(&mut *tx, &mut cancelled).await?;
        tx.commit().await?;

        tracing::info!(
            order_id,
            order_number = %cancelled.order_number,
            user_id,
            "Order cancelled by customer"
        );
        self.notify_status_changed(&cancelled).await;
        Ok(cancelled)
    }

    /// Admin status change following the transition table
    pub async fn update_status(&self, order_id: i64, update: StatusUpdate) -> OrderResult<Order> {
        let mut tx = db::begin_write(&self.pool).await?;

        let current = order::find_by_id_tx(&mut *tx, order_id)
            .await?
            .ok_or(OrderError::NotFound(order_id))?;
        let from = current.status;
        let to = update.status;

        let transition = check_transition(from, to, current.delivery_method)?;
        let changed = match transition {
            Transition::Unchanged => {
                // cancelled → cancelled 只更新原因
                if to == OrderStatus::Cancelled && update.reason != current.cancellation_reason {
                    order::update_status(&mut *tx, order_id, to, update.reason.as_deref()).await?;
                }
                false
            }
            Transition::Change(effect) => {
                match effect {
                    StockEffect::Release => release_items(&mut *tx, &current.items).await?,
                    StockEffect::Reserve => reserve_items(&mut *tx, &current.items).await?,
                    StockEffect::None => {}
                }
                order::update_status(&mut *tx, order_id, to, update.reason.as_deref()).await?;
                true
            }
        };

        let mut updated = order::find_by_id_tx(&mut *tx, order_id)
            .await?
            .ok_or(OrderError::NotFound(order_id))?;
        order::attach_products(&mut *tx, &mut updated).await?;
        tx.commit().await?;

        if changed {
            tracing::info!(
                order_id,
                order_number = %updated.order_number,
                from = %from,
                to = %to,
                "Order status updated"
            );
            self.notify_status_changed(&updated).await;
        }
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::fixtures;
    use crate::db::test_pool;
    use crate::orders::testing::workflow;
    use shared::models::{DeliveryMethod, NotificationKind, PaymentMethod, PlaceOrderRequest};
    use sqlx::SqlitePool;

    struct Shop {
        pool: SqlitePool,
        customer: i64,
        rice: i64,
        sugar: i64,
    }

    async fn shop() -> Shop {
        let pool = test_pool().await;
        let customer = fixtures::user(&pool, "Ana", "customer").await;
        let grocery = fixtures::category(&pool, "Grocery", true).await;
        let rice = fixtures::product(&pool, grocery, "Rice 5kg", 4500, 10).await;
        let sugar = fixtures::product(&pool, grocery, "Sugar 1kg", 5500, 10).await;
        Shop {
            pool,
            customer,
            rice,
            sugar,
        }
    }

    fn request(method: DeliveryMethod) -> PlaceOrderRequest {
        PlaceOrderRequest {
            delivery_method: method,
            payment_method: PaymentMethod::Cod,
            delivery_address: Some("Purok 2, Poblacion".into()),
            contact_phone: "09171234567".into(),
            notes: None,
            delivery_date: None,
        }
    }

    async fn place(shop: &Shop, wf: &OrderWorkflow, method: DeliveryMethod) -> Order {
        fixtures::cart_line(&shop.pool, shop.customer, shop.rice, 2).await;
        fixtures::cart_line(&shop.pool, shop.customer, shop.sugar, 1).await;
        wf.place_order(shop.customer, request(method)).await.unwrap()
    }

    fn update(status: &str, reason: Option<&str>) -> UpdateOrderStatusRequest {
        UpdateOrderStatusRequest {
            status: status.into(),
            cancellation_reason: reason.map(str::to_string),
        }
    }

    fn parsed(status: &str, reason: Option<&str>) -> StatusUpdate {
        StatusUpdate::try_from(update(status, reason)).unwrap()
    }

    #[test]
    fn test_reason_length_counts_trimmed_text() {
        use validator::Validate;

        let padded = format!("{}{}", "r".repeat(MAX_REASON_CHARS - 10), " ".repeat(20));
        let request = update("cancelled", Some(&padded));
        assert!(request.validate().is_ok());

        let accepted = StatusUpdate::try_from(request).unwrap();
        assert_eq!(accepted.reason.map(|r| r.chars().count()), Some(MAX_REASON_CHARS - 10));
    }

    #[test]
    fn test_status_update_parsing() {
        assert!(matches!(
            StatusUpdate::try_from(update("shipped", None)),
            Err(OrderError::Validation { field: "status", .. })
        ));
        assert!(matches!(
            StatusUpdate::try_from(update("cancelled", None)),
            Err(OrderError::ReasonRequired)
        ));
        assert!(matches!(
            StatusUpdate::try_from(update("cancelled", Some("   "))),
            Err(OrderError::ReasonRequired)
        ));
        let long = "x".repeat(MAX_REASON_CHARS + 1);
        assert!(matches!(
            StatusUpdate::try_from(update("cancelled", Some(&long))),
            Err(OrderError::Validation { field: "cancellation_reason", .. })
        ));

        let ok = parsed("cancelled", Some(" Out of stock "));
        assert_eq!(ok.reason.as_deref(), Some("Out of stock"));
        // 非取消状态忽略原因
        assert_eq!(parsed("confirmed", Some("ignored")).reason, None);
    }

    #[tokio::test]
    async fn test_customer_cancel_restores_stock() {
        let shop = shop().await;
        let (wf, recorder) = workflow(&shop.pool, vec![1001]);
        let order = place(&shop, &wf, DeliveryMethod::Pickup).await;
        assert_eq!(fixtures::stock_of(&shop.pool, shop.rice).await, 8);
        recorder.take();

        let cancelled = wf.cancel_by_customer(shop.customer, order.id).await.unwrap();
        assert_eq!(cancelled.status, OrderStatus::Cancelled);
        assert_eq!(fixtures::stock_of(&shop.pool, shop.rice).await, 10);
        assert_eq!(fixtures::stock_of(&shop.pool, shop.sugar).await, 10);

        let events = recorder.take();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].recipient_id, shop.customer);
        assert_eq!(events[0].kind, NotificationKind::OrderStatusChanged);
        assert_eq!(events[0].payload.message, "Your order status has been updated to Cancelled");

        // 已取消不能再次取消
        assert!(matches!(
            wf.cancel_by_customer(shop.customer, order.id).await,
            Err(OrderError::NotPending(OrderStatus::Cancelled))
        ));
        assert_eq!(fixtures::stock_of(&shop.pool, shop.rice).await, 10);
    }

    #[tokio::test]
    async fn test_customer_cancel_rules() {
        let shop = shop().await;
        let other = fixtures::user(&shop.pool, "Ben", "customer").await;
        let (wf, _) = workflow(&shop.pool, vec![1001]);
        let order = place(&shop, &wf, DeliveryMethod::Pickup).await;

        assert!(matches!(
            wf.cancel_by_customer(other, order.id).await,
            Err(OrderError::NotOwner(_))
        ));
        assert!(matches!(
            wf.cancel_by_customer(shop.customer, 9999).await,
            Err(OrderError::NotFound(9999))
        ));

        wf.update_status(order.id, parsed("confirmed", None)).await.unwrap();
        assert!(matches!(
            wf.cancel_by_customer(shop.customer, order.id).await,
            Err(OrderError::NotPending(OrderStatus::Confirmed))
        ));
        let unchanged = order::find_by_id(&shop.pool, order.id).await.unwrap().unwrap();
        assert_eq!(unchanged.status, OrderStatus::Confirmed);
        assert_eq!(fixtures::stock_of(&shop.pool, shop.rice).await, 8);
    }

    #[tokio::test]
    async fn test_admin_forward_flow_notifies_each_change() {
        let shop = shop().await;
        let (wf, recorder) = workflow(&shop.pool, vec![1001]);
        let order = place(&shop, &wf, DeliveryMethod::Delivery).await;
        recorder.take();

        for status in ["confirmed", "start_preparing", "mark_ready", "out_for_delivery", "delivered"] {
            let updated = wf.update_status(order.id, parsed(status, None)).await.unwrap();
            assert_eq!(updated.status.as_str(), status);
        }

        let messages: Vec<String> = recorder.take().into_iter().map(|e| e.payload.message).collect();
        assert_eq!(messages.len(), 5);
        assert_eq!(messages[0], "Your order status has been updated to Confirmed");
        assert_eq!(messages[3], "Your order status has been updated to Out for Delivery");

        // 终态不可再改
        assert!(matches!(
            wf.update_status(order.id, parsed("cancelled", Some("late"))).await,
            Err(OrderError::InvalidTransition { .. })
        ));
        assert_eq!(fixtures::stock_of(&shop.pool, shop.rice).await, 8);
    }

    #[tokio::test]
    async fn test_admin_cancel_stores_reason_and_reopen_clears_it() {
        let shop = shop().await;
        let (wf, recorder) = workflow(&shop.pool, vec![1001]);
        let order = place(&shop, &wf, DeliveryMethod::Pickup).await;
        wf.update_status(order.id, parsed("start_preparing", None)).await.unwrap();
        recorder.take();

        let cancelled = wf
            .update_status(order.id, parsed("cancelled", Some("Customer unreachable")))
            .await
            .unwrap();
        assert_eq!(cancelled.status, OrderStatus::Cancelled);
        assert_eq!(cancelled.cancellation_reason.as_deref(), Some("Customer unreachable"));
        assert_eq!(fixtures::stock_of(&shop.pool, shop.rice).await, 10);

        // 相同状态: 只更新原因，不通知
        let relabelled = wf
            .update_status(order.id, parsed("cancelled", Some("Duplicate order")))
            .await
            .unwrap();
        assert_eq!(relabelled.cancellation_reason.as_deref(), Some("Duplicate order"));
        assert_eq!(fixtures::stock_of(&shop.pool, shop.rice).await, 10);

        let reopened = wf.update_status(order.id, parsed("pending", None)).await.unwrap();
        assert_eq!(reopened.status, OrderStatus::Pending);
        assert_eq!(reopened.cancellation_reason, None);
        assert_eq!(fixtures::stock_of(&shop.pool, shop.rice).await, 8);
        assert_eq!(fixtures::stock_of(&shop.pool, shop.sugar).await, 9);

        assert_eq!(recorder.take().len(), 2);
    }

    #[tokio::test]
    async fn test_reopen_fails_when_stock_is_gone() {
        let shop = shop().await;
        let (wf, _) = workflow(&shop.pool, vec![1001]);
        let order = place(&shop, &wf, DeliveryMethod::Pickup).await;
        wf.update_status(order.id, parsed("cancelled", Some("Held too long")))
            .await
            .unwrap();

        sqlx::query("UPDATE product SET stock_quantity = 1 WHERE id = ?")
            .bind(shop.rice)
            .execute(&shop.pool)
            .await
            .unwrap();

        assert!(matches!(
            wf.update_status(order.id, parsed("pending", None)).await,
            Err(OrderError::InsufficientStock { requested: 2, available: 1, .. })
        ));
        let still = order::find_by_id(&shop.pool, order.id).await.unwrap().unwrap();
        assert_eq!(still.status, OrderStatus::Cancelled);
        assert_eq!(fixtures::stock_of(&shop.pool, shop.sugar).await, 10);
    }

    #[tokio::test]
    async fn test_pickup_order_cannot_go_out_for_delivery() {
        let shop = shop().await;
        let (wf, _) = workflow(&shop.pool, vec![1001]);
        let order = place(&shop, &wf, DeliveryMethod::Pickup).await;
        assert!(matches!(
            wf.update_status(order.id, parsed("out_for_delivery", None)).await,
            Err(OrderError::InvalidTransition { .. })
        ));
        let processed = wf.update_status(order.id, parsed("processed", None)).await.unwrap();
        assert_eq!(processed.status, OrderStatus::Processed);
    }
}
