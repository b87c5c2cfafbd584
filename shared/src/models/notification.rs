//! Notification Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{DeliveryMethod, Order, OrderStatus, PaymentMethod};

/// Notification type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum NotificationKind {
    /// Sent to every admin when an order is placed
    NewOrder,
    /// Sent to the customer when their order is placed
    OrderReceived,
    /// Sent to the customer on every status change
    OrderStatusChanged,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NewOrder => "new_order",
            Self::OrderReceived => "order_received",
            Self::OrderStatusChanged => "order_status_changed",
        }
    }
}

/// Stored notification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: i64,
    pub user_id: i64,
    pub kind: NotificationKind,
    pub data: NotificationPayload,
    pub read_at: Option<i64>,
    pub created_at: i64,
}

/// Payload carried by every order notification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationPayload {
    pub order_id: i64,
    pub order_number: String,
    pub customer_name: Option<String>,
    pub total_amount: Decimal,
    pub delivery_method: DeliveryMethod,
    pub payment_method: PaymentMethod,
    pub status: OrderStatus,
    pub message: String,
}

impl NotificationPayload {
    fn from_order(order: &Order, message: String) -> Self {
        Self {
            order_id: order.id,
            order_number: order.order_number.clone(),
            customer_name: order.customer_name.clone(),
            total_amount: order.total_amount,
            delivery_method: order.delivery_method,
            payment_method: order.payment_method,
            status: order.status,
            message,
        }
    }

    /// `Your order status has been updated to <Label>`
    pub fn status_changed(order: &Order) -> Self {
        Self::from_order(
            order,
            format!("Your order status has been updated to {}", order.status.label()),
        )
    }

    pub fn new_order(order: &Order) -> Self {
        let customer = order.customer_name.as_deref().unwrap_or("a customer");
        Self::from_order(order, format!("New order {} from {customer}", order.order_number))
    }

    pub fn order_received(order: &Order) -> Self {
        Self::from_order(order, format!("We received your order {}", order.order_number))
    }
}

/// Unread counter response
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct UnreadCount {
    pub unread: i64,
}
