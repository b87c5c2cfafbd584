//! Order Model
//!
//! 订单、订单明细及状态枚举。金额均为两位小数的 `Decimal`。

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

use super::Product;

// =============================================================================
// Enums
// =============================================================================

/// Order status
///
/// ```text
/// pending → confirmed → start_preparing → mark_ready → out_for_delivery → delivered | processed
///    └──────────────┴──────────────┴─────────────┴──────────────┴──→ cancelled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum OrderStatus {
    Pending,
    Confirmed,
    StartPreparing,
    MarkReady,
    OutForDelivery,
    Delivered,
    Processed,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 8] = [
        Self::Pending,
        Self::Confirmed,
        Self::StartPreparing,
        Self::MarkReady,
        Self::OutForDelivery,
        Self::Delivered,
        Self::Processed,
        Self::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::StartPreparing => "start_preparing",
            Self::MarkReady => "mark_ready",
            Self::OutForDelivery => "out_for_delivery",
            Self::Delivered => "delivered",
            Self::Processed => "processed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Customer-facing label
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Confirmed => "Confirmed",
            Self::StartPreparing => "Preparing",
            Self::MarkReady => "Ready",
            Self::OutForDelivery => "Out for Delivery",
            Self::Delivered => "Delivered",
            Self::Processed => "Processed",
            Self::Cancelled => "Cancelled",
        }
    }

    /// `delivered` and `processed` end the lifecycle
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Delivered | Self::Processed)
    }

    /// Fulfilled orders qualify reviews as verified purchases
    pub fn is_fulfilled(&self) -> bool {
        self.is_terminal()
    }

    /// Position on the forward path; `None` for `cancelled`
    pub fn stage(&self) -> Option<u8> {
        match self {
            Self::Pending => Some(0),
            Self::Confirmed => Some(1),
            Self::StartPreparing => Some(2),
            Self::MarkReady => Some(3),
            Self::OutForDelivery => Some(4),
            Self::Delivered | Self::Processed => Some(5),
            Self::Cancelled => None,
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown enum value in a request
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: {value}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl FromStr for OrderStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownVariant {
                kind: "order status",
                value: s.to_string(),
            })
    }
}

/// Fulfillment method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
pub enum DeliveryMethod {
    Delivery,
    Pickup,
}

impl DeliveryMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Delivery => "delivery",
            Self::Pickup => "pickup",
        }
    }
}

/// Payment method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
pub enum PaymentMethod {
    Cod,
    Gcash,
    Paymaya,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cod => "cod",
            Self::Gcash => "gcash",
            Self::Paymaya => "paymaya",
        }
    }
}

// =============================================================================
// Entities
// =============================================================================

/// Order entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub order_number: String,
    pub user_id: i64,
    /// Sum of frozen line totals
    pub total_amount: Decimal,
    pub delivery_method: DeliveryMethod,
    pub payment_method: PaymentMethod,
    pub status: OrderStatus,
    pub delivery_address: Option<String>,
    /// Requested fulfillment time (epoch millis)
    pub delivery_date: Option<i64>,
    pub contact_phone: String,
    pub notes: Option<String>,
    pub cancellation_reason: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub items: Vec<OrderItem>,
}

/// Order line with a price snapshot taken at placement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub product_id: i64,
    pub product_name: String,
    pub quantity: i64,
    pub unit_price: Decimal,
    pub line_total: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product: Option<Product>,
}

// =============================================================================
// Requests
// =============================================================================

/// Checkout payload (`POST /api/orders`)
///
/// Conditional rules (address for delivery, future delivery date) are
/// checked by the placement workflow.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PlaceOrderRequest {
    pub delivery_method: DeliveryMethod,
    pub payment_method: PaymentMethod,
    #[validate(length(max = 500))]
    pub delivery_address: Option<String>,
    #[validate(length(min = 1, max = 30))]
    pub contact_phone: String,
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_datetime")]
    pub delivery_date: Option<DateTime<Utc>>,
}

/// Admin status update payload
///
/// `status` stays a string so unknown values surface as a field error.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateOrderStatusRequest {
    #[validate(length(min = 1))]
    pub status: String,
    /// Trimmed and length-checked by the workflow
    pub cancellation_reason: Option<String>,
}

/// Order listing filter
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    /// Inclusive start day (`YYYY-MM-DD`)
    pub date_from: Option<NaiveDate>,
    /// Inclusive end day (`YYYY-MM-DD`)
    pub date_to: Option<NaiveDate>,
    /// Matches order number or customer name
    pub search: Option<String>,
}

/// Accepts RFC 3339, `YYYY-MM-DDTHH:MM[:SS]`, `YYYY-MM-DD HH:MM[:SS]` or `YYYY-MM-DD`.
/// Values without an offset are read as UTC.
pub fn parse_datetime(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in [
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
    ] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn deserialize_optional_datetime<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => parse_datetime(value)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid date: {value}"))),
    }
}
