//! Unified error codes for the storefront
//!
//! Error codes are shared by the server and the single-page front end.
//! They are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 4xxx: Order errors
//! - 6xxx: Product / category errors
//! - 7xxx: Cart errors
//! - 8xxx: Customer errors (reviews, notifications)
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// Serialized as its `u16` value, the number the front end switches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Request payload failed validation
    ValidationFailed = 2,
    NotFound = 3,
    AlreadyExists = 4,

    // ==================== 1xxx: Auth ====================
    NotAuthenticated = 1001,
    TokenExpired = 1003,
    /// Bad signature, malformed subject or unknown user
    TokenInvalid = 1004,
    AccountDisabled = 1007,

    // ==================== 2xxx: Permission ====================
    AdminRequired = 2003,
    /// Order belongs to another customer
    NotResourceOwner = 2006,

    // ==================== 4xxx: Order ====================
    OrderNotFound = 4001,
    CartEmpty = 4007,
    /// Customer cancellation outside `pending`
    OrderNotPending = 4010,
    OrderInvalidTransition = 4011,
    CancellationReasonRequired = 4012,
    /// A cart line's category is pickup only
    DeliveryNotAvailable = 4013,
    OrderNumberExhausted = 4014,

    // ==================== 6xxx: Product ====================
    ProductNotFound = 6001,
    /// Stock ran short at checkout
    ProductOutOfStock = 6003,
    /// Product or its category is inactive
    ProductUnavailable = 6004,
    CategoryNotFound = 6101,
    CategoryNameExists = 6103,

    // ==================== 7xxx: Cart ====================
    CartItemNotFound = 7001,
    CartQuantityExceedsStock = 7002,

    // ==================== 8xxx: Customer ====================
    ReviewAlreadyExists = 8101,
    ReviewNotEligible = 8102,
    NotificationNotFound = 8201,

    // ==================== 9xxx: System ====================
    DatabaseError = 9002,
    /// SQLite write lock not acquired within busy_timeout
    SystemBusy = 9404,
}

impl ErrorCode {
    /// Every code in numeric order
    pub const ALL: [ErrorCode; 28] = [
        ErrorCode::ValidationFailed,
        ErrorCode::NotFound,
        ErrorCode::AlreadyExists,
        ErrorCode::NotAuthenticated,
        ErrorCode::TokenExpired,
        ErrorCode::TokenInvalid,
        ErrorCode::AccountDisabled,
        ErrorCode::AdminRequired,
        ErrorCode::NotResourceOwner,
        ErrorCode::OrderNotFound,
        ErrorCode::CartEmpty,
        ErrorCode::OrderNotPending,
        ErrorCode::OrderInvalidTransition,
        ErrorCode::CancellationReasonRequired,
        ErrorCode::DeliveryNotAvailable,
        ErrorCode::OrderNumberExhausted,
        ErrorCode::ProductNotFound,
        ErrorCode::ProductOutOfStock,
        ErrorCode::ProductUnavailable,
        ErrorCode::CategoryNotFound,
        ErrorCode::CategoryNameExists,
        ErrorCode::CartItemNotFound,
        ErrorCode::CartQuantityExceedsStock,
        ErrorCode::ReviewAlreadyExists,
        ErrorCode::ReviewNotEligible,
        ErrorCode::NotificationNotFound,
        ErrorCode::DatabaseError,
        ErrorCode::SystemBusy,
    ];

    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Default message when the caller supplies none
    pub const fn message(&self) -> &'static str {
        match self {
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",

            ErrorCode::NotAuthenticated => "User is not authenticated",
            ErrorCode::TokenExpired => "Authentication token has expired",
            ErrorCode::TokenInvalid => "Authentication token is invalid",
            ErrorCode::AccountDisabled => "Account is disabled",

            ErrorCode::AdminRequired => "Administrator role is required",
            ErrorCode::NotResourceOwner => "Resource belongs to another user",

            ErrorCode::OrderNotFound => "Order not found",
            ErrorCode::CartEmpty => "Cart is empty",
            ErrorCode::OrderNotPending => "Only pending orders can be cancelled",
            ErrorCode::OrderInvalidTransition => "Order status transition is not allowed",
            ErrorCode::CancellationReasonRequired => "Cancellation reason is required",
            ErrorCode::DeliveryNotAvailable => {
                "Delivery is not available for one or more items in your cart"
            }
            ErrorCode::OrderNumberExhausted => "Could not allocate a unique order number",

            ErrorCode::ProductNotFound => "Product not found",
            ErrorCode::ProductOutOfStock => "Insufficient stock",
            ErrorCode::ProductUnavailable => "Product is not available",
            ErrorCode::CategoryNotFound => "Category not found",
            ErrorCode::CategoryNameExists => "Category name already exists",

            ErrorCode::CartItemNotFound => "Cart item not found",
            ErrorCode::CartQuantityExceedsStock => "Requested quantity exceeds available stock",

            ErrorCode::ReviewAlreadyExists => "You have already reviewed this product",
            ErrorCode::ReviewNotEligible => "Invalid order or order not eligible for review",
            ErrorCode::NotificationNotFound => "Notification not found",

            ErrorCode::DatabaseError => "Database error",
            ErrorCode::SystemBusy => "System busy, please retry later",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// A number that is not an [`ErrorCode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|code| code.code() == value)
            .ok_or(InvalidErrorCode(value))
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
