//! HTTP status for each error code

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    pub fn http_status(&self) -> StatusCode {
        use ErrorCode::*;
        match self {
            ValidationFailed | CancellationReasonRequired => StatusCode::BAD_REQUEST,

            NotAuthenticated | TokenExpired | TokenInvalid | AccountDisabled => {
                StatusCode::UNAUTHORIZED
            }

            AdminRequired | NotResourceOwner => StatusCode::FORBIDDEN,

            NotFound | OrderNotFound | ProductNotFound | CategoryNotFound | CartItemNotFound
            | NotificationNotFound => StatusCode::NOT_FOUND,

            AlreadyExists | CategoryNameExists | ReviewAlreadyExists => StatusCode::CONFLICT,

            // 请求格式正确但违反业务规则
            CartEmpty | OrderNotPending | OrderInvalidTransition | DeliveryNotAvailable
            | ProductOutOfStock | ProductUnavailable | CartQuantityExceedsStock
            | ReviewNotEligible => StatusCode::UNPROCESSABLE_ENTITY,

            // 客户端可重试
            SystemBusy => StatusCode::SERVICE_UNAVAILABLE,

            DatabaseError | OrderNumberExhausted => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
