//! Error system shared by the server and its clients
//!
//! Every failure leaves the server as an [`AppError`], rendered as an
//! [`ErrorBody`] with the HTTP status of its [`ErrorCode`]. Codes are
//! grouped by range, see [`ErrorCategory`].
//!
//! ```
//! use shared::error::{AppError, ErrorBody, ErrorCode};
//!
//! let err = AppError::with_message(ErrorCode::ProductOutOfStock, "Only 2 left")
//!     .with_detail("product_id", 7);
//! assert_eq!(err.http_status(), 422);
//!
//! let body = ErrorBody::from(&err);
//! assert_eq!(body.code, 6003);
//! ```

mod category;
mod codes;
mod http;
mod types;

pub use category::ErrorCategory;
pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{AppError, AppResult, ErrorBody};
