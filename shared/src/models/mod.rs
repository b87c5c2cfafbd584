//! Data models
//!
//! Shared between storefront-server and API clients.
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! Rows carrying `Decimal` money are mapped by the server repositories
//! (stored as integer cents). All IDs are `i64` (SQLite INTEGER PRIMARY KEY).

pub mod cart;
pub mod category;
pub mod notification;
pub mod order;
pub mod product;
pub mod report;
pub mod review;
pub mod user;

// Re-exports
pub use cart::*;
pub use category::*;
pub use notification::*;
pub use order::*;
pub use product::*;
pub use report::*;
pub use review::*;
pub use user::*;
