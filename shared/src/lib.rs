//! Shared types for the storefront
//!
//! Domain models, error types, the error body and pagination used by
//! the server and its API clients.

pub mod error;
pub mod models;
pub mod pagination;
pub mod util;

// Re-exports
pub use axum::{Json, body};
pub use http;
pub use serde::{Deserialize, Serialize};

pub use error::{AppError, AppResult, ErrorBody, ErrorCode};
pub use pagination::{PageQuery, PaginatedResponse};
