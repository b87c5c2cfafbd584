//! Repository Module
//!
//! Free functions over `&SqlitePool`, or over a `&mut SqliteConnection` when
//! the call must join an open transaction.

pub mod cart;
pub mod category;
pub mod notification;
pub mod order;
pub mod product;
pub mod report;
pub mod review;
pub mod user;

use shared::{AppError, ErrorCode};
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// SQLITE_BUSY / SQLITE_LOCKED after busy_timeout
    #[error("Database busy: {0}")]
    Busy(String),
}

/// 主结果码 (扩展码低 8 位): 5 = SQLITE_BUSY, 6 = SQLITE_LOCKED
fn is_lock_contention(db_err: &dyn sqlx::error::DatabaseError) -> bool {
    db_err
        .code()
        .and_then(|code| code.parse::<i32>().ok())
        .is_some_and(|code| matches!(code & 0xff, 5 | 6))
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                RepoError::Duplicate(db_err.message().to_string())
            }
            sqlx::Error::Database(db_err) if is_lock_contention(&**db_err) => {
                RepoError::Busy(db_err.message().to_string())
            }
            sqlx::Error::RowNotFound => RepoError::NotFound("row".into()),
            _ => RepoError::Database(err.to_string()),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(msg) => AppError::with_message(ErrorCode::NotFound, msg),
            RepoError::Duplicate(msg) => AppError::with_message(ErrorCode::AlreadyExists, msg),
            RepoError::Database(msg) => {
                tracing::error!(error = %msg, "Repository database error");
                AppError::database("Database operation failed")
            }
            RepoError::Validation(msg) => AppError::validation(msg),
            RepoError::Busy(msg) => {
                tracing::warn!(error = %msg, "Database write lock contention");
                AppError::busy("System busy, please retry later")
            }
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// Escape `%`/`_` for a `LIKE ? ESCAPE '\'` pattern
pub(crate) fn like_pattern(term: &str) -> String {
    let escaped = term
        .trim()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}
