//! Review API Handlers

use axum::{Json, extract::State};
use http::StatusCode;
use shared::models::{Review, ReviewCreate};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::{RepoError, product, review};
use crate::utils::{AppError, AppResult, ErrorCode, ValidatedJson};

const NOT_ELIGIBLE: &str = "Invalid order or order not eligible for review";

fn already_reviewed() -> AppError {
    AppError::with_message(ErrorCode::ReviewAlreadyExists, "You have already reviewed this product")
}

/// POST /api/reviews
///
/// 提供 `order_id` 时订单须属于本人、已送达或已处理、且包含该商品，
/// 满足条件的评价标记为已验证购买。
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    ValidatedJson(payload): ValidatedJson<ReviewCreate>,
) -> AppResult<(StatusCode, Json<Review>)> {
    let product = product::find_by_id(&state.pool, payload.product_id)
        .await?
        .filter(|p| p.is_active)
        .ok_or_else(|| {
            AppError::with_message(
                ErrorCode::ProductNotFound,
                format!("Product {} not found", payload.product_id),
            )
        })?;

    if review::exists(&state.pool, user.id, product.id).await? {
        return Err(already_reviewed());
    }

    let is_verified = match payload.order_id {
        Some(order_id) => {
            if !review::order_qualifies(&state.pool, user.id, order_id, product.id).await? {
                return Err(AppError::with_message(ErrorCode::ReviewNotEligible, NOT_ELIGIBLE)
                    .with_detail("order_id", order_id));
            }
            true
        }
        None => false,
    };

    let created = review::create(&state.pool, user.id, &payload, is_verified)
        .await
        .map_err(|e| match e {
            RepoError::Duplicate(_) => already_reviewed(),
            other => other.into(),
        })?;

    tracing::info!(
        user_id = user.id,
        product_id = product.id,
        rating = created.rating,
        is_verified,
        "Review created"
    );
    Ok((StatusCode::CREATED, Json(created)))
}
