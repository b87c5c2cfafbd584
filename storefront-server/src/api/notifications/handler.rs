//! Notification API Handlers

use std::convert::Infallible;

use axum::{
    Json,
    extract::{Path, Query, State},
    response::sse::{Event, KeepAlive, Sse},
};
use futures::Stream;
use serde::Deserialize;
use shared::models::{Notification, UnreadCount};
use shared::pagination::{PageQuery, PaginatedResponse};
use tokio::sync::broadcast::error::RecvError;

use crate::api::not_found_as;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::notification;
use crate::notifications::LiveNotification;
use crate::utils::{AppResult, ErrorCode};

#[derive(Debug, Default, Deserialize)]
pub struct InboxQuery {
    #[serde(default)]
    pub unread_only: bool,
}

async fn unread(state: &ServerState, user_id: i64) -> AppResult<Json<UnreadCount>> {
    let unread = notification::unread_count(&state.pool, user_id).await?;
    Ok(Json(UnreadCount { unread }))
}

/// GET /api/notifications - 最新在前
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(query): Query<InboxQuery>,
    Query(page): Query<PageQuery>,
) -> AppResult<Json<PaginatedResponse<Notification>>> {
    let (items, total) = notification::find_page(&state.pool, user.id, query.unread_only, &page).await?;
    Ok(Json(PaginatedResponse::from_query(items, total, &page)))
}

/// GET /api/notifications/unread-count
pub async fn unread_count(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<UnreadCount>> {
    unread(&state, user.id).await
}

/// POST /api/notifications/{id}/read - 返回剩余未读数
pub async fn mark_read(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<UnreadCount>> {
    notification::mark_read(&state.pool, user.id, id)
        .await
        .map_err(not_found_as(ErrorCode::NotificationNotFound))?;
    unread(&state, user.id).await
}

/// POST /api/notifications/read-all
pub async fn mark_all_read(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<UnreadCount>> {
    let marked = notification::mark_all_read(&state.pool, user.id).await?;
    tracing::debug!(user_id = user.id, marked, "Notifications marked read");
    unread(&state, user.id).await
}

/// DELETE /api/notifications/{id}
pub async fn delete(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    notification::delete(&state.pool, user.id, id)
        .await
        .map_err(not_found_as(ErrorCode::NotificationNotFound))?;
    Ok(Json(true))
}

fn to_event(live: &LiveNotification) -> Event {
    Event::default()
        .event(live.kind.as_str())
        .json_data(live)
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to encode live notification");
            Event::default().comment("encode error")
        })
}

/// GET /api/notifications/stream - 当前用户的实时通知 (SSE)
///
/// 订阅进程内广播；落后过多时跳过丢失的消息，收件箱仍保留完整记录。
pub async fn stream(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.notifier.subscribe();
    let user_id = user.id;
    tracing::debug!(user_id, "Notification stream opened");

    let events = futures::stream::unfold(rx, move |mut rx| async move {
        loop {
            match rx.recv().await {
                Ok(live) if live.user_id == user_id => return Some((Ok::<_, Infallible>(to_event(&live)), rx)),
                Ok(_) => continue,
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(user_id, skipped, "Notification stream lagged");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    });

    Sse::new(events).keep_alive(KeepAlive::default())
}
