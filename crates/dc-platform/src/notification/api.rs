//! Notification API
//!
//! User-facing notification endpoints including the SSE live feed.

use axum::{
    extract::{State, Path},
    response::sse::{Event, KeepAlive, Sse},
    routing::get,
    Json,
};
use utoipa_axum::{router::OpenApiRouter, routes};
use utoipa::ToSchema;
use serde::Serialize;
use std::convert::Infallible;
use std::sync::Arc;
use chrono::{Duration, Utc};
use futures::{Stream, StreamExt};

use crate::notification::entity::{Notification, BADGE_WINDOW_HOURS};
use crate::notification::repository::NotificationRepository;
use crate::stream::CollectionWatcher;
use crate::shared::api_common::SuccessResponse;
use crate::shared::error::PlatformError;
use crate::shared::middleware::Authenticated;

const LIST_LIMIT: i64 = 100;

/// Notification response DTO
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotificationResponse {
    pub id: String,
    pub title: String,
    pub message: String,
    pub severity: String,
    pub read: bool,
    pub created_at: String,
}

impl From<Notification> for NotificationResponse {
    fn from(n: Notification) -> Self {
        Self {
            id: n.id,
            title: n.title,
            message: n.message,
            severity: n.severity.as_str().to_string(),
            read: n.read,
            created_at: n.created_at.to_rfc3339(),
        }
    }
}

/// Unread badge count response
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BadgeResponse {
    pub unread: u64,
}

/// Notifications service state
#[derive(Clone)]
pub struct NotificationsState {
    pub notification_repo: Arc<NotificationRepository>,
    pub watcher: Arc<CollectionWatcher<Notification>>,
}

/// List own notifications, newest first
#[utoipa::path(
    get,
    path = "",
    tag = "notifications",
    operation_id = "getApiUserNotifications",
    responses(
        (status = 200, description = "List of notifications", body = Vec<NotificationResponse>)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_notifications(
    State(state): State<NotificationsState>,
    auth: Authenticated,
) -> Result<Json<Vec<NotificationResponse>>, PlatformError> {
    let notifications = state.notification_repo
        .find_by_user(&auth.principal_id, LIST_LIMIT)
        .await?;

    let response: Vec<NotificationResponse> = notifications.into_iter()
        .map(|n| n.into())
        .collect();

    Ok(Json(response))
}

/// Unread badge count
///
/// Counts unread notifications created within the 1-day rolling window.
#[utoipa::path(
    get,
    path = "/badge",
    tag = "notifications",
    operation_id = "getApiUserNotificationsBadge",
    responses(
        (status = 200, description = "Unread count", body = BadgeResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_badge(
    State(state): State<NotificationsState>,
    auth: Authenticated,
) -> Result<Json<BadgeResponse>, PlatformError> {
    let since = Utc::now() - Duration::hours(BADGE_WINDOW_HOURS);
    let unread = state.notification_repo
        .count_unread_since(&auth.principal_id, since)
        .await?;

    Ok(Json(BadgeResponse { unread }))
}

/// Mark a notification read
#[utoipa::path(
    post,
    path = "/{id}/read",
    tag = "notifications",
    operation_id = "postApiUserNotificationsByIdRead",
    params(
        ("id" = String, Path, description = "Notification ID")
    ),
    responses(
        (status = 200, description = "Notification marked read", body = SuccessResponse),
        (status = 404, description = "Notification not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn mark_read(
    State(state): State<NotificationsState>,
    auth: Authenticated,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, PlatformError> {
    let matched = state.notification_repo
        .mark_read(&id, &auth.principal_id)
        .await?;

    if !matched {
        return Err(PlatformError::not_found("Notification", &id));
    }

    Ok(Json(SuccessResponse::ok()))
}

/// Mark all notifications read
#[utoipa::path(
    post,
    path = "/read-all",
    tag = "notifications",
    operation_id = "postApiUserNotificationsReadAll",
    responses(
        (status = 200, description = "All notifications marked read", body = SuccessResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn mark_all_read(
    State(state): State<NotificationsState>,
    auth: Authenticated,
) -> Result<Json<SuccessResponse>, PlatformError> {
    let modified = state.notification_repo
        .mark_all_read(&auth.principal_id)
        .await?;

    Ok(Json(SuccessResponse::with_message(format!(
        "{} notifications marked read",
        modified
    ))))
}

/// SSE live feed of the caller's notifications
pub async fn watch_notifications(
    State(state): State<NotificationsState>,
    auth: Authenticated,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let user_id = auth.principal_id.clone();
    let receiver = state.watcher.subscribe();

    let stream = crate::stream::into_stream(receiver)
        .filter(move |n: &Notification| {
            let matches = n.user_id == user_id;
            futures::future::ready(matches)
        })
        .map(|n: Notification| {
            let event = Event::default()
                .event("notification")
                .json_data(NotificationResponse::from(n))
                .unwrap_or_else(|_| Event::default().event("notification"));
            Ok(event)
        });

    Sse::new(stream).keep_alive(KeepAlive::default())
}

/// Create the notifications router (mounted under /api/user/notifications)
pub fn notifications_router(state: NotificationsState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(list_notifications))
        .routes(routes!(get_badge))
        .routes(routes!(mark_read))
        .routes(routes!(mark_all_read))
        .route("/watch", get(watch_notifications))
        .with_state(state)
}
