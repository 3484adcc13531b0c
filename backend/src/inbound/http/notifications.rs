//! In-app notifications for the signed-in user, plus admin authoring.

use actix_web::{HttpResponse, delete, get, post, web};
use uuid::Uuid;

use crate::domain::{Error, Notification, NotificationDraft, NotificationView};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

#[utoipa::path(
    get,
    path = "/api/v1/notifications",
    responses(
        (status = 200, description = "Broadcast and personal notifications, newest first", body = [NotificationView]),
        (status = 401, description = "Login required", body = Error)
    ),
    tags = ["notifications"],
    operation_id = "listNotifications"
)]
#[get("/notifications")]
pub async fn list_notifications(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<NotificationView>>> {
    let me = session.require_user().await?;
    Ok(web::Json(state.notifications.list_for(me.user_id).await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/notifications/{id}/read",
    params(("id" = Uuid, Path, description = "Notification id")),
    responses(
        (status = 204, description = "Marked read"),
        (status = 404, description = "Not addressed to this user", body = Error)
    ),
    tags = ["notifications"],
    operation_id = "markNotificationRead"
)]
#[post("/notifications/{id}/read")]
pub async fn mark_read(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    let me = session.require_user().await?;
    state
        .notifications
        .mark_read(path.into_inner(), me.user_id)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/notifications",
    request_body = NotificationDraft,
    responses(
        (status = 201, description = "Created", body = Notification),
        (status = 400, description = "Invalid notification", body = Error),
        (status = 404, description = "Audience user not found", body = Error)
    ),
    tags = ["admin"],
    operation_id = "adminCreateNotification"
)]
#[post("/admin/notifications")]
pub async fn create_notification(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<NotificationDraft>,
) -> ApiResult<HttpResponse> {
    session.require_admin().await?;
    let notification = state.notifications.create(payload.into_inner()).await?;
    Ok(HttpResponse::Created().json(notification))
}

#[utoipa::path(
    delete,
    path = "/api/v1/admin/notifications/{id}",
    params(("id" = Uuid, Path, description = "Notification id")),
    responses(
        (status = 204, description = "Soft-deleted"),
        (status = 404, description = "No such notification", body = Error)
    ),
    tags = ["admin"],
    operation_id = "adminDeleteNotification"
)]
#[delete("/admin/notifications/{id}")]
pub async fn delete_notification(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    session.require_admin().await?;
    state.notifications.delete(path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}
