//! Landing page, system settings and contact form endpoints.

use actix_web::{HttpResponse, delete, get, post, put, web};
use uuid::Uuid;

use crate::domain::{
    ContactDraft, ContactMessage, Error, LandingConfig, LandingDraft, SettingsDraft,
    SystemSettings,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

#[utoipa::path(
    get,
    path = "/api/v1/landing",
    responses((status = 200, description = "Landing content, defaults until edited", body = LandingConfig)),
    tags = ["site"],
    operation_id = "getLanding",
    security([])
)]
#[get("/landing")]
pub async fn get_landing(state: web::Data<HttpState>) -> ApiResult<web::Json<LandingConfig>> {
    Ok(web::Json(state.site.landing().await?))
}

#[utoipa::path(
    put,
    path = "/api/v1/admin/landing",
    request_body = LandingDraft,
    responses(
        (status = 200, description = "Saved", body = LandingConfig),
        (status = 400, description = "Invalid content", body = Error)
    ),
    tags = ["admin"],
    operation_id = "adminReplaceLanding"
)]
#[put("/admin/landing")]
pub async fn replace_landing(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LandingDraft>,
) -> ApiResult<web::Json<LandingConfig>> {
    session.require_admin().await?;
    Ok(web::Json(state.site.replace_landing(payload.into_inner()).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/settings",
    responses((status = 200, description = "Current settings", body = SystemSettings)),
    tags = ["site"],
    operation_id = "getSettings",
    security([])
)]
#[get("/settings")]
pub async fn get_settings(state: web::Data<HttpState>) -> ApiResult<web::Json<SystemSettings>> {
    Ok(web::Json(state.site.settings().await?))
}

#[utoipa::path(
    put,
    path = "/api/v1/admin/settings",
    request_body = SettingsDraft,
    responses((status = 200, description = "Saved", body = SystemSettings)),
    tags = ["admin"],
    operation_id = "adminReplaceSettings"
)]
#[put("/admin/settings")]
pub async fn replace_settings(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<SettingsDraft>,
) -> ApiResult<web::Json<SystemSettings>> {
    session.require_admin().await?;
    Ok(web::Json(state.site.replace_settings(payload.into_inner()).await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/contact",
    request_body = ContactDraft,
    responses(
        (status = 201, description = "Message received"),
        (status = 400, description = "Invalid message", body = Error)
    ),
    tags = ["site"],
    operation_id = "submitContact",
    security([])
)]
#[post("/contact")]
pub async fn submit_contact(
    state: web::Data<HttpState>,
    payload: web::Json<ContactDraft>,
) -> ApiResult<HttpResponse> {
    state.site.submit_contact(payload.into_inner()).await?;
    Ok(HttpResponse::Created().finish())
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/contact-messages",
    responses((status = 200, description = "Messages, newest first", body = [ContactMessage])),
    tags = ["admin"],
    operation_id = "adminListContactMessages"
)]
#[get("/admin/contact-messages")]
pub async fn list_contact_messages(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<ContactMessage>>> {
    session.require_admin().await?;
    Ok(web::Json(state.site.list_contact().await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/contact-messages/{id}/handled",
    params(("id" = Uuid, Path, description = "Message id")),
    responses(
        (status = 200, description = "Marked handled", body = ContactMessage),
        (status = 404, description = "No such message", body = Error)
    ),
    tags = ["admin"],
    operation_id = "adminMarkContactHandled"
)]
#[post("/admin/contact-messages/{id}/handled")]
pub async fn mark_contact_handled(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<ContactMessage>> {
    session.require_admin().await?;
    Ok(web::Json(state.site.mark_handled(path.into_inner()).await?))
}

#[utoipa::path(
    delete,
    path = "/api/v1/admin/contact-messages/{id}",
    params(("id" = Uuid, Path, description = "Message id")),
    responses(
        (status = 204, description = "Soft-deleted"),
        (status = 404, description = "No such message", body = Error)
    ),
    tags = ["admin"],
    operation_id = "adminDeleteContactMessage"
)]
#[delete("/admin/contact-messages/{id}")]
pub async fn delete_contact_message(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    session.require_admin().await?;
    state.site.delete_contact(path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}
