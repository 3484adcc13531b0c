//! Admin alumni registry endpoints, including CSV batch import.

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{AlumniDraft, AlumniFilter, AlumniRecord, Error, ImportReport};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

#[utoipa::path(
    get,
    path = "/api/v1/admin/alumni",
    params(
        ("batchYear" = Option<i32>, Query, description = "Only this graduating batch"),
        ("search" = Option<String>, Query, description = "Name or Alumni ID fragment")
    ),
    responses(
        (status = 200, description = "Alumni records by batch then name", body = [AlumniRecord]),
        (status = 403, description = "Administrator access required", body = Error)
    ),
    tags = ["admin"],
    operation_id = "adminListAlumni"
)]
#[get("/admin/alumni")]
pub async fn list_alumni(
    state: web::Data<HttpState>,
    session: SessionContext,
    filter: web::Query<AlumniFilter>,
) -> ApiResult<web::Json<Vec<AlumniRecord>>> {
    session.require_admin().await?;
    Ok(web::Json(state.alumni.list(&filter).await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/alumni",
    request_body = AlumniDraft,
    responses(
        (status = 201, description = "Created", body = AlumniRecord),
        (status = 400, description = "Invalid record", body = Error),
        (status = 409, description = "Alumni ID already registered", body = Error)
    ),
    tags = ["admin"],
    operation_id = "adminCreateAlumni"
)]
#[post("/admin/alumni")]
pub async fn create_alumni(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<AlumniDraft>,
) -> ApiResult<HttpResponse> {
    session.require_admin().await?;
    let record = state.alumni.create(payload.into_inner()).await?;
    Ok(HttpResponse::Created().json(record))
}

/// Body for `POST /admin/alumni/import`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AlumniImportRequest {
    pub batch_year: i32,
    /// Raw CSV text including the header row.
    pub csv: String,
}

/// Import a batch roster. Bad rows are reported, never fatal.
#[utoipa::path(
    post,
    path = "/api/v1/admin/alumni/import",
    request_body = AlumniImportRequest,
    responses(
        (status = 200, description = "Import summary", body = ImportReport),
        (status = 400, description = "Invalid batch year", body = Error)
    ),
    tags = ["admin"],
    operation_id = "adminImportAlumni"
)]
#[post("/admin/alumni/import")]
pub async fn import_alumni(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<AlumniImportRequest>,
) -> ApiResult<web::Json<ImportReport>> {
    session.require_admin().await?;
    let report = state
        .alumni
        .import_csv(&payload.csv, payload.batch_year)
        .await?;
    Ok(web::Json(report))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/alumni/{id}",
    params(("id" = Uuid, Path, description = "Alumni record id")),
    responses(
        (status = 200, description = "Alumni record", body = AlumniRecord),
        (status = 404, description = "No such record", body = Error)
    ),
    tags = ["admin"],
    operation_id = "adminGetAlumni"
)]
#[get("/admin/alumni/{id}")]
pub async fn get_alumni(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<AlumniRecord>> {
    session.require_admin().await?;
    Ok(web::Json(state.alumni.get(path.into_inner()).await?))
}

/// Replace a record; the linked user's profile follows.
#[utoipa::path(
    put,
    path = "/api/v1/admin/alumni/{id}",
    params(("id" = Uuid, Path, description = "Alumni record id")),
    request_body = AlumniDraft,
    responses(
        (status = 200, description = "Updated", body = AlumniRecord),
        (status = 404, description = "No such record", body = Error),
        (status = 409, description = "Alumni ID already registered", body = Error)
    ),
    tags = ["admin"],
    operation_id = "adminUpdateAlumni"
)]
#[put("/admin/alumni/{id}")]
pub async fn update_alumni(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
    payload: web::Json<AlumniDraft>,
) -> ApiResult<web::Json<AlumniRecord>> {
    session.require_admin().await?;
    let record = state
        .alumni
        .update(path.into_inner(), payload.into_inner())
        .await?;
    Ok(web::Json(record))
}

#[utoipa::path(
    delete,
    path = "/api/v1/admin/alumni/{id}",
    params(("id" = Uuid, Path, description = "Alumni record id")),
    responses(
        (status = 204, description = "Soft-deleted with its officer positions"),
        (status = 404, description = "No such record", body = Error)
    ),
    tags = ["admin"],
    operation_id = "adminDeleteAlumni"
)]
#[delete("/admin/alumni/{id}")]
pub async fn delete_alumni(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    session.require_admin().await?;
    state.alumni.delete(path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AlumniLink {
    pub user_id: Uuid,
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/alumni/{id}/link",
    params(("id" = Uuid, Path, description = "Alumni record id")),
    request_body = AlumniLink,
    responses(
        (status = 200, description = "Linked", body = AlumniRecord),
        (status = 409, description = "Record already linked to another user", body = Error)
    ),
    tags = ["admin"],
    operation_id = "adminLinkAlumni"
)]
#[post("/admin/alumni/{id}/link")]
pub async fn link_alumni(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
    payload: web::Json<AlumniLink>,
) -> ApiResult<web::Json<AlumniRecord>> {
    session.require_admin().await?;
    let record = state
        .alumni
        .link_user(path.into_inner(), payload.user_id)
        .await?;
    Ok(web::Json(record))
}
