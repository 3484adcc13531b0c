//! Officer listing and admin management.

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::Deserialize;
use uuid::Uuid;

use crate::domain::{Error, OfficerDraft, OfficerPosition};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfficerQuery {
    pub batch_year: Option<i32>,
}

async fn active_positions(
    state: &HttpState,
    query: &OfficerQuery,
) -> ApiResult<Vec<OfficerPosition>> {
    Ok(state
        .officers
        .list(query.batch_year)
        .await?
        .into_iter()
        .filter(|position| position.active)
        .collect())
}

/// Active officer positions.
#[utoipa::path(
    get,
    path = "/api/v1/officers",
    params(("batchYear" = Option<i32>, Query, description = "Only this batch")),
    responses((status = 200, description = "Active positions", body = [OfficerPosition])),
    tags = ["officers"],
    operation_id = "listOfficers",
    security([])
)]
#[get("/officers")]
pub async fn list_officers(
    state: web::Data<HttpState>,
    query: web::Query<OfficerQuery>,
) -> ApiResult<web::Json<Vec<OfficerPosition>>> {
    Ok(web::Json(active_positions(&state, &query).await?))
}

/// All non-deleted positions, active or not.
#[utoipa::path(
    get,
    path = "/api/v1/admin/officers",
    params(("batchYear" = Option<i32>, Query, description = "Only this batch")),
    responses(
        (status = 200, description = "Positions", body = [OfficerPosition]),
        (status = 403, description = "Administrator access required", body = Error)
    ),
    tags = ["admin"],
    operation_id = "adminListOfficers"
)]
#[get("/admin/officers")]
pub async fn admin_list_officers(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<OfficerQuery>,
) -> ApiResult<web::Json<Vec<OfficerPosition>>> {
    session.require_admin().await?;
    Ok(web::Json(state.officers.list(query.batch_year).await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/officers",
    request_body = OfficerDraft,
    responses(
        (status = 201, description = "Created", body = OfficerPosition),
        (status = 400, description = "Invalid dates or title", body = Error),
        (status = 409, description = "Batch already has a president", body = Error)
    ),
    tags = ["admin"],
    operation_id = "adminCreateOfficer"
)]
#[post("/admin/officers")]
pub async fn create_officer(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<OfficerDraft>,
) -> ApiResult<HttpResponse> {
    session.require_admin().await?;
    let position = state.officers.create(payload.into_inner()).await?;
    Ok(HttpResponse::Created().json(position))
}

#[utoipa::path(
    put,
    path = "/api/v1/admin/officers/{id}",
    params(("id" = Uuid, Path, description = "Position id")),
    request_body = OfficerDraft,
    responses(
        (status = 200, description = "Updated", body = OfficerPosition),
        (status = 404, description = "No such position", body = Error),
        (status = 409, description = "Batch already has a president", body = Error)
    ),
    tags = ["admin"],
    operation_id = "adminUpdateOfficer"
)]
#[put("/admin/officers/{id}")]
pub async fn update_officer(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
    payload: web::Json<OfficerDraft>,
) -> ApiResult<web::Json<OfficerPosition>> {
    session.require_admin().await?;
    let position = state
        .officers
        .update(path.into_inner(), payload.into_inner())
        .await?;
    Ok(web::Json(position))
}

#[utoipa::path(
    delete,
    path = "/api/v1/admin/officers/{id}",
    params(("id" = Uuid, Path, description = "Position id")),
    responses(
        (status = 204, description = "Soft-deleted"),
        (status = 404, description = "No such position", body = Error)
    ),
    tags = ["admin"],
    operation_id = "adminDeleteOfficer"
)]
#[delete("/admin/officers/{id}")]
pub async fn delete_officer(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    session.require_admin().await?;
    state.officers.delete(path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}
