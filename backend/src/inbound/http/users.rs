//! User directory, own profile and admin user management.
//!
//! ```text
//! GET    /api/v1/users
//! GET    /api/v1/users/me          PATCH /api/v1/users/me
//! PUT    /api/v1/users/me/password
//! GET    /api/v1/users/{id}
//! POST   /api/v1/users/{id}/follow DELETE /api/v1/users/{id}/follow
//! GET    /api/v1/admin/users
//! DELETE /api/v1/admin/users/{id}  PUT /api/v1/admin/users/{id}/role
//! ```

use actix_web::{HttpResponse, delete, get, patch, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{Error, ProfileUpdate, Role, User, UserProfile};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

fn profiles(users: &[User]) -> Vec<UserProfile> {
    users.iter().map(UserProfile::from).collect()
}

/// Alumni directory.
#[utoipa::path(
    get,
    path = "/api/v1/users",
    responses(
        (status = 200, description = "Active users by name", body = [UserProfile]),
        (status = 401, description = "Login required", body = Error)
    ),
    tags = ["users"],
    operation_id = "listUsers"
)]
#[get("/users")]
pub async fn list_users(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<UserProfile>>> {
    session.require_user().await?;
    let users = state.users.list().await?;
    let active: Vec<_> = users.into_iter().filter(|user| user.active).collect();
    Ok(web::Json(profiles(&active)))
}

/// Profile of the signed-in user.
#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    responses(
        (status = 200, description = "Current user", body = UserProfile),
        (status = 401, description = "Login required", body = Error)
    ),
    tags = ["users"],
    operation_id = "currentUser"
)]
#[get("/users/me")]
pub async fn current_user(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<UserProfile>> {
    let me = session.require_user().await?;
    let user = state.users.get(me.user_id).await?;
    Ok(web::Json(UserProfile::from(&user)))
}

#[utoipa::path(
    patch,
    path = "/api/v1/users/me",
    request_body = ProfileUpdate,
    responses(
        (status = 200, description = "Updated profile", body = UserProfile),
        (status = 400, description = "Invalid field", body = Error),
        (status = 401, description = "Login required", body = Error)
    ),
    tags = ["users"],
    operation_id = "updateCurrentUser"
)]
#[patch("/users/me")]
pub async fn update_current_user(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<ProfileUpdate>,
) -> ApiResult<web::Json<UserProfile>> {
    let me = session.require_user().await?;
    let user = state
        .users
        .update_profile(me.user_id, payload.into_inner())
        .await?;
    Ok(web::Json(UserProfile::from(&user)))
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PasswordChange {
    /// Required when the account already has a password.
    #[serde(default)]
    pub current_password: Option<String>,
    pub new_password: String,
}

#[utoipa::path(
    put,
    path = "/api/v1/users/me/password",
    request_body = PasswordChange,
    responses(
        (status = 204, description = "Password changed"),
        (status = 400, description = "Weak password", body = Error),
        (status = 401, description = "Wrong current password", body = Error)
    ),
    tags = ["users"],
    operation_id = "changePassword"
)]
#[put("/users/me/password")]
pub async fn change_password(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<PasswordChange>,
) -> ApiResult<HttpResponse> {
    let me = session.require_user().await?;
    state
        .users
        .change_password(
            me.user_id,
            payload.current_password.as_deref(),
            &payload.new_password,
        )
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    params(("id" = Uuid, Path, description = "User id")),
    responses(
        (status = 200, description = "User profile", body = UserProfile),
        (status = 404, description = "No such user", body = Error)
    ),
    tags = ["users"],
    operation_id = "getUser"
)]
#[get("/users/{id}")]
pub async fn get_user(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<UserProfile>> {
    session.require_user().await?;
    let user = state.users.get(path.into_inner()).await?;
    Ok(web::Json(UserProfile::from(&user)))
}

#[utoipa::path(
    post,
    path = "/api/v1/users/{id}/follow",
    params(("id" = Uuid, Path, description = "User to follow")),
    responses(
        (status = 204, description = "Following"),
        (status = 400, description = "Cannot follow yourself", body = Error),
        (status = 404, description = "No such user", body = Error)
    ),
    tags = ["users"],
    operation_id = "followUser"
)]
#[post("/users/{id}/follow")]
pub async fn follow_user(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    let me = session.require_user().await?;
    state.users.follow(me.user_id, path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}/follow",
    params(("id" = Uuid, Path, description = "User to unfollow")),
    responses((status = 204, description = "Not following")),
    tags = ["users"],
    operation_id = "unfollowUser"
)]
#[delete("/users/{id}/follow")]
pub async fn unfollow_user(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    let me = session.require_user().await?;
    state.users.unfollow(me.user_id, path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Every non-deleted user, including inactive ones.
#[utoipa::path(
    get,
    path = "/api/v1/admin/users",
    responses(
        (status = 200, description = "Users", body = [UserProfile]),
        (status = 403, description = "Administrator access required", body = Error)
    ),
    tags = ["admin"],
    operation_id = "adminListUsers"
)]
#[get("/admin/users")]
pub async fn admin_list_users(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<UserProfile>>> {
    session.require_admin().await?;
    Ok(web::Json(profiles(&state.users.list().await?)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/admin/users/{id}",
    params(("id" = Uuid, Path, description = "User id")),
    responses(
        (status = 204, description = "User soft-deleted"),
        (status = 400, description = "Administrators cannot delete themselves", body = Error),
        (status = 404, description = "No such user", body = Error)
    ),
    tags = ["admin"],
    operation_id = "adminDeleteUser"
)]
#[delete("/admin/users/{id}")]
pub async fn admin_delete_user(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    let admin = session.require_admin().await?;
    let id = path.into_inner();
    if id == admin.user_id {
        return Err(Error::invalid_request("administrators cannot delete themselves"));
    }
    state.users.delete(id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct RoleChange {
    pub role: Role,
}

#[utoipa::path(
    put,
    path = "/api/v1/admin/users/{id}/role",
    params(("id" = Uuid, Path, description = "User id")),
    request_body = RoleChange,
    responses(
        (status = 200, description = "Updated user", body = UserProfile),
        (status = 404, description = "No such user", body = Error)
    ),
    tags = ["admin"],
    operation_id = "adminSetRole"
)]
#[put("/admin/users/{id}/role")]
pub async fn admin_set_role(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
    payload: web::Json<RoleChange>,
) -> ApiResult<web::Json<UserProfile>> {
    session.require_admin().await?;
    let user = state
        .users
        .set_role(path.into_inner(), payload.role)
        .await?;
    Ok(web::Json(UserProfile::from(&user)))
}
