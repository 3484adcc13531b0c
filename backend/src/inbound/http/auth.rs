//! Login, logout and password reset endpoints.
//!
//! ```text
//! POST /api/v1/login {"identifier":"123456-A","password":"..."}
//! POST /api/v1/logout
//! POST /api/v1/password-resets {"email":"ana@example.com"}
//! POST /api/v1/password-resets/confirm {"token":"...","newPassword":"..."}
//! ```

use actix_web::{HttpResponse, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{Error, LoginAttempt, LoginCandidate, LoginOutcome, UserProfile};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Login request body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    /// Full name or Alumni ID.
    pub identifier: String,
    #[serde(default)]
    pub password: Option<String>,
    /// Chosen account after a `multipleMatches` response.
    #[serde(default)]
    pub candidate_id: Option<Uuid>,
}

/// Login result.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum LoginResponse {
    Authenticated { user: UserProfile },
    MultipleMatches { candidates: Vec<LoginCandidate> },
}

/// Resolve an identifier to one account and start a session.
///
/// When several accounts match, no session is created and the candidates
/// are returned so the client can retry with `candidateId`.
#[utoipa::path(
    post,
    path = "/api/v1/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated or candidates to choose from", body = LoginResponse,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unknown account or wrong password", body = Error),
        (status = 403, description = "Account disabled", body = Error)
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<LoginResponse>> {
    let LoginRequest {
        identifier,
        password,
        candidate_id,
    } = payload.into_inner();
    let attempt = LoginAttempt::try_new(&identifier, password.as_deref(), candidate_id)?;
    let response = match state.login.login(&attempt).await? {
        LoginOutcome::Authenticated(user) => {
            session.persist_user(&user)?;
            LoginResponse::Authenticated {
                user: UserProfile::from(user.as_ref()),
            }
        }
        LoginOutcome::MultipleMatches(candidates) => LoginResponse::MultipleMatches { candidates },
    };
    Ok(web::Json(response))
}

/// End the current session.
#[utoipa::path(
    post,
    path = "/api/v1/logout",
    responses((status = 204, description = "Session cleared")),
    tags = ["auth"],
    operation_id = "logout"
)]
#[post("/logout")]
pub async fn logout(session: SessionContext) -> HttpResponse {
    session.clear();
    HttpResponse::NoContent().finish()
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PasswordResetRequest {
    pub email: String,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PasswordResetConfirmation {
    pub token: String,
    pub new_password: String,
}

/// Email a reset link. Always accepted so addresses cannot be probed.
#[utoipa::path(
    post,
    path = "/api/v1/password-resets",
    request_body = PasswordResetRequest,
    responses((status = 202, description = "Request accepted")),
    tags = ["auth"],
    operation_id = "requestPasswordReset",
    security([])
)]
#[post("/password-resets")]
pub async fn request_password_reset(
    state: web::Data<HttpState>,
    payload: web::Json<PasswordResetRequest>,
) -> ApiResult<HttpResponse> {
    state.password_resets.request(&payload.email).await?;
    Ok(HttpResponse::Accepted().finish())
}

/// Set a new password with a reset token.
#[utoipa::path(
    post,
    path = "/api/v1/password-resets/confirm",
    request_body = PasswordResetConfirmation,
    responses(
        (status = 204, description = "Password changed"),
        (status = 400, description = "Invalid or expired token, or weak password", body = Error)
    ),
    tags = ["auth"],
    operation_id = "confirmPasswordReset",
    security([])
)]
#[post("/password-resets/confirm")]
pub async fn confirm_password_reset(
    state: web::Data<HttpState>,
    payload: web::Json<PasswordResetConfirmation>,
) -> ApiResult<HttpResponse> {
    state
        .password_resets
        .confirm(&payload.token, &payload.new_password)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::MockLoginService;
    use crate::domain::{CandidateSource, Role, User};
    use crate::inbound::http::test_utils::{test_harness, test_session_middleware};
    use crate::test_support::fixture_timestamp;
    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use serde_json::{Value, json};
    use std::sync::Arc;

    async fn post_login(state: HttpState, body: Value) -> (StatusCode, Value, bool) {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .wrap(test_session_middleware())
                .service(web::scope("/api/v1").service(login)),
        )
        .await;
        let req = test::TestRequest::post()
            .uri("/api/v1/login")
            .set_json(body)
            .to_request();
        let res = test::call_service(&app, req).await;
        let status = res.status();
        let has_cookie = res.response().cookies().any(|c| c.name() == "session");
        let body: Value = test::read_body_json(res).await;
        (status, body, has_cookie)
    }

    #[actix_web::test]
    async fn authenticated_login_sets_the_session_cookie() {
        let mut resolver = MockLoginService::new();
        resolver.expect_login().times(1).returning(|attempt| {
            assert_eq!(attempt.identifier(), "Ana Cruz");
            Ok(LoginOutcome::Authenticated(Box::new(User::new(
                "Ana Cruz".into(),
                "ana@example.com".into(),
                Role::Alumni,
                fixture_timestamp(),
            ))))
        });
        let state = test_harness().state.with_login(Arc::new(resolver));
        let (status, body, has_cookie) =
            post_login(state, json!({ "identifier": "Ana Cruz" })).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "authenticated");
        assert_eq!(body["user"]["name"], "Ana Cruz");
        assert!(has_cookie);
    }

    #[actix_web::test]
    async fn multiple_matches_do_not_start_a_session() {
        let mut resolver = MockLoginService::new();
        resolver.expect_login().returning(|_| {
            Ok(LoginOutcome::MultipleMatches(vec![LoginCandidate {
                id: Uuid::nil(),
                source: CandidateSource::User,
                name: "Ana Cruz".into(),
                batch_year: Some(2010),
                alumni_id: None,
            }]))
        });
        let state = test_harness().state.with_login(Arc::new(resolver));
        let (status, body, has_cookie) =
            post_login(state, json!({ "identifier": "ana cruz" })).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "multipleMatches");
        assert_eq!(body["candidates"][0]["batchYear"], 2010);
        assert!(!has_cookie);
    }

    #[actix_web::test]
    async fn blank_identifier_is_rejected_before_lookup() {
        let mut resolver = MockLoginService::new();
        resolver.expect_login().never();
        let state = test_harness().state.with_login(Arc::new(resolver));
        let (status, body, _) = post_login(state, json!({ "identifier": "   " })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "invalid_request");
    }

    #[actix_web::test]
    async fn unknown_email_reset_is_still_accepted() {
        let harness = test_harness();
        let email = harness.email.clone();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(harness.state))
                .service(web::scope("/api/v1").service(request_password_reset)),
        )
        .await;
        let req = test::TestRequest::post()
            .uri("/api/v1/password-resets")
            .set_json(json!({ "email": "nobody@example.com" }))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::ACCEPTED);
        assert!(email.sent().is_empty());
    }
}
