//! Shared harness for HTTP integration tests.
//!
//! Builds the full `/api/v1` surface over an in-memory store with a plain
//! password hasher, a recording email sender and a frozen clock.

#![allow(dead_code, reason = "each test binary uses a different subset")]

use std::sync::Arc;

use actix_http::Request;
use actix_web::body::MessageBody;
use actix_web::cookie::{Cookie, Key, SameSite};
use actix_web::dev::{Service, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use backend::domain::{AdminSeed, Collections, UserService};
use backend::inbound::http::configure_api;
use backend::inbound::http::session_config::SessionSettings;
use backend::inbound::http::state::{HttpState, HttpStatePorts};
use backend::test_support::{
    MutableClock, PlainPasswordHasher, RecordingEmailSender, in_memory_collections,
};
use serde_json::{Value, json};

pub const ADMIN_NAME: &str = "Site Admin";
pub const ADMIN_PASSWORD: &str = "change-me-now";

pub struct TestContext {
    pub state: HttpState,
    pub collections: Collections,
    pub email: Arc<RecordingEmailSender>,
    session: SessionSettings,
}

impl TestContext {
    /// Context with a bootstrap administrator already created.
    pub async fn with_admin() -> Self {
        let collections = in_memory_collections();
        let email = Arc::new(RecordingEmailSender::default());
        let clock = Arc::new(MutableClock::default());
        let hasher = Arc::new(PlainPasswordHasher);
        UserService::new(&collections, hasher.clone(), clock.clone())
            .ensure_admin(&AdminSeed {
                name: ADMIN_NAME.to_owned(),
                email: "admin@alumni.example".to_owned(),
                password: ADMIN_PASSWORD.to_owned(),
            })
            .await
            .expect("seed admin");
        let state = HttpState::new(HttpStatePorts {
            collections: collections.clone(),
            hasher,
            email: email.clone(),
            clock,
            password_reset_url: "https://alumni.example/reset".to_owned(),
        });
        Self {
            state,
            collections,
            email,
            session: SessionSettings {
                key: Key::generate(),
                cookie_secure: false,
                same_site: SameSite::Lax,
            },
        }
    }

    /// The `/api/v1` app. Owns clones of the state so it outlives `self`.
    pub fn app(
        &self,
    ) -> App<
        impl ServiceFactory<
            ServiceRequest,
            Config = (),
            Response = ServiceResponse<impl MessageBody + use<>>,
            Error = actix_web::Error,
            InitError = (),
        > + use<>,
    > {
        let state = web::Data::new(self.state.clone());
        let middleware = self.session.middleware();
        App::new()
            .app_data(state)
            .service(web::scope("/api/v1").wrap(middleware).configure(configure_api))
    }
}

/// Send a JSON request, optionally with a session cookie, and decode the
/// response body when there is one.
pub async fn send<S, B>(
    app: &S,
    request: test::TestRequest,
    cookie: Option<&Cookie<'static>>,
) -> (StatusCode, Value, Option<Cookie<'static>>)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let request = match cookie {
        Some(cookie) => request.cookie(cookie.clone()),
        None => request,
    };
    let response = test::call_service(app, request.to_request()).await;
    let status = response.status();
    let session = response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(Cookie::into_owned);
    let bytes = test::read_body(response).await;
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, body, session)
}

/// Log in and return the session cookie. Panics unless authenticated.
pub async fn login<S, B>(app: &S, identifier: &str, password: Option<&str>) -> Cookie<'static>
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let request = test::TestRequest::post()
        .uri("/api/v1/login")
        .set_json(json!({ "identifier": identifier, "password": password }));
    let (status, body, cookie) = send(app, request, None).await;
    assert_eq!(status, StatusCode::OK, "login failed: {body}");
    assert_eq!(body["status"], "authenticated", "{body}");
    cookie.expect("session cookie")
}

pub async fn login_admin<S, B>(app: &S) -> Cookie<'static>
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    login(app, ADMIN_NAME, Some(ADMIN_PASSWORD)).await
}

/// Import a roster as the administrator and return the report.
pub async fn import_roster<S, B>(
    app: &S,
    admin: &Cookie<'static>,
    batch_year: i32,
    csv: &str,
) -> Value
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let request = test::TestRequest::post()
        .uri("/api/v1/admin/alumni/import")
        .set_json(json!({ "batchYear": batch_year, "csv": csv }));
    let (status, body, _) = send(app, request, Some(admin)).await;
    assert_eq!(status, StatusCode::OK, "import failed: {body}");
    body
}
