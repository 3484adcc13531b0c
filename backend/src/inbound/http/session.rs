//! Session helpers to keep HTTP handlers free of framework-specific logic.
//!
//! The cookie only holds the signed-in user's id. Every guard reloads that
//! user, so role changes, deactivation and deletion take effect on the next
//! request rather than when the cookie expires.

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::LocalBoxFuture;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::{Error, Role, Submitter, User, UserService};
use crate::inbound::http::state::HttpState;

pub(crate) const USER_ID_KEY: &str = "user_id";

/// Newtype wrapper that exposes higher-level session operations.
#[derive(Clone)]
pub struct SessionContext {
    session: Session,
    users: Option<UserService>,
}

impl SessionContext {
    pub fn new(session: Session, users: Option<UserService>) -> Self {
        Self { session, users }
    }

    /// Persist the authenticated user's id, rotating the session.
    pub fn persist_user(&self, user: &User) -> Result<(), Error> {
        self.session.renew();
        self.session
            .insert(USER_ID_KEY, user.id)
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    /// Forget the signed-in user.
    pub fn clear(&self) {
        self.session.purge();
    }

    fn user_id(&self) -> Option<Uuid> {
        match self.session.get::<Uuid>(USER_ID_KEY) {
            Ok(user_id) => user_id,
            Err(error) => {
                warn!(%error, "malformed session cookie");
                None
            }
        }
    }

    /// Current user with the role currently stored for them.
    ///
    /// Sessions of deleted, deactivated or unknown users are purged and
    /// treated as signed out.
    pub async fn submitter(&self) -> Result<Option<Submitter>, Error> {
        let Some(user_id) = self.user_id() else {
            return Ok(None);
        };
        let users = self
            .users
            .as_ref()
            .ok_or_else(|| Error::internal("session user lookup is not configured"))?;
        match users.find_active(user_id).await? {
            Some(user) => Ok(Some(Submitter {
                user_id: user.id,
                role: user.role,
            })),
            None => {
                info!(%user_id, "session user no longer active; signing out");
                self.clear();
                Ok(None)
            }
        }
    }

    /// Require a signed-in user or return `401 Unauthorized`.
    pub async fn require_user(&self) -> Result<Submitter, Error> {
        self.submitter()
            .await?
            .ok_or_else(|| Error::unauthorized("login required"))
    }

    /// Require an administrator: `401` when signed out, `403` otherwise.
    pub async fn require_admin(&self) -> Result<Submitter, Error> {
        let submitter = self.require_user().await?;
        if submitter.role == Role::Admin {
            Ok(submitter)
        } else {
            Err(Error::forbidden("administrator access required"))
        }
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let users = req
            .app_data::<web::Data<HttpState>>()
            .map(|state| state.users.clone());
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(|session| SessionContext::new(session, users)) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Repository;
    use crate::inbound::http::test_utils::{TestHarness, test_harness, test_session_middleware};
    use crate::test_support::fixture_timestamp;
    use actix_web::cookie::Cookie;
    use actix_web::body::MessageBody;
    use actix_web::dev::{Service, ServiceFactory, ServiceRequest, ServiceResponse};
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test};
    use actix_http::Request;
    use rstest::rstest;

    async fn seed_user(harness: &TestHarness, role: Role) -> User {
        let user = User::new("Ana Cruz".into(), "ana@example.com".into(), role, fixture_timestamp());
        let users: Repository<User> = harness.collections.repository();
        users.insert(&user).await.expect("seed user");
        user
    }

    fn session_app(
        state: HttpState,
    ) -> App<
        impl ServiceFactory<
            ServiceRequest,
            Config = (),
            Response = ServiceResponse<impl MessageBody>,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .app_data(web::Data::new(state))
            .wrap(test_session_middleware())
            .route(
                "/set/{id}",
                web::get().to(
                    |session: SessionContext, state: web::Data<HttpState>, path: web::Path<Uuid>| async move {
                        let user = state.users.get(path.into_inner()).await?;
                        session.persist_user(&user)?;
                        Ok::<_, Error>(HttpResponse::Ok().finish())
                    },
                ),
            )
            .route(
                "/user",
                web::get().to(|session: SessionContext| async move {
                    session.require_user().await?;
                    Ok::<_, Error>(HttpResponse::Ok().finish())
                }),
            )
            .route(
                "/admin",
                web::get().to(|session: SessionContext| async move {
                    session.require_admin().await?;
                    Ok::<_, Error>(HttpResponse::Ok().finish())
                }),
            )
    }

    async fn sign_in<S, B>(app: &S, user_id: Uuid) -> Cookie<'static>
    where
        S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
        B: MessageBody,
    {
        let res = test::call_service(
            app,
            test::TestRequest::get().uri(&format!("/set/{user_id}")).to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        res.response()
            .cookies()
            .find(|cookie| cookie.name() == "session")
            .expect("session cookie set")
            .into_owned()
    }

    async fn status_of<S, B>(app: &S, uri: &str, cookie: Option<Cookie<'static>>) -> StatusCode
    where
        S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
        B: MessageBody,
    {
        let request = test::TestRequest::get().uri(uri);
        let request = match cookie {
            Some(cookie) => request.cookie(cookie),
            None => request,
        };
        test::call_service(app, request.to_request()).await.status()
    }

    #[rstest]
    #[case(Role::Alumni, StatusCode::FORBIDDEN)]
    #[case(Role::Admin, StatusCode::OK)]
    #[actix_web::test]
    async fn admin_guard_checks_the_stored_role(#[case] role: Role, #[case] expected: StatusCode) {
        let harness = test_harness();
        let user = seed_user(&harness, role).await;
        let app = test::init_service(session_app(harness.state.clone())).await;

        let cookie = sign_in(&app, user.id).await;
        assert_eq!(status_of(&app, "/admin", Some(cookie)).await, expected);
    }

    #[actix_web::test]
    async fn demotion_applies_to_open_sessions() {
        let harness = test_harness();
        let admin = seed_user(&harness, Role::Admin).await;
        let app = test::init_service(session_app(harness.state.clone())).await;
        let cookie = sign_in(&app, admin.id).await;
        assert_eq!(status_of(&app, "/admin", Some(cookie.clone())).await, StatusCode::OK);

        harness
            .state
            .users
            .set_role(admin.id, Role::Alumni)
            .await
            .expect("demote");

        assert_eq!(status_of(&app, "/admin", Some(cookie.clone())).await, StatusCode::FORBIDDEN);
        assert_eq!(status_of(&app, "/user", Some(cookie)).await, StatusCode::OK);
    }

    #[actix_web::test]
    async fn deleted_users_are_signed_out() {
        let harness = test_harness();
        let admin = seed_user(&harness, Role::Admin).await;
        let app = test::init_service(session_app(harness.state.clone())).await;
        let cookie = sign_in(&app, admin.id).await;

        harness.state.users.delete(admin.id).await.expect("delete");

        assert_eq!(
            status_of(&app, "/admin", Some(cookie.clone())).await,
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(status_of(&app, "/user", Some(cookie)).await, StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn deactivated_users_are_signed_out() {
        let harness = test_harness();
        let mut user = seed_user(&harness, Role::Alumni).await;
        let app = test::init_service(session_app(harness.state.clone())).await;
        let cookie = sign_in(&app, user.id).await;

        user.active = false;
        let users: Repository<User> = harness.collections.repository();
        users.save(&user).await.expect("deactivate");

        assert_eq!(status_of(&app, "/user", Some(cookie)).await, StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn missing_user_is_unauthorised() {
        let harness = test_harness();
        let app = test::init_service(session_app(harness.state.clone())).await;
        assert_eq!(status_of(&app, "/user", None).await, StatusCode::UNAUTHORIZED);
    }
}
