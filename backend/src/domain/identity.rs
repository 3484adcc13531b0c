//! Identity resolution for login by name or Alumni ID.
//!
//! Users are matched first. When no user matches, active alumni records are
//! consulted and a user account is provisioned from the record on demand.
//! Ambiguous names never resolve silently; the caller receives the candidate
//! list and may retry with a `candidateId`.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;

use super::ports::{LoginService, PasswordHasher};
use super::repository::{Collections, Repository};
use super::{
    AlumniId, AlumniRecord, CandidateSource, Error, LoginAttempt, LoginCandidate, LoginOutcome,
    Role, User, normalize_name,
};

const NO_ACCOUNT: &str = "no account found for that name or alumni id";

/// Intermediate result before the password check.
enum Resolution {
    User(User),
    Record(AlumniRecord),
    Candidates(Vec<LoginCandidate>),
}

/// [`LoginService`] backed by the `users` and `alumni_records` collections.
#[derive(Clone)]
pub struct IdentityService {
    users: Repository<User>,
    alumni: Repository<AlumniRecord>,
    hasher: Arc<dyn PasswordHasher>,
    clock: Arc<dyn Clock>,
}

impl IdentityService {
    pub fn new(
        collections: &Collections,
        hasher: Arc<dyn PasswordHasher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users: collections.repository(),
            alumni: collections.repository(),
            hasher,
            clock,
        }
    }

    async fn resolve(&self, attempt: &LoginAttempt) -> Result<Resolution, Error> {
        match AlumniId::parse(attempt.identifier()) {
            Ok(alumni_id) => self.resolve_alumni_id(&alumni_id, attempt.candidate_id()).await,
            Err(_) => {
                self.resolve_name(&normalize_name(attempt.identifier()), attempt.candidate_id())
                    .await
            }
        }
    }

    async fn resolve_alumni_id(
        &self,
        alumni_id: &AlumniId,
        candidate_id: Option<Uuid>,
    ) -> Result<Resolution, Error> {
        let users = self.active_users_where("alumniId", alumni_id.as_ref()).await?;
        if !users.is_empty() {
            return Ok(pick_user(users, candidate_id));
        }
        let records = self
            .active_records_where("alumniId", alumni_id.as_ref())
            .await?;
        Ok(pick_record(records, candidate_id))
    }

    async fn resolve_name(
        &self,
        normalized: &str,
        candidate_id: Option<Uuid>,
    ) -> Result<Resolution, Error> {
        let users = self.active_users_where("normalizedName", normalized).await?;
        if !users.is_empty() {
            return Ok(pick_user(users, candidate_id));
        }
        let records = self.active_records_where("normalizedName", normalized).await?;
        Ok(pick_record(records, candidate_id))
    }

    async fn active_users_where(&self, field: &str, value: &str) -> Result<Vec<User>, Error> {
        Ok(self
            .users
            .list_where(field, value)
            .await?
            .into_iter()
            .filter(|user| user.active)
            .collect())
    }

    async fn active_records_where(
        &self,
        field: &str,
        value: &str,
    ) -> Result<Vec<AlumniRecord>, Error> {
        Ok(self
            .alumni
            .list_where(field, value)
            .await?
            .into_iter()
            .filter(|record| record.active)
            .collect())
    }

    /// Return the record's linked user, provisioning one if needed.
    async fn user_for_record(&self, record: AlumniRecord) -> Result<User, Error> {
        if let Some(user_id) = record.user_id
            && let Some(user) = self.users.find(user_id).await?
        {
            if !user.active {
                return Err(Error::forbidden("this account has been deactivated"));
            }
            return Ok(user);
        }
        self.provision(record).await
    }

    async fn provision(&self, mut record: AlumniRecord) -> Result<User, Error> {
        let now = self.clock.utc();
        let mut user = User::new(record.name.clone(), record.email.clone(), Role::Alumni, now);
        user.batch_year = Some(record.batch_year);
        user.alumni_id = Some(record.alumni_id.clone());
        user.photo = record.photo.clone();
        user.alumni_record_id = Some(record.id);
        self.users.insert(&user).await?;

        record.user_id = Some(user.id);
        record.updated_at = now;
        if let Err(err) = self.alumni.save(&record).await {
            error!(
                user_id = %user.id,
                alumni_record_id = %record.id,
                error = %err,
                "provisioned user but failed to link alumni record"
            );
            return Err(err);
        }
        info!(user_id = %user.id, alumni_record_id = %record.id, "provisioned user from alumni record");
        Ok(user)
    }

    fn check_password(&self, user: &User, password: Option<&str>) -> Result<(), Error> {
        match (&user.password_hash, password) {
            (Some(hash), Some(secret)) => {
                let matches = self.hasher.verify(secret, hash).map_err(|err| {
                    Error::internal(format!("password verification failed: {err}"))
                })?;
                if matches {
                    Ok(())
                } else {
                    Err(Error::unauthorized("invalid credentials"))
                }
            }
            (Some(_), None) => Err(Error::unauthorized("password required")
                .with_details(json!({ "passwordRequired": true }))),
            (None, _) if user.role == Role::Admin => Err(Error::unauthorized(
                "administrator accounts require a password",
            )),
            (None, _) => Ok(()),
        }
    }
}

fn user_candidate(user: &User) -> LoginCandidate {
    LoginCandidate {
        id: user.id,
        source: CandidateSource::User,
        name: user.name.clone(),
        batch_year: user.batch_year,
        alumni_id: user.alumni_id.clone(),
    }
}

fn record_candidate(record: &AlumniRecord) -> LoginCandidate {
    LoginCandidate {
        id: record.id,
        source: CandidateSource::AlumniRecord,
        name: record.name.clone(),
        batch_year: Some(record.batch_year),
        alumni_id: Some(record.alumni_id.clone()),
    }
}

fn pick_user(mut users: Vec<User>, candidate_id: Option<Uuid>) -> Resolution {
    if users.len() == 1
        && let Some(user) = users.pop()
    {
        return Resolution::User(user);
    }
    if let Some(wanted) = candidate_id
        && let Some(index) = users.iter().position(|user| user.id == wanted)
    {
        return Resolution::User(users.swap_remove(index));
    }
    Resolution::Candidates(users.iter().map(user_candidate).collect())
}

fn pick_record(mut records: Vec<AlumniRecord>, candidate_id: Option<Uuid>) -> Resolution {
    if records.len() == 1
        && let Some(record) = records.pop()
    {
        return Resolution::Record(record);
    }
    if let Some(wanted) = candidate_id
        && let Some(index) = records.iter().position(|record| record.id == wanted)
    {
        return Resolution::Record(records.swap_remove(index));
    }
    Resolution::Candidates(records.iter().map(record_candidate).collect())
}

#[async_trait]
impl LoginService for IdentityService {
    async fn login(&self, attempt: &LoginAttempt) -> Result<LoginOutcome, Error> {
        let user = match self.resolve(attempt).await? {
            Resolution::Candidates(candidates) if candidates.is_empty() => {
                return Err(Error::unauthorized(NO_ACCOUNT));
            }
            Resolution::Candidates(candidates) => {
                return Ok(LoginOutcome::MultipleMatches(candidates));
            }
            Resolution::User(user) => user,
            Resolution::Record(record) => self.user_for_record(record).await?,
        };
        self.check_password(&user, attempt.password())?;
        Ok(LoginOutcome::Authenticated(Box::new(user)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::record::Record;
    use crate::test_support::{MutableClock, PlainPasswordHasher, fixture_timestamp, in_memory_collections};
    use rstest::{fixture, rstest};

    struct Harness {
        service: IdentityService,
        users: Repository<User>,
        alumni: Repository<AlumniRecord>,
    }

    #[fixture]
    fn harness() -> Harness {
        let collections = in_memory_collections();
        Harness {
            service: IdentityService::new(
                &collections,
                Arc::new(PlainPasswordHasher),
                Arc::new(MutableClock::default()),
            ),
            users: collections.repository(),
            alumni: collections.repository(),
        }
    }

    fn user(name: &str) -> User {
        User::new(name.into(), format!("{}@example.com", Uuid::new_v4()), Role::Alumni, fixture_timestamp())
    }

    fn record(name: &str, alumni_id: &str) -> AlumniRecord {
        let id = AlumniId::parse(alumni_id).expect("valid id");
        AlumniRecord::new(name.into(), id.placeholder_email(), 2004, id, fixture_timestamp())
    }

    fn attempt(identifier: &str, password: Option<&str>) -> LoginAttempt {
        LoginAttempt::try_new(identifier, password, None).expect("valid attempt")
    }

    fn authenticated(outcome: LoginOutcome) -> User {
        match outcome {
            LoginOutcome::Authenticated(user) => *user,
            LoginOutcome::MultipleMatches(candidates) => {
                panic!("expected a single user, got {candidates:?}")
            }
        }
    }

    #[rstest]
    #[tokio::test]
    async fn name_login_ignores_case_and_spacing(harness: Harness) {
        let ana = user("Ana Reyes");
        harness.users.insert(&ana).await.expect("seed");

        let outcome = harness
            .service
            .login(&attempt("  ana   REYES ", None))
            .await
            .expect("login");
        assert_eq!(authenticated(outcome).id, ana.id);
    }

    #[rstest]
    #[tokio::test]
    async fn duplicate_names_return_candidates(harness: Harness) {
        harness.users.insert(&user("Juan Cruz")).await.expect("seed");
        harness.users.insert(&user("juan  cruz")).await.expect("seed");

        let outcome = harness
            .service
            .login(&attempt("Juan Cruz", None))
            .await
            .expect("login");
        match outcome {
            LoginOutcome::MultipleMatches(candidates) => {
                assert_eq!(candidates.len(), 2);
                assert!(candidates.iter().all(|c| c.source == CandidateSource::User));
            }
            LoginOutcome::Authenticated(user) => panic!("picked {} silently", user.id),
        }
    }

    #[rstest]
    #[tokio::test]
    async fn candidate_id_selects_one_of_the_matches(harness: Harness) {
        let first = user("Juan Cruz");
        let second = user("Juan Cruz");
        harness.users.insert(&first).await.expect("seed");
        harness.users.insert(&second).await.expect("seed");

        let attempt = LoginAttempt::try_new("juan cruz", None, Some(second.id)).expect("attempt");
        let outcome = harness.service.login(&attempt).await.expect("login");
        assert_eq!(authenticated(outcome).id, second.id);
    }

    #[rstest]
    #[tokio::test]
    async fn inactive_and_deleted_users_are_ignored(harness: Harness) {
        let mut inactive = user("Maria Santos");
        inactive.active = false;
        let mut deleted = user("Maria Santos");
        deleted.mark_deleted(fixture_timestamp());
        let active = user("Maria Santos");
        for u in [&inactive, &deleted, &active] {
            harness.users.insert(u).await.expect("seed");
        }

        let outcome = harness
            .service
            .login(&attempt("maria santos", None))
            .await
            .expect("login");
        assert_eq!(authenticated(outcome).id, active.id);
    }

    #[rstest]
    #[tokio::test]
    async fn record_match_provisions_and_links_user(harness: Harness) {
        let rec = record("Pedro Garcia", "200401-A");
        harness.alumni.insert(&rec).await.expect("seed");

        let user = authenticated(
            harness
                .service
                .login(&attempt("Pedro Garcia", None))
                .await
                .expect("login"),
        );
        assert_eq!(user.alumni_record_id, Some(rec.id));
        assert_eq!(user.batch_year, Some(2004));
        assert_eq!(user.role, Role::Alumni);
        assert!(user.password_hash.is_none());

        let stored = harness.alumni.get(rec.id).await.expect("record");
        assert_eq!(stored.user_id, Some(user.id));

        let again = authenticated(
            harness
                .service
                .login(&attempt("200401-a", None))
                .await
                .expect("second login"),
        );
        assert_eq!(again.id, user.id);
        assert_eq!(harness.users.list().await.expect("users").len(), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn alumni_id_login_reuses_linked_user(harness: Harness) {
        let mut rec = record("Liza Tan", "199912-C");
        let mut linked = user("Liza Tan");
        rec.user_id = Some(linked.id);
        linked.alumni_record_id = Some(rec.id);
        harness.users.insert(&linked).await.expect("seed");
        harness.alumni.insert(&rec).await.expect("seed");

        let outcome = harness
            .service
            .login(&attempt("199912-C", None))
            .await
            .expect("login");
        assert_eq!(authenticated(outcome).id, linked.id);
    }

    #[rstest]
    #[tokio::test]
    async fn duplicate_record_names_return_record_candidates(harness: Harness) {
        harness.alumni.insert(&record("Jose Rizal", "100001-A")).await.expect("seed");
        harness.alumni.insert(&record("Jose Rizal", "100002-B")).await.expect("seed");

        match harness
            .service
            .login(&attempt("jose rizal", None))
            .await
            .expect("login")
        {
            LoginOutcome::MultipleMatches(candidates) => {
                assert_eq!(candidates.len(), 2);
                assert!(candidates.iter().all(|c| c.source == CandidateSource::AlumniRecord));
            }
            LoginOutcome::Authenticated(_) => panic!("expected candidates"),
        }
        assert!(harness.users.list().await.expect("users").is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn unknown_identifier_is_unauthorized(harness: Harness) {
        let err = harness
            .service
            .login(&attempt("Nobody Here", None))
            .await
            .expect_err("no match");
        assert_eq!(err.code(), ErrorCode::Unauthorized);
    }

    #[rstest]
    #[case(Some("secret"), true)]
    #[case(Some("wrong"), false)]
    #[case(None, false)]
    #[tokio::test]
    async fn password_is_required_once_set(
        harness: Harness,
        #[case] password: Option<&str>,
        #[case] succeeds: bool,
    ) {
        let mut ana = user("Ana Reyes");
        ana.password_hash = Some("plain:secret".into());
        harness.users.insert(&ana).await.expect("seed");

        let result = harness.service.login(&attempt("Ana Reyes", password)).await;
        match (succeeds, result) {
            (true, Ok(outcome)) => assert_eq!(authenticated(outcome).id, ana.id),
            (false, Err(err)) => assert_eq!(err.code(), ErrorCode::Unauthorized),
            (true, Err(err)) => panic!("expected success, got {err:?}"),
            (false, Ok(outcome)) => panic!("expected failure, got {outcome:?}"),
        }
    }

    #[rstest]
    #[tokio::test]
    async fn admins_without_password_cannot_log_in(harness: Harness) {
        let mut admin = user("Site Admin");
        admin.role = Role::Admin;
        harness.users.insert(&admin).await.expect("seed");

        let err = harness
            .service
            .login(&attempt("Site Admin", None))
            .await
            .expect_err("admin needs password");
        assert_eq!(err.code(), ErrorCode::Unauthorized);
    }
}
