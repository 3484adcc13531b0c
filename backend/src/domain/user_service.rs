//! Account management: profiles, passwords, follows and administration.

use std::sync::Arc;

use mockable::Clock;
use serde::Deserialize;
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;

use super::ports::PasswordHasher;
use super::record::Record;
use super::repository::{Collections, Repository};
use super::{
    AlumniRecord, Error, InlineImage, Role, SocialLinks, User, clean_person_name, normalize_email,
};

/// Shortest accepted password, in characters.
pub const PASSWORD_MIN_CHARS: usize = 8;

/// Partial profile update; absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub photo: Option<InlineImage>,
    pub bio: Option<String>,
    pub occupation: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub social_links: Option<SocialLinks>,
}

/// Credentials for a bootstrap administrator.
#[derive(Debug, Clone)]
pub struct AdminSeed {
    pub name: String,
    pub email: String,
    pub password: String,
}

pub(crate) fn validate_password(password: &str) -> Result<(), Error> {
    if password.chars().count() < PASSWORD_MIN_CHARS {
        return Err(Error::invalid_request(format!(
            "password must be at least {PASSWORD_MIN_CHARS} characters"
        )));
    }
    Ok(())
}

pub(crate) fn validate_email(raw: &str) -> Result<String, Error> {
    let email = normalize_email(raw);
    let valid = email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
    if valid {
        Ok(email)
    } else {
        Err(Error::invalid_request("email must be a valid address"))
    }
}

fn optional_text(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

/// Operations on the `users` collection.
#[derive(Clone)]
pub struct UserService {
    users: Repository<User>,
    alumni: Repository<AlumniRecord>,
    hasher: Arc<dyn PasswordHasher>,
    clock: Arc<dyn Clock>,
}

impl UserService {
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

    fn hash(&self, password: &str) -> Result<String, Error> {
        self.hasher
            .hash(password)
            .map_err(|err| Error::internal(format!("password hashing failed: {err}")))
    }

    /// Live users ordered by name.
    pub async fn list(&self) -> Result<Vec<User>, Error> {
        let mut users = self.users.list().await?;
        users.sort_by(|a, b| a.normalized_name.cmp(&b.normalized_name));
        Ok(users)
    }

    pub async fn get(&self, id: Uuid) -> Result<User, Error> {
        self.users.get(id).await
    }

    /// The user behind a session: `None` once deleted or deactivated.
    pub async fn find_active(&self, id: Uuid) -> Result<Option<User>, Error> {
        Ok(self.users.find(id).await?.filter(|user| user.active))
    }

    pub async fn update_profile(&self, id: Uuid, update: ProfileUpdate) -> Result<User, Error> {
        let mut user = self.users.get(id).await?;
        if let Some(name) = update.name {
            let cleaned =
                clean_person_name(&name).map_err(|err| Error::invalid_request(err.to_string()))?;
            user.rename(cleaned);
        }
        if let Some(email) = update.email {
            user.email = validate_email(&email)?;
        }
        if let Some(photo) = update.photo {
            user.photo = Some(photo);
        }
        if let Some(bio) = update.bio {
            user.bio = optional_text(bio);
        }
        if let Some(occupation) = update.occupation {
            user.occupation = optional_text(occupation);
        }
        if let Some(company) = update.company {
            user.company = optional_text(company);
        }
        if let Some(location) = update.location {
            user.location = optional_text(location);
        }
        if let Some(links) = update.social_links {
            user.social_links = links;
        }
        user.touch(self.clock.utc());
        self.users.save(&user).await?;
        Ok(user)
    }

    /// Set a new password. The current one must be supplied when one exists.
    pub async fn change_password(
        &self,
        id: Uuid,
        current: Option<&str>,
        new_password: &str,
    ) -> Result<(), Error> {
        validate_password(new_password)?;
        let mut user = self.users.get(id).await?;
        if let Some(hash) = &user.password_hash {
            let supplied =
                current.ok_or_else(|| Error::unauthorized("current password is required"))?;
            let matches = self
                .hasher
                .verify(supplied, hash)
                .map_err(|err| Error::internal(format!("password verification failed: {err}")))?;
            if !matches {
                return Err(Error::unauthorized("current password is incorrect"));
            }
        }
        user.password_hash = Some(self.hash(new_password)?);
        user.touch(self.clock.utc());
        self.users.save(&user).await
    }

    /// `follower` starts following `target`; both lists are updated.
    pub async fn follow(&self, follower: Uuid, target: Uuid) -> Result<(), Error> {
        if follower == target {
            return Err(Error::invalid_request("users cannot follow themselves"));
        }
        let mut source = self.users.get(follower).await?;
        let mut followed = self.users.get(target).await?;
        let now = self.clock.utc();
        if !source.following.contains(&target) {
            source.following.push(target);
            source.touch(now);
            self.users.save(&source).await?;
        }
        if !followed.followers.contains(&follower) {
            followed.followers.push(follower);
            followed.touch(now);
            self.users.save_logged(&followed, "follow").await?;
        }
        Ok(())
    }

    pub async fn unfollow(&self, follower: Uuid, target: Uuid) -> Result<(), Error> {
        let mut source = self.users.get(follower).await?;
        let now = self.clock.utc();
        if source.following.contains(&target) {
            source.following.retain(|id| *id != target);
            source.touch(now);
            self.users.save(&source).await?;
        }
        if let Some(mut followed) = self.users.find(target).await?
            && followed.followers.contains(&follower)
        {
            followed.followers.retain(|id| *id != follower);
            followed.touch(now);
            self.users.save_logged(&followed, "unfollow").await?;
        }
        Ok(())
    }

    pub async fn set_role(&self, id: Uuid, role: Role) -> Result<User, Error> {
        let mut user = self.users.get(id).await?;
        user.role = role;
        user.touch(self.clock.utc());
        self.users.save(&user).await?;
        Ok(user)
    }

    /// Soft delete the account and unlink its alumni record.
    pub async fn delete(&self, id: Uuid) -> Result<(), Error> {
        let mut user = self.users.get(id).await?;
        let now = self.clock.utc();
        user.mark_deleted(now);
        self.users.save(&user).await?;

        if let Some(record_id) = user.alumni_record_id
            && let Some(mut record) = self.alumni.find(record_id).await?
            && record.user_id == Some(id)
        {
            record.user_id = None;
            record.touch(now);
            self.alumni.save_logged(&record, "user deletion").await?;
        }
        Ok(())
    }

    /// Create the configured administrator unless an account with the same
    /// email already exists.
    pub async fn ensure_admin(&self, seed: &AdminSeed) -> Result<User, Error> {
        let email = validate_email(&seed.email)?;
        if let Some(existing) = self
            .users
            .list_where("email", &email)
            .await?
            .into_iter()
            .next()
        {
            return Ok(existing);
        }
        validate_password(&seed.password)?;
        let name =
            clean_person_name(&seed.name).map_err(|err| Error::invalid_request(err.to_string()))?;
        let mut admin = User::new(name, email, Role::Admin, self.clock.utc());
        admin.password_hash = Some(self.hash(&seed.password)?);
        self.users.insert(&admin).await?;
        info!(user_id = %admin.id, "bootstrap administrator created");
        Ok(admin)
    }
}
