//! Collections and the common contract every stored record satisfies.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use uuid::Uuid;

/// Named document collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collection {
    Users,
    AlumniRecords,
    AlumniOfficers,
    Events,
    GalleryItems,
    JobPostings,
    Donations,
    Notifications,
    LandingConfig,
    ContactMessages,
    PasswordResets,
}

impl Collection {
    /// Every collection, in declaration order.
    pub const ALL: [Self; 11] = [
        Self::Users,
        Self::AlumniRecords,
        Self::AlumniOfficers,
        Self::Events,
        Self::GalleryItems,
        Self::JobPostings,
        Self::Donations,
        Self::Notifications,
        Self::LandingConfig,
        Self::ContactMessages,
        Self::PasswordResets,
    ];

    /// Storage name of the collection.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::AlumniRecords => "alumni_records",
            Self::AlumniOfficers => "alumni_officers",
            Self::Events => "events",
            Self::GalleryItems => "gallery_items",
            Self::JobPostings => "job_postings",
            Self::Donations => "donations",
            Self::Notifications => "notifications",
            Self::LandingConfig => "landing_config",
            Self::ContactMessages => "contact_messages",
            Self::PasswordResets => "password_resets",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A document persisted in one collection.
///
/// Records serialise to camelCase JSON carrying `id`, `createdAt`,
/// `updatedAt` and, once soft-deleted, `deletedAt`.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Collection the record lives in.
    const COLLECTION: Collection;

    fn id(&self) -> Uuid;
    fn created_at(&self) -> DateTime<Utc>;
    fn updated_at(&self) -> DateTime<Utc>;
    fn deleted_at(&self) -> Option<DateTime<Utc>>;

    /// Bump `updatedAt`.
    fn touch(&mut self, now: DateTime<Utc>);

    /// Soft delete the record at `now`.
    fn mark_deleted(&mut self, now: DateTime<Utc>);

    fn is_deleted(&self) -> bool {
        self.deleted_at().is_some()
    }
}

/// Implement [`Record`] for a struct with the standard audit fields.
macro_rules! impl_record {
    ($ty:ty, $collection:expr) => {
        impl $crate::domain::record::Record for $ty {
            const COLLECTION: $crate::domain::record::Collection = $collection;

            fn id(&self) -> ::uuid::Uuid {
                self.id
            }

            fn created_at(&self) -> ::chrono::DateTime<::chrono::Utc> {
                self.created_at
            }

            fn updated_at(&self) -> ::chrono::DateTime<::chrono::Utc> {
                self.updated_at
            }

            fn deleted_at(&self) -> Option<::chrono::DateTime<::chrono::Utc>> {
                self.deleted_at
            }

            fn touch(&mut self, now: ::chrono::DateTime<::chrono::Utc>) {
                self.updated_at = now;
            }

            fn mark_deleted(&mut self, now: ::chrono::DateTime<::chrono::Utc>) {
                self.deleted_at = Some(now);
                self.updated_at = now;
            }
        }
    };
}

pub(crate) use impl_record;

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn collection_names_are_unique() {
        let names: HashSet<_> = Collection::ALL.iter().map(|c| c.as_str()).collect();
        assert_eq!(names.len(), Collection::ALL.len());
    }

    #[test]
    fn display_uses_storage_name() {
        assert_eq!(Collection::AlumniOfficers.to_string(), "alumni_officers");
    }
}
