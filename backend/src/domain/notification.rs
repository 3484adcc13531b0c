//! In-app notifications (`notifications` collection).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::record::{Collection, impl_record};

/// Stored notification. `audience` of `None` addresses every user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Uuid,
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub audience: Option<Uuid>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub read_by: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl_record!(Notification, Collection::Notifications);

impl Notification {
    /// Whether `user` should see this notification.
    #[must_use]
    pub fn is_visible_to(&self, user: Uuid) -> bool {
        self.audience.is_none_or(|audience| audience == user)
    }

    #[must_use]
    pub fn is_read_by(&self, user: Uuid) -> bool {
        self.read_by.contains(&user)
    }
}

/// Notification as seen by one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotificationView {
    pub id: Uuid,
    pub title: String,
    pub body: String,
    pub link: Option<String>,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

impl NotificationView {
    #[must_use]
    pub fn for_user(notification: &Notification, user: Uuid) -> Self {
        Self {
            id: notification.id,
            title: notification.title.clone(),
            body: notification.body.clone(),
            link: notification.link.clone(),
            read: notification.is_read_by(user),
            created_at: notification.created_at,
        }
    }
}

/// Admin-authored notification payload.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotificationDraft {
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub audience: Option<Uuid>,
    #[serde(default)]
    pub link: Option<String>,
}
