//! Wire-level payloads sent to WebSocket clients.

use serde::Serialize;
use uuid::Uuid;

use crate::domain::{Toast, ToastKind};

/// Frame announcing newly published content.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename = "toast", rename_all = "camelCase")]
pub struct ToastMessage {
    pub kind: ToastKind,
    pub id: Uuid,
    pub message: String,
}

impl From<Toast> for ToastMessage {
    fn from(value: Toast) -> Self {
        Self {
            kind: value.kind,
            id: value.id,
            message: value.message,
        }
    }
}
