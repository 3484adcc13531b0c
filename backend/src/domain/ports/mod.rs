//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (`DocumentStore`, `ChangeFeed`, `PasswordHasher`,
//! `EmailSender`) are implemented by outbound adapters. Driving ports
//! (`LoginService`, `ToastFeed`) are called by inbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod change_feed;
mod document_store;
mod email_sender;
mod login_service;
mod password_hasher;
mod toast_feed;

#[cfg(test)]
pub use change_feed::MockChangeFeed;
pub use change_feed::{ChangeFeed, CollectionChange};
#[cfg(test)]
pub use document_store::MockDocumentStore;
pub use document_store::{
    Document, DocumentQuery, DocumentStore, DocumentStoreError, FieldFilter,
};
#[cfg(test)]
pub use email_sender::MockEmailSender;
pub use email_sender::{EmailMessage, EmailSendError, EmailSender, EmailTemplate};
#[cfg(test)]
pub use login_service::MockLoginService;
pub use login_service::LoginService;
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHashError, PasswordHasher};
#[cfg(test)]
pub use toast_feed::{MockToastFeed, MockToastStream};
pub use toast_feed::{ToastFeed, ToastStream};
