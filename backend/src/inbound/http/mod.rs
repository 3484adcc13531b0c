//! HTTP inbound adapter exposing the REST API under `/api/v1`.

pub mod alumni;
pub mod auth;
pub mod content;
pub mod error;
pub mod health;
pub mod notifications;
pub mod officers;
pub mod session;
pub mod session_config;
pub mod site;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod users;

use actix_web::web;

pub use error::ApiResult;

/// Register every `/api/v1` handler on `cfg`.
///
/// Literal segments are registered before `{id}` captures that share a
/// prefix.
///
/// # Examples
/// ```
/// use actix_web::{App, web};
/// use backend::inbound::http::configure_api;
///
/// let app = App::new().service(web::scope("/api/v1").configure(configure_api));
/// ```
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.configure(error::extractor_config)
        .service(auth::login)
        .service(auth::logout)
        .service(auth::request_password_reset)
        .service(auth::confirm_password_reset)
        .service(users::list_users)
        .service(users::current_user)
        .service(users::update_current_user)
        .service(users::change_password)
        .service(users::get_user)
        .service(users::follow_user)
        .service(users::unfollow_user)
        .service(users::admin_list_users)
        .service(users::admin_delete_user)
        .service(users::admin_set_role)
        .service(alumni::list_alumni)
        .service(alumni::create_alumni)
        .service(alumni::import_alumni)
        .service(alumni::get_alumni)
        .service(alumni::update_alumni)
        .service(alumni::delete_alumni)
        .service(alumni::link_alumni)
        .service(officers::list_officers)
        .service(officers::admin_list_officers)
        .service(officers::create_officer)
        .service(officers::update_officer)
        .service(officers::delete_officer)
        .configure(content::events::configure)
        .configure(content::gallery::configure)
        .configure(content::jobs::configure)
        .configure(content::donations::configure)
        .service(notifications::list_notifications)
        .service(notifications::mark_read)
        .service(notifications::create_notification)
        .service(notifications::delete_notification)
        .service(site::get_landing)
        .service(site::replace_landing)
        .service(site::get_settings)
        .service(site::replace_settings)
        .service(site::submit_contact)
        .service(site::list_contact_messages)
        .service(site::mark_contact_handled)
        .service(site::delete_contact_message);
}
