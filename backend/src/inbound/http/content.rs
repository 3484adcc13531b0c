//! Moderated content endpoints: events, gallery, jobs and donations.
//!
//! Every kind exposes the same surface, generated per kind so each handler
//! carries its own OpenAPI path:
//!
//! ```text
//! GET  /api/v1/{kind}            approved only, newest first
//! GET  /api/v1/{kind}/{id}       unapproved visible to admins and the submitter
//! POST /api/v1/{kind}            submit (signed in)
//! GET  /api/v1/admin/{kind}      everything not deleted
//! PUT  /api/v1/admin/{kind}/{id}
//! DELETE /api/v1/admin/{kind}/{id}
//! PUT  /api/v1/admin/{kind}/{id}/moderation {"status":"approved"}
//! ```

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ModerationStatus;

/// Body for the moderation endpoints.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct ModerationChange {
    pub status: ModerationStatus,
}

macro_rules! content_endpoints {
    (
        mod $module:ident for $entity:ident ($draft:ident) via $service:ident {
            tag: $tag:tt,
            public: [$list:tt, $item:tt],
            admin: [$admin_list:tt, $admin_item:tt, $moderation:tt],
            docs: [$list_doc:tt, $item_doc:tt, $admin_list_doc:tt, $admin_item_doc:tt, $moderation_doc:tt],
            operations: [$list_op:tt, $get_op:tt, $submit_op:tt, $admin_list_op:tt, $update_op:tt, $delete_op:tt, $moderate_op:tt] $(,)?
        }
    ) => {
        pub mod $module {
            use actix_web::{HttpResponse, delete, get, post, put, web};
            use uuid::Uuid;

            use super::ModerationChange;
            use crate::domain::{$draft, $entity, Error};
            use crate::inbound::http::ApiResult;
            use crate::inbound::http::session::SessionContext;
            use crate::inbound::http::state::HttpState;

            #[utoipa::path(
                get,
                path = $list_doc,
                responses((status = 200, description = "Approved entries, newest first", body = [$entity])),
                tags = [$tag],
                operation_id = $list_op,
                security([])
            )]
            #[get($list)]
            pub async fn list_published(
                state: web::Data<HttpState>,
            ) -> ApiResult<web::Json<Vec<$entity>>> {
                Ok(web::Json(state.$service.list_published().await?))
            }

            #[utoipa::path(
                get,
                path = $item_doc,
                params(("id" = Uuid, Path, description = "Entry id")),
                responses(
                    (status = 200, description = "Entry", body = $entity),
                    (status = 404, description = "Missing or not visible", body = Error)
                ),
                tags = [$tag],
                operation_id = $get_op,
                security([])
            )]
            #[get($item)]
            pub async fn show(
                state: web::Data<HttpState>,
                session: SessionContext,
                path: web::Path<Uuid>,
            ) -> ApiResult<web::Json<$entity>> {
                let entry = state
                    .$service
                    .get(path.into_inner(), session.submitter().await?)
                    .await?;
                Ok(web::Json(entry))
            }

            #[utoipa::path(
                post,
                path = $list_doc,
                request_body = $draft,
                responses(
                    (status = 201, description = "Submitted; approved immediately for admins", body = $entity),
                    (status = 400, description = "Invalid entry", body = Error),
                    (status = 401, description = "Login required", body = Error),
                    (status = 403, description = "Submissions of this kind are disabled", body = Error)
                ),
                tags = [$tag],
                operation_id = $submit_op
            )]
            #[post($list)]
            pub async fn submit(
                state: web::Data<HttpState>,
                session: SessionContext,
                payload: web::Json<$draft>,
            ) -> ApiResult<HttpResponse> {
                let submitter = session.require_user().await?;
                let entry = state
                    .$service
                    .submit(payload.into_inner(), submitter)
                    .await?;
                Ok(HttpResponse::Created().json(entry))
            }

            #[utoipa::path(
                get,
                path = $admin_list_doc,
                responses(
                    (status = 200, description = "All entries, newest first", body = [$entity]),
                    (status = 403, description = "Administrator access required", body = Error)
                ),
                tags = ["admin"],
                operation_id = $admin_list_op
            )]
            #[get($admin_list)]
            pub async fn list_all(
                state: web::Data<HttpState>,
                session: SessionContext,
            ) -> ApiResult<web::Json<Vec<$entity>>> {
                session.require_admin().await?;
                Ok(web::Json(state.$service.list_all().await?))
            }

            #[utoipa::path(
                put,
                path = $admin_item_doc,
                params(("id" = Uuid, Path, description = "Entry id")),
                request_body = $draft,
                responses(
                    (status = 200, description = "Updated", body = $entity),
                    (status = 400, description = "Invalid entry", body = Error),
                    (status = 404, description = "No such entry", body = Error)
                ),
                tags = ["admin"],
                operation_id = $update_op
            )]
            #[put($admin_item)]
            pub async fn update(
                state: web::Data<HttpState>,
                session: SessionContext,
                path: web::Path<Uuid>,
                payload: web::Json<$draft>,
            ) -> ApiResult<web::Json<$entity>> {
                session.require_admin().await?;
                let entry = state
                    .$service
                    .update(path.into_inner(), payload.into_inner())
                    .await?;
                Ok(web::Json(entry))
            }

            #[utoipa::path(
                delete,
                path = $admin_item_doc,
                params(("id" = Uuid, Path, description = "Entry id")),
                responses(
                    (status = 204, description = "Soft-deleted"),
                    (status = 404, description = "No such entry", body = Error)
                ),
                tags = ["admin"],
                operation_id = $delete_op
            )]
            #[delete($admin_item)]
            pub async fn remove(
                state: web::Data<HttpState>,
                session: SessionContext,
                path: web::Path<Uuid>,
            ) -> ApiResult<HttpResponse> {
                session.require_admin().await?;
                state.$service.delete(path.into_inner()).await?;
                Ok(HttpResponse::NoContent().finish())
            }

            #[utoipa::path(
                put,
                path = $moderation_doc,
                params(("id" = Uuid, Path, description = "Entry id")),
                request_body = ModerationChange,
                responses(
                    (status = 200, description = "New status applied", body = $entity),
                    (status = 404, description = "No such entry", body = Error)
                ),
                tags = ["admin"],
                operation_id = $moderate_op
            )]
            #[put($moderation)]
            pub async fn moderate(
                state: web::Data<HttpState>,
                session: SessionContext,
                path: web::Path<Uuid>,
                payload: web::Json<ModerationChange>,
            ) -> ApiResult<web::Json<$entity>> {
                session.require_admin().await?;
                let entry = state
                    .$service
                    .moderate(path.into_inner(), payload.status)
                    .await?;
                Ok(web::Json(entry))
            }

            /// Register this kind's handlers.
            pub fn configure(cfg: &mut web::ServiceConfig) {
                cfg.service(list_published)
                    .service(submit)
                    .service(show)
                    .service(list_all)
                    .service(moderate)
                    .service(update)
                    .service(remove);
            }
        }
    };
}

content_endpoints! {
    mod events for Event (EventDraft) via events {
        tag: "events",
        public: ["/events", "/events/{id}"],
        admin: ["/admin/events", "/admin/events/{id}", "/admin/events/{id}/moderation"],
        docs: [
            "/api/v1/events",
            "/api/v1/events/{id}",
            "/api/v1/admin/events",
            "/api/v1/admin/events/{id}",
            "/api/v1/admin/events/{id}/moderation"
        ],
        operations: [
            "listEvents", "getEvent", "submitEvent", "adminListEvents",
            "adminUpdateEvent", "adminDeleteEvent", "adminModerateEvent"
        ],
    }
}

content_endpoints! {
    mod gallery for GalleryPost (GalleryDraft) via gallery {
        tag: "gallery",
        public: ["/gallery", "/gallery/{id}"],
        admin: ["/admin/gallery", "/admin/gallery/{id}", "/admin/gallery/{id}/moderation"],
        docs: [
            "/api/v1/gallery",
            "/api/v1/gallery/{id}",
            "/api/v1/admin/gallery",
            "/api/v1/admin/gallery/{id}",
            "/api/v1/admin/gallery/{id}/moderation"
        ],
        operations: [
            "listGallery", "getGalleryPost", "submitGalleryPost", "adminListGallery",
            "adminUpdateGalleryPost", "adminDeleteGalleryPost", "adminModerateGalleryPost"
        ],
    }
}

content_endpoints! {
    mod jobs for JobPosting (JobDraft) via jobs {
        tag: "jobs",
        public: ["/jobs", "/jobs/{id}"],
        admin: ["/admin/jobs", "/admin/jobs/{id}", "/admin/jobs/{id}/moderation"],
        docs: [
            "/api/v1/jobs",
            "/api/v1/jobs/{id}",
            "/api/v1/admin/jobs",
            "/api/v1/admin/jobs/{id}",
            "/api/v1/admin/jobs/{id}/moderation"
        ],
        operations: [
            "listJobs", "getJob", "submitJob", "adminListJobs",
            "adminUpdateJob", "adminDeleteJob", "adminModerateJob"
        ],
    }
}

content_endpoints! {
    mod donations for Donation (DonationDraft) via donations {
        tag: "donations",
        public: ["/donations", "/donations/{id}"],
        admin: ["/admin/donations", "/admin/donations/{id}", "/admin/donations/{id}/moderation"],
        docs: [
            "/api/v1/donations",
            "/api/v1/donations/{id}",
            "/api/v1/admin/donations",
            "/api/v1/admin/donations/{id}",
            "/api/v1/admin/donations/{id}/moderation"
        ],
        operations: [
            "listDonations", "getDonation", "submitDonation", "adminListDonations",
            "adminUpdateDonation", "adminDeleteDonation", "adminModerateDonation"
        ],
    }
}
