//! HTTP mapping for domain errors.
//!
//! Domain errors become JSON bodies with a status derived from their
//! [`ErrorCode`]. Internal failures are logged in full and redacted for
//! clients. Extractor failures (bad JSON, query or path) are rewritten into
//! the same payload shape as `invalid_request`.

use actix_web::error::{JsonPayloadError, PathError, QueryPayloadError};
use actix_web::{HttpRequest, HttpResponse, ResponseError, http::StatusCode, web};
use serde_json::json;
use tracing::error;

use crate::domain::{Error, ErrorCode, TRACE_ID_HEADER};

/// Convenient result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, Error>;

const REDACTED_MESSAGE: &str = "Internal server error";

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::Forbidden => StatusCode::FORBIDDEN,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Conflict => StatusCode::CONFLICT,
        ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Client-facing copy of `error`.
fn client_payload(error: &Error) -> Error {
    if error.code() != ErrorCode::InternalError {
        return error.clone();
    }
    let redacted = Error::internal(REDACTED_MESSAGE);
    match error.trace_id() {
        Some(id) => redacted.with_trace_id(id),
        None => redacted,
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        if self.code() == ErrorCode::InternalError {
            error!(
                detail = self.message(),
                trace_id = self.trace_id().unwrap_or_default(),
                "internal error"
            );
        }
        let mut builder = HttpResponse::build(self.status_code());
        if let Some(id) = self.trace_id() {
            builder.insert_header((TRACE_ID_HEADER, id.to_owned()));
        }
        builder.json(client_payload(self))
    }
}

impl From<actix_web::Error> for Error {
    fn from(err: actix_web::Error) -> Self {
        error!(error = %err, "actix error promoted to domain error");
        Self::internal(REDACTED_MESSAGE)
    }
}

fn rejected_input(source: &'static str, detail: String) -> actix_web::Error {
    Error::invalid_request(format!("invalid {source}"))
        .with_details(json!({ "source": source, "reason": detail }))
        .into()
}

/// Extractor configuration so malformed input yields domain error bodies.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use backend::inbound::http::error::extractor_config;
///
/// let app = App::new().configure(extractor_config);
/// ```
pub fn extractor_config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .limit(JSON_LIMIT_BYTES)
            .error_handler(|err: JsonPayloadError, _req: &HttpRequest| {
                rejected_input("json body", err.to_string())
            }),
    )
    .app_data(
        web::QueryConfig::default().error_handler(|err: QueryPayloadError, _req: &HttpRequest| {
            rejected_input("query string", err.to_string())
        }),
    )
    .app_data(
        web::PathConfig::default().error_handler(|err: PathError, _req: &HttpRequest| {
            rejected_input("path", err.to_string())
        }),
    );
}

/// Upper bound for JSON bodies; inline images dominate the size.
pub const JSON_LIMIT_BYTES: usize = 4 * 1024 * 1024;
