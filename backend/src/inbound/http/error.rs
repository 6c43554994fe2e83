//! JSON error envelopes for the roster routes.
//!
//! Every failure leaves as `{code, message, traceId?, details?}` with the
//! `trace-id` header echoed and caching disabled, so a browser never replays
//! a stale 409 for a document link. Internal failures are logged in full and
//! answered with a fixed message; store outages carry `Retry-After`.

use actix_web::error::{BlockingError, UrlencodedError};
use actix_web::http::{StatusCode, header};
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use tracing::{error, warn};

use crate::domain::{DomainError, ErrorCode, TRACE_ID_HEADER};

pub use crate::domain::ApiResult;

/// Message sent in place of any internal failure.
pub const REDACTED_MESSAGE: &str = "Internal server error";

/// Seconds a client should wait before retrying after a store outage.
pub const STORE_RETRY_AFTER_SECS: u32 = 5;

const fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Conflict => StatusCode::CONFLICT,
        ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Body actually sent to the client.
fn public_view(err: &DomainError) -> DomainError {
    match err.code() {
        ErrorCode::InternalError => {
            error!(message = err.message(), trace_id = err.trace_id(), "roster request failed");
            let mut redacted = DomainError::internal(REDACTED_MESSAGE);
            if let Some(id) = err.trace_id() {
                redacted = redacted.with_trace_id(id.to_owned());
            }
            redacted
        }
        ErrorCode::ServiceUnavailable => {
            warn!(message = err.message(), trace_id = err.trace_id(), "user store unavailable");
            err.clone()
        }
        ErrorCode::InvalidRequest | ErrorCode::NotFound | ErrorCode::Conflict => err.clone(),
    }
}

impl ResponseError for DomainError {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        let mut builder = HttpResponse::build(self.status_code());
        builder.insert_header((header::CACHE_CONTROL, "no-store"));
        if let Some(id) = self.trace_id() {
            builder.insert_header((TRACE_ID_HEADER, id.to_owned()));
        }
        if self.code() == ErrorCode::ServiceUnavailable {
            builder.insert_header((header::RETRY_AFTER, STORE_RETRY_AFTER_SECS.to_string()));
        }
        builder.json(public_view(self))
    }
}

impl From<BlockingError> for DomainError {
    fn from(err: BlockingError) -> Self {
        Self::internal(format!("file worker did not finish: {err}"))
    }
}

/// Answer unreadable `POST /users/create` bodies with the JSON envelope
/// instead of Actix's plain-text 400.
#[must_use]
pub fn form_error(err: &UrlencodedError) -> actix_web::Error {
    DomainError::invalid_request(format!("form body could not be read: {err}"))
        .with_details(json!({ "code": "invalid_form" }))
        .into()
}
