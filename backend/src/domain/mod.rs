//! Domain primitives, ports and services for the users roster.
//!
//! Purpose: Define strongly typed domain entities used by the HTTP and
//! persistence layers, the ports adapters implement, and the services that
//! drive them. Keep types immutable and document invariants and
//! serialisation contracts (serde) in each type's Rustdoc.
//!
//! Public surface:
//! - DomainError (alias to `error::DomainError`): API error response payload.
//! - ErrorCode (alias to `error::ErrorCode`): stable error identifier.
//! - User (alias to `user::User`): roster member and document status.
//! - GeneratedArtifact (alias to `artifact::GeneratedArtifact`): leased
//!   export or document file awaiting delivery.

pub mod artifact;
pub mod delivery;
pub mod document_service;
pub mod error;
pub mod export_service;
pub mod ports;
pub mod roster_service;
pub mod roster_sheet;
pub mod trace_id;
pub mod user;

#[cfg(test)]
pub(crate) mod fixtures;

pub use self::artifact::{
    ArtifactKey, ArtifactLease, ArtifactName, ArtifactReader, DOCUMENT_EXTENSION, EXCEL_EXTENSION,
    GeneratedArtifact, StoredArtifact, USERS_EXPORT_OBJECT,
};
pub use self::delivery::{ArtifactSink, Delivered, DeliveryError, deliver};
pub use self::document_service::{DocumentService, EMAIL_PLACEHOLDER, NAME_PLACEHOLDER};
pub use self::error::{DomainError, DomainErrorValidationError, ErrorCode};
pub use self::export_service::RosterExportService;
pub use self::roster_service::{ALREADY_GENERATED_MESSAGE, RosterService};
pub use self::roster_sheet::{ROSTER_HEADER, ROSTER_SHEET_NAME, RosterRow, RosterSheet};
pub use self::trace_id::TraceId;
pub use self::user::{Email, NewUser, User, UserId, UserName, UserStatus, UserValidationError};

/// HTTP header name used to propagate trace identifiers.
pub const TRACE_ID_HEADER: &str = "trace-id";

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use roster::domain::{ApiResult, DomainError};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(DomainError::not_found("no such user"))
/// }
/// ```
pub type ApiResult<T> = Result<T, DomainError>;
