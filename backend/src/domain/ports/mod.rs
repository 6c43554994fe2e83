//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod artifact_store;
mod document_generation;
mod document_template;
mod roster_command;
mod roster_export;
mod roster_query;
mod spreadsheet_encoder;
mod user_repository;

#[cfg(test)]
pub use artifact_store::MockArtifactStore;
pub use artifact_store::{ArtifactStore, ArtifactStoreError};
pub use document_generation::DocumentGeneration;
#[cfg(test)]
pub use document_generation::MockDocumentGeneration;
#[cfg(test)]
pub use document_template::MockDocumentTemplate;
pub use document_template::{DocumentTemplate, DocumentTemplateError, Placeholders};
#[cfg(test)]
pub use roster_command::MockRosterCommand;
pub use roster_command::RosterCommand;
#[cfg(test)]
pub use roster_export::MockRosterExport;
pub use roster_export::RosterExport;
#[cfg(test)]
pub use roster_query::MockRosterQuery;
pub use roster_query::RosterQuery;
#[cfg(test)]
pub use spreadsheet_encoder::MockSpreadsheetEncoder;
pub use spreadsheet_encoder::{SpreadsheetEncoder, SpreadsheetEncoderError};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository};
