//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL roster table via Diesel
//! - **files**: export directory on the local filesystem
//! - **xlsx**: roster workbook encoder
//! - **docx**: Word template renderer
//!
//! Adapters are thin translators between domain types and infrastructure
//! representations. They contain no business logic.

pub mod docx;
pub mod files;
pub mod persistence;
pub mod xlsx;

pub use docx::DocxTemplate;
pub use files::CapStdArtifactStore;
pub use xlsx::XlsxSpreadsheetEncoder;
