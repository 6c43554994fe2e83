//! Driving port for the spreadsheet export.

use async_trait::async_trait;

use crate::domain::{DomainError, GeneratedArtifact};

/// Domain use-case port that writes the whole roster to a workbook.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RosterExport: Send + Sync {
    /// Produce a fresh workbook artifact holding a header row plus one row
    /// per user.
    async fn export_roster(&self) -> Result<GeneratedArtifact, DomainError>;
}
