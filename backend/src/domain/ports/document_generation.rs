//! Driving port for per-user document generation.

use async_trait::async_trait;

use crate::domain::{DomainError, GeneratedArtifact, UserId};

/// Domain use-case port that renders a user's document once.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentGeneration: Send + Sync {
    /// Render the template for `id` and mark the user `generated`.
    ///
    /// A user whose status is already `generated` yields
    /// [`crate::domain::ErrorCode::Conflict`] and nothing is written.
    async fn generate_document(&self, id: &UserId) -> Result<GeneratedArtifact, DomainError>;
}
