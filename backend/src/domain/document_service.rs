//! Per-user document generation.
//!
//! The user's status gates generation: an `ungenerated` user gets one
//! rendered document and flips to `generated`; every later request is a
//! conflict. The status write happens only after the rendered file exists,
//! and a lost race on that write discards the file.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::domain::artifact::run_blocking;
use crate::domain::export_service::map_store_error;
use crate::domain::ports::{
    ArtifactStore, DocumentGeneration, DocumentTemplate, DocumentTemplateError, Placeholders,
    UserRepository,
};
use crate::domain::roster_service::{already_generated, map_user_persistence_error};
use crate::domain::{ArtifactName, DOCUMENT_EXTENSION, DomainError, GeneratedArtifact, User, UserId};

/// Placeholder filled with the user's name.
pub const NAME_PLACEHOLDER: &str = "name";
/// Placeholder filled with the user's email.
pub const EMAIL_PLACEHOLDER: &str = "email";

fn placeholders_for(user: &User) -> Placeholders {
    Placeholders::from([
        (NAME_PLACEHOLDER.to_owned(), user.name().to_string()),
        (EMAIL_PLACEHOLDER.to_owned(), user.email().to_string()),
    ])
}

fn map_template_error(error: DocumentTemplateError) -> DomainError {
    DomainError::internal(error.to_string())
}

/// Document service implementing [`DocumentGeneration`].
pub struct DocumentService<R, T, A> {
    users: Arc<R>,
    template: Arc<T>,
    artifacts: Arc<A>,
}

impl<R, T, A> DocumentService<R, T, A> {
    /// Create the service from its repository, template and store.
    #[must_use]
    pub const fn new(users: Arc<R>, template: Arc<T>, artifacts: Arc<A>) -> Self {
        Self {
            users,
            template,
            artifacts,
        }
    }
}

#[async_trait]
impl<R, T, A> DocumentGeneration for DocumentService<R, T, A>
where
    R: UserRepository,
    T: DocumentTemplate + 'static,
    A: ArtifactStore + 'static,
{
    async fn generate_document(&self, id: &UserId) -> Result<GeneratedArtifact, DomainError> {
        let user = self
            .users
            .find_by_id(id)
            .await
            .map_err(map_user_persistence_error)?
            .ok_or_else(|| DomainError::not_found(format!("user {id} not found")))?;

        if !user.is_ungenerated() {
            return Err(already_generated(&id.to_string()));
        }

        let placeholders = placeholders_for(&user);
        let name = ArtifactName::for_document(user.name(), DOCUMENT_EXTENSION);
        let template = Arc::clone(&self.template);
        let artifacts = Arc::clone(&self.artifacts);

        let artifact = run_blocking(move || {
            let rendered = template
                .render(&placeholders)
                .map_err(map_template_error)?;
            let stored = artifacts
                .persist(&name, &rendered)
                .map_err(map_store_error)?;
            let store: Arc<dyn ArtifactStore> = artifacts;
            Ok(GeneratedArtifact::leased(stored, store))
        })
        .await?;

        if let Err(error) = self.users.mark_generated(id).await {
            warn!(user_id = %id, artifact = %artifact.name(), %error, "discarding document after status update failed");
            drop(artifact);
            return Err(map_user_persistence_error(error));
        }

        info!(user_id = %id, artifact = %artifact.name(), "document generated");
        Ok(artifact)
    }
}

#[cfg(test)]
#[path = "document_service_tests.rs"]
mod tests;
