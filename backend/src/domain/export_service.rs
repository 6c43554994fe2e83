//! Spreadsheet export of the whole roster.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use crate::domain::artifact::run_blocking;
use crate::domain::ports::{
    ArtifactStore, ArtifactStoreError, RosterExport, SpreadsheetEncoder, SpreadsheetEncoderError,
    UserRepository,
};
use crate::domain::roster_service::map_user_persistence_error;
use crate::domain::{
    ArtifactName, EXCEL_EXTENSION, DomainError, GeneratedArtifact, RosterSheet, USERS_EXPORT_OBJECT,
};

pub(crate) fn map_store_error(error: ArtifactStoreError) -> DomainError {
    DomainError::internal(error.to_string())
}

fn map_encoder_error(error: SpreadsheetEncoderError) -> DomainError {
    DomainError::internal(error.to_string())
}

/// Export service implementing [`RosterExport`].
pub struct RosterExportService<R, E, A> {
    users: Arc<R>,
    encoder: Arc<E>,
    artifacts: Arc<A>,
    clock: Arc<dyn Clock>,
}

impl<R, E, A> RosterExportService<R, E, A> {
    /// Create the service from its repository, encoder, store and clock.
    #[must_use]
    pub const fn new(users: Arc<R>, encoder: Arc<E>, artifacts: Arc<A>, clock: Arc<dyn Clock>) -> Self {
        Self {
            users,
            encoder,
            artifacts,
            clock,
        }
    }
}

#[async_trait]
impl<R, E, A> RosterExport for RosterExportService<R, E, A>
where
    R: UserRepository,
    E: SpreadsheetEncoder + 'static,
    A: ArtifactStore + 'static,
{
    async fn export_roster(&self) -> Result<GeneratedArtifact, DomainError> {
        let users = self
            .users
            .list()
            .await
            .map_err(map_user_persistence_error)?;
        let sheet = RosterSheet::from_users(&users);
        let name = ArtifactName::for_export(USERS_EXPORT_OBJECT, EXCEL_EXTENSION, self.clock.utc());
        let encoder = Arc::clone(&self.encoder);
        let artifacts = Arc::clone(&self.artifacts);

        let artifact = run_blocking(move || {
            let bytes = encoder.encode(&sheet).map_err(map_encoder_error)?;
            let stored = artifacts.persist(&name, &bytes).map_err(map_store_error)?;
            let store: Arc<dyn ArtifactStore> = artifacts;
            Ok(GeneratedArtifact::leased(stored, store))
        })
        .await?;

        info!(artifact = %artifact.name(), rows = users.len() + 1, "roster exported");
        Ok(artifact)
    }
}
