//! Port for the directory that holds transient export and document files.

use crate::domain::{ArtifactKey, ArtifactName, StoredArtifact};

use super::define_port_error;

define_port_error! {
    /// Errors raised by artifact store adapters.
    pub enum ArtifactStoreError {
        /// The export directory could not be created or opened.
        Directory { message: String } => "could not prepare export directory: {message}",
        /// The artifact bytes could not be written.
        Write { name: String, message: String } => "could not save generated file {name}: {message}",
        /// The written artifact could not be reopened for reading.
        Open { name: String, message: String } => "could not read generated file {name}: {message}",
        /// The artifact could not be deleted.
        Remove { name: String, message: String } => "could not remove generated file {name}: {message}",
    }
}

/// Blocking file store for generated artifacts.
///
/// Callers run these methods on the blocking pool.
#[cfg_attr(test, mockall::automock)]
pub trait ArtifactStore: Send + Sync {
    /// Write `contents` to a fresh file carrying `name` and reopen it for
    /// reading.
    ///
    /// The returned [`StoredArtifact::key`] is unique to this call, so no
    /// other caller can overwrite or remove the file.
    fn persist(&self, name: &ArtifactName, contents: &[u8])
    -> Result<StoredArtifact, ArtifactStoreError>;

    /// Delete the file `key`.
    fn remove(&self, key: &ArtifactKey) -> Result<(), ArtifactStoreError>;
}
