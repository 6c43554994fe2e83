//! Test helpers for inbound HTTP components.

use std::collections::HashMap;
use std::io::Cursor;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::domain::ports::{
    ArtifactStore, ArtifactStoreError, MockDocumentGeneration, MockRosterCommand,
    MockRosterExport, MockRosterQuery,
};
use crate::domain::{ArtifactKey, ArtifactName, GeneratedArtifact, StoredArtifact};
use crate::inbound::http::state::{HttpState, HttpStatePorts};
use crate::inbound::http::views::PageTemplates;

/// List page source with a nav link and the rows marker.
pub const LIST_SOURCE: &str =
    "<h1>Users</h1><a href=\"/users/export-data\">Export users</a><table>{{rows}}</table>";
/// Create page source.
pub const CREATE_SOURCE: &str =
    r#"<form method="post" action="/users/create"><input name="name"><input name="email"></form>"#;

/// Page templates built from [`LIST_SOURCE`] and [`CREATE_SOURCE`].
#[must_use]
pub fn pages() -> PageTemplates {
    PageTemplates::new(LIST_SOURCE, CREATE_SOURCE).expect("valid pages")
}

/// Artifact store keeping files in memory.
#[derive(Debug, Default)]
pub struct InMemoryArtifactStore {
    files: Mutex<HashMap<String, Vec<u8>>>,
}

impl InMemoryArtifactStore {
    /// Whether every stored file has been removed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.lock().expect("store lock").is_empty()
    }

    /// Store `bytes` under `name` and hand back a leased artifact.
    #[must_use]
    pub fn leased(self: &Arc<Self>, name: &ArtifactName, bytes: &[u8]) -> GeneratedArtifact {
        let stored = self.persist(name, bytes).expect("in-memory persist");
        let store: Arc<dyn ArtifactStore> = self.clone();
        GeneratedArtifact::leased(stored, store)
    }
}

impl ArtifactStore for InMemoryArtifactStore {
    fn persist(
        &self,
        name: &ArtifactName,
        contents: &[u8],
    ) -> Result<StoredArtifact, ArtifactStoreError> {
        let key = ArtifactKey::unique(name);
        self.files
            .lock()
            .expect("store lock")
            .insert(key.to_string(), contents.to_vec());
        Ok(StoredArtifact {
            name: name.clone(),
            path: PathBuf::from("/memory").join(key.as_str()),
            key,
            reader: Box::new(Cursor::new(contents.to_vec())),
        })
    }

    fn remove(&self, key: &ArtifactKey) -> Result<(), ArtifactStoreError> {
        self.files
            .lock()
            .expect("store lock")
            .remove(key.as_str())
            .map(|_| ())
            .ok_or_else(|| ArtifactStoreError::remove(key.as_str(), "no such file"))
    }
}

/// Mocked ports for handler tests; unset expectations panic when hit.
#[derive(Default)]
pub struct TestPorts {
    /// Create-user port.
    pub roster: MockRosterCommand,
    /// List-users port.
    pub roster_query: MockRosterQuery,
    /// Workbook export port.
    pub export: MockRosterExport,
    /// Document generation port.
    pub documents: MockDocumentGeneration,
}

impl TestPorts {
    /// Freeze the mocks into handler state.
    #[must_use]
    pub fn into_state(self) -> HttpState {
        HttpState::new(HttpStatePorts {
            roster: Arc::new(self.roster),
            roster_query: Arc::new(self.roster_query),
            export: Arc::new(self.export),
            documents: Arc::new(self.documents),
        })
    }
}
