//! Export directory adapter built on `cap_std`.
//!
//! Every operation opens the configured directory as a capability and works
//! relative to it, so an artifact name can never reach a file outside it.
//! Each write goes to a fresh [`ArtifactKey`] and refuses to replace an
//! existing file.

use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};

use cap_std::ambient_authority;
use cap_std::fs::{Dir, OpenOptions};
use tracing::debug;

use crate::domain::ports::{ArtifactStore, ArtifactStoreError};
use crate::domain::{ArtifactKey, ArtifactName, StoredArtifact};

/// [`ArtifactStore`] writing into a directory on the local filesystem.
#[derive(Debug, Clone)]
pub struct CapStdArtifactStore {
    root: PathBuf,
}

impl CapStdArtifactStore {
    /// Store artifacts under `root`. The directory is created on first write.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory holding the artifacts.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn open_root(&self) -> io::Result<Dir> {
        Dir::open_ambient_dir(&self.root, ambient_authority())
    }
}

/// Accept only names denoting a single entry directly inside the root.
fn single_file(name: &str) -> Result<&Path, String> {
    let path = Path::new(name);
    let mut components = path.components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(path),
        _ => Err("artifact name must denote a single file".to_owned()),
    }
}

fn write_new(dir: &Dir, relative: &Path, contents: &[u8]) -> io::Result<()> {
    let mut file = dir.open_with(relative, OpenOptions::new().write(true).create_new(true))?;
    file.write_all(contents)?;
    file.sync_all()
}

impl ArtifactStore for CapStdArtifactStore {
    fn persist(
        &self,
        name: &ArtifactName,
        contents: &[u8],
    ) -> Result<StoredArtifact, ArtifactStoreError> {
        let key = ArtifactKey::unique(name);
        let relative = single_file(key.as_str())
            .map_err(|message| ArtifactStoreError::write(key.as_str(), message))?;

        Dir::create_ambient_dir_all(&self.root, ambient_authority()).map_err(|err| {
            ArtifactStoreError::directory(format!("{}: {err}", self.root.display()))
        })?;
        let dir = self.open_root().map_err(|err| {
            ArtifactStoreError::directory(format!("{}: {err}", self.root.display()))
        })?;

        write_new(&dir, relative, contents)
            .map_err(|err| ArtifactStoreError::write(key.as_str(), err.to_string()))?;
        let reader = dir
            .open(relative)
            .map_err(|err| ArtifactStoreError::open(key.as_str(), err.to_string()))?;

        debug!(artifact = %name, file = %key, bytes = contents.len(), "artifact written");
        Ok(StoredArtifact {
            name: name.clone(),
            path: self.root.join(relative),
            key,
            reader: Box::new(reader),
        })
    }

    fn remove(&self, key: &ArtifactKey) -> Result<(), ArtifactStoreError> {
        let relative = single_file(key.as_str())
            .map_err(|message| ArtifactStoreError::remove(key.as_str(), message))?;
        let dir = self
            .open_root()
            .map_err(|err| ArtifactStoreError::remove(key.as_str(), err.to_string()))?;
        dir.remove_file(relative)
            .map_err(|err| ArtifactStoreError::remove(key.as_str(), err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Read;
    use std::sync::Arc;

    use chrono::DateTime;
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    use super::*;
    use crate::domain::{GeneratedArtifact, UserName};

    #[fixture]
    fn temp() -> TempDir {
        TempDir::new().expect("temp dir")
    }

    fn export_name() -> ArtifactName {
        ArtifactName::for_export("users", "xlsx", DateTime::UNIX_EPOCH)
    }

    fn root_dir(temp: &TempDir) -> Dir {
        Dir::open_ambient_dir(temp.path(), ambient_authority()).expect("open temp dir")
    }

    fn read_all(stored: &mut StoredArtifact) -> Vec<u8> {
        let mut bytes = Vec::new();
        stored.reader.read_to_end(&mut bytes).expect("read back");
        bytes
    }

    #[rstest]
    fn persist_creates_the_directory_and_reopens_the_file(temp: TempDir) {
        let root = temp.path().join("exports").join("nested");
        let store = CapStdArtifactStore::new(&root);

        let mut stored = store
            .persist(&export_name(), b"workbook")
            .expect("persist succeeds");

        assert_eq!(stored.name, export_name());
        assert_eq!(stored.path, root.join(stored.key.as_str()));
        assert!(stored.key.as_str().ends_with(export_name().as_str()));
        assert_eq!(read_all(&mut stored), b"workbook");
    }

    #[rstest]
    fn same_name_writes_keep_separate_files(temp: TempDir) {
        let store = CapStdArtifactStore::new(temp.path());
        let mut first = store.persist(&export_name(), b"first").expect("first write");
        let mut second = store.persist(&export_name(), b"second").expect("second write");

        assert_ne!(first.key, second.key);
        assert_eq!(read_all(&mut first), b"first");
        assert_eq!(read_all(&mut second), b"second");

        let second_key = second.key.clone();
        drop(second);
        store.remove(&second_key).expect("second removed");
        assert!(root_dir(&temp).exists(first.key.as_str()));
    }

    #[rstest]
    fn remove_deletes_the_file(temp: TempDir) {
        let store = CapStdArtifactStore::new(temp.path());
        let stored = store.persist(&export_name(), b"x").expect("persist");
        let key = stored.key.clone();
        drop(stored);

        store.remove(&key).expect("remove succeeds");

        assert!(!root_dir(&temp).exists(key.as_str()));
    }

    #[rstest]
    fn removing_a_missing_file_is_an_error(temp: TempDir) {
        let store = CapStdArtifactStore::new(temp.path());
        let err = store
            .remove(&ArtifactKey::unique(&export_name()))
            .expect_err("nothing to remove");
        assert!(matches!(err, ArtifactStoreError::Remove { .. }));
    }

    #[rstest]
    #[case("../escape.docx")]
    #[case("nested/file.docx")]
    #[case("/etc/passwd")]
    #[case("..")]
    #[case("")]
    fn only_plain_file_names_are_accepted(#[case] name: &str) {
        assert!(single_file(name).is_err());
    }

    #[rstest]
    fn document_names_stay_inside_the_directory(temp: TempDir) {
        let store = CapStdArtifactStore::new(temp.path().join("exports"));
        let name = ArtifactName::for_document(&UserName::new("../x").expect("name"), "docx");

        let stored = store.persist(&name, b"doc").expect("plain name persists");

        assert!(root_dir(&temp).exists(Path::new("exports").join(stored.key.as_str())));
    }

    #[rstest]
    fn dropping_a_leased_artifact_removes_it_from_disk(temp: TempDir) {
        let store = Arc::new(CapStdArtifactStore::new(temp.path()));
        let stored = store.persist(&export_name(), b"x").expect("persist");
        let key = stored.key.clone();
        let artifact = GeneratedArtifact::leased(stored, store.clone());
        assert!(root_dir(&temp).exists(key.as_str()));

        drop(artifact);

        assert!(!root_dir(&temp).exists(key.as_str()));
    }
}
