//! Generated artifacts: naming policy, read handles and the removal lease.
//!
//! An artifact is a transient file in the export directory. Every export or
//! document generation produces a fresh one under its own [`ArtifactKey`],
//! and the [`ArtifactLease`] it carries removes that file exactly once:
//! explicitly after delivery, or on drop when the artifact is abandoned.
//! Two requests that share an [`ArtifactName`] never touch each other's file.

use std::fmt;
use std::io::{Read, Seek};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Datelike, Timelike, Utc};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::domain::ports::{ArtifactStore, ArtifactStoreError};
use crate::domain::{DomainError, TraceId, UserName};

/// Spreadsheet extension used for roster exports.
pub const EXCEL_EXTENSION: &str = "xlsx";
/// Extension of rendered user documents.
pub const DOCUMENT_EXTENSION: &str = "docx";
/// Object label used in roster export file names.
pub const USERS_EXPORT_OBJECT: &str = "users";

/// Readable, seekable handle onto an artifact's bytes.
///
/// The handle is closed when dropped.
pub trait ArtifactReader: Read + Seek + Send {}

impl<T> ArtifactReader for T where T: Read + Seek + Send {}

/// File name of a generated artifact, relative to the export directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArtifactName(String);

impl ArtifactName {
    /// Name an export of `object` taken at `now`.
    ///
    /// Format: `export_<object>_<D>-<M>-<YYYY>_<H>:<MI>.<ext>`, unpadded and
    /// at minute granularity, so two exports in the same minute share a name.
    ///
    /// # Examples
    /// ```
    /// use chrono::{TimeZone, Utc};
    /// use roster::domain::ArtifactName;
    ///
    /// let now = Utc.with_ymd_and_hms(2026, 3, 4, 9, 5, 59).unwrap();
    /// let name = ArtifactName::for_export("users", "xlsx", now);
    /// assert_eq!(name.as_str(), "export_users_4-3-2026_9:5.xlsx");
    /// ```
    #[must_use]
    pub fn for_export(object: &str, extension: &str, now: DateTime<Utc>) -> Self {
        Self(format!(
            "export_{object}_{}-{}-{}_{}:{}.{extension}",
            now.day(),
            now.month(),
            now.year(),
            now.hour(),
            now.minute(),
        ))
    }

    /// Name the rendered document for a user: `document_<name>.<ext>`.
    ///
    /// Path separators in the user name are replaced with `_` so the name
    /// always denotes a single file in the export directory.
    #[must_use]
    pub fn for_document(user_name: &UserName, extension: &str) -> Self {
        let stem: String = user_name
            .as_ref()
            .chars()
            .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
            .collect();
        Self(format!("document_{stem}.{extension}"))
    }

    /// Borrow the file name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for ArtifactName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for ArtifactName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// On-disk file name owned by exactly one request.
///
/// Formed as `<token>_<name>` where the token is a fresh UUID, so concurrent
/// exports in the same minute, or racing generations for one user, write
/// and remove distinct files. The [`ArtifactName`] is what the client sees.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArtifactKey(String);

impl ArtifactKey {
    /// Mint a key for a new file carrying `name`.
    #[must_use]
    pub fn unique(name: &ArtifactName) -> Self {
        Self(format!("{}_{name}", Uuid::new_v4().simple()))
    }

    /// Borrow the on-disk file name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for ArtifactKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Artifact as persisted by an [`ArtifactStore`], before a lease is attached.
pub struct StoredArtifact {
    /// Name presented to the client.
    pub name: ArtifactName,
    /// File name inside the export directory.
    pub key: ArtifactKey,
    /// Full path of the file.
    pub path: PathBuf,
    /// Open read handle.
    pub reader: Box<dyn ArtifactReader>,
}

impl fmt::Debug for StoredArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoredArtifact")
            .field("name", &self.name)
            .field("key", &self.key)
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

/// Guarantees an artifact is removed from its store exactly once.
pub struct ArtifactLease {
    store: Arc<dyn ArtifactStore>,
    key: Option<ArtifactKey>,
}

impl ArtifactLease {
    /// Take responsibility for removing the file `key` from `store`.
    #[must_use]
    pub const fn new(store: Arc<dyn ArtifactStore>, key: ArtifactKey) -> Self {
        Self {
            store,
            key: Some(key),
        }
    }

    /// Remove the artifact now and report the outcome.
    ///
    /// # Errors
    /// Returns the store's removal error; the lease is spent either way.
    pub fn release(mut self) -> Result<(), ArtifactStoreError> {
        self.key.take().map_or(Ok(()), |key| {
            debug!(artifact = %key, "removing delivered artifact");
            self.store.remove(&key)
        })
    }
}

impl Drop for ArtifactLease {
    fn drop(&mut self) {
        if let Some(key) = self.key.take() {
            match self.store.remove(&key) {
                Ok(()) => debug!(artifact = %key, "removed abandoned artifact"),
                Err(error) => warn!(artifact = %key, %error, "failed to remove abandoned artifact"),
            }
        }
    }
}

/// Output of the export and document generators.
///
/// Dropping it without delivery removes the file.
pub struct GeneratedArtifact {
    pub(crate) name: ArtifactName,
    pub(crate) path: PathBuf,
    pub(crate) reader: Box<dyn ArtifactReader>,
    pub(crate) lease: ArtifactLease,
}

impl GeneratedArtifact {
    /// Attach a removal lease to a freshly stored artifact.
    #[must_use]
    pub fn leased(stored: StoredArtifact, store: Arc<dyn ArtifactStore>) -> Self {
        let StoredArtifact {
            name,
            key,
            path,
            reader,
        } = stored;
        let lease = ArtifactLease::new(store, key);
        Self {
            name,
            path,
            reader,
            lease,
        }
    }

    /// Name presented to the client.
    #[must_use]
    pub const fn name(&self) -> &ArtifactName {
        &self.name
    }

    /// Full path of the file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Mutable access to the open read handle.
    pub fn reader_mut(&mut self) -> &mut dyn ArtifactReader {
        self.reader.as_mut()
    }
}

impl fmt::Debug for GeneratedArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeneratedArtifact")
            .field("name", &self.name)
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

/// Run blocking artifact work on the blocking pool, keeping the trace id.
pub(crate) async fn run_blocking<F, T>(work: F) -> Result<T, DomainError>
where
    F: FnOnce() -> Result<T, DomainError> + Send + 'static,
    T: Send + 'static,
{
    let trace_id = TraceId::current();
    tokio::task::spawn_blocking(move || TraceId::sync_scope(trace_id, work))
        .await
        .map_err(|err| DomainError::internal(format!("artifact worker failed: {err}")))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::MockArtifactStore;
    use chrono::TimeZone;
    use rstest::rstest;
    use std::io::Cursor;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 30)
            .single()
            .expect("valid timestamp")
    }

    #[rstest]
    #[case(at(2026, 3, 4, 9, 5), "export_users_4-3-2026_9:5.xlsx")]
    #[case(at(2025, 12, 31, 23, 59), "export_users_31-12-2025_23:59.xlsx")]
    fn export_names_use_minute_granularity(#[case] now: DateTime<Utc>, #[case] expected: &str) {
        let name = ArtifactName::for_export(USERS_EXPORT_OBJECT, EXCEL_EXTENSION, now);
        assert_eq!(name.as_str(), expected);
    }

    #[rstest]
    #[case("Ana", "document_Ana.docx")]
    #[case("Ana Maria", "document_Ana Maria.docx")]
    #[case("../etc/passwd", "document_.._etc_passwd.docx")]
    #[case("a\\b", "document_a_b.docx")]
    fn document_names_derive_from_user_name(#[case] raw: &str, #[case] expected: &str) {
        let name = UserName::new(raw).expect("valid name");
        assert_eq!(
            ArtifactName::for_document(&name, DOCUMENT_EXTENSION).as_str(),
            expected
        );
    }

    fn key(raw: &str) -> ArtifactKey {
        ArtifactKey(raw.to_owned())
    }

    fn stored(name: &str, file: &str) -> StoredArtifact {
        StoredArtifact {
            name: ArtifactName(name.to_owned()),
            key: key(file),
            path: PathBuf::from("/exports").join(file),
            reader: Box::new(Cursor::new(b"bytes".to_vec())),
        }
    }

    #[rstest]
    fn keys_keep_the_name_but_never_repeat() {
        let name = ArtifactName("document_Ana.docx".to_owned());

        let first = ArtifactKey::unique(&name);
        let second = ArtifactKey::unique(&name);

        assert_ne!(first, second);
        assert!(first.as_str().ends_with("_document_Ana.docx"));
        assert!(!first.as_str().contains('/'));
    }

    #[rstest]
    fn dropping_an_artifact_removes_its_own_file_once() {
        let mut store = MockArtifactStore::new();
        store
            .expect_remove()
            .withf(|key| key.as_str() == "a1_document_Ana.docx")
            .times(1)
            .returning(|_| Ok(()));

        let artifact = GeneratedArtifact::leased(
            stored("document_Ana.docx", "a1_document_Ana.docx"),
            Arc::new(store),
        );
        assert_eq!(artifact.name().as_str(), "document_Ana.docx");
        drop(artifact);
    }

    #[rstest]
    fn released_lease_does_not_remove_again() {
        let mut store = MockArtifactStore::new();
        store.expect_remove().times(1).returning(|_| Ok(()));
        let store: Arc<dyn ArtifactStore> = Arc::new(store);

        let lease = ArtifactLease::new(store, key("a1_a.xlsx"));
        lease.release().expect("removal succeeds");
    }

    #[rstest]
    fn release_reports_removal_failures() {
        let mut store = MockArtifactStore::new();
        store
            .expect_remove()
            .times(1)
            .returning(|file| Err(ArtifactStoreError::remove(file.as_str(), "busy")));
        let store: Arc<dyn ArtifactStore> = Arc::new(store);

        let lease = ArtifactLease::new(store, key("a1_a.xlsx"));
        let err = lease.release().expect_err("removal fails");
        assert!(err.to_string().contains("busy"));
    }

    #[tokio::test]
    async fn run_blocking_propagates_results() {
        let value = run_blocking(|| Ok::<_, DomainError>(7)).await.expect("value");
        assert_eq!(value, 7);

        let err = run_blocking(|| Err::<(), _>(DomainError::conflict("nope")))
            .await
            .expect_err("error");
        assert_eq!(err.code(), crate::domain::ErrorCode::Conflict);
    }
}
