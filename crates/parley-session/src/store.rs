//! Local persistence of the credential pair.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use tracing::debug;

use crate::credentials::CredentialPair;
use crate::error::StorageError;
use crate::manager::lock;

/// Client-local storage for the credential pair. Synchronous: storage is
/// local and never a suspension point.
pub trait TokenStore: Send + Sync {
    /// The stored pair, or the empty pair when nothing is stored.
    fn load(&self) -> Result<CredentialPair, StorageError>;

    fn persist(&self, pair: &CredentialPair) -> Result<(), StorageError>;

    fn clear(&self) -> Result<(), StorageError>;
}

/// Stores the pair as a JSON object with `access_token` and
/// `refresh_token` keys. Tokens are written unencrypted; the file is
/// created owner-only on unix.
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StorageError {
        StorageError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<CredentialPair, StorageError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(CredentialPair::empty()),
            Err(e) => return Err(self.io_error(e)),
        };
        if content.trim().is_empty() {
            return Ok(CredentialPair::empty());
        }
        serde_json::from_str(&content).map_err(|e| StorageError::Corrupt(e.to_string()))
    }

    fn persist(&self, pair: &CredentialPair) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        let json =
            serde_json::to_string_pretty(pair).map_err(|e| StorageError::Corrupt(e.to_string()))?;

        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json).map_err(|e| self.io_error(e))?;
        restrict_permissions(&tmp).map_err(|e| self.io_error(e))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| self.io_error(e))?;

        debug!(path = %self.path.display(), "persisted credentials");
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                debug!(path = %self.path.display(), "removed stored credentials");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_error(e)),
        }
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

/// In-process store, for tests and runs that must not touch disk.
#[derive(Default)]
pub struct MemoryTokenStore {
    pair: Mutex<CredentialPair>,
    writes: AtomicUsize,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pair(pair: CredentialPair) -> Self {
        Self {
            pair: Mutex::new(pair),
            writes: AtomicUsize::new(0),
        }
    }

    /// Current stored value.
    pub fn snapshot(&self) -> CredentialPair {
        lock(&self.pair).clone()
    }

    /// Number of persist/clear calls so far.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::Acquire)
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<CredentialPair, StorageError> {
        Ok(self.snapshot())
    }

    fn persist(&self, pair: &CredentialPair) -> Result<(), StorageError> {
        *lock(&self.pair) = pair.clone();
        self.writes.fetch_add(1, Ordering::AcqRel);
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        *lock(&self.pair) = CredentialPair::empty();
        self.writes.fetch_add(1, Ordering::AcqRel);
        Ok(())
    }
}

/// Lets a caller keep a handle on a store it hands to the session manager.
impl<S: TokenStore + ?Sized> TokenStore for std::sync::Arc<S> {
    fn load(&self) -> Result<CredentialPair, StorageError> {
        (**self).load()
    }

    fn persist(&self, pair: &CredentialPair) -> Result<(), StorageError> {
        (**self).persist(pair)
    }

    fn clear(&self) -> Result<(), StorageError> {
        (**self).clear()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_loads_empty_pair() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path().join("credentials.json"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn persist_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path().join("nested").join("credentials.json"));
        let pair = CredentialPair::new("A1", Some("R1".into()));

        store.persist(&pair).unwrap();
        assert_eq!(store.load().unwrap(), pair);

        let raw = std::fs::read_to_string(store.path()).unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json["access_token"], "A1");
        assert_eq!(json["refresh_token"], "R1");
    }

    #[cfg(unix)]
    #[test]
    fn persisted_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path().join("credentials.json"));
        store.persist(&CredentialPair::new("A1", None)).unwrap();

        let mode = std::fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn clear_removes_file_and_is_repeatable() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path().join("credentials.json"));
        store.persist(&CredentialPair::new("A1", None)).unwrap();

        store.clear().unwrap();
        assert!(!store.path().exists());
        store.clear().unwrap();
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn corrupt_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        std::fs::write(&path, "{not json").unwrap();

        let err = FileTokenStore::new(path).load().unwrap_err();
        assert!(matches!(err, StorageError::Corrupt(_)));
    }

    #[test]
    fn memory_store_counts_writes() {
        let store = MemoryTokenStore::new();
        store.persist(&CredentialPair::new("A1", None)).unwrap();
        store.clear().unwrap();
        assert_eq!(store.writes(), 2);
        assert!(store.snapshot().is_empty());
    }

    #[test]
    fn memory_store_counts_writes_across_threads() {
        let store = std::sync::Arc::new(MemoryTokenStore::new());
        let writers: Vec<_> = (0..4)
            .map(|_| {
                let store = std::sync::Arc::clone(&store);
                std::thread::spawn(move || {
                    for _ in 0..25 {
                        store.persist(&CredentialPair::new("A1", None)).unwrap();
                    }
                })
            })
            .collect();
        for writer in writers {
            writer.join().unwrap();
        }
        assert_eq!(store.writes(), 100);
    }
}
