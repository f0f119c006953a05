//! File-backed store — one JSON file per `(namespace, key)` entry.
//!
//! Layout: `<root>/<namespace>/<key>.json`. The namespace becomes a
//! directory, so keys from different namespaces can never alias.

use crate::{KvStore, StoreError};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A [`KvStore`] persisting entries under a root directory.
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Open (or create) a store rooted at `root`.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    fn entry_path(&self, namespace: &str, key: &str) -> Result<PathBuf, StoreError> {
        validate_component(namespace)?;
        validate_component(key)?;
        Ok(self.root.join(namespace).join(format!("{key}.json")))
    }
}

/// Namespaces and keys become path components, so path syntax is rejected.
fn validate_component(s: &str) -> Result<(), StoreError> {
    if s.is_empty()
        || s.contains(['/', '\\', '\0'])
        || s == "."
        || s == ".."
    {
        return Err(StoreError::InvalidKey(s.to_string()));
    }
    Ok(())
}

impl KvStore for FileStore {
    fn get(&self, namespace: &str, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let path = self.entry_path(namespace, key)?;
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn put(&self, namespace: &str, key: &str, value: &[u8]) -> Result<(), StoreError> {
        let path = self.entry_path(namespace, key)?;
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        // Write-then-rename so a crash mid-write never leaves a torn entry.
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        debug!(namespace, key, bytes = value.len(), "store entry written");
        Ok(())
    }

    fn delete(&self, namespace: &str, key: &str) -> Result<(), StoreError> {
        let path = self.entry_path(namespace, key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

impl AsRef<Path> for FileStore {
    fn as_ref(&self) -> &Path {
        &self.root
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        store.put("cache", "0xabc", b"{\"x\":1}").unwrap();
        assert_eq!(
            store.get("cache", "0xabc").unwrap(),
            Some(b"{\"x\":1}".to_vec())
        );

        // A fresh handle over the same root sees the entry.
        let reopened = FileStore::open(dir.path()).unwrap();
        assert!(reopened.get("cache", "0xabc").unwrap().is_some());
    }

    #[test]
    fn missing_entry_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        assert_eq!(store.get("cache", "nope").unwrap(), None);
    }

    #[test]
    fn delete_then_get_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        store.put("cache", "k", b"v").unwrap();
        store.delete("cache", "k").unwrap();
        assert_eq!(store.get("cache", "k").unwrap(), None);
        // Second delete is a no-op.
        store.delete("cache", "k").unwrap();
    }

    #[test]
    fn path_syntax_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        assert!(store.put("../escape", "k", b"v").is_err());
        assert!(store.put("ns", "a/b", b"v").is_err());
        assert!(store.get("ns", "..").is_err());
    }
}
