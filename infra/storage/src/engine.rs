//! The [`Storage`] handle: root-scoped atomic file I/O shared by every namespace.

use crate::builder::StorageBuilder;
use crate::error::{StorageError, StorageErrorExt};
use crate::maintenance;
use crate::namespace::{NamespaceName, NamespacedStorage};
use crate::security;
use std::io::ErrorKind;
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

pub(crate) const TMP_MARKER: &str = ".psntmp.";

#[derive(Debug)]
pub struct StorageInner {
    /// Canonical physical root; every resolved path starts with it.
    pub(crate) root: PathBuf,
    pub(crate) tmp_counter: AtomicU64,
}

/// Cheaply clonable handle to a storage root.
#[derive(Debug, Clone)]
pub struct Storage {
    pub(crate) inner: Arc<StorageInner>,
}

impl Deref for Storage {
    type Target = StorageInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl Storage {
    #[must_use = "The storage is not opened until you call .connect()"]
    pub fn builder() -> StorageBuilder {
        StorageBuilder::new()
    }

    /// The canonical root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.inner.root
    }

    /// Returns a view whose keys live under `<root>/<name>/`.
    ///
    /// # Errors
    /// Returns [`StorageError::InvalidNamespace`] unless `name` is non-empty and made of
    /// ASCII letters, digits and underscores.
    pub fn namespace<N>(&self, name: N) -> Result<NamespacedStorage, StorageError>
    where
        N: TryInto<NamespaceName, Error = StorageError>,
    {
        Ok(NamespacedStorage::new(self.clone(), name.try_into()?))
    }

    /// Resolves a relative key to a physical path inside the root.
    ///
    /// # Errors
    /// Returns [`StorageError::PathTraversalAttempt`] for absolute keys, keys climbing above
    /// the root and keys reaching through a symlink that points outside of it.
    pub fn resolve(&self, key: impl AsRef<Path>) -> Result<PathBuf, StorageError> {
        self.resolve_in(None, key)
    }

    pub(crate) fn resolve_in(
        &self,
        namespace: Option<&NamespaceName>,
        key: impl AsRef<Path>,
    ) -> Result<PathBuf, StorageError> {
        let key = key.as_ref();
        match namespace {
            Some(ns) => security::resolve_path(&self.root, Path::new(ns.as_ref()).join(key)),
            None => security::resolve_path(&self.root, key),
        }
    }

    /// Reads an entry.
    ///
    /// # Errors
    /// Returns [`StorageError::NotFound`] when the entry does not exist.
    pub async fn read(&self, key: impl AsRef<Path>) -> Result<Vec<u8>, StorageError> {
        self.read_in(None, key).await
    }

    /// Reads an entry, mapping a missing entry to `None`.
    ///
    /// # Errors
    /// Returns path resolution and I/O errors.
    pub async fn read_optional(
        &self,
        key: impl AsRef<Path>,
    ) -> Result<Option<Vec<u8>>, StorageError> {
        self.read_optional_in(None, key).await
    }

    pub(crate) async fn read_in(
        &self,
        namespace: Option<&NamespaceName>,
        key: impl AsRef<Path>,
    ) -> Result<Vec<u8>, StorageError> {
        let key = key.as_ref();
        self.read_optional_in(namespace, key).await?.ok_or_else(|| StorageError::NotFound {
            message: key.display().to_string().into(),
            context: namespace.map(|ns| format!("Namespace {ns}").into()),
        })
    }

    pub(crate) async fn read_optional_in(
        &self,
        namespace: Option<&NamespaceName>,
        key: impl AsRef<Path>,
    ) -> Result<Option<Vec<u8>>, StorageError> {
        let resolved = self.resolve_in(namespace, key)?;

        match fs::read(&resolved).await {
            Ok(data) => Ok(Some(data)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(StorageError::Io {
                source: err,
                context: Some(format!("Read failed: {}", resolved.display()).into()),
            }),
        }
    }

    /// Replaces an entry atomically (temporary file, `fsync`, `rename`).
    ///
    /// # Errors
    /// Returns [`StorageError::PathTraversalAttempt`] for keys outside the root and
    /// [`StorageError::Io`] when the disk write fails.
    pub async fn write(&self, key: impl AsRef<Path>, data: &[u8]) -> Result<(), StorageError> {
        self.write_in(None, key, data).await
    }

    pub(crate) async fn write_in(
        &self,
        namespace: Option<&NamespaceName>,
        key: impl AsRef<Path>,
        data: &[u8],
    ) -> Result<(), StorageError> {
        let resolved = self.resolve_in(namespace, key)?;

        if let Some(parent) = resolved.parent() {
            fs::create_dir_all(parent)
                .await
                .context(format!("Failed to create directory for {}", resolved.display()))?;
        }

        let temp = tmp_path(&resolved, &self.tmp_counter);
        {
            let mut file = fs::OpenOptions::new()
                .create_new(true)
                .write(true)
                .open(&temp)
                .await
                .context(format!("Temp creation failed: {}", temp.display()))?;
            file.write_all(data).await.context("Write failed")?;
            file.sync_all().await.context("Hardware sync failed")?;
        }

        if let Err(err) = fs::rename(&temp, &resolved).await {
            // Windows refuses to rename over an existing file.
            if err.kind() != ErrorKind::AlreadyExists {
                let _ = fs::remove_file(&temp).await;
                return Err(StorageError::Io {
                    source: err,
                    context: Some(format!("Atomic swap failed: {}", resolved.display()).into()),
                });
            }
            fs::remove_file(&resolved)
                .await
                .context(format!("Failed to replace {}", resolved.display()))?;
            fs::rename(&temp, &resolved)
                .await
                .context(format!("Atomic swap failed: {}", resolved.display()))?;
        }

        if let Some(parent) = resolved.parent() {
            sync_dir(parent).await;
        }

        debug!(path = %resolved.display(), bytes = data.len(), "Entry written");
        Ok(())
    }

    /// Removes an entry.
    ///
    /// # Errors
    /// Returns [`StorageError::NotFound`] when there is nothing to remove.
    pub async fn delete(&self, key: impl AsRef<Path>) -> Result<(), StorageError> {
        self.delete_in(None, key).await
    }

    pub(crate) async fn delete_in(
        &self,
        namespace: Option<&NamespaceName>,
        key: impl AsRef<Path>,
    ) -> Result<(), StorageError> {
        let resolved = self.resolve_in(namespace, key)?;
        match fs::remove_file(&resolved).await {
            Ok(()) => {
                debug!(path = %resolved.display(), "Entry deleted");
                Ok(())
            },
            Err(err) if err.kind() == ErrorKind::NotFound => Err(StorageError::NotFound {
                message: resolved.display().to_string().into(),
                context: None,
            }),
            Err(err) => Err(StorageError::Io {
                source: err,
                context: Some(format!("Failed to delete: {}", resolved.display()).into()),
            }),
        }
    }

    /// Whether an entry exists.
    ///
    /// # Errors
    /// Only path resolution errors; a missing entry is `Ok(false)`.
    pub fn exists(&self, key: impl AsRef<Path>) -> Result<bool, StorageError> {
        Ok(self.resolve_in(None, key)?.is_file())
    }

    /// Lists the entry keys stored directly in a namespace, sorted.
    pub(crate) async fn keys_in(
        &self,
        namespace: &NamespaceName,
    ) -> Result<Vec<String>, StorageError> {
        let dir = self.root.join(namespace.as_ref());
        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => {
                return Err(StorageError::Io {
                    source: err,
                    context: Some(format!("Failed to list {}", dir.display()).into()),
                });
            },
        };

        let mut keys = Vec::new();
        while let Some(entry) = entries.next_entry().await.context("Failed to list entries")? {
            if !entry.file_type().await.is_ok_and(|t| t.is_file()) {
                continue;
            }
            match entry.file_name().to_str() {
                Some(name) if !name.contains(TMP_MARKER) => keys.push(name.to_owned()),
                _ => {},
            }
        }
        keys.sort_unstable();
        Ok(keys)
    }

    /// Removes temporary files older than five minutes left behind by interrupted writes.
    pub async fn purge_tmp(&self) {
        maintenance::purge_tmp(&self.root).await;
    }
}

fn tmp_path(target: &Path, counter: &AtomicU64) -> PathBuf {
    let n = counter.fetch_add(1, Ordering::Relaxed);
    let file_name = target.file_name().and_then(|s| s.to_str()).unwrap_or("entry");
    target.with_file_name(format!("{file_name}{TMP_MARKER}{}.{n}", std::process::id()))
}

async fn sync_dir(path: &Path) {
    match fs::File::open(path).await {
        Ok(dir) => {
            if let Err(err) = dir.sync_all().await {
                warn!(path = %path.display(), error = %err, "Directory sync failed");
            }
        },
        Err(err) => warn!(path = %path.display(), error = %err, "Directory open failed"),
    }
}
