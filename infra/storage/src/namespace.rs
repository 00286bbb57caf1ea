use crate::engine::Storage;
use crate::error::StorageError;
use std::fmt;
use std::path::{Path, PathBuf};

/// Validated namespace directory name: lowercase ASCII letters, digits and `_`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NamespaceName(String);

impl TryFrom<&str> for NamespaceName {
    type Error = StorageError;

    fn try_from(value: &str) -> Result<Self, StorageError> {
        let name = value.to_ascii_lowercase();

        if name.is_empty() {
            return Err(StorageError::InvalidNamespace {
                message: "namespace cannot be empty".into(),
                context: None,
            });
        }
        if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(StorageError::InvalidNamespace {
                message: name.into(),
                context: Some("Only ASCII letters, digits and '_' are allowed".into()),
            });
        }

        Ok(Self(name))
    }
}

impl TryFrom<String> for NamespaceName {
    type Error = StorageError;

    fn try_from(value: String) -> Result<Self, StorageError> {
        Self::try_from(value.as_str())
    }
}

impl AsRef<str> for NamespaceName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NamespaceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A view of [`Storage`] restricted to one namespace directory.
///
/// Cloning is cheap; all views of one root share the same temporary-file sequence.
#[derive(Debug, Clone)]
pub struct NamespacedStorage {
    storage: Storage,
    namespace: NamespaceName,
}

impl NamespacedStorage {
    pub(crate) const fn new(storage: Storage, namespace: NamespaceName) -> Self {
        Self { storage, namespace }
    }

    #[must_use]
    pub const fn name(&self) -> &NamespaceName {
        &self.namespace
    }

    /// See [`Storage::resolve`].
    ///
    /// # Errors
    /// Returns [`StorageError::PathTraversalAttempt`] for keys escaping the namespace root.
    pub fn resolve(&self, key: impl AsRef<Path>) -> Result<PathBuf, StorageError> {
        self.storage.resolve_in(Some(&self.namespace), key)
    }

    /// See [`Storage::read`].
    ///
    /// # Errors
    /// Returns [`StorageError::NotFound`] when the entry does not exist.
    pub async fn read(&self, key: impl AsRef<Path>) -> Result<Vec<u8>, StorageError> {
        self.storage.read_in(Some(&self.namespace), key).await
    }

    /// See [`Storage::read_optional`].
    ///
    /// # Errors
    /// Returns path resolution and I/O errors.
    pub async fn read_optional(
        &self,
        key: impl AsRef<Path>,
    ) -> Result<Option<Vec<u8>>, StorageError> {
        self.storage.read_optional_in(Some(&self.namespace), key).await
    }

    /// See [`Storage::write`].
    ///
    /// # Errors
    /// Returns path resolution and I/O errors.
    pub async fn write(&self, key: impl AsRef<Path>, data: &[u8]) -> Result<(), StorageError> {
        self.storage.write_in(Some(&self.namespace), key, data).await
    }

    /// See [`Storage::delete`].
    ///
    /// # Errors
    /// Returns [`StorageError::NotFound`] when there is nothing to remove.
    pub async fn delete(&self, key: impl AsRef<Path>) -> Result<(), StorageError> {
        self.storage.delete_in(Some(&self.namespace), key).await
    }

    /// # Errors
    /// Only path resolution errors.
    pub fn exists(&self, key: impl AsRef<Path>) -> Result<bool, StorageError> {
        Ok(self.resolve(key)?.is_file())
    }

    /// Keys of the entries stored directly in this namespace, sorted. Empty when the
    /// namespace directory does not exist yet.
    ///
    /// # Errors
    /// Returns [`StorageError::Io`] when the directory cannot be listed.
    pub async fn keys(&self) -> Result<Vec<String>, StorageError> {
        self.storage.keys_in(&self.namespace).await
    }
}
