use super::{CounterError, CounterErrorExt, CounterStore, next_value};
use fxhash::FxHashMap;
use psn_domain::DomainId;
use psn_storage::{NamespacedStorage, Storage, StorageError};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

const NAMESPACE: &str = "counters";

/// Counters persisted as one decimal file per domain under `<root>/counters/`.
///
/// A per-domain async mutex serialises read-increment-write inside this process; the
/// write itself is an atomic file swap, so a crash leaves either the old or the new value.
/// Several processes must not share one root.
#[derive(Debug, Clone)]
pub struct FileCounterStore {
    storage: NamespacedStorage,
    locks: Arc<parking_lot::Mutex<FxHashMap<DomainId, Arc<Mutex<()>>>>>,
}

impl FileCounterStore {
    /// # Errors
    /// Returns [`CounterError::Storage`] if the namespace cannot be opened.
    pub fn new(storage: &Storage) -> Result<Self, CounterError> {
        let storage = storage.namespace(NAMESPACE).context("Opening counter namespace")?;
        Ok(Self { storage, locks: Arc::default() })
    }

    /// Ids of every domain with a persisted counter.
    ///
    /// # Errors
    /// Returns [`CounterError::Storage`] if the namespace cannot be listed.
    pub async fn domains(&self) -> Result<Vec<DomainId>, CounterError> {
        let keys = self.storage.keys().await?;
        Ok(keys.iter().filter_map(|k| k.parse().ok()).map(DomainId).collect())
    }

    fn lock_for(&self, domain: DomainId) -> Arc<Mutex<()>> {
        Arc::clone(self.locks.lock().entry(domain).or_default())
    }

    async fn read(&self, domain: DomainId) -> Result<Option<i64>, CounterError> {
        let Some(bytes) = self.storage.read_optional(key(domain)).await? else {
            return Ok(None);
        };
        let text = String::from_utf8_lossy(&bytes);
        text.trim().parse().map(Some).map_err(|e: std::num::ParseIntError| CounterError::Corrupt {
            domain,
            message: e.to_string().into(),
            context: None,
        })
    }

    async fn write(&self, domain: DomainId, value: i64) -> Result<(), CounterError> {
        self.storage
            .write(key(domain), value.to_string().as_bytes())
            .await
            .context(format!("Persisting counter of domain {domain}"))
    }
}

impl CounterStore for FileCounterStore {
    async fn get(&self, domain: DomainId) -> Result<Option<i64>, CounterError> {
        self.read(domain).await
    }

    async fn set(&self, domain: DomainId, value: i64) -> Result<(), CounterError> {
        let lock = self.lock_for(domain);
        let _guard = lock.lock().await;
        self.write(domain, value).await
    }

    async fn increment(&self, domain: DomainId, seed: i64) -> Result<i64, CounterError> {
        let lock = self.lock_for(domain);
        let _guard = lock.lock().await;

        let current = self.read(domain).await?.unwrap_or(seed);
        let next = next_value(domain, current)?;
        self.write(domain, next).await?;

        debug!(domain = %domain, value = next, "Counter incremented");
        Ok(next)
    }

    async fn remove(&self, domain: DomainId) -> Result<(), CounterError> {
        // The lock entry stays: a task may still hold a clone of it.
        let lock = self.lock_for(domain);
        let _guard = lock.lock().await;
        match self.storage.delete(key(domain)).await {
            Ok(()) | Err(StorageError::NotFound { .. }) => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

fn key(domain: DomainId) -> String {
    domain.0.to_string()
}
