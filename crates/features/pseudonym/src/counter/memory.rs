use super::{CounterError, CounterStore, next_value};
use fxhash::FxHashMap;
use parking_lot::Mutex;
use psn_domain::DomainId;

/// Process-local counters; the whole read-increment-write runs under one lock.
#[derive(Debug, Default)]
pub struct MemoryCounterStore {
    counters: Mutex<FxHashMap<DomainId, i64>>,
}

impl MemoryCounterStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl CounterStore for MemoryCounterStore {
    async fn get(&self, domain: DomainId) -> Result<Option<i64>, CounterError> {
        Ok(self.counters.lock().get(&domain).copied())
    }

    async fn set(&self, domain: DomainId, value: i64) -> Result<(), CounterError> {
        self.counters.lock().insert(domain, value);
        Ok(())
    }

    async fn increment(&self, domain: DomainId, seed: i64) -> Result<i64, CounterError> {
        let mut counters = self.counters.lock();
        let slot = counters.entry(domain).or_insert(seed);
        *slot = next_value(domain, *slot)?;
        Ok(*slot)
    }

    async fn remove(&self, domain: DomainId) -> Result<(), CounterError> {
        self.counters.lock().remove(&domain);
        Ok(())
    }
}
