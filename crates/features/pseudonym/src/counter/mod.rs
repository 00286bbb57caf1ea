//! Per-domain counters.
//!
//! The only mutation generation performs is [`CounterStore::increment`], an atomic
//! increment-and-fetch. Two concurrent callers on the same domain always receive distinct
//! values; calls on different domains do not contend.

mod error;
mod file;
mod memory;

pub use error::{CounterError, CounterErrorExt};
pub use file::FileCounterStore;
pub use memory::MemoryCounterStore;

use psn_domain::DomainId;
use std::future::Future;

pub trait CounterStore: Send + Sync {
    /// Current value, `None` when the domain has never counted.
    fn get(
        &self,
        domain: DomainId,
    ) -> impl Future<Output = Result<Option<i64>, CounterError>> + Send;

    fn set(
        &self,
        domain: DomainId,
        value: i64,
    ) -> impl Future<Output = Result<(), CounterError>> + Send;

    /// Adds one and returns the new value. A missing counter starts from `seed`, so the first
    /// call returns `seed + 1`. The new value is durable before it is returned.
    fn increment(
        &self,
        domain: DomainId,
        seed: i64,
    ) -> impl Future<Output = Result<i64, CounterError>> + Send;

    /// Drops the counter of a deleted domain. Removing a missing counter is not an error.
    fn remove(&self, domain: DomainId) -> impl Future<Output = Result<(), CounterError>> + Send;
}

fn next_value(domain: DomainId, current: i64) -> Result<i64, CounterError> {
    current.checked_add(1).ok_or(CounterError::Overflow { domain, context: None })
}
