//! # Domain hierarchy
//!
//! Domains form a forest through parent pointers. This crate owns everything that depends on
//! that shape:
//!
//! * [`resolver`]: the effective value of every inheritable attribute, with the domain or
//!   ancestor it came from;
//! * [`path`]: the unique path between two domains;
//! * [`catalog`]: an in-memory, thread-safe catalogue with validated create, recursive update
//!   and recursive delete.
//!
//! Everything reads domains through [`DomainReader`], so any store can back resolution.

pub mod catalog;
mod error;
pub mod path;
pub mod resolver;

pub use crate::catalog::{DomainCatalog, NewDomain, UpdateReport, validate_defaults};
pub use crate::error::{HierarchyError, HierarchyErrorExt};
pub use crate::path::DomainPathFinder;
pub use crate::resolver::{DomainConfigResolver, EffectiveConfig, Resolved, ValueSource};

use psn_domain::{Domain, DomainId};

/// Read access to stored domains.
///
/// Implementations return snapshots: callers never observe a half-applied update.
pub trait DomainReader: Send + Sync {
    fn domain(&self, id: DomainId) -> Option<Domain>;

    fn domain_by_name(&self, name: &str) -> Option<Domain>;

    /// Every stored domain, in id order.
    fn domains(&self) -> Vec<Domain>;
}

impl DomainReader for [Domain] {
    fn domain(&self, id: DomainId) -> Option<Domain> {
        self.iter().find(|d| d.id == id).cloned()
    }

    fn domain_by_name(&self, name: &str) -> Option<Domain> {
        self.iter().find(|d| d.name == name).cloned()
    }

    fn domains(&self) -> Vec<Domain> {
        let mut all = self.to_vec();
        all.sort_by_key(|d| d.id);
        all
    }
}

impl DomainReader for Vec<Domain> {
    fn domain(&self, id: DomainId) -> Option<Domain> {
        self.as_slice().domain(id)
    }

    fn domain_by_name(&self, name: &str) -> Option<Domain> {
        self.as_slice().domain_by_name(name)
    }

    fn domains(&self) -> Vec<Domain> {
        self.as_slice().domains()
    }
}

/// Ancestors of `domain` ordered root first, parent last.
///
/// # Errors
/// Returns [`HierarchyError::Cycle`] when the chain revisits a domain and
/// [`HierarchyError::DanglingParent`] when a parent id cannot be read.
pub fn ancestor_chain<R>(reader: &R, domain: &Domain) -> Result<Vec<Domain>, HierarchyError>
where
    R: DomainReader + ?Sized,
{
    let mut seen = fxhash::FxHashSet::default();
    seen.insert(domain.id);

    let mut chain = Vec::new();
    let mut child = domain.id;
    let mut next = domain.parent_id;
    while let Some(parent_id) = next {
        if !seen.insert(parent_id) {
            return Err(HierarchyError::Cycle { domain: domain.id, context: None });
        }
        let parent = reader.domain(parent_id).ok_or(HierarchyError::DanglingParent {
            domain: child,
            parent: parent_id,
            context: None,
        })?;
        child = parent.id;
        next = parent.parent_id;
        chain.push(parent);
    }

    chain.reverse();
    Ok(chain)
}
