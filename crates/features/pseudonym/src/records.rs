//! Issued pseudonyms.
//!
//! A [`PseudonymRecord`] maps one pseudonym back to the identifier it stands for, scoped to a
//! domain. Pseudonyms are unique per domain; the same identifier may hold several records only
//! when the domain allows multiple pseudonyms.

use chrono::{DateTime, Utc};
use fxhash::FxHashMap;
use parking_lot::RwLock;
use psn_domain::DomainId;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PseudonymRecord {
    pub identifier: String,
    pub id_type: String,
    pub pseudonym: String,
    pub domain_id: DomainId,
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_to: Option<DateTime<Utc>>,
    /// Counter value consumed by the generation, if any.
    pub counter: Option<i64>,
}

/// Result of [`RecordStore::insert`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    /// The domain already uses this pseudonym; nothing was stored.
    PseudonymTaken,
    /// A unique insert found a record for the same identifier; nothing was stored.
    IdentifierExists(PseudonymRecord),
}

type IdentifierKey = (DomainId, String, String);

#[derive(Debug, Default)]
struct RecordState {
    by_pseudonym: FxHashMap<(DomainId, String), PseudonymRecord>,
    by_identifier: FxHashMap<IdentifierKey, Vec<String>>,
}

/// In-memory record index with an atomic check-and-insert.
#[derive(Debug, Default)]
pub struct RecordStore {
    state: RwLock<RecordState>,
}

impl RecordStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `record` unless its pseudonym is taken in the domain or, with
    /// `unique_identifier`, the identifier already holds a record there. Both checks and the
    /// insert happen under one write lock.
    pub fn insert(&self, record: PseudonymRecord, unique_identifier: bool) -> InsertOutcome {
        let mut state = self.state.write();
        let id_key = (record.domain_id, record.identifier.clone(), record.id_type.clone());

        if unique_identifier
            && let Some(existing) = state
                .by_identifier
                .get(&id_key)
                .and_then(|list| list.first())
                .and_then(|p| state.by_pseudonym.get(&(record.domain_id, p.clone())))
        {
            return InsertOutcome::IdentifierExists(existing.clone());
        }

        let ps_key = (record.domain_id, record.pseudonym.clone());
        if state.by_pseudonym.contains_key(&ps_key) {
            return InsertOutcome::PseudonymTaken;
        }

        state.by_identifier.entry(id_key).or_default().push(record.pseudonym.clone());
        state.by_pseudonym.insert(ps_key, record);
        InsertOutcome::Inserted
    }

    #[must_use]
    pub fn find_by_pseudonym(&self, domain: DomainId, pseudonym: &str) -> Option<PseudonymRecord> {
        self.state.read().by_pseudonym.get(&(domain, pseudonym.to_owned())).cloned()
    }

    /// Records of `identifier` in `domain`, oldest first.
    #[must_use]
    pub fn find_by_identifier(
        &self,
        domain: DomainId,
        identifier: &str,
        id_type: &str,
    ) -> Vec<PseudonymRecord> {
        let state = self.state.read();
        state
            .by_identifier
            .get(&(domain, identifier.to_owned(), id_type.to_owned()))
            .into_iter()
            .flatten()
            .filter_map(|p| state.by_pseudonym.get(&(domain, p.clone())).cloned())
            .collect()
    }

    /// Drops every record of `domain` and returns how many there were.
    pub fn remove_domain(&self, domain: DomainId) -> usize {
        let mut state = self.state.write();
        let before = state.by_pseudonym.len();
        state.by_pseudonym.retain(|(d, _), _| *d != domain);
        state.by_identifier.retain(|(d, _, _), _| *d != domain);
        before - state.by_pseudonym.len()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.state.read().by_pseudonym.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
