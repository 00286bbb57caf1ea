//! Issuance, lookup and cross-domain linking of pseudonyms.

use crate::algorithm::{Algorithm, AlgorithmRegistry, FALLBACK_ALGORITHM, Selection};
use crate::check_digit::validate_check_digit;
use crate::counter::CounterStore;
use crate::error::{PseudonymError, PseudonymErrorExt};
use crate::generator::{AlgorithmSelection, PseudonymGenerator, subject};
use crate::records::{InsertOutcome, PseudonymRecord, RecordStore};
use psn_domain::{Domain, DomainId};
use psn_hierarchy::{DomainConfigResolver, DomainPathFinder, DomainReader, EffectiveConfig};
use psn_kernel::clock::{Clock, SystemClock};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Generation attempts before a collision is reported.
pub const MAX_ATTEMPTS: usize = 10;

/// Outcome of [`Pseudonymizer::issue`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issued {
    pub record: PseudonymRecord,
    pub selection: Selection,
    /// `true` when an existing record was returned instead of generating.
    pub reused: bool,
    pub conforming: bool,
}

/// Issues pseudonyms against a domain tree.
///
/// The domain tree is read through `R`, counters go through `C`. Generation itself is pure;
/// the only state it touches is the atomic counter increment and the record insert.
#[derive(Debug)]
pub struct Pseudonymizer<R, C> {
    reader: Arc<R>,
    counters: Arc<C>,
    records: Arc<RecordStore>,
    resolver: DomainConfigResolver,
    clock: Arc<dyn Clock>,
}

impl<R, C> Clone for Pseudonymizer<R, C> {
    fn clone(&self) -> Self {
        Self {
            reader: Arc::clone(&self.reader),
            counters: Arc::clone(&self.counters),
            records: Arc::clone(&self.records),
            resolver: self.resolver.clone(),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<R, C> Pseudonymizer<R, C>
where
    R: DomainReader,
    C: CounterStore,
{
    #[must_use]
    pub fn new(reader: Arc<R>, counters: Arc<C>, resolver: DomainConfigResolver) -> Self {
        Self {
            reader,
            counters,
            records: Arc::new(RecordStore::new()),
            resolver,
            clock: Arc::new(SystemClock),
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn with_records(mut self, records: Arc<RecordStore>) -> Self {
        self.records = records;
        self
    }

    #[must_use]
    pub fn counters(&self) -> &C {
        &self.counters
    }

    #[must_use]
    pub fn records(&self) -> &RecordStore {
        &self.records
    }

    #[must_use]
    pub const fn resolver(&self) -> &DomainConfigResolver {
        &self.resolver
    }

    /// Issues a pseudonym for `identifier` in the domain called `domain`.
    ///
    /// When the domain does not allow multiple pseudonyms and the identifier already holds
    /// one, that record is returned unchanged with [`Issued::reused`] set.
    ///
    /// # Errors
    /// - [`PseudonymError::Hierarchy`] when the domain is unknown or its chain is broken.
    /// - [`PseudonymError::OutsideValidity`] when an enforced validity bound excludes now.
    /// - [`PseudonymError::Counter`] when the counter cannot be persisted; nothing is issued.
    /// - [`PseudonymError::Collision`] when every attempt hit a pseudonym already in use.
    pub async fn issue(
        &self,
        domain: &str,
        identifier: &str,
        id_type: &str,
    ) -> Result<Issued, PseudonymError> {
        let config = self
            .resolver
            .resolve_by_name(&*self.reader, domain)
            .context(format!("Resolving domain {domain}"))?;
        self.check_validity(&config)?;

        let selection = AlgorithmSelection::from_effective(&config);
        let multiple = selection.multiple_pseudonyms_allowed;

        if !multiple {
            let existing = self.records.find_by_identifier(config.domain_id, identifier, id_type);
            if let Some(record) = existing.into_iter().next() {
                debug!(domain = %config.name, "Identifier already holds a pseudonym");
                return Ok(reused(&config, record));
            }
        }

        let algorithm = Algorithm::from_name(&selection.algorithm).unwrap_or(FALLBACK_ALGORITHM);
        let seed = config.consecutive_counter.value;
        let input = subject(identifier, id_type);

        for attempt in 1..=MAX_ATTEMPTS {
            let counter = if algorithm.uses_counter(multiple) {
                let value = self
                    .counters
                    .increment(config.domain_id, seed)
                    .await
                    .context(format!("Incrementing counter of domain {}", config.name))?;
                Some(value)
            } else {
                None
            };

            let generated = PseudonymGenerator::generate(&input, &selection, counter)?;
            let record = PseudonymRecord {
                identifier: identifier.to_owned(),
                id_type: id_type.to_owned(),
                pseudonym: generated.pseudonym.clone(),
                domain_id: config.domain_id,
                valid_from: config.valid_from.value,
                valid_to: config.valid_to.value,
                counter: generated.counter,
            };

            match self.records.insert(record.clone(), !multiple) {
                InsertOutcome::Inserted => {
                    info!(
                        domain = %config.name,
                        algorithm = %generated.selection.algorithm(),
                        attempt,
                        "Pseudonym issued"
                    );
                    return Ok(Issued {
                        record,
                        selection: generated.selection,
                        reused: false,
                        conforming: generated.conforming,
                    });
                },
                InsertOutcome::IdentifierExists(existing) => {
                    return Ok(reused(&config, existing));
                },
                InsertOutcome::PseudonymTaken => {
                    warn!(domain = %config.name, attempt, "Pseudonym collision, retrying");
                    if algorithm.is_deterministic() && counter.is_none() {
                        return Err(PseudonymError::Collision { attempts: attempt, context: None });
                    }
                },
            }
        }

        Err(PseudonymError::Collision {
            attempts: MAX_ATTEMPTS,
            context: Some(format!("Domain {}", config.name).into()),
        })
    }

    /// The identifier behind `pseudonym` in `domain`.
    ///
    /// # Errors
    /// Returns [`PseudonymError::NotFound`] for an unknown domain.
    pub fn lookup_identifier(
        &self,
        domain: &str,
        pseudonym: &str,
    ) -> Result<Option<PseudonymRecord>, PseudonymError> {
        let domain = self.domain(domain)?;
        Ok(self.records.find_by_pseudonym(domain.id, pseudonym.trim()))
    }

    /// Every pseudonym `identifier` holds in `domain`, oldest first.
    ///
    /// # Errors
    /// Returns [`PseudonymError::NotFound`] for an unknown domain.
    pub fn lookup_pseudonyms(
        &self,
        domain: &str,
        identifier: &str,
        id_type: &str,
    ) -> Result<Vec<PseudonymRecord>, PseudonymError> {
        let domain = self.domain(domain)?;
        Ok(self.records.find_by_identifier(domain.id, identifier, id_type))
    }

    /// Verifies the check character of `pseudonym` with the alphabet of the domain's algorithm.
    ///
    /// # Errors
    /// Returns [`PseudonymError::Hierarchy`] for an unknown domain and
    /// [`PseudonymError::EmptyAlphabet`] when the alphabet is unusable.
    pub fn validate(&self, domain: &str, pseudonym: &str) -> Result<Option<bool>, PseudonymError> {
        let config = self.resolver.resolve_by_name(&*self.reader, domain)?;
        validate_check_digit(
            pseudonym,
            &config.algorithm.value,
            &config.alphabet.value,
            &config.prefix,
        )
    }

    /// Relates `pseudonym` of `source` to the destination domain, issuing a destination
    /// pseudonym when the identifier holds none there yet.
    ///
    /// # Errors
    /// - [`PseudonymError::NoPath`] when the domains are not connected.
    /// - [`PseudonymError::NotFound`] when `pseudonym` is unknown in `source`.
    /// - Any error of [`Self::issue`].
    pub async fn link(
        &self,
        source: &str,
        pseudonym: &str,
        destination: &str,
    ) -> Result<Issued, PseudonymError> {
        let hops = {
            let domains = self.reader.domains();
            DomainPathFinder::new(&domains).find_id_path(source, destination).map(|p| p.len())
        };
        let Some(hops) = hops else {
            return Err(PseudonymError::NoPath {
                message: format!("{source} -> {destination}").into(),
                context: None,
            });
        };

        let record = self.lookup_identifier(source, pseudonym)?.ok_or_else(|| {
            PseudonymError::NotFound {
                message: "pseudonym".into(),
                context: Some(format!("Domain {source}").into()),
            }
        })?;
        debug!(source, destination, hops, "Linking pseudonym across domains");

        let existing = self.lookup_pseudonyms(destination, &record.identifier, &record.id_type)?;
        if let Some(found) = existing.into_iter().next() {
            let config = self.resolver.resolve_by_name(&*self.reader, destination)?;
            return Ok(reused(&config, found));
        }
        self.issue(destination, &record.identifier, &record.id_type).await
    }

    /// Removes every record scoped to `domain`.
    pub fn delete_domain_records(&self, domain: DomainId) -> usize {
        let removed = self.records.remove_domain(domain);
        if removed > 0 {
            info!(domain = %domain, removed, "Domain records deleted");
        }
        removed
    }

    fn domain(&self, name: &str) -> Result<Domain, PseudonymError> {
        self.reader.domain_by_name(name).ok_or_else(|| PseudonymError::NotFound {
            message: format!("domain {name}").into(),
            context: None,
        })
    }

    fn check_validity(&self, config: &EffectiveConfig) -> Result<(), PseudonymError> {
        let now = self.clock.now();
        if config.is_valid_at(now) {
            return Ok(());
        }
        warn!(domain = %config.name, %now, "Issuance outside the domain validity window");
        Err(PseudonymError::OutsideValidity {
            message: format!(
                "{now} not in [{}, {}]",
                config.valid_from.value.map_or_else(|| "-".to_owned(), |t| t.to_string()),
                config.valid_to.value.map_or_else(|| "-".to_owned(), |t| t.to_string()),
            )
            .into(),
            context: Some(format!("Domain {}", config.name).into()),
        })
    }
}

fn reused(config: &EffectiveConfig, record: PseudonymRecord) -> Issued {
    Issued {
        record,
        selection: AlgorithmRegistry::select(&config.algorithm.value),
        reused: true,
        conforming: true,
    }
}
