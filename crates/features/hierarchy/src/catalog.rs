//! In-memory domain catalogue.
//!
//! [`DomainCatalog`] validates every mutation against the data model rules before it becomes
//! visible, keeps the tree acyclic, and hands out cloned snapshots through [`DomainReader`].

use crate::error::{HierarchyError, HierarchyErrorExt};
use crate::{DomainReader, ancestor_chain};
use chrono::{DateTime, Utc};
use fxhash::FxHashSet;
use parking_lot::RwLock;
use psn_domain::config::{AttributeDefaults, DomainSeed};
use psn_domain::constants::MAX_ALPHABET_LEN;
use psn_domain::{Domain, DomainAttributes, DomainId, DomainPatch};
use std::collections::{BTreeMap, VecDeque};
use tracing::{debug, info, warn};

/// Input of [`DomainCatalog::create`]; the catalogue assigns the id.
#[derive(Debug, Clone, Default)]
pub struct NewDomain {
    pub name: String,
    pub prefix: String,
    pub parent: Option<DomainId>,
    pub description: Option<String>,
    pub attributes: DomainAttributes,
}

impl NewDomain {
    #[must_use]
    pub fn new(name: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self { name: name.into(), prefix: prefix.into(), ..Self::default() }
    }

    #[must_use]
    pub const fn parent(mut self, parent: DomainId) -> Self {
        self.parent = Some(parent);
        self
    }

    #[must_use]
    pub fn attributes(mut self, attributes: DomainAttributes) -> Self {
        self.attributes = attributes;
        self
    }
}

/// Outcome of a (possibly recursive) update.
///
/// The target domain is always in `updated` when the call returns `Ok`; descendants that
/// rejected the patch are listed in `failed` and keep their previous configuration.
#[derive(Debug, Default)]
pub struct UpdateReport {
    pub updated: Vec<DomainId>,
    pub failed: Vec<(DomainId, HierarchyError)>,
}

impl UpdateReport {
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

#[derive(Debug, Default)]
struct CatalogState {
    domains: BTreeMap<DomainId, Domain>,
    next_id: u64,
}

/// Validity windows are checked against the defaults the catalogue was built with, so they
/// must match the defaults used for resolution.
#[derive(Debug, Default)]
pub struct DomainCatalog {
    state: RwLock<CatalogState>,
    defaults: AttributeDefaults,
}

impl DomainCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn defaults(&self) -> &AttributeDefaults {
        &self.defaults
    }

    /// An empty catalogue over `defaults`.
    ///
    /// # Errors
    /// Returns [`HierarchyError::Validation`] when the defaults break the attribute rules.
    pub fn with_defaults(defaults: AttributeDefaults) -> Result<Self, HierarchyError> {
        validate_defaults(&defaults)?;
        Ok(Self { state: RwLock::default(), defaults })
    }

    /// Builds a catalogue from configuration seeds. Seeds reference parents by name and may
    /// be listed in any order.
    ///
    /// # Errors
    /// Returns [`HierarchyError::NotFound`] when a seed names a parent that no seed defines,
    /// and any validation error of [`Self::with_defaults`] or [`Self::create`].
    pub fn from_seeds(
        seeds: &[DomainSeed],
        defaults: AttributeDefaults,
    ) -> Result<Self, HierarchyError> {
        let catalog = Self::with_defaults(defaults)?;
        let mut pending: Vec<&DomainSeed> = seeds.iter().collect();

        while !pending.is_empty() {
            let before = pending.len();
            let mut blocked = Vec::new();
            for seed in pending {
                let parent = match seed.parent.as_deref() {
                    None => None,
                    Some(name) => match catalog.domain_by_name(name) {
                        Some(parent) => Some(parent.id),
                        None => {
                            blocked.push(seed);
                            continue;
                        },
                    },
                };
                catalog.create(NewDomain {
                    name: seed.name.clone(),
                    prefix: seed.prefix.clone(),
                    parent,
                    description: seed.description.clone(),
                    attributes: seed.attributes.clone(),
                })?;
            }
            if blocked.len() == before {
                let seed = blocked[0];
                return Err(HierarchyError::NotFound {
                    message: seed.parent.clone().unwrap_or_default().into(),
                    context: Some(format!("Parent of seed domain {}", seed.name).into()),
                });
            }
            pending = blocked;
        }

        info!(domains = seeds.len(), "Domain catalogue seeded");
        Ok(catalog)
    }

    /// Validates and stores a new domain.
    ///
    /// # Errors
    /// Returns [`HierarchyError::Validation`], [`HierarchyError::DuplicateName`], or
    /// [`HierarchyError::NotFound`] when the parent does not exist.
    pub fn create(&self, new: NewDomain) -> Result<Domain, HierarchyError> {
        let mut state = self.state.write();
        let id = DomainId(state.next_id + 1);
        let domain = Domain {
            id,
            name: new.name.trim().to_owned(),
            prefix: new.prefix,
            parent_id: new.parent,
            description: new.description,
            attributes: new.attributes,
        };

        validate(&state.domains, &domain, &self.defaults)?;
        state.next_id = id.0;
        state.domains.insert(id, domain.clone());

        info!(domain = %domain.name, id = %id, parent = ?domain.parent_id, "Domain created");
        Ok(domain)
    }

    /// Applies `patch` to a domain and, when `recursive`, its inheritable attributes to every
    /// descendant as well.
    ///
    /// # Errors
    /// Returns [`HierarchyError::NotFound`] for an unknown id and a validation error when the
    /// target itself rejects the patch or the result would leave a domain of the subtree with
    /// `valid_from` after `valid_to`; nothing is changed then. Other descendant failures do
    /// not abort the call; they are collected in [`UpdateReport::failed`].
    pub fn update(
        &self,
        id: DomainId,
        patch: &DomainPatch,
        recursive: bool,
    ) -> Result<UpdateReport, HierarchyError> {
        let mut state = self.state.write();
        let mut domains = state.domains.clone();
        let mut target = domains.get(&id).cloned().ok_or_else(|| HierarchyError::not_found(id))?;
        patch.apply(&mut target);
        validate(&domains, &target, &self.defaults)?;
        domains.insert(id, target);

        let mut report = UpdateReport { updated: vec![id], failed: Vec::new() };
        let subtree = descendants_of(&domains, id);
        if recursive {
            let attributes_only = DomainPatch {
                set: patch.set.clone(),
                clear: patch.clear,
                ..DomainPatch::default()
            };
            for descendant in &subtree {
                let Some(mut domain) = domains.get(descendant).cloned() else {
                    continue;
                };
                attributes_only.apply(&mut domain);
                match validate(&domains, &domain, &self.defaults) {
                    Ok(()) => {
                        domains.insert(*descendant, domain);
                        report.updated.push(*descendant);
                    },
                    Err(err) => {
                        warn!(domain = %descendant, error = %err, "Descendant rejected update");
                        report.failed.push((*descendant, err));
                    },
                }
            }
        }

        for descendant in subtree.iter().filter_map(|d| domains.get(d)) {
            let (from, to) = effective_window(&domains, descendant, &self.defaults);
            check_window(from, to).context(format!("Descendant {}", descendant.name))?;
        }
        state.domains = domains;

        debug!(
            domain = %id,
            updated = report.updated.len(),
            failed = report.failed.len(),
            "Domain updated"
        );
        Ok(report)
    }

    /// Removes a domain. With `recursive` its whole subtree goes too; the removed ids are
    /// returned deepest first.
    ///
    /// # Errors
    /// Returns [`HierarchyError::NotFound`] for an unknown id and
    /// [`HierarchyError::HasChildren`] for a non-recursive delete of an inner node.
    pub fn delete(&self, id: DomainId, recursive: bool) -> Result<Vec<DomainId>, HierarchyError> {
        let mut state = self.state.write();
        if !state.domains.contains_key(&id) {
            return Err(HierarchyError::not_found(id));
        }

        let mut removed = descendants_of(&state.domains, id);
        if !removed.is_empty() && !recursive {
            return Err(HierarchyError::HasChildren { domain: id, context: None });
        }
        removed.reverse();
        removed.push(id);
        for domain in &removed {
            state.domains.remove(domain);
        }

        info!(domain = %id, removed = removed.len(), "Domain deleted");
        Ok(removed)
    }

    #[must_use]
    pub fn children(&self, id: DomainId) -> Vec<Domain> {
        self.state.read().domains.values().filter(|d| d.parent_id == Some(id)).cloned().collect()
    }

    /// Every domain below `id`, breadth first.
    #[must_use]
    pub fn descendants(&self, id: DomainId) -> Vec<Domain> {
        let state = self.state.read();
        descendants_of(&state.domains, id)
            .into_iter()
            .filter_map(|d| state.domains.get(&d).cloned())
            .collect()
    }

    /// Ancestors of `id`, root first.
    ///
    /// # Errors
    /// Returns [`HierarchyError::NotFound`] for an unknown id.
    pub fn ancestors(&self, id: DomainId) -> Result<Vec<Domain>, HierarchyError> {
        let domain = self.domain(id).ok_or_else(|| HierarchyError::not_found(id))?;
        ancestor_chain(self, &domain)
    }

    #[must_use]
    pub fn list(&self) -> Vec<Domain> {
        self.state.read().domains.values().cloned().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.state.read().domains.len()
    }
}

impl DomainReader for DomainCatalog {
    fn domain(&self, id: DomainId) -> Option<Domain> {
        self.state.read().domains.get(&id).cloned()
    }

    fn domain_by_name(&self, name: &str) -> Option<Domain> {
        self.state.read().domains.values().find(|d| d.name == name).cloned()
    }

    fn domains(&self) -> Vec<Domain> {
        self.list()
    }
}

fn descendants_of(domains: &BTreeMap<DomainId, Domain>, id: DomainId) -> Vec<DomainId> {
    let mut found = Vec::new();
    let mut seen = FxHashSet::default();
    let mut queue = VecDeque::from([id]);
    seen.insert(id);

    while let Some(current) = queue.pop_front() {
        for child in domains.values().filter(|d| d.parent_id == Some(current)) {
            if seen.insert(child.id) {
                found.push(child.id);
                queue.push_back(child.id);
            }
        }
    }
    found
}

/// Checks the system defaults against the rules every domain's local attributes follow.
///
/// # Errors
/// Returns [`HierarchyError::Validation`] naming the offending default.
pub fn validate_defaults(defaults: &AttributeDefaults) -> Result<(), HierarchyError> {
    let attributes = DomainAttributes {
        alphabet: Some(defaults.alphabet.clone()),
        pseudonym_length: Some(defaults.pseudonym_length),
        check_digit_counts_toward_length: Some(defaults.check_digit_counts_toward_length),
        ..DomainAttributes::default()
    };
    validate_attributes(&attributes)
        .and_then(|()| check_window(defaults.valid_from, defaults.valid_to))
        .context("System defaults")
}

fn validate(
    domains: &BTreeMap<DomainId, Domain>,
    domain: &Domain,
    defaults: &AttributeDefaults,
) -> Result<(), HierarchyError> {
    if domain.name.trim().is_empty() {
        return Err(HierarchyError::invalid("name must not be empty"));
    }
    if domains.values().any(|d| d.id != domain.id && d.name == domain.name) {
        return Err(HierarchyError::DuplicateName { name: domain.name.clone(), context: None });
    }
    if domain.prefix.chars().any(char::is_whitespace) {
        return Err(HierarchyError::invalid(format!(
            "prefix '{}' contains whitespace",
            domain.prefix
        )));
    }

    validate_attributes(&domain.attributes).context(format!("Domain {}", domain.name))?;

    if let Some(parent) = domain.parent_id {
        if parent == domain.id {
            return Err(HierarchyError::Cycle { domain: domain.id, context: None });
        }
        let mut current = domains.get(&parent).ok_or_else(|| HierarchyError::NotFound {
            message: parent.to_string().into(),
            context: Some(format!("Parent of domain {}", domain.name).into()),
        })?;
        let mut seen = FxHashSet::default();
        while let Some(next) = current.parent_id {
            if next == domain.id || !seen.insert(next) {
                return Err(HierarchyError::Cycle { domain: domain.id, context: None });
            }
            current = domains.get(&next).ok_or(HierarchyError::DanglingParent {
                domain: current.id,
                parent: next,
                context: None,
            })?;
        }
    }

    let (from, to) = effective_window(domains, domain, defaults);
    check_window(from, to).context(format!("Domain {}", domain.name))
}

/// Validity bounds of `domain`: per bound, the local value, else the nearest ancestor's, else
/// the default.
fn effective_window(
    domains: &BTreeMap<DomainId, Domain>,
    domain: &Domain,
    defaults: &AttributeDefaults,
) -> (Option<DateTime<Utc>>, Option<DateTime<Utc>>) {
    let mut from = domain.attributes.valid_from;
    let mut to = domain.attributes.valid_to;
    let mut seen = FxHashSet::default();
    let mut next = domain.parent_id;

    while let Some(id) = next {
        if (from.is_some() && to.is_some()) || !seen.insert(id) {
            break;
        }
        let Some(parent) = domains.get(&id) else {
            break;
        };
        from = from.or(parent.attributes.valid_from);
        to = to.or(parent.attributes.valid_to);
        next = parent.parent_id;
    }

    (from.or(defaults.valid_from), to.or(defaults.valid_to))
}

fn check_window(
    from: Option<DateTime<Utc>>,
    to: Option<DateTime<Utc>>,
) -> Result<(), HierarchyError> {
    match (from, to) {
        (Some(from), Some(to)) if from > to => Err(HierarchyError::invalid(format!(
            "effective valid_from {from} is after valid_to {to}"
        ))),
        _ => Ok(()),
    }
}

fn validate_attributes(attrs: &DomainAttributes) -> Result<(), HierarchyError> {
    if let Some(length) = attrs.pseudonym_length {
        let min = if attrs.check_digit_counts_toward_length == Some(true) { 2 } else { 1 };
        if length < min {
            return Err(HierarchyError::invalid(format!(
                "pseudonym_length must be at least {min}, got {length}"
            )));
        }
    }

    if let Some(alphabet) = &attrs.alphabet {
        let count = alphabet.chars().count();
        if count == 0 || count > MAX_ALPHABET_LEN {
            return Err(HierarchyError::invalid(format!(
                "alphabet must hold 1 to {MAX_ALPHABET_LEN} characters, got {count}"
            )));
        }
        let mut seen = FxHashSet::default();
        if let Some(dup) = alphabet.chars().find(|c| !seen.insert(*c)) {
            return Err(HierarchyError::invalid(format!("alphabet repeats '{dup}'")));
        }
    }

    Ok(())
}
