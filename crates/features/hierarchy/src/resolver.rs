//! Effective configuration of a domain.
//!
//! An attribute set locally on a domain wins. Otherwise the nearest ancestor that sets it
//! *locally* provides the value; ancestors' own resolved values never take part, so an
//! explicit override further up is never masked. Attributes nobody sets fall back to the
//! configured system defaults. Nothing is cached: every call reads the current snapshot, so a
//! change on an ancestor is visible to inheriting descendants on their next resolution.

use crate::error::HierarchyError;
use crate::{DomainReader, ancestor_chain};
use chrono::{DateTime, Utc};
use psn_domain::config::AttributeDefaults;
use psn_domain::{Domain, DomainAttributes, DomainId};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::sync::Arc;

/// Where a resolved value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "domain")]
pub enum ValueSource {
    Local,
    Ancestor(DomainId),
    Default,
}

/// A resolved attribute value and its origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved<T> {
    pub value: T,
    pub source: ValueSource,
}

impl<T> Resolved<T> {
    /// `false` only for values set on the domain itself.
    #[must_use]
    pub const fn inherited(&self) -> bool {
        !matches!(self.source, ValueSource::Local)
    }
}

impl<T: Serialize> Serialize for Resolved<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Resolved", 3)?;
        state.serialize_field("value", &self.value)?;
        state.serialize_field("inherited", &self.inherited())?;
        state.serialize_field("source", &self.source)?;
        state.end()
    }
}

/// Every inheritable attribute of one domain, resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EffectiveConfig {
    pub domain_id: DomainId,
    pub name: String,
    pub prefix: String,
    pub algorithm: Resolved<String>,
    pub alphabet: Resolved<String>,
    pub pseudonym_length: Resolved<usize>,
    pub padding_char: Resolved<char>,
    pub padding_enabled: Resolved<bool>,
    pub add_check_digit: Resolved<bool>,
    pub check_digit_counts_toward_length: Resolved<bool>,
    pub multiple_pseudonyms_allowed: Resolved<bool>,
    pub valid_from: Resolved<Option<DateTime<Utc>>>,
    pub valid_to: Resolved<Option<DateTime<Utc>>>,
    pub enforce_start_date_validity: Resolved<bool>,
    pub enforce_end_date_validity: Resolved<bool>,
    pub salt: Resolved<String>,
    pub consecutive_counter: Resolved<i64>,
}

impl EffectiveConfig {
    /// Whether `at` lies inside the validity window, honouring only the enforced bounds.
    #[must_use]
    pub fn is_valid_at(&self, at: DateTime<Utc>) -> bool {
        let after_start = !self.enforce_start_date_validity.value
            || self.valid_from.value.is_none_or(|from| at >= from);
        let before_end = !self.enforce_end_date_validity.value
            || self.valid_to.value.is_none_or(|to| at <= to);
        after_start && before_end
    }
}

/// Computes [`EffectiveConfig`]s against a set of system defaults.
#[derive(Debug, Clone, Default)]
pub struct DomainConfigResolver {
    defaults: Arc<AttributeDefaults>,
}

impl DomainConfigResolver {
    #[must_use]
    pub fn new(defaults: AttributeDefaults) -> Self {
        Self { defaults: Arc::new(defaults) }
    }

    #[must_use]
    pub fn defaults(&self) -> &AttributeDefaults {
        &self.defaults
    }

    /// Resolves `domain` given its ancestors ordered root first, parent last.
    ///
    /// # Errors
    /// Returns [`HierarchyError::Cycle`] when a domain id repeats in the chain and
    /// [`HierarchyError::DanglingParent`] when the chain does not follow the parent pointers.
    pub fn resolve_effective(
        &self,
        domain: &Domain,
        ancestors: &[Domain],
    ) -> Result<EffectiveConfig, HierarchyError> {
        check_chain(domain, ancestors)?;

        let chain = Chain { domain, ancestors };
        let d = &*self.defaults;

        Ok(EffectiveConfig {
            domain_id: domain.id,
            name: domain.name.clone(),
            prefix: domain.prefix.clone(),
            algorithm: chain.pick(|a| a.algorithm.clone(), || d.algorithm.clone()),
            alphabet: chain.pick(|a| a.alphabet.clone(), || d.alphabet.clone()),
            pseudonym_length: chain.pick(|a| a.pseudonym_length, || d.pseudonym_length),
            padding_char: chain.pick(|a| a.padding_char, || d.padding_char),
            padding_enabled: chain.pick(|a| a.padding_enabled, || d.padding_enabled),
            add_check_digit: chain.pick(|a| a.add_check_digit, || d.add_check_digit),
            check_digit_counts_toward_length: chain.pick(
                |a| a.check_digit_counts_toward_length,
                || d.check_digit_counts_toward_length,
            ),
            multiple_pseudonyms_allowed: chain
                .pick(|a| a.multiple_pseudonyms_allowed, || d.multiple_pseudonyms_allowed),
            valid_from: chain.pick(|a| a.valid_from.map(Some), || d.valid_from),
            valid_to: chain.pick(|a| a.valid_to.map(Some), || d.valid_to),
            enforce_start_date_validity: chain
                .pick(|a| a.enforce_start_date_validity, || d.enforce_start_date_validity),
            enforce_end_date_validity: chain
                .pick(|a| a.enforce_end_date_validity, || d.enforce_end_date_validity),
            salt: chain.pick(|a| a.salt.clone(), || d.salt.clone()),
            consecutive_counter: chain.pick(|a| a.consecutive_counter, || d.consecutive_counter),
        })
    }

    /// Reads `id` and its ancestors from `reader` and resolves it.
    ///
    /// # Errors
    /// Returns [`HierarchyError::NotFound`] for an unknown id, plus the structural errors of
    /// [`ancestor_chain`].
    pub fn resolve<R>(&self, reader: &R, id: DomainId) -> Result<EffectiveConfig, HierarchyError>
    where
        R: DomainReader + ?Sized,
    {
        let domain = reader.domain(id).ok_or_else(|| HierarchyError::not_found(id))?;
        let ancestors = ancestor_chain(reader, &domain)?;
        self.resolve_effective(&domain, &ancestors)
    }

    /// Same as [`Self::resolve`], addressing the domain by name.
    ///
    /// # Errors
    /// See [`Self::resolve`].
    pub fn resolve_by_name<R>(
        &self,
        reader: &R,
        name: &str,
    ) -> Result<EffectiveConfig, HierarchyError>
    where
        R: DomainReader + ?Sized,
    {
        let domain =
            reader.domain_by_name(name).ok_or_else(|| HierarchyError::not_found(name.to_owned()))?;
        let ancestors = ancestor_chain(reader, &domain)?;
        self.resolve_effective(&domain, &ancestors)
    }
}

struct Chain<'a> {
    domain: &'a Domain,
    ancestors: &'a [Domain],
}

impl Chain<'_> {
    fn pick<T>(
        &self,
        local: impl Fn(&DomainAttributes) -> Option<T>,
        default: impl FnOnce() -> T,
    ) -> Resolved<T> {
        if let Some(value) = local(&self.domain.attributes) {
            return Resolved { value, source: ValueSource::Local };
        }
        self.ancestors
            .iter()
            .rev()
            .find_map(|a| {
                local(&a.attributes).map(|value| Resolved {
                    value,
                    source: ValueSource::Ancestor(a.id),
                })
            })
            .unwrap_or_else(|| Resolved { value: default(), source: ValueSource::Default })
    }
}

fn check_chain(domain: &Domain, ancestors: &[Domain]) -> Result<(), HierarchyError> {
    let mut seen = fxhash::FxHashSet::default();
    seen.insert(domain.id);
    if ancestors.iter().any(|a| !seen.insert(a.id)) {
        return Err(HierarchyError::Cycle { domain: domain.id, context: None });
    }

    // Walk child → parent and compare each pointer with the next element up.
    let mut child = domain;
    for parent in ancestors.iter().rev() {
        if child.parent_id != Some(parent.id) {
            return Err(HierarchyError::DanglingParent {
                domain: child.id,
                parent: parent.id,
                context: Some("Ancestor chain does not follow parent pointers".into()),
            });
        }
        child = parent;
    }
    match child.parent_id {
        Some(parent) => Err(HierarchyError::DanglingParent {
            domain: child.id,
            parent,
            context: Some("Ancestor chain stops before the root".into()),
        }),
        None => Ok(()),
    }
}
