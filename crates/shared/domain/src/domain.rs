use crate::attributes::{AttributeSet, DomainAttributes};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier of a domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DomainId(pub u64);

impl fmt::Display for DomainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for DomainId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// A node of the domain tree.
///
/// Every pseudonym minted in a domain starts with its `prefix`. Only roots have no parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Domain {
    pub id: DomainId,
    pub name: String,
    pub prefix: String,
    pub parent_id: Option<DomainId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub attributes: DomainAttributes,
}

impl Domain {
    pub fn root(id: impl Into<DomainId>, name: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            prefix: prefix.into(),
            parent_id: None,
            description: None,
            attributes: DomainAttributes::default(),
        }
    }

    pub fn child(
        id: impl Into<DomainId>,
        name: impl Into<String>,
        prefix: impl Into<String>,
        parent: impl Into<DomainId>,
    ) -> Self {
        Self { parent_id: Some(parent.into()), ..Self::root(id, name, prefix) }
    }

    #[must_use]
    pub fn with_attributes(mut self, attributes: DomainAttributes) -> Self {
        self.attributes = attributes;
        self
    }

    #[must_use]
    pub const fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// A partial update of a domain.
///
/// `set` overwrites the attributes it carries, `clear` resets attributes to "inherited".
/// Clearing wins over setting when both name the same attribute.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DomainPatch {
    pub prefix: Option<String>,
    pub description: Option<String>,
    pub set: DomainAttributes,
    pub clear: AttributeSet,
}

impl DomainPatch {
    #[must_use]
    pub fn set(attributes: DomainAttributes) -> Self {
        Self { set: attributes, ..Self::default() }
    }

    #[must_use]
    pub fn clear(attributes: AttributeSet) -> Self {
        Self { clear: attributes, ..Self::default() }
    }

    /// Applies the patch to `domain` in place.
    pub fn apply(&self, domain: &mut Domain) {
        if let Some(prefix) = &self.prefix {
            domain.prefix.clone_from(prefix);
        }
        if let Some(description) = &self.description {
            domain.description = Some(description.clone());
        }
        domain.attributes.overlay(&self.set);
        domain.attributes.clear(self.clear);
    }

    /// Returns whether the patch touches only inheritable attributes.
    #[must_use]
    pub const fn is_attribute_only(&self) -> bool {
        self.prefix.is_none() && self.description.is_none()
    }
}
