use psn_domain::DomainId;
use std::borrow::Cow;

/// Errors raised while reading or mutating the domain tree.
#[psn_derive::psn_error]
pub enum HierarchyError {
    /// A domain definition breaks one of the data model rules.
    #[error("Invalid domain{}: {message}", format_context(.context))]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Domain not found{}: {message}", format_context(.context))]
    NotFound { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Domain name already in use{}: {name}", format_context(.context))]
    DuplicateName { name: String, context: Option<Cow<'static, str>> },

    /// Non-recursive deletion of a domain that still has children.
    #[error("Domain {domain} has children{}", format_context(.context))]
    HasChildren { domain: DomainId, context: Option<Cow<'static, str>> },

    /// The parent chain of `domain` loops back onto itself.
    #[error("Cycle in the ancestor chain of domain {domain}{}", format_context(.context))]
    Cycle { domain: DomainId, context: Option<Cow<'static, str>> },

    /// `domain` points at a parent that does not exist.
    #[error("Domain {domain} references missing parent {parent}{}", format_context(.context))]
    DanglingParent { domain: DomainId, parent: DomainId, context: Option<Cow<'static, str>> },

    #[error("Internal hierarchy error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl HierarchyError {
    pub(crate) fn not_found(what: impl std::fmt::Display) -> Self {
        Self::NotFound { message: what.to_string().into(), context: None }
    }

    pub(crate) fn invalid(message: impl Into<Cow<'static, str>>) -> Self {
        Self::Validation { message: message.into(), context: None }
    }
}
