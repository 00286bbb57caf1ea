use crate::counter::CounterError;
use psn_hierarchy::HierarchyError;
use std::borrow::Cow;

/// Errors of pseudonym generation and issuance.
#[psn_derive::psn_error]
pub enum PseudonymError {
    /// A random strategy or the check digit calculator was given no usable alphabet.
    #[error("Alphabet is empty{}", format_context(.context))]
    EmptyAlphabet { context: Option<Cow<'static, str>> },

    #[error("Invalid generator configuration{}: {message}", format_context(.context))]
    InvalidConfig { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The counter could not be read or persisted; nothing was issued.
    #[error("Counter failure{}: {source}", format_context(.context))]
    Counter { source: CounterError, context: Option<Cow<'static, str>> },

    #[error("Domain hierarchy error{}: {source}", format_context(.context))]
    Hierarchy { source: HierarchyError, context: Option<Cow<'static, str>> },

    #[error("Not found{}: {message}", format_context(.context))]
    NotFound { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The domain's enforced validity window does not contain the current instant.
    #[error("Domain is outside its validity window{}: {message}", format_context(.context))]
    OutsideValidity { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("No path between domains{}: {message}", format_context(.context))]
    NoPath { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Every generation attempt produced a pseudonym already used in the domain.
    #[error("Pseudonym collision after {attempts} attempts{}", format_context(.context))]
    Collision { attempts: usize, context: Option<Cow<'static, str>> },

    #[error("Internal pseudonym error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
