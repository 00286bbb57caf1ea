use psn_domain::DomainId;
use psn_storage::StorageError;
use std::borrow::Cow;

#[psn_derive::psn_error]
pub enum CounterError {
    #[error("Counter storage failure{}: {source}", format_context(.context))]
    Storage { source: StorageError, context: Option<Cow<'static, str>> },

    /// The persisted value is not a decimal `i64`.
    #[error("Corrupt counter for domain {domain}{}: {message}", format_context(.context))]
    Corrupt { domain: DomainId, message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Counter of domain {domain} overflowed{}", format_context(.context))]
    Overflow { domain: DomainId, context: Option<Cow<'static, str>> },

    #[error("Internal counter error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
