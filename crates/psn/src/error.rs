use psn_hierarchy::HierarchyError;
use psn_pseudonym::{CounterError, PseudonymError};
use psn_storage::StorageError;
use std::borrow::Cow;

#[psn_derive::psn_error]
pub enum PsnError {
    #[error("Storage initialisation failed{}: {source}", format_context(.context))]
    Storage { source: StorageError, context: Option<Cow<'static, str>> },

    #[error("Counter store failure{}: {source}", format_context(.context))]
    Counter { source: CounterError, context: Option<Cow<'static, str>> },

    #[error("Domain catalogue error{}: {source}", format_context(.context))]
    Hierarchy { source: HierarchyError, context: Option<Cow<'static, str>> },

    #[error("Pseudonym error{}: {source}", format_context(.context))]
    Pseudonym { source: PseudonymError, context: Option<Cow<'static, str>> },
}
