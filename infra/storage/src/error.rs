use std::borrow::Cow;

#[psn_derive::psn_error]
pub enum StorageError {
    #[error("Entry not found{}: {message}", format_context(.context))]
    NotFound { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Path escapes the storage root{}: {message}", format_context(.context))]
    PathTraversalAttempt { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Invalid namespace{}: {message}", format_context(.context))]
    InvalidNamespace { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Storage I/O failure{}: {source}", format_context(.context))]
    Io { source: std::io::Error, context: Option<Cow<'static, str>> },
}
