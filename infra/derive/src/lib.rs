#![allow(unreachable_pub)]
#![allow(clippy::needless_pass_by_value)]

//! # Macros
//!
//! Procedural macros shared by the pseudonymization workspace.
//!
//! ## Usage
//! ```toml
//! [dependencies]
//! psn-derive.workspace = true
//! thiserror.workspace = true
//! ```
//!
//! The examples below are `ignore`d to avoid compiling in this crate; the consuming crates'
//! `error.rs` modules are the reference usage.

mod macros;

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

/// Attribute macro for defining the error enum of a crate.
///
/// # Features
///
/// * **Automatic Derives**: Injects `#[derive(Debug, thiserror::Error)]` unless already present.
/// * **Context Support**: Generates a companion `...Ext` trait that adds `.context()`
///   to any `Result` that can be converted into this error type.
/// * **Standard Conversions**: Implements `From<T>` for variants containing a `source` field
///   (or a field marked `#[source]`/`#[from]`), enabling `?` on upstream errors.
/// * **Internal Fallback**: Provides `From<&'static str>` and `From<String>` when an
///   `Internal` variant is present.
/// * **Introspection**: Generates `kind()` (the variant name, for structured log fields) and
///   `context_str()` (the attached context, if any).
///
/// # Requirements
///
/// 1. The macro must be applied to an **enum**.
/// 2. Variants that support context must include a `context: Option<Cow<'static, str>>` field.
/// 3. Variants wrapping external errors must also carry a context field.
/// 4. Tuple or unit variants are rejected to keep error wiring explicit.
///
/// # Example
///
/// ```rust,ignore
/// use std::borrow::Cow;
///
/// #[psn_derive::psn_error]
/// pub enum CounterError {
///     #[error("Counter storage failure{}: {source}", format_context(.context))]
///     Storage { source: psn_storage::StorageError, context: Option<Cow<'static, str>> },
///
///     #[error("Internal counter error{}: {message}", format_context(.context))]
///     Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
/// }
///
/// fn load() -> Result<i64, CounterError> {
///     let bytes = storage.read("7").await.context("Reading counter of domain 7")?;
///     parse(&bytes).ok_or_else(|| "Counter file is corrupt".into())
/// }
/// ```
#[proc_macro_attribute]
pub fn psn_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    macros::error::expand_derive(input).into()
}
