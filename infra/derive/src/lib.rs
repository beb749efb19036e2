#![allow(unreachable_pub)]

//! # Macros
//!
//! Procedural macros shared by the `factbase` crates.
//!
//! ## Usage
//! Add the crate as a regular dependency; the generated code refers to `thiserror`,
//! so the consuming crate must depend on it as well:
//! ```toml
//! [dependencies]
//! factbase-derive = { path = "../derive" }
//! thiserror = "2"
//! ```

mod macros;

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

/// Attribute macro for crate-level error enums.
///
/// Turns a plain enum into the error type used across the workspace.
///
/// # Generated Items
///
/// * `#[derive(Debug, thiserror::Error)]` unless already derived.
/// * `Result<T, E = ErrorName>` type alias in the same module.
/// * `<ErrorName>Ext` trait with `.context(...)`, implemented for `Result<T, ErrorName>`
///   and for `Result<T, SourceError>` of every variant wrapping a source.
/// * `From<SourceError>` for every variant with a `source` field (or a field marked
///   `#[source]` / `#[from]`), so `?` converts upstream errors.
/// * A private `format_context` helper for use inside `#[error(...)]` strings.
///
/// # Requirements
///
/// 1. The macro must be applied to an **enum**.
/// 2. Every variant uses named fields and has a `context: Option<Cow<'static, str>>` field.
/// 3. At most one source field per variant.
///
/// # Example
///
/// ```rust,ignore
/// use factbase_derive::store_error;
/// use std::borrow::Cow;
///
/// #[store_error]
/// pub enum LoadError {
///     #[error("Parse failure{}: {source}", format_context(.context))]
///     Parse { source: std::num::ParseIntError, context: Option<Cow<'static, str>> },
///
///     #[error("Missing key{}: {message}", format_context(.context))]
///     Missing { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
/// }
///
/// fn port(raw: &str) -> Result<u16> {
///     raw.parse::<u16>().context("Reading port")
/// }
/// ```
#[proc_macro_attribute]
pub fn store_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    macros::error::expand(input).into()
}
