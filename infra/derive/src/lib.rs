#![allow(unreachable_pub)]
#![allow(clippy::needless_pass_by_value)]

//! # Macros
//!
//! Procedural macros shared by the bootkit crates.
//!
//! ## Usage
//! Every crate in the workspace depends on this one to declare its error enum:
//! ```toml
//! [dependencies]
//! bootkit-derive.workspace = true
//! thiserror.workspace = true
//! ```

mod error;

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

/// Attribute macro for defining crate-level error enums.
///
/// # Features
///
/// * **Automatic Derives**: Injects `#[derive(Debug, thiserror::Error)]` unless already present.
/// * **Context Support**: Generates a companion `<Name>Ext` trait that adds `.context()`
///   to results carrying this error, or any upstream error wrapped by one of its variants.
/// * **Standard Conversions**: Implements `From<T>` for variants holding a `source` field,
///   so `?` lifts upstream errors.
/// * **Internal Fallback**: `From<&'static str>` and `From<String>` when an `Internal` variant exists.
/// * **Kind**: `kind()` returns the variant name, useful for structured log fields.
///
/// # Requirements
///
/// 1. Only enums are accepted.
/// 2. Variants use named fields; tuple and unit variants are rejected.
/// 3. A context field must be typed `Option<Cow<'static, str>>`.
/// 4. A variant with a `source` field must also carry a `context` field.
///
/// # Example
///
/// ```rust,ignore
/// use std::borrow::Cow;
///
/// #[bootkit_derive::bootkit_error]
/// pub enum SettingsError {
///     #[error("Setting not found{}: {key}", format_context(.context))]
///     NotFound { key: Cow<'static, str>, context: Option<Cow<'static, str>> },
///
///     #[error("Config error{}: {source}", format_context(.context))]
///     Config { source: config::ConfigError, context: Option<Cow<'static, str>> },
/// }
///
/// fn port(cfg: &config::Config) -> Result<u16, SettingsError> {
///     cfg.get::<u16>("server.port").context("Reading server port")
/// }
/// ```
#[proc_macro_attribute]
pub fn bootkit_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    error::expand(input).into()
}
