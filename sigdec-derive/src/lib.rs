//! This crate provides the derive macros for `sigdec`.

use proc_macro::TokenStream;

mod attributes;
mod model;
mod util;

use crate::model::CodeTable;

/// Turns a field-less enum into a protocol code table.
///
/// Every variant is either assigned a wire code with `#[sigdec(code = N)]`, or marked as the
/// catch-all with `#[sigdec(fallback)]`. Labels default to the variant name in title case and can
/// be overridden with `#[sigdec(rename = "...")]`.
///
/// # Example
///
/// ```ignore
/// #[derive(Clone, Copy, Debug, PartialEq, Eq, sigdec::Dispatch)]
/// enum Channel {
///     #[sigdec(code = 0, rename = "r-csch")]
///     RCsch,
///     #[sigdec(code = 1, rename = "f-csch")]
///     FCsch,
///     #[sigdec(fallback)]
///     Unknown,
/// }
/// ```
#[proc_macro_derive(Dispatch, attributes(sigdec))]
pub fn derive_dispatch(input: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(input as syn::DeriveInput);
    let ret = CodeTable::new(&input)
        .map(|table| table.dispatch_impl())
        .unwrap_or_else(|e| e.to_compile_error());
    ret.into()
}
