use std::collections::HashMap;

use quote::quote;

use crate::attributes::*;
use crate::util::*;

/// A field-less enum viewed as a table of protocol codes.
#[derive(Debug)]
pub(crate) struct CodeTable<'a> {
    ident: &'a syn::Ident,
    entries: Vec<CodeEntry<'a>>,
    fallback: Option<&'a syn::Ident>,
}

#[derive(Debug)]
struct CodeEntry<'a> {
    ident: &'a syn::Ident,
    code: Option<u64>,
    label: String,
}

impl<'a> CodeTable<'a> {
    pub(crate) fn new(input: &'a syn::DeriveInput) -> syn::Result<Self> {
        let data_enum = match &input.data {
            syn::Data::Enum(data_enum) => data_enum,
            _ => return error_at(&input.ident, "only enums can derive Dispatch"),
        };
        if data_enum.variants.is_empty() {
            return error_at(&input.ident, "expected at least one variant");
        }

        let mut entries = Vec::with_capacity(data_enum.variants.len());
        let mut fallback = None;
        let mut seen: HashMap<u64, &syn::Ident> = HashMap::new();

        for variant in &data_enum.variants {
            if !matches!(variant.fields, syn::Fields::Unit) {
                return error_at(variant, "variants of a code table cannot carry data");
            }
            let opts = init_options::<VariantOptions>(&variant.attrs)?;

            if opts.fallback {
                if fallback.is_some() {
                    return error_at(variant, "only one variant can be the fallback");
                }
                if opts.code.is_some() {
                    return error_at(variant, "the fallback variant cannot have a code");
                }
                fallback = Some(&variant.ident);
            } else if opts.code.is_none() {
                return error_at(variant, "expected #[sigdec(code = ...)] or #[sigdec(fallback)]");
            }

            if let Some((code, span)) = opts.code {
                if let Some(prev) = seen.insert(code, &variant.ident) {
                    let msg = format!("code {code} is already used by {prev}");
                    return Err(syn::Error::new(span, msg));
                }
            }

            let label = opts
                .rename
                .unwrap_or_else(|| label_from_ident(&variant.ident));
            entries.push(CodeEntry {
                ident: &variant.ident,
                code: opts.code.map(|(code, _)| code),
                label,
            });
        }

        Ok(CodeTable {
            ident: &input.ident,
            entries,
            fallback,
        })
    }

    pub(crate) fn dispatch_impl(&self) -> proc_macro2::TokenStream {
        let ident = self.ident;
        let coded: Vec<_> = self
            .entries
            .iter()
            .filter_map(|entry| entry.code.map(|code| (entry.ident, code, &entry.label)))
            .collect();

        let values = coded.iter().map(|(_, code, label)| quote!((#code, #label)));
        let from_code_arms = coded
            .iter()
            .map(|(variant, code, _)| quote!(#code => ::std::option::Option::Some(Self::#variant),));
        let code_arms = coded
            .iter()
            .map(|(variant, code, _)| quote!(Self::#variant => ::std::option::Option::Some(#code),));
        let label_arms = self.entries.iter().map(|entry| {
            let variant = entry.ident;
            let label = &entry.label;
            quote!(Self::#variant => #label,)
        });
        let fallback = match self.fallback {
            Some(variant) => quote!(::std::option::Option::Some(Self::#variant)),
            None => quote!(::std::option::Option::None),
        };

        quote! {
            impl sigdec::Dispatch for #ident {
                const VALUES: sigdec::ValueStrings = sigdec::ValueStrings::new(&[#(#values),*]);
                const FALLBACK: ::std::option::Option<Self> = #fallback;

                fn from_code(code: u64) -> ::std::option::Option<Self> {
                    match code {
                        #(#from_code_arms)*
                        _ => ::std::option::Option::None,
                    }
                }

                fn code(&self) -> ::std::option::Option<u64> {
                    match self {
                        #(#code_arms)*
                        #[allow(unreachable_patterns)]
                        _ => ::std::option::Option::None,
                    }
                }

                fn label(&self) -> &'static str {
                    match self {
                        #(#label_arms)*
                    }
                }
            }
        }
    }
}
