use syn::punctuated::Punctuated;
use syn::Token;

use crate::util::*;

pub(crate) trait OptionBuilder {
    fn add_option(&mut self, meta: &syn::Meta) -> syn::Result<()>;
}

/// Builds up a set of options from every `#[sigdec(...)]` attribute in the list.
pub(crate) fn init_options<T>(attrs: &[syn::Attribute]) -> syn::Result<T>
where
    T: OptionBuilder + Default,
{
    let mut opts = T::default();
    for meta in get_meta_items(attrs)? {
        opts.add_option(&meta)?;
    }
    Ok(opts)
}

const META_CODE: &str = "code";
const META_RENAME: &str = "rename";
const META_FALLBACK: &str = "fallback";

/// Options for one variant of a code table.
#[derive(Debug, Clone, Default)]
pub(crate) struct VariantOptions {
    pub(crate) code: Option<(u64, proc_macro2::Span)>,
    pub(crate) rename: Option<String>,
    pub(crate) fallback: bool,
}

impl OptionBuilder for VariantOptions {
    fn add_option(&mut self, meta: &syn::Meta) -> syn::Result<()> {
        match meta {
            syn::Meta::Path(path) if path.is_ident(META_FALLBACK) => {
                self.fallback = true;
            }
            syn::Meta::NameValue(nv) if nv.path.is_ident(META_CODE) => {
                if self.code.is_some() {
                    return error_at(meta, "code specified more than once");
                }
                self.code = Some(code_value(META_CODE, &nv.value)?);
            }
            syn::Meta::NameValue(nv) if nv.path.is_ident(META_RENAME) => {
                self.rename = Some(label_value(META_RENAME, &nv.value)?);
            }
            syn::Meta::NameValue(nv) if nv.path.is_ident(META_FALLBACK) => {
                self.fallback = switch_value(META_FALLBACK, &nv.value)?;
            }
            _ => return error_at(meta, "unrecognized attribute"),
        }
        Ok(())
    }
}

fn get_meta_items(attrs: &[syn::Attribute]) -> syn::Result<Vec<syn::Meta>> {
    let mut ret = Vec::new();
    for attr in get_sigdec_attrs(attrs) {
        let nested = attr.parse_args_with(Punctuated::<syn::Meta, Token![,]>::parse_terminated)?;
        ret.extend(nested);
    }
    Ok(ret)
}

fn get_sigdec_attrs(attrs: &[syn::Attribute]) -> impl Iterator<Item = &syn::Attribute> {
    attrs.iter().filter(|attr| attr.path().is_ident("sigdec"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn variant_opts(variant: syn::Variant) -> syn::Result<VariantOptions> {
        init_options::<VariantOptions>(&variant.attrs)
    }

    #[test]
    fn parses_code_and_rename() {
        let variant: syn::Variant = syn::parse_quote! {
            #[sigdec(code = 0x11, rename = "General Page")]
            GeneralPageRequest
        };
        let opts = variant_opts(variant).unwrap();
        assert_eq!(opts.code.map(|(code, _)| code), Some(17));
        assert_eq!(opts.rename.as_deref(), Some("General Page"));
        assert!(!opts.fallback);
    }

    #[test]
    fn parses_fallback_across_attributes() {
        let variant: syn::Variant = syn::parse_quote! {
            #[sigdec(fallback)]
            #[sigdec(rename = "Reserved")]
            Reserved
        };
        let opts = variant_opts(variant).unwrap();
        assert!(opts.fallback);
        assert!(opts.code.is_none());
        assert_eq!(opts.rename.as_deref(), Some("Reserved"));
    }

    #[test]
    fn ignores_foreign_attributes() {
        let variant: syn::Variant = syn::parse_quote! {
            #[doc = "Unit data"]
            #[sigdec(code = 9)]
            Udt
        };
        let opts = variant_opts(variant).unwrap();
        assert_eq!(opts.code.map(|(code, _)| code), Some(9));
    }

    #[test]
    fn rejects_bad_options() {
        let tests: Vec<syn::Variant> = vec![
            syn::parse_quote! { #[sigdec(code = "nine")] Udt },
            syn::parse_quote! { #[sigdec(code = 1, code = 2)] Udt },
            syn::parse_quote! { #[sigdec(rename = " ")] Udt },
            syn::parse_quote! { #[sigdec(bits = 4)] Udt },
            syn::parse_quote! { #[sigdec(code = -1)] Udt },
        ];
        for variant in tests {
            assert!(variant_opts(variant).is_err());
        }
    }
}
