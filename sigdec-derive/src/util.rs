use once_cell::sync::Lazy;
use regex::Regex;
use syn::spanned::Spanned;

pub(crate) fn error_at<T>(tok: &impl Spanned, msg: &str) -> syn::Result<T> {
    Err(syn::Error::new(tok.span(), msg))
}

fn literal<'a>(option: &str, expr: &'a syn::Expr) -> syn::Result<&'a syn::Lit> {
    match expr {
        syn::Expr::Lit(expr) => Ok(&expr.lit),
        other => error_at(other, &format!("`{option}` takes a literal value")),
    }
}

/// A wire code. Hex, octal and binary literals are accepted.
pub(crate) fn code_value(option: &str, expr: &syn::Expr) -> syn::Result<(u64, proc_macro2::Span)> {
    match literal(option, expr)? {
        syn::Lit::Int(lit) => Ok((lit.base10_parse()?, lit.span())),
        other => error_at(other, &format!("`{option}` takes an unsigned integer")),
    }
}

pub(crate) fn label_value(option: &str, expr: &syn::Expr) -> syn::Result<String> {
    match literal(option, expr)? {
        syn::Lit::Str(lit) if lit.value().trim().is_empty() => {
            error_at(lit, "label must not be blank")
        }
        syn::Lit::Str(lit) => Ok(lit.value()),
        other => error_at(other, &format!("`{option}` takes a string")),
    }
}

pub(crate) fn switch_value(option: &str, expr: &syn::Expr) -> syn::Result<bool> {
    match literal(option, expr)? {
        syn::Lit::Bool(lit) => Ok(lit.value),
        other => error_at(other, &format!("`{option}` takes `true` or `false`")),
    }
}

/// Words of an identifier: runs of capitals with their lowercase tail, or lowercase runs.
static WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Z]+[a-z0-9]*|[a-z0-9]+").expect("word pattern is valid"));

/// The default label of a variant, e.g. `"Data Burst Indication"` for `DataBurstIndication`.
pub(crate) fn label_from_ident(ident: &syn::Ident) -> String {
    title_case(&ident.to_string())
}

fn title_case(name: &str) -> String {
    let words: Vec<String> = WORD
        .find_iter(name)
        .map(|word| {
            let mut chars = word.as_str().chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect();
    words.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variant_names_become_labels() {
        assert_eq!(title_case("ServiceOptionRequest"), "Service Option Request");
        assert_eq!(title_case("Ports16"), "Ports16");
        assert_eq!(title_case("alert_with_info"), "Alert With Info");
        assert_eq!(title_case("RCsch"), "RCsch");
        assert_eq!(title_case("Ludt"), "Ludt");
    }

    #[test]
    fn literals_are_checked_per_option() {
        let expr: syn::Expr = syn::parse_quote!(0x14);
        assert_eq!(code_value("code", &expr).unwrap().0, 20);

        let expr: syn::Expr = syn::parse_quote!("twenty");
        let err = code_value("code", &expr).unwrap_err();
        assert_eq!(err.to_string(), "`code` takes an unsigned integer");

        let expr: syn::Expr = syn::parse_quote!(" ");
        assert!(label_value("rename", &expr).is_err());

        let expr: syn::Expr = syn::parse_quote!(yes);
        let err = switch_value("fallback", &expr).unwrap_err();
        assert_eq!(err.to_string(), "`fallback` takes a literal value");
    }
}
