use fxhash::FxHashSet;
use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{
    Data, DeriveInput, Field, Fields, GenericArgument, Ident, PathArguments, PathSegment, Type,
    Variant,
};

struct SourceField<'a> {
    ident: &'a Ident,
    ty: &'a Type,
}

struct ErrorVariant<'a> {
    ident: &'a Ident,
    source: Option<SourceField<'a>>,
}

pub fn expand(input: DeriveInput) -> TokenStream {
    try_expand(&input).unwrap_or_else(syn::Error::into_compile_error)
}

fn try_expand(input: &DeriveInput) -> syn::Result<TokenStream> {
    let Data::Enum(data) = &input.data else {
        return Err(syn::Error::new_spanned(&input.ident, "store_error can only be applied to enums"));
    };
    if data.variants.is_empty() {
        return Err(syn::Error::new_spanned(&input.ident, "store_error needs at least one variant"));
    }

    let variants = data.variants.iter().map(inspect_variant).collect::<syn::Result<Vec<_>>>()?;

    let name = &input.ident;
    let ext = format_ident!("{}Ext", name);
    let derives = missing_derives(input);

    let context_arms = variants.iter().map(|v| {
        let ident = v.ident;
        quote! { #name::#ident { context: slot, .. } => *slot = Some(context.into()), }
    });
    let conversions = variants.iter().filter_map(|v| conversion(name, &ext, v));

    Ok(quote! {
        #derives
        #input

        pub type Result<T, E = #name> = ::std::result::Result<T, E>;

        pub trait #ext<T> {
            fn context(
                self,
                context: impl Into<::std::borrow::Cow<'static, str>>,
            ) -> ::std::result::Result<T, #name>;
        }

        #[automatically_derived]
        impl<T> #ext<T> for ::std::result::Result<T, #name> {
            #[inline]
            fn context(self, context: impl Into<::std::borrow::Cow<'static, str>>) -> Self {
                self.map_err(|mut err| {
                    match &mut err {
                        #( #context_arms )*
                    }
                    err
                })
            }
        }

        #( #conversions )*

        #[allow(dead_code, clippy::ref_option)]
        fn format_context(
            context: &Option<::std::borrow::Cow<'static, str>>,
        ) -> ::std::borrow::Cow<'static, str> {
            context.as_ref().map_or(::std::borrow::Cow::Borrowed(""), |c| {
                ::std::borrow::Cow::Owned(format!(" ({c})"))
            })
        }
    })
}

fn inspect_variant(variant: &Variant) -> syn::Result<ErrorVariant<'_>> {
    let Fields::Named(fields) = &variant.fields else {
        return Err(syn::Error::new_spanned(
            variant,
            "store_error variants need named fields for source/context handling",
        ));
    };

    let context = fields.named.iter().find(|f| has_name(f, "context")).ok_or_else(|| {
        syn::Error::new_spanned(
            &variant.ident,
            "store_error variants need a `context: Option<Cow<'static, str>>` field",
        )
    })?;
    if !is_context_type(&context.ty) {
        return Err(syn::Error::new_spanned(
            &context.ty,
            "context field must be Option<Cow<'static, str>>",
        ));
    }

    let mut sources = fields.named.iter().filter(|f| is_source(f));
    let source = sources.next();
    if let Some(extra) = sources.next() {
        return Err(syn::Error::new_spanned(extra, "store_error variants take one source at most"));
    }
    if source.is_some() && fields.named.len() != 2 {
        return Err(syn::Error::new_spanned(
            &variant.ident,
            "variants with a source may only carry the source and `context`",
        ));
    }

    let source = source.and_then(|f| f.ident.as_ref().map(|ident| SourceField { ident, ty: &f.ty }));
    Ok(ErrorVariant { ident: &variant.ident, source })
}

fn conversion(name: &Ident, ext: &Ident, variant: &ErrorVariant<'_>) -> Option<TokenStream> {
    let SourceField { ident: field, ty } = variant.source.as_ref()?;
    let ident = variant.ident;

    Some(quote! {
        #[automatically_derived]
        impl From<#ty> for #name {
            #[inline]
            fn from(#field: #ty) -> Self { Self::#ident { #field, context: None } }
        }

        #[automatically_derived]
        impl<T> #ext<T> for ::std::result::Result<T, #ty> {
            #[inline]
            fn context(
                self,
                context: impl Into<::std::borrow::Cow<'static, str>>,
            ) -> ::std::result::Result<T, #name> {
                self.map_err(|#field| #name::#ident { #field, context: Some(context.into()) })
            }
        }
    })
}

fn missing_derives(input: &DeriveInput) -> TokenStream {
    let mut derived = FxHashSet::default();
    for attr in input.attrs.iter().filter(|a| a.path().is_ident("derive")) {
        let _ = attr.parse_nested_meta(|meta| {
            if let Some(segment) = meta.path.segments.last() {
                derived.insert(segment.ident.to_string());
            }
            Ok(())
        });
    }

    let mut missing = Vec::new();
    if !derived.contains("Debug") {
        missing.push(quote! { Debug });
    }
    if !derived.contains("Error") {
        missing.push(quote! { ::thiserror::Error });
    }

    if missing.is_empty() { quote! {} } else { quote! { #[derive(#(#missing),*)] } }
}

fn has_name(field: &Field, name: &str) -> bool {
    field.ident.as_ref().is_some_and(|ident| ident == name)
}

fn is_source(field: &Field) -> bool {
    has_name(field, "source")
        || field.attrs.iter().any(|a| a.path().is_ident("source") || a.path().is_ident("from"))
}

fn last_segment(ty: &Type) -> Option<&PathSegment> {
    let Type::Path(path) = ty else {
        return None;
    };
    path.path.segments.last()
}

fn is_context_type(ty: &Type) -> bool {
    let Some(option) = last_segment(ty) else {
        return false;
    };
    if option.ident != "Option" {
        return false;
    }
    let PathArguments::AngleBracketed(args) = &option.arguments else {
        return false;
    };
    let mut args = args.args.iter();
    match (args.next(), args.next()) {
        (Some(GenericArgument::Type(inner)), None) => is_static_cow_str(inner),
        _ => false,
    }
}

fn is_static_cow_str(ty: &Type) -> bool {
    let Some(cow) = last_segment(ty) else {
        return false;
    };
    if cow.ident != "Cow" {
        return false;
    }
    let PathArguments::AngleBracketed(args) = &cow.arguments else {
        return false;
    };
    let mut args = args.args.iter();
    match (args.next(), args.next(), args.next()) {
        (Some(GenericArgument::Lifetime(lt)), Some(GenericArgument::Type(inner)), None) => {
            lt.ident == "static" && last_segment(inner).is_some_and(|s| s.ident == "str")
        },
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::expand;
    use syn::{DeriveInput, parse_quote};

    fn expanded(input: DeriveInput) -> String {
        expand(input).to_string()
    }

    #[test]
    fn test_generates_alias_context_trait_and_from() {
        let out = expanded(parse_quote! {
            pub enum DemoError {
                #[error("io{}: {source}", format_context(.context))]
                Io { source: std::io::Error, context: Option<Cow<'static, str>> },
                #[error("gone{}: {message}", format_context(.context))]
                Gone { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
            }
        });

        assert!(out.contains("pub type Result"), "missing Result alias: {out}");
        assert!(out.contains("pub trait DemoErrorExt"), "missing context trait: {out}");
        assert!(out.contains("impl From"), "missing From: {out}");
        assert!(out.contains("thiserror"), "missing thiserror derive: {out}");
        assert!(!out.contains("compile_error"), "unexpected error: {out}");
    }

    #[test]
    fn test_existing_derives_are_not_duplicated() {
        let out = expanded(parse_quote! {
            #[derive(Debug)]
            pub enum DemoError {
                Gone { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
            }
        });

        assert_eq!(out.matches("Debug").count(), 1, "Debug derived twice: {out}");
    }

    #[test]
    fn test_rejects_structs() {
        let out = expanded(parse_quote! {
            pub struct NotAnEnum { context: Option<Cow<'static, str>> }
        });
        assert!(out.contains("compile_error"));
        assert!(out.contains("only be applied to enums"));
    }

    #[test]
    fn test_rejects_tuple_variants() {
        let out = expanded(parse_quote! {
            pub enum DemoError { Io(std::io::Error) }
        });
        assert!(out.contains("named fields"));
    }

    #[test]
    fn test_rejects_missing_context() {
        let out = expanded(parse_quote! {
            pub enum DemoError { Io { #[source] inner: std::io::Error } }
        });
        assert!(out.contains("need a `context"));
    }

    #[test]
    fn test_rejects_wrong_context_type() {
        let out = expanded(parse_quote! {
            pub enum DemoError { Gone { message: String, context: Option<String> } }
        });
        assert!(out.contains("context field must be"));
    }

    #[test]
    fn test_rejects_source_with_extra_fields() {
        let out = expanded(parse_quote! {
            pub enum DemoError {
                Io {
                    source: std::io::Error,
                    path: String,
                    context: Option<Cow<'static, str>>,
                },
            }
        });
        assert!(out.contains("may only carry the source"));
    }
}
