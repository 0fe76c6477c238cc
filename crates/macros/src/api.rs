use proc_macro2::{TokenStream, Span};
use syn::{Attribute, Ident, Lit, Meta, MetaList, NestedMeta, spanned::Spanned};
use synstructure::{BindingInfo, Structure, VariantInfo};

#[derive(Debug)]
struct Error(TokenStream);

impl Error {
    fn new(span: Span, message: &str) -> Error {
        Error(quote_spanned! { span =>
            compile_error!(#message);
        })
    }

    fn to_tokens(&self) -> TokenStream {
        self.0.clone()
    }
}

pub fn derive_error(s: Structure) -> TokenStream {
    let resolved = s.variants()
        .iter()
        .map(|v| (v.pat(), Api::of_variant(v)))
        .collect::<Vec<_>>();

    let arms = |select: fn(&Api) -> TokenStream| resolved.iter()
        .map(|(pat, api)| {
            let body = match api {
                Ok(api) => select(api),
                Err(err) => err.to_tokens(),
            };
            quote!(#pat => { #body })
        })
        .collect::<TokenStream>();

    let statuses = arms(Api::status);
    let codes = arms(Api::code);

    s.gen_impl(quote! {
        extern crate actix_web;
        use std::borrow::Cow;

        gen impl ApiError for @Self {
            fn status(&self) -> actix_web::http::StatusCode {
                match *self { #statuses }
            }

            fn code(&self) -> Option<Cow<str>> {
                match *self { #codes }
            }
        }
    })
}

/// How to obtain status and code for a single variant.
enum Api {
    /// Variant is annotated with `#[api(...)]`.
    Attr(ApiAttr),
    /// Variant has no annotation, and its `#[cause]` field describes it.
    Delegate(TokenStream),
}

impl Api {
    fn of_variant(v: &VariantInfo) -> Result<Api, Error> {
        if let Some(meta) = find_api(v.ast().attrs)? {
            return ApiAttr::parse(meta).map(Api::Attr);
        }

        match v.bindings().iter().find(is_cause) {
            Some(cause) => Ok(Api::Delegate(quote!(#cause))),
            None => Err(Error::new(
                v.ast().ident.span(),
                "each variant must be #[api]-annotated or have a #[cause]",
            )),
        }
    }

    fn status(&self) -> TokenStream {
        match self {
            Api::Attr(attr) => attr.status(),
            Api::Delegate(cause) => quote!(#cause.status()),
        }
    }

    fn code(&self) -> TokenStream {
        match self {
            Api::Attr(attr) => attr.code(),
            Api::Delegate(cause) => quote!(#cause.code()),
        }
    }
}

/// Parsed contents of an `#[api(...)]` attribute.
struct ApiAttr {
    code: Option<Lit>,
    status: Option<Ident>,
}

impl ApiAttr {
    fn parse(meta: MetaList) -> Result<ApiAttr, Error> {
        let mut internal = None;
        let mut code = None;
        let mut status = None;

        for item in meta.nested {
            match item {
                NestedMeta::Meta(Meta::Path(ref path)) if path.is_ident("internal") =>
                    internal = Some(item.span()),
                NestedMeta::Meta(Meta::NameValue(ref nv)) if nv.path.is_ident("code") =>
                    code = Some(nv.lit.clone()),
                NestedMeta::Meta(Meta::NameValue(ref nv)) if nv.path.is_ident("status") =>
                    status = Some(match nv.lit {
                        Lit::Str(ref s) => Ident::new(&s.value(), s.span()),
                        _ => return Err(Error::new(
                            nv.lit.span(),
                            "expected a string",
                        )),
                    }),
                _ => return Err(Error::new(
                    item.span(),
                    "expected one of: internal, code, status",
                )),
            }
        }

        if let Some(span) = internal {
            if code.is_some() {
                return Err(Error::new(span, "internal errors can't have codes"));
            }
            if status.is_some() {
                return Err(Error::new(span, "internal errors can't have statuses"));
            }
        }

        Ok(ApiAttr { code, status })
    }

    fn status(&self) -> TokenStream {
        match self.status {
            Some(ref status) => quote!(actix_web::http::StatusCode::#status),
            None => quote!(actix_web::http::StatusCode::INTERNAL_SERVER_ERROR),
        }
    }

    fn code(&self) -> TokenStream {
        match self.code {
            Some(ref code) => quote!(Some(Cow::Borrowed(#code))),
            None => quote!(None),
        }
    }
}

/// Find the single `#[api(...)]` attribute in a list of attributes.
fn find_api(attrs: &[Attribute]) -> Result<Option<MetaList>, Error> {
    let metas = attrs.iter()
        .filter_map(|attr| attr.parse_meta().ok())
        .filter(|meta| meta.path().is_ident("api"))
        .collect::<Vec<_>>();

    let meta = match metas.as_slice() {
        [] => return Ok(None),
        [meta] => meta.clone(),
        [_, extra, ..] => return Err(Error::new(
            extra.span(),
            "api attribute must be used exactly once",
        )),
    };

    match meta {
        Meta::List(ref list) if list.nested.is_empty() => Err(Error::new(
            list.span(),
            "api attribute requires at least one argument",
        )),
        Meta::List(list) => Ok(Some(list)),
        other => Err(Error::new(
            other.span(),
            "api attribute must take a list in parentheses",
        )),
    }
}

fn is_cause(bi: &&BindingInfo) -> bool {
    bi.ast()
        .attrs
        .iter()
        .filter_map(|attr| attr.parse_meta().ok())
        .any(|meta| meta.path().is_ident("cause"))
}
