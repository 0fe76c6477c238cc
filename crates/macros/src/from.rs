use proc_macro2::TokenStream;
use synstructure::{BindingInfo, Structure};

/// Implement [`From`] for every variant which has a field marked `#[from]`.
///
/// Such variants must have exactly one field.
pub fn derive_from(s: Structure) -> TokenStream {
    let name = &s.ast().ident;
    let (impl_generics, ty_generics, where_clause) =
        s.ast().generics.split_for_impl();

    let impls = s.variants().iter().filter_map(|v| {
        let from = v.bindings().iter().find(is_from)?;

        if v.bindings().len() != 1 {
            return Some(quote_spanned! { v.ast().ident.span() =>
                compile_error!("#[from] can only be used on variants with \
                    exactly one field");
            });
        }

        let ty = &from.ast().ty;
        let construct = v.construct(|_, _| quote!(value));

        Some(quote! {
            impl #impl_generics From<#ty> for #name #ty_generics #where_clause {
                fn from(value: #ty) -> Self {
                    #construct
                }
            }
        })
    });

    quote!(#(#impls)*)
}

fn is_from(bi: &&BindingInfo) -> bool {
    bi.ast()
        .attrs
        .iter()
        .any(|attr| attr.path.is_ident("from"))
}
