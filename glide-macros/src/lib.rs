use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, parse_quote, Data, DeriveInput, Fields, GenericParam, Index};

/// Derive macro implementing `glide::Tween` by interpolating every field.
///
/// Every field type must itself implement `Tween`. Works on structs with
/// named fields, tuple structs and unit structs.
///
/// # Example
/// ```ignore
/// #[derive(Clone, Tween)]
/// struct Insets {
///     left: f32,
///     right: f32,
///     top: f32,
///     bottom: f32,
/// }
///
/// let half = Insets::lerp(&zero, &ten, 0.5);
/// ```
#[proc_macro_derive(Tween)]
pub fn derive_tween(input: TokenStream) -> TokenStream {
    let mut input = parse_macro_input!(input as DeriveInput);

    let name = &input.ident;

    let data = match &input.data {
        Data::Struct(data) => data,
        _ => {
            return syn::Error::new_spanned(&input.ident, "Tween can only be derived for structs")
                .to_compile_error()
                .into();
        }
    };

    let body = match &data.fields {
        Fields::Named(fields) => {
            let inits = fields.named.iter().map(|field| {
                let field_name = &field.ident;
                quote! {
                    #field_name: ::glide::Tween::lerp(&from.#field_name, &to.#field_name, t)
                }
            });
            quote! { Self { #(#inits,)* } }
        }
        Fields::Unnamed(fields) => {
            let inits = (0..fields.unnamed.len()).map(|i| {
                let index = Index::from(i);
                quote! { ::glide::Tween::lerp(&from.#index, &to.#index, t) }
            });
            quote! { Self(#(#inits,)*) }
        }
        Fields::Unit => quote! { Self },
    };

    // Every type parameter has to be tweenable for the field-wise lerp to typecheck
    for param in input.generics.params.iter_mut() {
        if let GenericParam::Type(type_param) = param {
            type_param.bounds.push(parse_quote!(::glide::Tween));
        }
    }
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let expanded = quote! {
        impl #impl_generics ::glide::Tween for #name #ty_generics #where_clause {
            #[allow(unused_variables)]
            fn lerp(from: &Self, to: &Self, t: f32) -> Self {
                #body
            }
        }
    };

    TokenStream::from(expanded)
}
