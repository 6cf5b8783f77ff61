/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use proc_macro2::TokenStream;
use quote::quote;
use syn::{DeriveInput, LitStr};

pub(crate) fn derive(input: TokenStream) -> TokenStream {
    match expand(input) {
        Ok(tokens) => tokens,
        Err(err) => err.to_compile_error(),
    }
}

fn expand(input: TokenStream) -> syn::Result<TokenStream> {
    let input: DeriveInput = syn::parse2(input)?;
    let name = entity_name(&input)?;

    let ident = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::dynamodb_single_table::EntityName
            for #ident #ty_generics #where_clause
        {
            const NAME: &'static str = #name;
        }
    })
}

fn entity_name(input: &DeriveInput) -> syn::Result<LitStr> {
    let mut name = None;
    for attr in input.attrs.iter().filter(|a| a.path().is_ident("entity")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("name") {
                name = Some(meta.value()?.parse::<LitStr>()?);
                Ok(())
            } else {
                Err(meta.error("unsupported entity attribute, expected `name`"))
            }
        })?;
    }
    let name = name.unwrap_or_else(|| LitStr::new(&input.ident.to_string(), input.ident.span()));

    let value = name.value();
    if value.is_empty() {
        return Err(syn::Error::new(name.span(), "entity name must not be empty"));
    }
    if !value.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_') {
        return Err(syn::Error::new(
            name.span(),
            "entity names may only contain ASCII letters, digits and '_'",
        ));
    }
    Ok(name)
}
