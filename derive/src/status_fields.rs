use std::collections::HashSet;

use proc_macro::TokenStream;
use quote::quote;
use syn::{
    Data, DeriveInput, Error, ExprClosure, Field, Fields, Ident, LitStr, Meta, Result, Token,
    parse::{Parse, ParseStream},
    spanned::Spanned,
};

pub(crate) fn expand_status_fields(input: &DeriveInput) -> Result<TokenStream> {
    let Data::Struct(data) = &input.data else {
        Err(Error::new(
            input.span(),
            "`StatusFields` may only be derived on structs.",
        ))?
    };

    let Fields::Named(fields) = &data.fields else {
        Err(Error::new(
            input.span(),
            "`StatusFields` may only be derived on structs with named fields.",
        ))?
    };

    let fields = fields
        .named
        .iter()
        .map(FieldMetadata::parse)
        .map(Result::transpose)
        .flatten() // Skip fields without an attribute.
        .collect::<Result<Vec<_>>>()?;

    let mut keys = HashSet::new();
    for field in &fields {
        if !keys.insert(field.key.value()) {
            Err(Error::new(field.key.span(), "Field names must be unique."))?
        }
    }

    let insertions = fields.iter().map(|field| {
        let FieldMetadata { name, key, handler } = field;

        let value = if let Some(handler) = handler {
            quote! { (#handler)(value) }
        } else {
            quote! { value }
        };

        quote! {
            {
                let value = self.#name;
                status.insert(#key, #value);
            }
        }
    });

    let name = &input.ident;

    let expanded = quote! {
        impl ::fgc_statussrv::avec::StatusFields for #name {
            fn add_fields(&self, status: &mut ::fgc_statussrv::DeviceStatus) {
                #(#insertions)*
            }
        }
    };

    Ok(expanded.into())
}

#[derive(Debug)]
struct FieldMetadata {
    name: Ident,
    key: LitStr,
    handler: Option<ExprClosure>,
}

impl FieldMetadata {
    fn parse(field: &Field) -> Result<Option<Self>> {
        let name = field.ident.clone().unwrap();

        let Some(attr) = field.attrs.iter().find(|a| a.path().is_ident("field")) else {
            return Ok(None);
        };

        let (key, handler) = match &attr.meta {
            Meta::Path(_) => {
                let key = name.to_string().trim_start_matches("r#").to_uppercase();
                (LitStr::new(&key, name.span()), None)
            }
            Meta::List(list) => {
                let FieldAttribute { key, handler } = list.parse_args()?;
                (key, handler)
            }
            Meta::NameValue(_) => Err(Error::new_spanned(
                attr,
                "Field attribute must be `#[field]` or `#[field(\"NAME\")]`.",
            ))?,
        };

        if key.value().is_empty() {
            Err(Error::new(key.span(), "Field name must not be empty."))?
        }

        Ok(Some(Self { name, key, handler }))
    }
}

#[derive(Debug)]
struct FieldAttribute {
    key: LitStr,
    handler: Option<ExprClosure>,
}

impl Parse for FieldAttribute {
    fn parse(input: ParseStream) -> Result<Self> {
        let key = input.parse::<LitStr>()?;

        let handler = if !input.is_empty() {
            input.parse::<Token![,]>()?;
            Some(input.parse::<ExprClosure>()?)
        } else {
            None
        };

        Ok(Self { key, handler })
    }
}
