use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod status_fields;

#[proc_macro_derive(StatusFields, attributes(field))]
pub fn derive_status_fields(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match status_fields::expand_status_fields(&input) {
        Ok(tokens) => tokens,
        Err(err) => err.to_compile_error().into(),
    }
}
