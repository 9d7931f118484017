//! `#[derive(Flags)]` for commandments.
//!
//! The derive records, for every named field of a struct and in declaration
//! order, the field identifier, the source text of its declared type and the
//! raw `#[flag = "..."]` annotation if one is present. Interpreting any of
//! that (tag splitting, type mapping) is left to the runtime crate so it can
//! report errors by field name instead of failing compilation.
//!
//! ```ignore
//! #[derive(Flags, Serialize, Deserialize, Default)]
//! struct ServeArgs {
//!     #[flag = "port,Port to listen on"]
//!     port: u16,
//!     #[flag = "host"]
//!     host: String,
//!     internal: bool, // no flag
//! }
//! ```

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{ToTokens, quote};
use syn::ext::IdentExt;
use syn::{
    Data, DeriveInput, Expr, ExprLit, Field, Fields, Lit, LitStr, Meta, Type, parse_macro_input,
};

#[proc_macro_derive(Flags, attributes(flag))]
pub fn derive_flags(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    &input.ident,
                    "#[derive(Flags)] requires a struct with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input.ident,
                "#[derive(Flags)] can only be used on structs",
            ));
        }
    };

    let entries = fields
        .iter()
        .map(field_entry)
        .collect::<syn::Result<Vec<_>>>()?;

    let ident = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::commandments::Flags for #ident #ty_generics #where_clause {
            const FIELDS: &'static [::commandments::FieldInfo] = &[
                #(#entries),*
            ];
        }
    })
}

fn field_entry(field: &Field) -> syn::Result<TokenStream2> {
    let Some(ident) = &field.ident else {
        return Err(syn::Error::new_spanned(field, "expected a named field"));
    };
    let name = ident.unraw().to_string();
    let ty = normalize_type(&field.ty);
    let tag = match flag_tag(field)? {
        Some(lit) => quote!(::core::option::Option::Some(#lit)),
        None => quote!(::core::option::Option::None),
    };

    Ok(quote! {
        ::commandments::FieldInfo {
            name: #name,
            ty: #ty,
            tag: #tag,
        }
    })
}

/// Find the single `#[flag = "..."]` attribute on a field.
fn flag_tag(field: &Field) -> syn::Result<Option<LitStr>> {
    let mut found = None;
    for attr in &field.attrs {
        if !attr.path().is_ident("flag") {
            continue;
        }
        if found.is_some() {
            return Err(syn::Error::new_spanned(attr, "duplicate #[flag] attribute"));
        }
        let Meta::NameValue(nv) = &attr.meta else {
            return Err(syn::Error::new_spanned(
                attr,
                r#"expected #[flag = "name,help text"]"#,
            ));
        };
        let Expr::Lit(ExprLit {
            lit: Lit::Str(lit), ..
        }) = &nv.value
        else {
            return Err(syn::Error::new_spanned(
                &nv.value,
                "flag annotation must be a string literal",
            ));
        };
        found = Some(lit.clone());
    }
    Ok(found)
}

/// Render a type as compact source text: `Vec < String >` becomes
/// `Vec<String>`, while spaces between two words (`&'static str`) survive.
fn normalize_type(ty: &Type) -> String {
    let raw = ty.to_token_stream().to_string();
    let chars: Vec<char> = raw.chars().collect();
    let mut out = String::with_capacity(raw.len());

    for (i, &c) in chars.iter().enumerate() {
        if c != ' ' {
            out.push(c);
            continue;
        }
        let prev = i.checked_sub(1).and_then(|j| chars.get(j)).copied();
        let next = chars.get(i + 1).copied();
        if let (Some(p), Some(n)) = (prev, next)
            && is_word(p)
            && is_word(n)
        {
            out.push(' ');
        }
    }
    out
}

fn is_word(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}
