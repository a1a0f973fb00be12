//! Procedural macros for the `formwork` binding engine.
use darling::ast::Data;
use darling::{FromDeriveInput, FromField};
use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{parse_macro_input, DeriveInput};

/// The `#[bind(...)]` annotations attached to one field.
#[derive(FromField)]
#[darling(attributes(bind))]
struct BindField {
    ident: Option<syn::Ident>,
    ty: syn::Type,
    /// The key under the `form` namespace, if any.
    #[darling(default)]
    form: Option<String>,
    /// The key under the `param` namespace, if any.
    #[darling(default)]
    param: Option<String>,
    /// A strptime-style layout, consulted only for timestamp fields.
    #[darling(default)]
    date_format: Option<String>,
}

#[derive(FromDeriveInput)]
#[darling(attributes(bind), supports(struct_named))]
struct BindInput {
    ident: syn::Ident,
    generics: syn::Generics,
    data: Data<darling::util::Ignored, BindField>,
}

/// One field that resolved to a non-suppressed key in some namespace.
struct ResolvedField {
    ident: syn::Ident,
    ty: syn::Type,
    key: String,
    date_format: Option<String>,
}

/// Derive `formwork::binding::Bind` for a named struct.
///
/// For each field and namespace (`form`, `param`): no annotation means the
/// field is skipped; a key that trims to the empty string or to the literal
/// `-` suppresses it; anything else becomes an entry of the compile-time
/// field table, with the trimmed key.
#[proc_macro_derive(Bind, attributes(bind))]
pub fn derive_bind(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match BindInput::from_derive_input(&input) {
        Ok(parsed) => expand(parsed).into(),
        Err(e) => e.write_errors().into(),
    }
}

fn expand(input: BindInput) -> TokenStream2 {
    let fields = input
        .data
        .take_struct()
        .expect("`supports(struct_named)` guarantees a struct")
        .fields;

    let form = resolve(&fields, |f| f.form.as_deref());
    let param = resolve(&fields, |f| f.param.as_deref());

    let form_table = form.iter().map(table_entry);
    let param_table = param.iter().map(table_entry);
    let form_stmts = form.iter().map(bind_stmt);
    let param_stmts = param.iter().map(bind_stmt);

    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    quote! {
        #[automatically_derived]
        impl #impl_generics ::formwork::binding::Bind for #name #ty_generics #where_clause {
            fn bindings(
                namespace: ::formwork::binding::Namespace,
            ) -> &'static [::formwork::binding::FieldBinding] {
                const FORM: &[::formwork::binding::FieldBinding] = &[#(#form_table),*];
                const PARAM: &[::formwork::binding::FieldBinding] = &[#(#param_table),*];
                match namespace {
                    ::formwork::binding::Namespace::Form => FORM,
                    ::formwork::binding::Namespace::Param => PARAM,
                }
            }

            fn bind(
                &mut self,
                source: &::formwork::binding::ValueSource,
                namespace: ::formwork::binding::Namespace,
            ) -> ::core::result::Result<(), ::formwork::binding::BindError> {
                match namespace {
                    ::formwork::binding::Namespace::Form => { #(#form_stmts)* }
                    ::formwork::binding::Namespace::Param => { #(#param_stmts)* }
                }
                ::core::result::Result::Ok(())
            }
        }
    }
}

/// Collect the fields whose annotation under one namespace resolves to a
/// usable key.
fn resolve<'f>(
    fields: &'f [BindField],
    annotation: impl Fn(&'f BindField) -> Option<&'f str>,
) -> Vec<ResolvedField> {
    fields
        .iter()
        .filter_map(|field| {
            let key = annotation(field)?.trim();
            if key.is_empty() || key == "-" {
                return None;
            }
            let ident = field
                .ident
                .clone()
                .expect("`supports(struct_named)` guarantees named fields");
            Some(ResolvedField {
                ident,
                ty: field.ty.clone(),
                key: key.to_owned(),
                date_format: field.date_format.clone(),
            })
        })
        .collect()
}

fn aux_tokens(field: &ResolvedField) -> TokenStream2 {
    let date_format = match &field.date_format {
        Some(layout) => quote! { ::core::option::Option::Some(#layout) },
        None => quote! { ::core::option::Option::None },
    };
    quote! {
        ::formwork::binding::FieldAux { date_format: #date_format }
    }
}

fn table_entry(field: &ResolvedField) -> TokenStream2 {
    let field_name = field.ident.to_string();
    let key = &field.key;
    let aux = aux_tokens(field);
    quote! {
        ::formwork::binding::FieldBinding {
            field: #field_name,
            key: #key,
            aux: #aux,
        }
    }
}

fn bind_stmt(field: &ResolvedField) -> TokenStream2 {
    let ident = &field.ident;
    let ty = &field.ty;
    let key = &field.key;
    let aux = aux_tokens(field);
    quote! {
        if let ::core::option::Option::Some(value) =
            <#ty as ::formwork::binding::Materialize>::materialize(source, #key, &#aux)?
        {
            self.#ident = value;
        }
    }
}
