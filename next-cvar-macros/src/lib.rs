//! Proc macros for the next-cvar crate.
//!
//! This crate provides the `#[derive(CVarGroup)]` macro

use proc_macro::TokenStream;
use quote::quote;
use syn::{
    Data, DeriveInput, Expr, Fields, Ident, Lit, LitStr, parse_macro_input, spanned::Spanned,
};

/// Struct-level options parsed from `#[cvar(...)]`.
struct GroupOptions {
    prefix: Option<String>,
}

impl GroupOptions {
    fn from_attrs(attrs: &[syn::Attribute]) -> syn::Result<Self> {
        let mut prefix = None;

        for attr in attrs {
            if attr.path().is_ident("cvar") {
                attr.parse_nested_meta(|meta| {
                    if meta.path.is_ident("prefix") {
                        prefix = Some(string_value(&meta.value()?.parse::<Expr>()?, "prefix")?);
                    } else {
                        return Err(syn::Error::new(
                            meta.path.span(),
                            format!("unknown cvar group attribute: {:?}", meta.path.get_ident()),
                        ));
                    }
                    Ok(())
                })?;
            }
        }

        Ok(Self { prefix })
    }
}

/// Field-level options parsed from `#[cvar(...)]`.
struct FieldOptions {
    name: Option<String>,
    default: Expr,
    description: String,
    flags: Vec<Ident>,
    min: Option<Expr>,
    max: Option<Expr>,
}

impl FieldOptions {
    fn from_field(field: &syn::Field) -> syn::Result<Self> {
        let mut name = None;
        let mut default = None;
        let mut description = String::new();
        let mut flags = Vec::new();
        let mut min = None;
        let mut max = None;

        for attr in &field.attrs {
            if attr.path().is_ident("cvar") {
                attr.parse_nested_meta(|meta| {
                    let path = &meta.path;
                    if path.is_ident("name") {
                        name = Some(string_value(&meta.value()?.parse::<Expr>()?, "name")?);
                    } else if path.is_ident("default") {
                        default = Some(meta.value()?.parse::<Expr>()?);
                    } else if path.is_ident("description") {
                        description = string_value(&meta.value()?.parse::<Expr>()?, "description")?;
                    } else if path.is_ident("min") {
                        min = Some(meta.value()?.parse::<Expr>()?);
                    } else if path.is_ident("max") {
                        max = Some(meta.value()?.parse::<Expr>()?);
                    } else if let Some(flag) = flag_const(path) {
                        flags.push(Ident::new(flag, path.span()));
                    } else {
                        return Err(syn::Error::new(
                            path.span(),
                            format!("unknown cvar attribute: {:?}", path.get_ident()),
                        ));
                    }
                    Ok(())
                })?;
            }
        }

        let default = default.ok_or_else(|| {
            syn::Error::new(
                field.span(),
                "missing required attribute: #[cvar(default = ...)]",
            )
        })?;

        Ok(Self {
            name,
            default,
            description,
            flags,
            min,
            max,
        })
    }
}

fn flag_const(path: &syn::Path) -> Option<&'static str> {
    if path.is_ident("archive") {
        Some("ARCHIVE")
    } else if path.is_ident("read_only") {
        Some("READ_ONLY")
    } else if path.is_ident("hidden") {
        Some("HIDDEN")
    } else if path.is_ident("advanced") {
        Some("ADVANCED")
    } else {
        None
    }
}

fn string_value(value: &Expr, what: &str) -> syn::Result<String> {
    if let Expr::Lit(expr_lit) = value {
        if let Lit::Str(lit_str) = &expr_lit.lit {
            return Ok(lit_str.value());
        }
        return Err(syn::Error::new(
            expr_lit.span(),
            format!("{what} must be a string"),
        ));
    }
    Err(syn::Error::new(value.span(), format!("{what} must be a literal")))
}

/// Derive macro for the `CVarGroup` trait.
///
/// Every field must be a `Handle<T>` carrying a `#[cvar(default = ...)]`
/// attribute. Entry names default to the field name, prefixed with
/// `prefix.` when the struct has `#[cvar(prefix = "...")]`.
///
/// ```rust,ignore
/// use next_cvar::{CVarGroup, Handle};
///
/// #[derive(CVarGroup)]
/// #[cvar(prefix = "audio")]
/// struct AudioSettings {
///     #[cvar(default = 0.8, description = "Master volume", archive, min = 0.0, max = 1.0)]
///     volume: Handle<f64>,
///     #[cvar(name = "audio.device", default = "default", archive)]
///     device: Handle<String>,
/// }
/// ```
///
/// This expands to roughly:
///
/// ```rust,ignore
/// impl next_cvar::CVarGroup for AudioSettings {
///     fn bind(registry: &next_cvar::Registry) -> next_cvar::Result<Self> {
///         Ok(Self {
///             volume: next_cvar::Handle::declare_with(
///                 registry, "audio.volume", 0.8.into(), "Master volume",
///                 next_cvar::CVarFlags::empty().union(next_cvar::CVarFlags::ARCHIVE),
///                 Some(next_cvar::Bound::from(0.0)), Some(next_cvar::Bound::from(1.0)),
///             )?,
///             // ...
///         })
///     }
/// }
/// ```
#[proc_macro_derive(CVarGroup, attributes(cvar))]
pub fn derive_cvar_group(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match derive_cvar_group_impl(input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn derive_cvar_group_impl(input: DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let group = GroupOptions::from_attrs(&input.attrs)?;
    let ident = &input.ident;

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            other => {
                return Err(syn::Error::new(
                    other.span(),
                    "CVarGroup requires a struct with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new(
                input.span(),
                "CVarGroup can only be derived for structs",
            ));
        }
    };

    let mut inits = Vec::with_capacity(fields.len());
    for field in fields {
        let field_ident = field
            .ident
            .as_ref()
            .ok_or_else(|| syn::Error::new(field.span(), "expected a named field"))?;
        let options = FieldOptions::from_field(field)?;

        let name = match (&options.name, &group.prefix) {
            (Some(name), _) => name.clone(),
            (None, Some(prefix)) => format!("{prefix}.{field_ident}"),
            (None, None) => field_ident.to_string(),
        };
        let name = LitStr::new(&name, field_ident.span());
        let description = LitStr::new(&options.description, field_ident.span());
        let default = &options.default;
        let flags = options.flags.iter();
        let min = bound_tokens(options.min.as_ref());
        let max = bound_tokens(options.max.as_ref());

        inits.push(quote! {
            #field_ident: ::next_cvar::Handle::declare_with(
                registry,
                #name,
                ::core::convert::Into::into(#default),
                #description,
                ::next_cvar::CVarFlags::empty() #( .union(::next_cvar::CVarFlags::#flags) )*,
                #min,
                #max,
            )?
        });
    }

    Ok(quote! {
        impl ::next_cvar::CVarGroup for #ident {
            fn bind(registry: &::next_cvar::Registry) -> ::next_cvar::Result<Self> {
                ::core::result::Result::Ok(Self {
                    #( #inits, )*
                })
            }
        }
    })
}

fn bound_tokens(bound: Option<&Expr>) -> proc_macro2::TokenStream {
    match bound {
        Some(expr) => quote! {
            ::core::option::Option::Some(::next_cvar::Bound::from(#expr))
        },
        None => quote! { ::core::option::Option::None },
    }
}
