//! Attribute macros for phasespec.
//!
//! - `#[spec]`: turns an inherent impl block into a spec by implementing `phasespec::Spec` for the type.
//!
//! Inside the block, methods are registered as phase operations by tagging them with a phase
//! attribute. Any spelling from the phase registry works (`#[given]`, `#[setup]`, `#[then]`, `#[it]`,
//! `#[after]`, ...). Other markers:
//!
//! - `#[skip]` next to a phase attribute: the operation is reported as skipped and never runs
//! - `#[construct]`: the zero-argument constructor (returns `Self` or `Result<Self, E>`); without one the
//!   subject is built with `Default`
//! - `#[spec(name = "...")]` overrides the spec name, `#[spec(skip)]` skips the whole spec
//!
//! # Example
//! ```ignore
//! #[derive(Default)]
//! struct GutterGame { game: Game }
//!
//! #[spec]
//! impl GutterGame {
//!     #[when]
//!     fn all_balls_land_in_the_gutter(&mut self) {
//!         self.game.roll_many(20, 0);
//!     }
//!
//!     #[then("the score is zero")]
//!     fn score_is_zero(&mut self) -> Result<(), AssertionFailure> {
//!         this(self.game.score()).should().equal(0)
//!     }
//! }
//! ```
//!
//! Descriptions default to the method name with `_` replaced by spaces.

use phasespec_core::{PhaseKind, describe_identifier, phases};
use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::meta::ParseNestedMeta;
use syn::spanned::Spanned;
use syn::{Attribute, FnArg, ImplItem, ImplItemFn, ItemImpl, LitStr, Meta, ReturnType, Type, parse_macro_input};

/// Implements `phasespec::Spec` for the type of an inherent impl block.
#[proc_macro_attribute]
pub fn spec(attr: TokenStream, item: TokenStream) -> TokenStream {
    let mut args = SpecArgs::default();
    let parser = syn::meta::parser(|meta| args.parse(meta));
    parse_macro_input!(attr with parser);
    let mut item = parse_macro_input!(item as ItemImpl);

    expand(args, &mut item)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

#[derive(Debug, Default)]
struct SpecArgs {
    name: Option<String>,
    skip: bool,
}

impl SpecArgs {
    fn parse(&mut self, meta: ParseNestedMeta<'_>) -> syn::Result<()> {
        if meta.path.is_ident("name") {
            self.name = Some(meta.value()?.parse::<LitStr>()?.value());
            Ok(())
        } else if meta.path.is_ident("skip") {
            self.skip = true;
            Ok(())
        } else {
            Err(meta.error("unsupported spec argument; expected `name = \"...\"` or `skip`"))
        }
    }
}

/// What the markers on one method asked for.
#[derive(Default)]
struct MethodMarkers {
    phase: Option<(PhaseKind, Option<String>)>,
    skip: bool,
    construct: bool,
}

fn expand(args: SpecArgs, item: &mut ItemImpl) -> syn::Result<TokenStream2> {
    if let Some((_, path, _)) = &item.trait_ {
        return Err(syn::Error::new_spanned(path, "#[spec] goes on an inherent impl block"));
    }

    let mut operations = Vec::new();
    let mut constructor: Option<TokenStream2> = None;

    for impl_item in &mut item.items {
        let ImplItem::Fn(method) = impl_item else {
            continue;
        };
        let markers = take_markers(&mut method.attrs)?;

        if markers.construct {
            if markers.phase.is_some() {
                return Err(syn::Error::new_spanned(
                    &method.sig,
                    "a constructor cannot also be a phase operation",
                ));
            }
            if constructor.is_some() {
                return Err(syn::Error::new_spanned(&method.sig, "only one #[construct] method is allowed"));
            }
            constructor = Some(constructor_call(method)?);
            continue;
        }

        match markers.phase {
            Some((kind, description)) => operations.push(operation(method, kind, description, markers.skip)?),
            None if markers.skip => {
                return Err(syn::Error::new_spanned(
                    &method.sig,
                    "#[skip] needs a phase attribute such as #[then]",
                ));
            }
            None => {}
        }
    }

    let construct_body = constructor.unwrap_or_else(|| {
        quote! { ::core::result::Result::Ok(<Self as ::core::default::Default>::default()) }
    });
    let name_fn = args.name.map(|name| {
        quote! {
            fn name() -> ::std::string::String {
                ::std::string::String::from(#name)
            }
        }
    });
    let skipped_fn = args.skip.then(|| {
        quote! {
            fn skipped() -> bool {
                true
            }
        }
    });

    let self_ty = &item.self_ty;
    let (impl_generics, _, where_clause) = item.generics.split_for_impl();
    let spec_impl = quote! {
        impl #impl_generics ::phasespec::Spec for #self_ty #where_clause {
            #name_fn
            #skipped_fn

            fn construct() -> ::core::result::Result<Self, ::phasespec::PhaseError> {
                #construct_body
            }

            fn declare(spec: ::phasespec::SpecBuilder<Self>) -> ::phasespec::SpecBuilder<Self> {
                spec #(.operation(#operations))*
            }
        }
    };

    Ok(quote! {
        #item
        #spec_impl
    })
}

/// Remove the phasespec markers from `attrs` and report what they asked for.
fn take_markers(attrs: &mut Vec<Attribute>) -> syn::Result<MethodMarkers> {
    let mut markers = MethodMarkers::default();
    let mut kept = Vec::with_capacity(attrs.len());

    for attr in attrs.drain(..) {
        let Some(ident) = attr.path().get_ident().map(ToString::to_string) else {
            kept.push(attr);
            continue;
        };
        if ident == "skip" {
            markers.skip = true;
        } else if ident == "construct" {
            markers.construct = true;
        } else if let Some(kind) = phases::from_str(&ident) {
            if markers.phase.is_some() {
                return Err(syn::Error::new_spanned(&attr, "a method can carry only one phase attribute"));
            }
            markers.phase = Some((kind, phase_description(&attr)?));
        } else {
            kept.push(attr);
        }
    }

    *attrs = kept;
    Ok(markers)
}

/// `#[then]` has no description; `#[then("the score is zero")]` carries one.
fn phase_description(attr: &Attribute) -> syn::Result<Option<String>> {
    match &attr.meta {
        Meta::Path(_) => Ok(None),
        Meta::List(_) => Ok(Some(attr.parse_args::<LitStr>()?.value())),
        Meta::NameValue(_) => Err(syn::Error::new_spanned(
            attr,
            "expected #[phase] or #[phase(\"description\")]",
        )),
    }
}

fn operation(
    method: &ImplItemFn,
    kind: PhaseKind,
    description: Option<String>,
    skip: bool,
) -> syn::Result<TokenStream2> {
    let sig = &method.sig;
    let ident = &sig.ident;

    match sig.inputs.first() {
        Some(FnArg::Receiver(receiver)) if receiver.reference.is_some() => {}
        _ => {
            return Err(syn::Error::new(
                sig.span(),
                "phase operations take `&mut self` (or `&self`), optionally followed by `&mut Output`",
            ));
        }
    }
    let takes_output = match sig.inputs.len() {
        1 => false,
        2 => true,
        _ => {
            return Err(syn::Error::new_spanned(
                &sig.inputs,
                "phase operations take at most one argument besides `self`",
            ));
        }
    };

    let description = description.unwrap_or_else(|| describe_identifier(&ident.to_string()));
    let variant = format_ident!("{}", variant_name(kind));
    let (output, call) = if takes_output {
        (quote!(out), quote!(Self::#ident(subject, out)))
    } else {
        (quote!(_out), quote!(Self::#ident(subject)))
    };

    let operation = quote! {
        ::phasespec::PhaseOperation::new(
            ::phasespec::PhaseKind::#variant,
            #description,
            |subject: &mut Self, #output: &mut ::phasespec::Output| {
                ::phasespec::IntoPhaseResult::into_phase_result(#call)
            },
        )
    };
    Ok(if skip { quote!(#operation.skip()) } else { operation })
}

fn variant_name(kind: PhaseKind) -> &'static str {
    match kind {
        PhaseKind::Setup => "Setup",
        PhaseKind::Action => "Action",
        PhaseKind::Collect => "Collect",
        PhaseKind::Assert => "Assert",
        PhaseKind::Cleanup => "Cleanup",
    }
}

fn constructor_call(method: &ImplItemFn) -> syn::Result<TokenStream2> {
    let sig = &method.sig;
    if !sig.inputs.is_empty() {
        return Err(syn::Error::new_spanned(
            &sig.inputs,
            "a #[construct] method takes no arguments",
        ));
    }
    let ident = &sig.ident;
    let returns_self = match &sig.output {
        ReturnType::Type(_, ty) => matches!(&**ty, Type::Path(path) if path.qself.is_none() && path.path.is_ident("Self")),
        ReturnType::Default => {
            return Err(syn::Error::new_spanned(sig, "a #[construct] method must return the subject"));
        }
    };

    Ok(if returns_self {
        quote! { ::core::result::Result::Ok(Self::#ident()) }
    } else {
        quote! { ::phasespec::IntoSubject::into_subject(Self::#ident()) }
    })
}
