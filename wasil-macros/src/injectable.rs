use darling::ast::Data;
use darling::util::{Ignored, PathList};
use darling::{Error, FromDeriveInput, FromField};
use proc_macro2::TokenStream;
use quote::quote;
use syn::{DeriveInput, GenericArgument, Generics, Ident, Path, PathArguments, Type};
use wasil_support::tag;

#[derive(FromDeriveInput)]
#[darling(attributes(inject), supports(struct_named, struct_unit))]
struct InjectableInput {
    ident: Ident,
    generics: Generics,
    data: Data<Ignored, InjectField>,
    #[darling(default)]
    provides: PathList,
}

#[derive(FromField)]
#[darling(attributes(inject))]
struct InjectField {
    ident: Option<Ident>,
    ty: Type,
    #[darling(default)]
    named: Option<String>,
    #[darling(default)]
    tag: Option<String>,
    #[darling(default)]
    skip: bool,
}

/// A field the generated `inject_fields` fills.
struct Dependency<'a> {
    ident: &'a Ident,
    handle: &'a Type,
    namespace: String,
}

impl InjectField {
    fn has_directive(&self) -> bool {
        self.named.is_some() || self.tag.is_some()
    }

    /// Namespace from `named = "..."` or from the `named` key of `tag`.
    fn namespace(&self) -> darling::Result<String> {
        match (&self.named, &self.tag) {
            (Some(_), Some(_)) => Err(Error::custom("use either `named` or `tag`, not both").with_span(&self.ty)),
            (Some(named), None) => Ok(named.clone()),
            (None, Some(raw)) => {
                let parsed = tag::parse(raw).map_err(|err| Error::custom(err.to_string()).with_span(&self.ty))?;
                Ok(parsed.namespace().unwrap_or_default().to_string())
            }
            (None, None) => Ok(String::new()),
        }
    }

    fn dependency(&self) -> darling::Result<Option<Dependency<'_>>> {
        let Some(ident) = self.ident.as_ref() else {
            return Ok(None);
        };

        if self.skip {
            if self.has_directive() {
                return Err(Error::custom("`skip` cannot be combined with `named` or `tag`").with_span(ident));
            }
            return Ok(None);
        }

        match shared_handle(&self.ty) {
            Some(handle) => Ok(Some(Dependency {
                ident,
                handle,
                namespace: self.namespace()?,
            })),
            None if self.has_directive() => {
                Err(Error::custom("only fields of type `Option<Arc<_>>` can be injected").with_span(&self.ty))
            }
            None => Ok(None),
        }
    }
}

/// Returns `Arc<X>` for a field of type `Option<Arc<X>>`.
fn shared_handle(ty: &Type) -> Option<&Type> {
    let inner = single_argument(ty, "Option")?;
    single_argument(inner, "Arc").map(|_| inner)
}

fn single_argument<'a>(ty: &'a Type, wrapper: &str) -> Option<&'a Type> {
    let Type::Path(path) = ty else {
        return None;
    };
    if path.qself.is_some() {
        return None;
    }

    let segment = path.path.segments.last()?;
    if segment.ident != wrapper {
        return None;
    }

    let PathArguments::AngleBracketed(arguments) = &segment.arguments else {
        return None;
    };
    match arguments.args.iter().collect::<Vec<_>>().as_slice() {
        [GenericArgument::Type(inner)] => Some(inner),
        _ => None,
    }
}

pub(crate) fn expand(input: &DeriveInput) -> darling::Result<TokenStream> {
    let InjectableInput {
        ident,
        generics,
        data,
        provides,
    } = InjectableInput::from_derive_input(input)?;

    let fields = data
        .take_struct()
        .ok_or_else(|| Error::unsupported_shape("only structs with named fields or unit structs are injectable").with_span(&ident))?;

    let mut errors = Error::accumulator();
    let dependencies: Vec<Dependency<'_>> = fields
        .fields
        .iter()
        .filter_map(|field| errors.handle(field.dependency()).flatten())
        .collect();
    errors.finish()?;

    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let injections = dependencies.iter().map(|dependency| {
        let Dependency {
            ident,
            handle,
            namespace,
        } = dependency;
        quote! {
            if self.#ident.is_none() {
                self.#ident = injector.resolve_field::<#handle>(::core::stringify!(#ident), #namespace)?;
            }
        }
    });

    let capabilities = capability_methods(&provides);

    Ok(quote! {
        impl #impl_generics ::wasil::Injectable for #ident #ty_generics #where_clause {
            fn inject_fields(&mut self, injector: &mut ::wasil::Injector<'_>) -> ::wasil::Result<()> {
                let _ = &injector;
                #(#injections)*
                Ok(())
            }

            #capabilities
        }

        impl #impl_generics ::wasil::Reflect for #ident #ty_generics #where_clause {
            fn type_info() -> ::wasil::TypeInfo {
                ::wasil::TypeInfo::structure::<Self>()
            }
        }
    })
}

/// `provides` and `upcast` for the declared capabilities.
fn capability_methods(provides: &[Path]) -> TokenStream {
    if provides.is_empty() {
        return TokenStream::new();
    }

    let checks = provides.iter().map(|capability| {
        quote! {
            capability == ::core::any::TypeId::of::<::std::sync::Arc<dyn #capability>>()
        }
    });
    let casts = provides.iter().map(|capability| {
        quote! {
            if capability == ::core::any::TypeId::of::<::std::sync::Arc<dyn #capability>>() {
                return Some(::wasil::Provided::new(this as ::std::sync::Arc<dyn #capability>));
            }
        }
    });

    quote! {
        fn provides(capability: ::core::any::TypeId) -> bool {
            false #(|| #checks)*
        }

        fn upcast(
            this: ::std::sync::Arc<Self>,
            capability: ::core::any::TypeId,
        ) -> Option<::wasil::Provided> {
            #(#casts)*
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    fn field(input: DeriveInput) -> InjectField {
        let Data::Struct(fields) = InjectableInput::from_derive_input(&input).unwrap().data else {
            panic!("Expected a struct");
        };
        fields.fields.into_iter().next().unwrap()
    }

    #[test]
    fn detects_shared_handles() {
        let ty: Type = parse_quote!(Option<Arc<dyn Logger>>);
        assert!(shared_handle(&ty).is_some());

        let ty: Type = parse_quote!(Option<std::sync::Arc<Database>>);
        assert!(shared_handle(&ty).is_some());

        let rejected: [Type; 4] = [
            parse_quote!(Arc<Database>),
            parse_quote!(Option<Box<Database>>),
            parse_quote!(Option<i32>),
            parse_quote!(Vec<Arc<Database>>),
        ];
        for ty in rejected {
            assert!(shared_handle(&ty).is_none());
        }
    }

    #[test]
    fn namespace_from_named_and_tag() {
        let named = field(parse_quote! {
            struct S { #[inject(named = "one")] a: Option<Arc<A>> }
        });
        assert_eq!(named.namespace().unwrap(), "one");

        let tagged = field(parse_quote! {
            struct S { #[inject(tag = "optional; named: two")] a: Option<Arc<A>> }
        });
        assert_eq!(tagged.namespace().unwrap(), "two");

        let plain = field(parse_quote! {
            struct S { a: Option<Arc<A>> }
        });
        assert_eq!(plain.namespace().unwrap(), "");
    }

    #[test]
    fn rejects_conflicting_directives() {
        let both = field(parse_quote! {
            struct S { #[inject(named = "one", tag = "named:two")] a: Option<Arc<A>> }
        });
        assert!(both.namespace().is_err());

        let bad_tag = field(parse_quote! {
            struct S { #[inject(tag = ":two")] a: Option<Arc<A>> }
        });
        assert!(bad_tag.namespace().is_err());

        let skipped = field(parse_quote! {
            struct S { #[inject(skip, named = "one")] a: Option<Arc<A>> }
        });
        assert!(skipped.dependency().is_err());
    }

    #[test]
    fn non_handle_fields_are_ignored_unless_configured() {
        let plain = field(parse_quote! {
            struct S { count: i32 }
        });
        assert!(plain.dependency().unwrap().is_none());

        let configured = field(parse_quote! {
            struct S { #[inject(named = "one")] count: i32 }
        });
        assert!(configured.dependency().is_err());
    }

    #[test]
    fn expansion_covers_dependencies_and_capabilities() {
        let input: DeriveInput = parse_quote! {
            #[inject(provides(Logger, crate::audit::Auditor))]
            struct FileLogger {
                #[inject(named = "disk")]
                sink: Option<Arc<dyn Sink>>,
                #[inject(skip)]
                fallback: Option<Arc<dyn Sink>>,
                level: u8,
            }
        };
        let expanded = expand(&input).unwrap().to_string();

        assert!(expanded.contains("resolve_field"));
        assert!(expanded.contains("\"disk\""));
        assert!(!expanded.contains("self . fallback"));
        assert!(expanded.contains("dyn Logger"));
        assert!(expanded.contains("dyn crate :: audit :: Auditor"));
    }

    #[test]
    fn unit_struct_expands_to_empty_injection() {
        let input: DeriveInput = parse_quote! {
            #[inject(provides(Clock))]
            struct Leaf;
        };
        let expanded = expand(&input).unwrap().to_string();

        assert!(expanded.contains("fn inject_fields"));
        assert!(!expanded.contains("resolve_field"));
        assert!(expanded.contains("dyn Clock"));
        assert!(expanded.contains("TypeInfo :: structure"));
    }

    #[test]
    fn rejects_tuple_structs() {
        let input: DeriveInput = parse_quote! {
            struct Wrapper(Option<Arc<Database>>);
        };
        assert!(expand(&input).is_err());
    }
}
