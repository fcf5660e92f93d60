//! Document derive macro implementation
//!
//! Reads `#[document(...)]` on the struct (model name, namespace,
//! embeddable flag, attributes, indices) and on its fields (the state field
//! and one memo field per association), then emits the `Model` impl and the
//! typed accessors for every association.

use proc_macro::TokenStream;
use proc_macro2::{Ident, TokenStream as TokenStream2};
use quote::{format_ident, quote};
use syn::{
    parse::Result, parse_macro_input, Data, DeriveInput, Error, Field, Fields, GenericArgument,
    LitStr, PathArguments, PathSegment, Type,
};

/// Main implementation function for the Document derive
pub fn document_impl(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match expand(&input) {
        Ok(result) => result.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

/// Struct-level options
#[derive(Debug, Default)]
struct ModelOptions {
    name: Option<String>,
    namespace: Option<String>,
    embeddable: bool,
    attributes: Vec<String>,
    indices: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Reference,
    Referenced,
    Collection,
    Embed,
    EmbedCollection,
}

impl Kind {
    fn from_ident(ident: &str) -> Option<Self> {
        match ident {
            "reference" => Some(Kind::Reference),
            "referenced" => Some(Kind::Referenced),
            "collection" => Some(Kind::Collection),
            "embed" => Some(Kind::Embed),
            "embed_collection" => Some(Kind::EmbedCollection),
            _ => None,
        }
    }

    /// Container expected inside `Memo<...>`
    fn container(self) -> &'static str {
        match self {
            Kind::Collection | Kind::EmbedCollection => "Vec",
            Kind::Reference | Kind::Referenced | Kind::Embed => "Option",
        }
    }
}

/// One association field
#[derive(Debug)]
struct AssociationField {
    field: Ident,
    kind: Kind,
    target_type: Type,
    target: String,
    reverse: Option<String>,
}

/// Classified struct fields
#[derive(Debug)]
struct DocumentFields {
    state: Ident,
    associations: Vec<AssociationField>,
    others: Vec<Ident>,
}

fn expand(input: &DeriveInput) -> Result<TokenStream2> {
    if !input.generics.params.is_empty() {
        return Err(Error::new_spanned(
            &input.generics,
            "#[derive(Document)] does not support generic structs",
        ));
    }

    let options = parse_model_options(input)?;
    let fields = parse_fields(input)?;

    let model_impl = generate_model_impl(&input.ident, &options, &fields);
    let accessors = generate_accessors(&input.ident, &fields);

    Ok(quote! {
        #model_impl

        #accessors
    })
}

fn parse_model_options(input: &DeriveInput) -> Result<ModelOptions> {
    let mut options = ModelOptions::default();

    for attr in input.attrs.iter().filter(|attr| attr.path().is_ident("document")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("name") {
                options.name = Some(meta.value()?.parse::<LitStr>()?.value());
            } else if meta.path.is_ident("namespace") {
                options.namespace = Some(meta.value()?.parse::<LitStr>()?.value());
            } else if meta.path.is_ident("embeddable") {
                options.embeddable = true;
            } else if meta.path.is_ident("attribute") {
                options.attributes.push(meta.value()?.parse::<LitStr>()?.value());
            } else if meta.path.is_ident("index") {
                options.indices.push(meta.value()?.parse::<LitStr>()?.value());
            } else {
                return Err(meta.error(
                    "unsupported document option; expected name, namespace, embeddable, attribute or index",
                ));
            }
            Ok(())
        })?;
    }

    Ok(options)
}

fn parse_fields(input: &DeriveInput) -> Result<DocumentFields> {
    let named = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(Error::new_spanned(
                    &input.ident,
                    "#[derive(Document)] requires a struct with named fields",
                ))
            }
        },
        _ => {
            return Err(Error::new_spanned(
                &input.ident,
                "#[derive(Document)] can only be applied to structs",
            ))
        }
    };

    let mut state = None;
    let mut associations = Vec::new();
    let mut others = Vec::new();

    for field in named {
        let Some(ident) = field.ident.clone() else {
            continue;
        };

        match parse_field(field)? {
            FieldRole::State => {
                if state.replace(ident).is_some() {
                    return Err(Error::new_spanned(field, "only one state field is allowed"));
                }
            }
            FieldRole::Association { kind, target, reverse } => {
                let target_type = memo_target_type(&field.ty, kind)?;
                let target = match target {
                    Some(target) => target,
                    None => type_name(&target_type)?,
                };
                associations.push(AssociationField {
                    field: ident,
                    kind,
                    target_type,
                    target,
                    reverse,
                });
            }
            FieldRole::Other => others.push(ident),
        }
    }

    let state = state.ok_or_else(|| {
        Error::new_spanned(
            &input.ident,
            "#[derive(Document)] requires a `DocumentState` field (or one marked #[document(state)])",
        )
    })?;

    Ok(DocumentFields {
        state,
        associations,
        others,
    })
}

enum FieldRole {
    State,
    Association {
        kind: Kind,
        target: Option<String>,
        reverse: Option<String>,
    },
    Other,
}

fn parse_field(field: &Field) -> Result<FieldRole> {
    let mut is_state = false;
    let mut kind = None;
    let mut target = None;
    let mut reverse = None;

    for attr in field.attrs.iter().filter(|attr| attr.path().is_ident("document")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("state") {
                is_state = true;
            } else if meta.path.is_ident("target") {
                target = Some(meta.value()?.parse::<LitStr>()?.value());
            } else if meta.path.is_ident("reverse") {
                reverse = Some(meta.value()?.parse::<LitStr>()?.value());
            } else if let Some(found) = meta.path.get_ident().and_then(|i| Kind::from_ident(&i.to_string())) {
                if kind.replace(found).is_some() {
                    return Err(meta.error("a field can declare only one association"));
                }
            } else {
                return Err(meta.error(
                    "unsupported field option; expected state, reference, referenced, collection, embed, embed_collection, target or reverse",
                ));
            }
            Ok(())
        })?;
    }

    if is_state || (kind.is_none() && last_segment_is(&field.ty, "DocumentState")) {
        if kind.is_some() {
            return Err(Error::new_spanned(field, "the state field cannot declare an association"));
        }
        return Ok(FieldRole::State);
    }

    match kind {
        Some(kind) => {
            if reverse.is_some() && !matches!(kind, Kind::Referenced | Kind::Collection) {
                return Err(Error::new_spanned(
                    field,
                    "`reverse` applies only to referenced and collection associations",
                ));
            }
            Ok(FieldRole::Association { kind, target, reverse })
        }
        None if target.is_some() || reverse.is_some() => Err(Error::new_spanned(
            field,
            "`target` and `reverse` require an association kind",
        )),
        None => Ok(FieldRole::Other),
    }
}

fn last_segment(ty: &Type) -> Option<&PathSegment> {
    match ty {
        Type::Path(type_path) => type_path.path.segments.last(),
        _ => None,
    }
}

fn last_segment_is(ty: &Type, name: &str) -> bool {
    last_segment(ty).map(|segment| segment.ident == name).unwrap_or(false)
}

/// Extract the generic type from a type segment
fn extract_generic_type(segment: &PathSegment, expected_name: &str) -> Result<Type> {
    if let PathArguments::AngleBracketed(args) = &segment.arguments {
        if let Some(GenericArgument::Type(inner_type)) = args.args.first() {
            return Ok(inner_type.clone());
        }
    }

    Err(Error::new_spanned(
        segment,
        format!("Failed to extract generic type from {}<T>", expected_name),
    ))
}

/// `Memo<Option<T>>` / `Memo<Vec<T>>` -> `T`
fn memo_target_type(ty: &Type, kind: Kind) -> Result<Type> {
    let container = kind.container();
    let message = format!("{:?} fields must be declared as Memo<{}<T>>", kind, container);

    let memo = last_segment(ty)
        .filter(|segment| segment.ident == "Memo")
        .ok_or_else(|| Error::new_spanned(ty, &message))?;
    let inner = extract_generic_type(memo, "Memo")?;

    let wrapper = last_segment(&inner)
        .filter(|segment| segment.ident == container)
        .ok_or_else(|| Error::new_spanned(&inner, &message))?;
    extract_generic_type(wrapper, container)
}

fn type_name(ty: &Type) -> Result<String> {
    last_segment(ty)
        .map(|segment| segment.ident.to_string())
        .ok_or_else(|| Error::new_spanned(ty, "cannot infer the target model name; add target = \"...\""))
}

fn generate_model_impl(struct_name: &Ident, options: &ModelOptions, fields: &DocumentFields) -> TokenStream2 {
    let model_name = options.name.clone().unwrap_or_else(|| struct_name.to_string());
    let state = &fields.state;

    let namespace = options.namespace.as_ref().map(|namespace| quote! { .namespace(#namespace) });
    let embeddable = options.embeddable.then(|| quote! { .embeddable() });
    let attributes = options.attributes.iter().map(|name| quote! { .attribute(#name) });
    let indices = options.indices.iter().map(|name| quote! { .index(#name) });

    let declarations = fields.associations.iter().map(|association| {
        let name = association.field.to_string();
        let target = &association.target;
        match (association.kind, &association.reverse) {
            (Kind::Reference, _) => quote! { .reference(#name, #target) },
            (Kind::Referenced, Some(reverse)) => quote! { .referenced_with(#name, #target, #reverse) },
            (Kind::Referenced, None) => quote! { .referenced(#name, #target) },
            (Kind::Collection, Some(reverse)) => quote! { .collection_with(#name, #target, #reverse) },
            (Kind::Collection, None) => quote! { .collection(#name, #target) },
            (Kind::Embed, _) => quote! { .embed(#name, #target) },
            (Kind::EmbedCollection, _) => quote! { .embed_collection(#name, #target) },
        }
    });

    let memo_fields: Vec<&Ident> = fields.associations.iter().map(|association| &association.field).collect();
    let others = &fields.others;

    quote! {
        impl ::elif_odm::Model for #struct_name {
            fn descriptor() -> &'static ::elif_odm::ModelDescriptor {
                static DESCRIPTOR: ::std::sync::OnceLock<::elif_odm::ModelDescriptor> =
                    ::std::sync::OnceLock::new();
                DESCRIPTOR.get_or_init(|| {
                    ::elif_odm::ModelDescriptor::builder(#model_name)
                        #namespace
                        #embeddable
                        #(#attributes)*
                        #(#indices)*
                        #(#declarations)*
                        .build()
                })
            }

            fn state(&self) -> &::elif_odm::DocumentState {
                &self.#state
            }

            fn state_mut(&mut self) -> &mut ::elif_odm::DocumentState {
                &mut self.#state
            }

            fn from_state(state: ::elif_odm::DocumentState) -> Self {
                Self {
                    #state: state,
                    #(#memo_fields: ::elif_odm::Memo::new(),)*
                    #(#others: ::std::default::Default::default(),)*
                }
            }

            fn reset_associations(&mut self) {
                #(self.#memo_fields.invalidate();)*
            }
        }
    }
}

fn generate_accessors(struct_name: &Ident, fields: &DocumentFields) -> TokenStream2 {
    let methods = fields
        .associations
        .iter()
        .map(|association| generate_association_accessors(&fields.state, association));

    quote! {
        impl #struct_name {
            #(#methods)*
        }
    }
}

fn generate_association_accessors(state: &Ident, association: &AssociationField) -> TokenStream2 {
    let field = &association.field;
    let name = field.to_string();
    let target = &association.target_type;

    let lookup = quote! {
        <Self as ::elif_odm::Model>::descriptor().association(#name)
    };
    let engines = quote! { ::elif_odm::relationships };

    match association.kind {
        Kind::Reference => {
            let id_reader = format_ident!("{}_id", field);
            let id_writer = format_ident!("set_{}_id", field);
            let writer = format_ident!("set_{}", field);
            quote! {
                /// Resolve the referenced document
                pub fn #field(
                    &mut self,
                    models: &::elif_odm::ModelRegistry,
                ) -> ::elif_odm::ModelResult<::std::option::Option<&#target>> {
                    let association = #lookup?;
                    #engines::reference::read(association, &self.#state, &mut self.#field, models)
                }

                pub fn #id_reader(&self) -> ::std::option::Option<::elif_odm::DocumentId> {
                    let association = #lookup.ok()?;
                    #engines::reference::id(association, &self.#state)
                }

                pub fn #id_writer(
                    &mut self,
                    id: ::std::option::Option<::elif_odm::DocumentId>,
                ) -> ::elif_odm::ModelResult<()> {
                    let association = #lookup?;
                    #engines::reference::set_id(association, &mut self.#state, &mut self.#field, id);
                    Ok(())
                }

                /// Assign the referenced document, or clear it with `None`
                pub fn #writer(
                    &mut self,
                    document: ::std::option::Option<&dyn ::elif_odm::Document>,
                ) -> ::elif_odm::ModelResult<()> {
                    let association = #lookup?;
                    #engines::reference::assign(association, &mut self.#state, &mut self.#field, document)
                }
            }
        }
        Kind::Referenced => quote! {
            /// Resolve the reverse lookup
            pub fn #field(
                &mut self,
                models: &::elif_odm::ModelRegistry,
            ) -> ::elif_odm::ModelResult<::std::option::Option<&#target>> {
                let association = #lookup?;
                #engines::referenced::read(association, &self.#state, &mut self.#field, models)
            }
        },
        Kind::Collection => {
            let ids_reader = format_ident!("{}_ids", field);
            let ids_writer = format_ident!("set_{}_ids", field);
            let adder = format_ident!("{}_add", field);
            quote! {
                /// Resolve the collection members in stored order
                pub fn #field(
                    &mut self,
                    models: &::elif_odm::ModelRegistry,
                ) -> ::elif_odm::ModelResult<&[#target]> {
                    let association = #lookup?;
                    #engines::collection::read(association, &self.#state, &mut self.#field, models)
                }

                pub fn #ids_reader(&self) -> ::std::vec::Vec<::elif_odm::DocumentId> {
                    match #lookup {
                        Ok(association) => #engines::collection::ids(association, &self.#state),
                        Err(_) => ::std::vec::Vec::new(),
                    }
                }

                pub fn #ids_writer(
                    &mut self,
                    ids: ::std::vec::Vec<::elif_odm::DocumentId>,
                ) -> ::elif_odm::ModelResult<()> {
                    let association = #lookup?;
                    #engines::collection::set_ids(association, &mut self.#state, &mut self.#field, ids);
                    Ok(())
                }

                /// Append a saved document to the collection. Fails with
                /// `MissingPrimaryKey` when `document` has no id yet.
                pub fn #adder(&mut self, document: &dyn ::elif_odm::Document) -> ::elif_odm::ModelResult<()> {
                    let association = #lookup?;
                    #engines::collection::add(association, &mut self.#state, &mut self.#field, document)
                }
            }
        }
        Kind::Embed => {
            let writer = format_ident!("set_{}", field);
            quote! {
                /// Embedded document, if one was assigned
                pub fn #field(&mut self) -> ::std::option::Option<&#target> {
                    let association = #lookup.ok()?;
                    #engines::embed::read(association, &self.#state, &mut self.#field)
                }

                /// Embed a copy of `document`. Only the stored copy carries
                /// the parent handle; `document` is not modified.
                pub fn #writer(&mut self, document: &dyn ::elif_odm::Document) -> ::elif_odm::ModelResult<()> {
                    let association = #lookup?;
                    #engines::embed::assign(association, &mut self.#state, &mut self.#field, document)
                }
            }
        }
        Kind::EmbedCollection => {
            let adder = format_ident!("{}_add", field);
            quote! {
                /// Embedded documents in stored order
                pub fn #field(&mut self) -> &[#target] {
                    match #lookup {
                        Ok(association) => #engines::embed::read_many(association, &self.#state, &mut self.#field),
                        Err(_) => &[],
                    }
                }

                /// Append a copy of `document`. Only the stored copy carries
                /// the parent handle; `document` is not modified.
                pub fn #adder(&mut self, document: &dyn ::elif_odm::Document) -> ::elif_odm::ModelResult<()> {
                    let association = #lookup?;
                    #engines::embed::push(association, &mut self.#state, &mut self.#field, document)
                }
            }
        }
    }
}
