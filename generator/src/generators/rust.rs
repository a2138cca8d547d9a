use std::collections::{BTreeSet, HashSet};

use check_keyword::CheckKeyword;
use heck::{ToPascalCase, ToSnakeCase};
use quote::quote;
use syn::{__private::Span, parse_quote, Attribute, Ident, Item, Type};

use knit_wrapper::view::{ClassView, EnumView, RpcView, TypedefView, UnionView, Variable};
use knit_wrapper::{Module, ModuleView, Naming, Wool};

/// Rust naming: PascalCase types, snake_case fields, escaped keywords.
pub struct RustNaming;

impl RustNaming {
    fn escape(name: String) -> String {
        if ["crate", "self", "super", "Self"].contains(&name.as_str()) {
            // These are keywords that are not allowed as raw identifiers
            format!("{name}_")
        } else if name.is_keyword() {
            format!("r#{name}")
        } else {
            name
        }
    }
}

impl Naming for RustNaming {
    fn class_name(&self, yang_name: &str) -> String {
        Self::escape(yang_name.to_pascal_case())
    }

    fn variable_name(&self, yang_name: &str) -> String {
        Self::escape(yang_name.to_snake_case())
    }

    fn enum_variant_name(&self, yang_name: &str) -> String {
        let name = yang_name.to_pascal_case();
        if name.starts_with(|c: char| c.is_ascii_digit()) {
            format!("_{name}")
        } else {
            Self::escape(name)
        }
    }

    /// Inline enumerations and unions are prefixed with the class name of their parent.
    fn inline_type_name(&self, parent: Option<&str>, yang_name: &str) -> String {
        let name = self.class_name(yang_name);
        match parent {
            Some(parent) => format!("{parent}{}", name.trim_start_matches("r#")),
            None => name,
        }
    }

    fn import_path(&self, module: &str, class_name: &str) -> String {
        format!("super::{}::{class_name}", module.to_snake_case())
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let start = chars.next();
    matches!(start, Some(c) if c == '_' || c.is_ascii_alphabetic())
        && chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
        && name != "_"
}

/// The identifier for `name`, or `fallback()` when the schema name has no usable characters.
fn checked_ident(name: &str, fallback: impl FnOnce() -> String) -> Ident {
    match name.strip_prefix("r#") {
        Some(raw) if is_identifier(raw) => Ident::new_raw(raw, Span::call_site()),
        None if is_identifier(name) => Ident::new(name, Span::call_site()),
        _ => {
            let replacement = fallback();
            tracing::warn!("{name:?} is not a Rust identifier, using {replacement}");
            Ident::new(&replacement, Span::call_site())
        }
    }
}

fn name_to_ident(name: &str) -> Ident {
    checked_ident(name, || "Unnamed".to_string())
}

fn variant_ident(name: &str, index: usize) -> Ident {
    checked_ident(name, || format!("Variant{index}"))
}

fn doc_attrs(description: Option<&str>) -> Vec<Attribute> {
    description
        .into_iter()
        .flat_map(str::lines)
        .map(|line| {
            let line = format!(" {}", line.trim());
            parse_quote!(#[doc = #line])
        })
        .collect()
}

fn parse_type(name: &str) -> Type {
    syn::parse_str(name).unwrap_or_else(|_| {
        tracing::warn!("{name:?} is not a Rust type, using String");
        parse_quote!(String)
    })
}

fn field_type(variable: &Variable) -> Type {
    let inner = parse_type(&variable.type_name);
    if variable.is_list {
        parse_quote!(Vec<#inner>)
    } else if variable.is_class {
        // Boxed, since groupings may contain themselves
        parse_quote!(Option<Box<#inner>>)
    } else if variable.mandatory {
        inner
    } else {
        parse_quote!(Option<#inner>)
    }
}

fn struct_item(name: &str, mut docs: Vec<Attribute>, variables: &[Variable]) -> Item {
    let ident = name_to_ident(name);
    let mut seen = HashSet::new();
    let fields = variables
        .iter()
        .filter(|variable| seen.insert(variable.name.as_str()))
        .map(|variable| {
            let mut field_docs = doc_attrs(variable.description.as_deref());
            if let Some(default) = variable.default.as_deref() {
                let text = format!(" Default: `{default}`");
                field_docs.push(parse_quote!(#[doc = #text]));
            }
            let field = name_to_ident(&variable.name);
            let ty = field_type(variable);
            quote! { #(#field_docs)* pub #field: #ty }
        });

    if docs.is_empty() {
        let text = format!(" `{name}`");
        docs.push(parse_quote!(#[doc = #text]));
    }
    parse_quote! {
        #(#docs)*
        #[derive(Debug, Clone, PartialEq)]
        pub struct #ident {
            #(#fields),*
        }
    }
}

fn class_item(class: &ClassView) -> Item {
    let mut docs = doc_attrs(class.description.as_deref());
    for base in &class.bases {
        let text = format!(" Uses [`{base}`].");
        docs.push(parse_quote!(#[doc = #text]));
    }
    struct_item(&class.name, docs, &class.variables)
}

fn enum_item(view: &EnumView) -> Item {
    let ident = name_to_ident(&view.name);
    let docs = doc_attrs(view.description.as_deref());
    // Explicit discriminants only when every value has one
    let valued = view.variants.iter().all(|variant| variant.value.is_some());
    let mut seen = HashSet::new();
    let variants = view
        .variants
        .iter()
        .enumerate()
        .map(|(index, variant)| (variant_ident(&variant.name, index), variant))
        .filter(|(name, variant)| {
            let fresh = seen.insert(name.to_string());
            if !fresh {
                tracing::warn!(
                    "enum value {:?} of {} is named {name} like an earlier one, skipping it",
                    variant.yang_name,
                    view.name
                );
            }
            fresh
        })
        .map(|(name, variant)| {
            let text = format!(" Enumeration value `{}`", variant.yang_name);
            match variant.value.filter(|_| valued) {
                Some(value) => quote! { #[doc = #text] #name = #value },
                None => quote! { #[doc = #text] #name },
            }
        })
        .collect::<Vec<_>>();
    let repr: Option<Attribute> = valued.then(|| parse_quote!(#[repr(i64)]));

    parse_quote! {
        #(#docs)*
        #[derive(Debug, PartialEq, Eq, Copy, Clone)]
        #repr
        pub enum #ident {
            #(#variants),*
        }
    }
}

fn union_item(view: &UnionView) -> Item {
    let ident = name_to_ident(&view.name);
    let docs = doc_attrs(view.description.as_deref());
    let variants = view.members.iter().enumerate().map(|(index, member)| {
        let name = variant_ident(&member.name, index);
        let ty = parse_type(&member.type_name);
        quote! { #name(#ty) }
    });

    parse_quote! {
        #(#docs)*
        #[derive(Debug, Clone, PartialEq)]
        pub enum #ident {
            #(#variants),*
        }
    }
}

fn typedef_item(view: &TypedefView) -> Item {
    let ident = name_to_ident(&view.name);
    let docs = doc_attrs(view.description.as_deref());
    let ty = parse_type(&view.type_name);
    parse_quote! {
        #(#docs)*
        pub type #ident = #ty;
    }
}

/// Input and output structs of every rpc, plus one trait with a method per rpc.
fn rpc_items(view: &ModuleView, naming: &dyn Naming) -> Vec<Item> {
    if view.rpcs.is_empty() {
        return Vec::new();
    }

    let mut items = Vec::new();
    let mut methods = Vec::new();
    for rpc in view.rpcs.values() {
        let RpcView {
            name,
            yang_name,
            description,
            input,
            output,
            ..
        } = rpc;
        let input_name = format!("{name}Input");
        let output_name = format!("{name}Output");
        items.push(struct_item(&input_name, Vec::new(), input));
        items.push(struct_item(&output_name, Vec::new(), output));

        let method = name_to_ident(&naming.variable_name(yang_name));
        let input_ident = name_to_ident(&input_name);
        let output_ident = name_to_ident(&output_name);
        let docs = doc_attrs(description.as_deref());
        methods.push(quote! {
            #(#docs)*
            fn #method(&self, input: #input_ident) -> #output_ident;
        });
    }

    let text = format!(" The rpcs of module `{}`", view.name);
    let trait_ident = name_to_ident(&format!("{}Rpcs", naming.class_name(&view.name)));
    items.push(parse_quote! {
        #[doc = #text]
        pub trait #trait_ident {
            #(#methods)*
        }
    });
    items
}

pub fn generate(module: &Module, wool: &Wool) -> String {
    let view = ModuleView::new(module, wool);
    let naming = wool.naming();

    let imports: BTreeSet<&String> = view
        .classes
        .values()
        .flat_map(|class| &class.imports)
        .chain(view.unions.values().flat_map(|union| &union.imports))
        .chain(view.typedefs.values().flat_map(|typedef| &typedef.imports))
        .chain(view.rpcs.values().flat_map(|rpc| &rpc.imports))
        .collect();

    let mut items: Vec<Item> = Vec::new();
    for import in imports {
        match syn::parse_str::<syn::Path>(import) {
            Ok(path) => items.push(parse_quote!(use #path;)),
            Err(_) => tracing::warn!("{import:?} is not a Rust path, skipping the import"),
        }
    }
    items.extend(view.typedefs.values().map(typedef_item));
    items.extend(view.enums.values().map(enum_item));
    items.extend(view.unions.values().map(union_item));
    items.extend(view.classes.values().map(class_item));
    items.extend(rpc_items(&view, naming));

    let doc_comment = format!(
        " Generated by {} {} from YANG module `{}`",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        view.name
    );
    let mut attrs: Vec<Attribute> = vec![parse_quote!(#![doc = #doc_comment])];
    if let Some(namespace) = view.namespace.as_deref() {
        let text = format!("\n Namespace `{namespace}`");
        attrs.push(parse_quote!(#![doc = #text]));
    }
    attrs.push(parse_quote!(#![allow(dead_code, unused_imports)]));

    let root = syn::File {
        shebang: None,
        attrs,
        items,
    };
    prettyplease::unparse(&root)
}
