use std::collections::{BTreeSet, HashMap};

use indexmap::{map::Entry, IndexMap};
use similar::TextDiff;

use crate::module::Module;
use crate::naming::Naming;
use crate::node::{Node, NodeKind, NodeRef, TypeClass, UnionMember};
use crate::wool::Wool;

/// A field of a generated class.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Variable {
    pub name: String,
    pub yang_name: String,
    pub type_name: String,
    pub is_list: bool,
    /// The type is a generated class (container or list)
    pub is_class: bool,
    pub mandatory: bool,
    pub default: Option<String>,
    pub description: Option<String>,
}

#[derive(Clone, Debug)]
pub struct ClassView {
    pub name: String,
    pub yang_name: String,
    pub yang_type: String,
    pub description: Option<String>,
    pub variables: Vec<Variable>,
    /// Classes of the used groupings
    pub bases: Vec<String>,
    pub imports: BTreeSet<String>,
    pub is_augmented: bool,
}

#[derive(Clone, Debug)]
pub struct EnumVariant {
    pub name: String,
    pub yang_name: String,
    pub value: Option<i64>,
    pub description: Option<String>,
}

#[derive(Clone, Debug)]
pub struct EnumView {
    pub name: String,
    pub yang_name: String,
    pub description: Option<String>,
    pub variants: Vec<EnumVariant>,
}

#[derive(Clone, Debug)]
pub struct UnionMemberView {
    pub name: String,
    pub type_name: String,
}

#[derive(Clone, Debug)]
pub struct UnionView {
    pub name: String,
    pub yang_name: String,
    pub description: Option<String>,
    pub members: Vec<UnionMemberView>,
    pub imports: BTreeSet<String>,
}

/// A typedef that is neither an enumeration nor a union: an alias.
#[derive(Clone, Debug)]
pub struct TypedefView {
    pub name: String,
    pub yang_name: String,
    pub description: Option<String>,
    pub type_name: String,
    pub imports: BTreeSet<String>,
}

#[derive(Clone, Debug)]
pub struct RpcView {
    pub name: String,
    pub yang_name: String,
    pub description: Option<String>,
    pub input: Vec<Variable>,
    pub output: Vec<Variable>,
    pub imports: BTreeSet<String>,
}

/// Everything a template needs to emit one module, named with the wool's conventions.
#[derive(Clone, Debug, Default)]
pub struct ModuleView {
    pub name: String,
    pub prefix: Option<String>,
    pub namespace: Option<String>,
    pub description: Option<String>,
    pub classes: IndexMap<String, ClassView>,
    pub enums: IndexMap<String, EnumView>,
    pub unions: IndexMap<String, UnionView>,
    pub typedefs: IndexMap<String, TypedefView>,
    pub rpcs: IndexMap<String, RpcView>,
}

/// Emitted items are compared by a textual rendering of their structure.
trait Structure {
    const KIND: &'static str;

    fn structure(&self) -> String;
}

fn variable_lines(variables: &[Variable]) -> String {
    variables
        .iter()
        .map(|v| {
            let list = if v.is_list { "[]" } else { "" };
            format!("{}: {}{list}\n", v.yang_name, v.type_name)
        })
        .collect()
}

impl Structure for ClassView {
    const KIND: &'static str = "class";

    fn structure(&self) -> String {
        let mut lines: String = self.bases.iter().map(|b| format!("uses {b}\n")).collect();
        lines.push_str(&variable_lines(&self.variables));
        lines
    }
}

impl Structure for EnumView {
    const KIND: &'static str = "enum";

    fn structure(&self) -> String {
        self.variants
            .iter()
            .map(|v| format!("{}\n", v.yang_name))
            .collect()
    }
}

impl Structure for UnionView {
    const KIND: &'static str = "union";

    fn structure(&self) -> String {
        self.members
            .iter()
            .map(|m| format!("{}\n", m.type_name))
            .collect()
    }
}

impl Structure for TypedefView {
    const KIND: &'static str = "typedef";

    fn structure(&self) -> String {
        format!("{}\n", self.type_name)
    }
}

impl Structure for RpcView {
    const KIND: &'static str = "rpc";

    fn structure(&self) -> String {
        format!(
            "input\n{}output\n{}",
            variable_lines(&self.input),
            variable_lines(&self.output)
        )
    }
}

/// Keeps the first item of a name. A second item with another structure is reported with a diff.
fn insert_unique<T: Structure>(items: &mut IndexMap<String, T>, name: String, item: T) {
    match items.entry(name) {
        Entry::Vacant(entry) => {
            entry.insert(item);
        }
        Entry::Occupied(entry) => {
            let first = entry.get().structure();
            let second = item.structure();
            if first == second {
                tracing::debug!("{} {} is defined again identically", T::KIND, entry.key());
            } else {
                let diff = TextDiff::from_lines(&first, &second);
                tracing::warn!(
                    "{} {} is defined twice with different structure, keeping the first:\n{}",
                    T::KIND,
                    entry.key(),
                    diff.unified_diff().header("first", "second")
                );
            }
        }
    }
}

struct ViewBuilder<'a> {
    module: &'a Module,
    wool: &'a Wool,
    naming: &'a dyn Naming,
    view: ModuleView,
    /// Classes, enums, unions, aliases and rpc messages share one namespace
    kinds: HashMap<String, &'static str>,
}

impl ModuleView {
    /// Builds the view of `module`. Only nodes defined in the module itself are emitted; nodes of
    /// other modules are referenced through imports.
    pub fn new(module: &Module, wool: &Wool) -> Self {
        let root = &module[module.root()];
        let (prefix, namespace) = match &root.kind {
            NodeKind::Module { prefix, namespace } => (prefix.clone(), namespace.clone()),
            _ => (None, None),
        };

        let mut builder = ViewBuilder {
            module,
            wool,
            naming: wool.naming(),
            view: ModuleView {
                name: module.name().to_string(),
                prefix,
                namespace,
                description: root.description.clone(),
                ..ModuleView::default()
            },
            kinds: HashMap::new(),
        };

        for (ref_, node) in module.nodes() {
            if node.yang_module != module.name() || ref_ == module.root() {
                continue;
            }
            match &node.kind {
                NodeKind::Container
                | NodeKind::List { .. }
                | NodeKind::Grouping
                | NodeKind::Case
                | NodeKind::Notification => builder.add_class(ref_),
                NodeKind::Rpc => builder.add_rpc(ref_),
                NodeKind::TypeDef | NodeKind::Leaf | NodeKind::LeafList => builder.add_type(ref_),
                _ => {}
            }
        }

        builder.view
    }
}

impl<'a> ViewBuilder<'a> {
    /// Claims `name` for an item of `kind`. Items of the same kind are compared by
    /// [`insert_unique`]; an item of another kind loses to the first one.
    fn claim(&mut self, kind: &'static str, name: &str) -> bool {
        match self.kinds.get(name) {
            None => {
                self.kinds.insert(name.to_string(), kind);
                true
            }
            Some(first) if *first == kind => true,
            Some(first) => {
                tracing::warn!(
                    "{kind} {name} is defined twice as {first} and {kind}, keeping the {first}"
                );
                false
            }
        }
    }

    fn is_foreign(&self, node: &Node) -> bool {
        node.yang_module != self.module.name()
    }

    /// Class name of the parent of an inline type. Rpc messages are named after their rpc.
    fn inline_parent(&self, node: &Node) -> Option<String> {
        let parent = &self.module[node.parent?];
        match parent.kind {
            NodeKind::Module { .. } => None,
            NodeKind::Input | NodeKind::Output => {
                let rpc = &self.module[parent.parent?];
                Some(format!(
                    "{}{}",
                    self.naming.class_name(&rpc.yang_name),
                    self.naming.class_name(&parent.yang_name)
                ))
            }
            _ => Some(self.naming.class_name(&parent.yang_name)),
        }
    }

    /// The generated name of `node`. Leaves only define inline enumerations and unions.
    fn defined_name(&self, node: &Node) -> String {
        match node.kind {
            NodeKind::Leaf | NodeKind::LeafList => {
                let parent = self.inline_parent(node);
                self.naming.inline_type_name(parent.as_deref(), &node.yang_name)
            }
            _ => self.naming.class_name(&node.yang_name),
        }
    }

    /// Class name of `node`, importing it if it comes from another module.
    fn class_reference(&self, node: &Node, imports: &mut BTreeSet<String>) -> String {
        let name = self.defined_name(node);
        if self.is_foreign(node) {
            imports.insert(self.naming.import_path(&node.yang_module, &name));
        }
        name
    }

    fn builtin(&self, builtin: &str) -> String {
        self.wool
            .data_type_for(builtin)
            .unwrap_or(builtin)
            .to_string()
    }

    /// The type name of a typed node as a variable or alias would use it.
    fn type_name(&self, ref_: NodeRef, imports: &mut BTreeSet<String>) -> String {
        let node = &self.module[ref_];
        let Some(typonder) = node.typonder.as_ref() else {
            return self.builtin("string");
        };

        match typonder.classification() {
            TypeClass::Builtin => typonder
                .data_type
                .clone()
                .unwrap_or_else(|| self.builtin("string")),
            TypeClass::Enumeration | TypeClass::Union => self.class_reference(node, imports),
            TypeClass::Leafref => match typonder.reference {
                Some(target) => self.type_name(target, imports),
                None => typonder
                    .data_type
                    .clone()
                    .unwrap_or_else(|| self.builtin("leafref")),
            },
            TypeClass::TypedefRef => match typonder.typedef {
                Some(typedef) => self.class_reference(&self.module[typedef], imports),
                None => self.builtin("string"),
            },
            TypeClass::Unresolved => self.builtin("string"),
        }
    }

    fn variable(&self, ref_: NodeRef, type_name: String, is_list: bool, is_class: bool) -> Variable {
        let node = &self.module[ref_];
        Variable {
            name: self.naming.variable_name(&node.yang_name),
            yang_name: node.yang_name.clone(),
            type_name,
            is_list,
            is_class,
            mandatory: node.is_mandatory(),
            default: node.default_value().map(String::from),
            description: node.description.clone(),
        }
    }

    fn variables(&self, ref_: NodeRef, imports: &mut BTreeSet<String>) -> Vec<Variable> {
        let mut variables = Vec::new();
        for (_, child) in self.module[ref_].children() {
            let node = &self.module[child];
            match &node.kind {
                NodeKind::Leaf | NodeKind::LeafList => {
                    let type_name = self.type_name(child, imports);
                    let is_list = node.kind == NodeKind::LeafList;
                    variables.push(self.variable(child, type_name, is_list, false));
                }
                NodeKind::Container | NodeKind::List { .. } => {
                    let type_name = self.class_reference(node, imports);
                    let is_list = matches!(node.kind, NodeKind::List { .. });
                    variables.push(self.variable(child, type_name, is_list, true));
                }
                // The members of a choice are optional fields of the enclosing class
                NodeKind::Choice | NodeKind::Case => {
                    variables.extend(self.variables(child, imports).into_iter().map(|mut v| {
                        v.mandatory = false;
                        v
                    }));
                }
                _ => {}
            }
        }
        variables
    }

    fn add_class(&mut self, ref_: NodeRef) {
        let node = &self.module[ref_];
        let mut imports = BTreeSet::new();
        let variables = self.variables(ref_, &mut imports);
        let bases = node
            .uses()
            .map(|(_, grouping)| self.class_reference(&self.module[grouping], &mut imports))
            .collect();

        let class = ClassView {
            name: self.naming.class_name(&node.yang_name),
            yang_name: node.yang_name.clone(),
            yang_type: node.yang_type.clone(),
            description: node.description.clone(),
            variables,
            bases,
            imports,
            is_augmented: node.is_augmented,
        };
        if self.claim(ClassView::KIND, &class.name) {
            insert_unique(&mut self.view.classes, class.name.clone(), class);
        }
    }

    fn add_rpc(&mut self, ref_: NodeRef) {
        let node = &self.module[ref_];
        let mut imports = BTreeSet::new();
        let mut input = Vec::new();
        let mut output = Vec::new();
        if let Some(child) = node.child("input") {
            input = self.variables(child, &mut imports);
        }
        if let Some(child) = node.child("output") {
            output = self.variables(child, &mut imports);
        }

        let rpc = RpcView {
            name: self.naming.class_name(&node.yang_name),
            yang_name: node.yang_name.clone(),
            description: node.description.clone(),
            input,
            output,
            imports,
        };
        let input = self.claim(RpcView::KIND, &format!("{}Input", rpc.name));
        let output = self.claim(RpcView::KIND, &format!("{}Output", rpc.name));
        if input && output {
            insert_unique(&mut self.view.rpcs, rpc.name.clone(), rpc);
        }
    }

    /// Typedefs become aliases, enums or unions; leaves only contribute inline enumerations and
    /// unions.
    fn add_type(&mut self, ref_: NodeRef) {
        let node = &self.module[ref_];
        let Some(typonder) = node.typonder.as_ref() else {
            return;
        };
        let name = self.defined_name(node);

        match (typonder.enumeration, typonder.union) {
            (Some(enumeration), _) => {
                let NodeKind::Enumeration { enums } = &self.module[enumeration].kind else {
                    return;
                };
                let variants = enums
                    .iter()
                    .map(|value| {
                        let value = &self.module[*value];
                        EnumVariant {
                            name: self.naming.enum_variant_name(&value.yang_name),
                            yang_name: value.yang_name.clone(),
                            value: match value.kind {
                                NodeKind::Enum { value } => value,
                                _ => None,
                            },
                            description: value.description.clone(),
                        }
                    })
                    .collect();
                let view = EnumView {
                    name: name.clone(),
                    yang_name: node.yang_name.clone(),
                    description: node.description.clone(),
                    variants,
                };
                if self.claim(EnumView::KIND, &name) {
                    insert_unique(&mut self.view.enums, name, view);
                }
            }
            (None, Some(union)) => {
                let NodeKind::Union { members } = &self.module[union].kind else {
                    return;
                };
                let mut imports = BTreeSet::new();
                let members = members
                    .iter()
                    .map(|(key, member)| UnionMemberView {
                        name: self.naming.class_name(key),
                        type_name: match member {
                            UnionMember::Builtin(data_type) => data_type.clone(),
                            UnionMember::TypeDef(typedef) => {
                                self.class_reference(&self.module[*typedef], &mut imports)
                            }
                        },
                    })
                    .collect();
                let view = UnionView {
                    name: name.clone(),
                    yang_name: node.yang_name.clone(),
                    description: node.description.clone(),
                    members,
                    imports,
                };
                if self.claim(UnionView::KIND, &name) {
                    insert_unique(&mut self.view.unions, name, view);
                }
            }
            (None, None) if node.kind == NodeKind::TypeDef => {
                let mut imports = BTreeSet::new();
                let type_name = self.type_name(ref_, &mut imports);
                let view = TypedefView {
                    name: name.clone(),
                    yang_name: node.yang_name.clone(),
                    description: node.description.clone(),
                    type_name,
                    imports,
                };
                if self.claim(TypedefView::KIND, &name) {
                    insert_unique(&mut self.view.typedefs, name, view);
                }
            }
            (None, None) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ModuleView;
    use crate::test_util::{capture_logs, load, yin};
    use crate::wool::Wool;
    use crate::Module;

    fn view(modules: &[String], name: &str) -> ModuleView {
        let schema = load(modules);
        let wool = Wool::default_wool();
        let module = Module::wrap(&schema, &wool, schema.module(name).unwrap());
        ModuleView::new(&module, &wool)
    }

    #[test]
    fn classes_hold_their_variables_and_bases() {
        let view = view(
            &[yin(
                "m",
                r#"<grouping name="named"><leaf name="full-name"><type name="string"/></leaf></grouping>
                   <container name="system">
                     <description><text>The system.</text></description>
                     <uses name="named"/>
                     <leaf name="host-name"><type name="string"/><mandatory value="true"/></leaf>
                     <leaf-list name="servers"><type name="string"/></leaf-list>
                     <list name="user"><key value="id"/><leaf name="id"><type name="uint8"/></leaf></list>
                     <choice name="transport">
                       <case name="tcp"><leaf name="port"><type name="uint16"/><mandatory value="true"/></leaf></case>
                     </choice>
                   </container>"#,
            )],
            "m",
        );

        let system = &view.classes["System"];
        assert_eq!(system.yang_type, "container");
        assert_eq!(system.description.as_deref(), Some("The system."));
        assert_eq!(system.bases, ["Named"]);
        assert!(system.imports.is_empty());

        let names: Vec<_> = system.variables.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, ["fullName", "hostName", "servers", "user", "port"]);
        assert!(system.variables[1].mandatory);
        assert!(system.variables[2].is_list);
        assert_eq!(system.variables[3].type_name, "User");
        assert!(system.variables[3].is_list);
        // Choice members are optional
        assert!(!system.variables[4].mandatory);
        assert!(view.classes.contains_key("Named"));
        assert!(view.classes.contains_key("Tcp"));
    }

    #[test]
    fn enumerations_unions_and_aliases_are_partitioned() {
        let view = view(
            &[yin(
                "m",
                r#"<typedef name="percent"><type name="uint8"/></typedef>
                   <typedef name="speed">
                     <type name="enumeration"><enum name="10g"/><enum name="auto"><value value="9"/></enum></type>
                   </typedef>
                   <typedef name="address"><type name="union"><type name="string"/><type name="percent"/></type></typedef>
                   <container name="c">
                     <leaf name="load"><type name="percent"/></leaf>
                     <leaf name="link"><type name="speed"/></leaf>
                     <leaf name="peer"><type name="address"/></leaf>
                     <leaf name="duplex"><type name="enumeration"><enum name="half"/><enum name="full"/></type></leaf>
                   </container>"#,
            )],
            "m",
        );

        assert_eq!(view.typedefs["Percent"].type_name, "uint8");
        let speed = &view.enums["Speed"];
        let variants: Vec<_> = speed.variants.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(variants, ["_10G", "AUTO"]);
        assert_eq!(speed.variants[1].value, Some(9));
        assert!(view.enums.contains_key("Duplex"));

        let address = &view.unions["Address"];
        let members: Vec<_> = address.members.iter().map(|m| m.type_name.as_str()).collect();
        assert_eq!(members, ["string", "Percent"]);

        let variables = &view.classes["C"].variables;
        let types: Vec<_> = variables.iter().map(|v| v.type_name.as_str()).collect();
        assert_eq!(types, ["Percent", "Speed", "Address", "Duplex"]);
    }

    #[test]
    fn foreign_definitions_are_imported() {
        let types = yin(
            "types",
            r#"<typedef name="counter"><type name="uint64"/></typedef>
               <grouping name="stats"><leaf name="hits"><type name="counter"/></leaf></grouping>"#,
        );
        let main = yin(
            "main",
            r#"<import module="types"><prefix value="t"/></import>
               <container name="cache">
                 <uses name="t:stats"/>
                 <leaf name="misses"><type name="t:counter"/></leaf>
               </container>"#,
        );
        let view = view(&[main, types], "main");

        let cache = &view.classes["Cache"];
        assert_eq!(cache.bases, ["Stats"]);
        assert!(cache.imports.contains("types.Stats"));
        assert!(cache.imports.contains("types.Counter"));
        // Definitions of the other module are not emitted here
        assert!(!view.classes.contains_key("Stats"));
        assert!(view.typedefs.is_empty());
    }

    #[test]
    fn leafrefs_take_the_type_of_their_target() {
        let view = view(
            &[yin(
                "m",
                r#"<container name="c">
                     <leaf name="id"><type name="int32"/></leaf>
                     <leaf name="ref"><type name="leafref"><path value="../id"/></type></leaf>
                     <leaf name="lost"><type name="leafref"><path value="../gone"/></type></leaf>
                   </container>"#,
            )],
            "m",
        );

        let variables = &view.classes["C"].variables;
        assert_eq!(variables[1].type_name, "int32");
        assert_eq!(variables[2].type_name, "leafref");
    }

    #[test]
    fn rpcs_collect_input_and_output() {
        let view = view(
            &[yin(
                "m",
                r#"<rpc name="reset-counters">
                     <input><leaf name="scope"><type name="string"/></leaf></input>
                     <output><leaf name="cleared"><type name="uint32"/></leaf></output>
                   </rpc>"#,
            )],
            "m",
        );

        let rpc = &view.rpcs["ResetCounters"];
        assert_eq!(rpc.input[0].yang_name, "scope");
        assert_eq!(rpc.output[0].type_name, "uint32");
    }

    #[test]
    fn conflicting_classes_are_reported_with_a_diff() {
        let (view, logs) = capture_logs(|| {
            view(
                &[yin(
                    "m",
                    r#"<container name="a"><container name="item"><leaf name="x"><type name="string"/></leaf></container></container>
                       <container name="b"><container name="item"><leaf name="y"><type name="string"/></leaf></container></container>
                       <container name="c"><container name="item"><leaf name="x"><type name="string"/></leaf></container></container>"#,
                )],
                "m",
            )
        });

        assert_eq!(view.classes["Item"].variables[0].yang_name, "x");
        assert!(logs.contains("class Item is defined twice with different structure"));
        assert!(logs.contains("-x: string"));
        assert!(logs.contains("+y: string"));
        assert!(logs.contains("class Item is defined again identically"));
    }

    #[test]
    fn names_are_unique_across_kinds() {
        let (view, logs) = capture_logs(|| {
            view(
                &[yin(
                    "m",
                    r#"<typedef name="mode"><type name="enumeration"><enum name="on"/></type></typedef>
                       <container name="mode"><leaf name="x"><type name="string"/></leaf></container>"#,
                )],
                "m",
            )
        });

        assert_ne!(view.classes.contains_key("Mode"), view.enums.contains_key("Mode"));
        assert!(logs.contains("Mode is defined twice as"), "{logs}");
    }
}
