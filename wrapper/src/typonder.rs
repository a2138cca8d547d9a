use indexmap::IndexMap;
use knit_yang::builtins::is_builtin_type;
use knit_yang::StmtRef;

use crate::knitter::Knitter;
use crate::node::{NodeKind, NodeRef, Typonder, UnionMember};

/// Resolves the `type` of a typed node.
pub fn knit(knitter: &mut Knitter, node: NodeRef) {
    let schema = knitter.schema();
    let table = schema.table();
    let stmt = knitter.node(node).statement;

    let Some(type_stmt) = table.search_one(stmt, "type") else {
        return;
    };
    let type_name = schema.get(type_stmt).name();

    let mut typonder = Typonder {
        default: table.search_arg(stmt, "default").map(String::from),
        mandatory: table.search_arg(stmt, "mandatory") == Some("true"),
        ..Typonder::default()
    };

    if is_builtin_type(type_name) {
        typonder.data_type = Some(builtin_data_type(knitter, type_name));
        typonder.is_build_in_type = true;
        typonder.builtin = Some(type_name.to_string());
    } else {
        typonder.typedef = referenced_typedef(knitter, type_stmt, node);
        typonder.data_type = typonder
            .typedef
            .map(|typedef| knitter.node(typedef).yang_name.clone());
    }

    match typonder.builtin.as_deref() {
        Some("enumeration") => typonder.enumeration = Some(wrap_enumeration(knitter, type_stmt, node)),
        Some("union") => typonder.union = Some(wrap_union(knitter, type_stmt, node)),
        Some("leafref") => {
            typonder.path = table.search_arg(type_stmt, "path").map(String::from);
            if let Some(target) = schema.get(type_stmt).i_target_node {
                typonder.reference = knitter.with_reference(target, |knitter| {
                    knitter.wrap_as(&schema.get(target).keyword, target, Some(node))
                });
            }
        }
        _ => {}
    }

    knitter.node_mut(node).typonder = Some(typonder);
}

fn builtin_data_type(knitter: &Knitter, builtin: &str) -> String {
    knitter
        .wool()
        .data_type_for(builtin)
        .unwrap_or(builtin)
        .to_string()
}

/// The wrapped typedef a non-builtin `type` refers to, reusing the one wrapped first.
fn referenced_typedef(knitter: &mut Knitter, type_stmt: StmtRef, node: NodeRef) -> Option<NodeRef> {
    let schema = knitter.schema();
    let Some(typedef) = schema.get(type_stmt).i_typedef else {
        tracing::warn!(
            "unknown type {:?} of {:?}",
            schema.get(type_stmt).name(),
            knitter.node(node).key
        );
        return None;
    };

    let key = knitter.definition_key(typedef);
    let wrapped = match knitter.lookup("typedef", &key) {
        Some(existing) => existing,
        None => {
            let top = knitter.top(node);
            knitter.wrap_as("typedef", typedef, Some(top))?
        }
    };
    knitter.add_derived_type(schema.get(typedef).name(), wrapped);
    Some(wrapped)
}

fn wrap_enumeration(knitter: &mut Knitter, type_stmt: StmtRef, node: NodeRef) -> NodeRef {
    let schema = knitter.schema();
    let enumeration =
        knitter.create_node(type_stmt, Some(node), NodeKind::Enumeration { enums: Vec::new() });

    let enums = schema
        .table()
        .search(type_stmt, "enum")
        .filter_map(|value| knitter.wrap_as("enum", value, Some(enumeration)))
        .collect();
    knitter.node_mut(enumeration).kind = NodeKind::Enumeration { enums };
    enumeration
}

fn wrap_union(knitter: &mut Knitter, type_stmt: StmtRef, node: NodeRef) -> NodeRef {
    let schema = knitter.schema();
    let union = knitter.create_node(
        type_stmt,
        Some(node),
        NodeKind::Union {
            members: IndexMap::new(),
        },
    );

    let mut members = IndexMap::new();
    for member in schema.table().search(type_stmt, "type") {
        let name = schema.get(member).name();
        if is_builtin_type(name) {
            let data_type = builtin_data_type(knitter, name);
            members.insert(name.to_string(), UnionMember::Builtin(data_type));
        } else if let Some(typedef) = referenced_typedef(knitter, member, union) {
            members.insert(
                knitter.node(typedef).yang_name.clone(),
                UnionMember::TypeDef(typedef),
            );
        }
    }
    knitter.node_mut(union).kind = NodeKind::Union { members };
    union
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::module::Module;
    use crate::node::{NodeKind, TypeClass, UnionMember};
    use crate::test_util::{capture_logs, load, wrap, yin};
    use crate::wool::{Wool, WoolBuilder};

    const TYPES: &str = r#"
        <typedef name="t1"><type name="uint16"/></typedef>
        <container name="c">
          <leaf name="a"><type name="t1"/><default value="7"/></leaf>
          <leaf name="b"><type name="t1"/><mandatory value="true"/></leaf>
          <leaf name="mode">
            <type name="enumeration">
              <enum name="fast"><value value="1"/></enum>
              <enum name="slow"/>
            </type>
          </leaf>
          <leaf name="either">
            <type name="union"><type name="int8"/><type name="t1"/></type>
          </leaf>
          <leaf name="ref">
            <type name="leafref"><path value="../a"/></type>
          </leaf>
          <leaf name="dangling">
            <type name="leafref"><path value="/m:nowhere"/></type>
          </leaf>
        </container>
    "#;

    #[test]
    fn shared_typedef_is_wrapped_once() {
        let schema = load(&[yin("m", TYPES)]);
        let module = wrap(&schema, "m");

        let a = module.path(&["c", "a"]).unwrap();
        let b = module.path(&["c", "b"]).unwrap();
        let t1 = module.derived_types()["t1"];
        assert_eq!(module[a].typonder.as_ref().unwrap().typedef, Some(t1));
        assert_eq!(module[b].typonder.as_ref().unwrap().typedef, Some(t1));
        assert_eq!(module.derived_types().len(), 1);
        assert_eq!(module[t1].key, "m/t1");
        assert_eq!(module[t1].parent, Some(module.root()));

        let typonder = module[a].typonder.as_ref().unwrap();
        assert_eq!(typonder.data_type.as_deref(), Some("t1"));
        assert!(!typonder.is_build_in_type);
        assert_eq!(typonder.classification(), TypeClass::TypedefRef);
        assert_eq!(module[a].default_value(), Some("7"));
        assert!(!module[a].is_mandatory());
        assert!(module[b].is_mandatory());
    }

    #[test]
    fn enumeration_wraps_every_enum() {
        let schema = load(&[yin("m", TYPES)]);
        let module = wrap(&schema, "m");

        let mode = module.path(&["c", "mode"]).unwrap();
        let typonder = module[mode].typonder.as_ref().unwrap();
        assert_eq!(typonder.classification(), TypeClass::Enumeration);
        let enumeration = typonder.enumeration.unwrap();
        assert_eq!(module[enumeration].parent, Some(mode));

        let NodeKind::Enumeration { enums } = &module[enumeration].kind else {
            panic!("not an enumeration");
        };
        let names: Vec<_> = enums.iter().map(|e| module[*e].yang_name.as_str()).collect();
        assert_eq!(names, ["fast", "slow"]);
        assert_eq!(module[enums[0]].kind, NodeKind::Enum { value: Some(1) });
        // Enums are transient
        assert!(!module.all_nodes().contains_key("enum"));
    }

    #[test]
    fn union_members_reuse_typedefs() {
        let schema = load(&[yin("m", TYPES)]);
        let module = wrap(&schema, "m");

        let either = module.path(&["c", "either"]).unwrap();
        let union = module[either].typonder.as_ref().unwrap().union.unwrap();
        let NodeKind::Union { members } = &module[union].kind else {
            panic!("not a union");
        };
        let t1 = module.derived_types()["t1"];
        assert_eq!(members["int8"], UnionMember::Builtin("int8".into()));
        assert_eq!(members["t1"], UnionMember::TypeDef(t1));
    }

    #[test]
    fn leafrefs_keep_their_path() {
        let schema = load(&[yin("m", TYPES)]);
        let module = wrap(&schema, "m");

        let reference = module.path(&["c", "ref"]).unwrap();
        let typonder = module[reference].typonder.as_ref().unwrap();
        assert_eq!(typonder.classification(), TypeClass::Leafref);
        assert_eq!(typonder.path.as_deref(), Some("../a"));
        let target = typonder.reference.unwrap();
        assert_eq!(module[target].yang_name, "a");
        assert_eq!(module[target].parent, Some(reference));

        let dangling = module.path(&["c", "dangling"]).unwrap();
        let typonder = module[dangling].typonder.as_ref().unwrap();
        assert_eq!(typonder.reference, None);
        assert_eq!(typonder.path.as_deref(), Some("/m:nowhere"));
    }

    #[test]
    fn builtin_types_follow_the_wool_patterns() {
        let schema = load(&[yin("m", TYPES)]);
        let java = WoolBuilder::new("java", Arc::new(Wool::default_wool()))
            .type_pattern("u?int\\d*", "int")
            .build()
            .unwrap();
        let module = Module::wrap(&schema, &java, schema.module("m").unwrap());

        let t1 = module.derived_types()["t1"];
        let typonder = module[t1].typonder.as_ref().unwrap();
        assert_eq!(typonder.data_type.as_deref(), Some("int"));
        assert_eq!(typonder.builtin.as_deref(), Some("uint16"));
        assert!(typonder.is_build_in_type);
    }

    #[test]
    fn every_typed_node_has_exactly_one_classification() {
        let schema = load(&[yin("m", TYPES)]);
        let module = wrap(&schema, "m");

        for (_, node) in module.nodes() {
            let Some(typonder) = node.typonder.as_ref() else {
                continue;
            };
            let class = typonder.classification();
            assert_eq!(
                typonder.is_build_in_type,
                class != TypeClass::TypedefRef && class != TypeClass::Unresolved,
                "{}",
                node.key
            );
        }
    }

    #[test]
    fn unknown_types_are_warned_about() {
        let schema = load(&[yin(
            "m",
            r#"<leaf name="odd"><type name="no-such-type"/></leaf>"#,
        )]);
        let (module, logs) = capture_logs(|| wrap(&schema, "m"));

        let odd = module.path(&["odd"]).unwrap();
        let typonder = module[odd].typonder.as_ref().unwrap();
        assert_eq!(typonder.data_type, None);
        assert_eq!(typonder.classification(), TypeClass::Unresolved);
        assert!(logs.contains("WARN"));
        assert!(logs.contains("unknown type \"no-such-type\""));
    }

    #[test]
    fn mutually_referencing_typedefs_terminate() {
        let schema = load(&[yin(
            "m",
            r#"<typedef name="ping"><type name="union"><type name="pong"/><type name="string"/></type></typedef>
               <typedef name="pong"><type name="ping"/></typedef>
               <leaf name="x"><type name="ping"/></leaf>"#,
        )]);
        let module = wrap(&schema, "m");

        let ping = module.derived_types()["ping"];
        let pong = module.derived_types()["pong"];
        assert_eq!(module[pong].typonder.as_ref().unwrap().typedef, Some(ping));
        assert_eq!(module.all_nodes()["typedef"].len(), 2);
    }

    #[test]
    fn self_referencing_leafrefs_terminate() {
        let schema = load(&[yin(
            "m",
            r#"<leaf name="a"><type name="leafref"><path value="/m:b"/></type></leaf>
               <leaf name="b"><type name="leafref"><path value="/m:a"/></type></leaf>"#,
        )]);
        let module = wrap(&schema, "m");

        let a = module.path(&["a"]).unwrap();
        let b = module[a].typonder.as_ref().unwrap().reference.unwrap();
        assert_eq!(module[b].yang_name, "b");
    }
}
