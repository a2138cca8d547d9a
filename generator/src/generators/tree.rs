//! A plain text dump of a wrapped module, for inspecting what the wrappers produced.

use knit_wrapper::{Module, NodeKind, NodeRef, UnionMember};

pub fn generate(module: &Module) -> String {
    let mut lines = vec![format!("module: {}", module.name())];
    write_children(module, module.root(), 1, &mut lines);

    for keyword in ["grouping", "typedef"] {
        let definitions: Vec<NodeRef> = module
            .all_nodes()
            .get(keyword)
            .into_iter()
            .flat_map(|ledger| ledger.values().copied())
            .filter(|definition| module[*definition].parent == Some(module.root()))
            .collect();
        if definitions.is_empty() {
            continue;
        }

        lines.push(String::new());
        lines.push(format!("{keyword}s:"));
        for definition in definitions {
            write_node(module, definition, 1, &mut lines);
        }
    }

    lines.push(String::new());
    lines.join("\n")
}

fn write_children(module: &Module, node: NodeRef, depth: usize, lines: &mut Vec<String>) {
    for (_, child) in module[node].children() {
        write_node(module, child, depth, lines);
    }
    let indent = "  ".repeat(depth);
    for (name, _) in module[node].uses() {
        lines.push(format!("{indent}uses {name}"));
    }
}

fn write_node(module: &Module, ref_: NodeRef, depth: usize, lines: &mut Vec<String>) {
    let node = &module[ref_];
    let mut line = format!("{}{} {}", "  ".repeat(depth), node.yang_type, node.yang_name);

    if node.typonder.is_some() {
        line.push_str(": ");
        line.push_str(&type_label(module, ref_));
    }
    if let NodeKind::List { keys } = &node.kind {
        if !keys.is_empty() {
            line.push_str(&format!(" [key {}]", keys.join(" ")));
        }
    }
    if node.is_mandatory() {
        line.push_str(" (mandatory)");
    }
    if node.is_augmented {
        line.push_str(" (augmented)");
    }
    lines.push(line);

    if node.grouponder.is_some() {
        write_children(module, ref_, depth + 1, lines);
    }
}

fn type_label(module: &Module, ref_: NodeRef) -> String {
    let Some(typonder) = module[ref_].typonder.as_ref() else {
        return String::new();
    };

    if let Some(enumeration) = typonder.enumeration {
        if let NodeKind::Enumeration { enums } = &module[enumeration].kind {
            let names: Vec<&str> = enums.iter().map(|e| module[*e].yang_name.as_str()).collect();
            return format!("enumeration {{{}}}", names.join(", "));
        }
    }
    if let Some(union) = typonder.union {
        if let NodeKind::Union { members } = &module[union].kind {
            let names: Vec<&str> = members
                .values()
                .map(|member| match member {
                    UnionMember::Builtin(data_type) => data_type.as_str(),
                    UnionMember::TypeDef(typedef) => module[*typedef].yang_name.as_str(),
                })
                .collect();
            return format!("union {{{}}}", names.join(" | "));
        }
    }
    if let Some(path) = typonder.path.as_deref() {
        return match typonder.reference {
            Some(target) => format!("leafref {path} -> {}", module[target].key),
            None => format!("leafref {path} (unresolved)"),
        };
    }

    typonder
        .data_type
        .clone()
        .unwrap_or_else(|| "<unresolved>".to_string())
}

#[cfg(test)]
mod tests {
    use knit_wrapper::Wool;

    use crate::test_util::{wrap, yin};

    #[test]
    fn tree_lists_children_uses_and_definitions() {
        let module = wrap(
            &[yin(
                "m",
                r#"<container name="c">
                     <leaf name="x"><type name="string"/><mandatory value="true"/></leaf>
                     <uses name="g"/>
                   </container>
                   <grouping name="g"><leaf name="y"><type name="uint8"/></leaf></grouping>"#,
            )],
            "m",
            &Wool::default_wool(),
        );

        let expected = "\
module: m
  container c
    leaf x: string (mandatory)
    leaf y: uint8
    uses g

groupings:
  grouping g
    leaf y: uint8
";
        assert_eq!(super::generate(&module), expected);
    }

    #[test]
    fn tree_shows_resolved_types() {
        let module = wrap(
            &[yin(
                "m",
                r#"<typedef name="level"><type name="enumeration"><enum name="low"/><enum name="high"/></type></typedef>
                   <list name="entry">
                     <key value="id"/>
                     <leaf name="id"><type name="uint32"/></leaf>
                     <leaf name="level"><type name="level"/></leaf>
                     <leaf name="ref"><type name="leafref"><path value="../id"/></type></leaf>
                   </list>
                   <augment target-node="/m:entry"><leaf name="extra"><type name="string"/></leaf></augment>"#,
            )],
            "m",
            &Wool::default_wool(),
        );

        let tree = super::generate(&module);
        assert!(tree.contains("  list entry [key id] (augmented)\n"), "{tree}");
        assert!(tree.contains("    leaf level: level\n"), "{tree}");
        assert!(tree.contains("    leaf ref: leafref ../id -> m/entry/ref/id\n"), "{tree}");
        assert!(tree.contains("    leaf extra: string\n"), "{tree}");
        assert!(tree.contains("  typedef level: enumeration {low, high}\n"), "{tree}");
    }
}
