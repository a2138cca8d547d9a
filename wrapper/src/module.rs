use std::collections::HashMap;
use std::ops::Index;

use indexmap::IndexMap;
use knit_yang::{Schema, StmtRef};

use crate::knitter::Knitter;
use crate::node::{Node, NodeRef, NodeTable};
use crate::wool::Wool;
use crate::wrappers;

/// The wrapped tree of one YANG module together with its dedup ledgers.
///
/// Once [`Module::wrap()`] returns, the graph is complete and never changes.
#[derive(Clone, Debug)]
pub struct Module {
    name: String,
    nodes: NodeTable,
    root: NodeRef,
    all_nodes: HashMap<String, IndexMap<String, NodeRef>>,
    derived_types: IndexMap<String, NodeRef>,
}

impl Module {
    pub(crate) fn new(
        name: String,
        nodes: NodeTable,
        root: NodeRef,
        all_nodes: HashMap<String, IndexMap<String, NodeRef>>,
        derived_types: IndexMap<String, NodeRef>,
    ) -> Self {
        Self {
            name,
            nodes,
            root,
            all_nodes,
            derived_types,
        }
    }

    /// Wraps the module statement `module` and everything reachable from it with `wool`.
    ///
    /// Top-level groupings and typedefs nothing refers to are wrapped afterwards, so that they
    /// are part of `all_nodes` too.
    pub fn wrap(schema: &Schema, wool: &Wool, module: StmtRef) -> Self {
        let name = schema.get(module).name().to_string();
        tracing::info!("wrapping module {name} with wool {}", wool.name());

        let mut knitter = Knitter::new(schema, wool);
        let wrap_module = wool.lookup("module").unwrap_or(wrappers::wrap_module);
        let root = wrap_module(&mut knitter, module, None);

        for keyword in ["grouping", "typedef"] {
            for definition in schema.table().search(module, keyword) {
                let key = knitter.definition_key(definition);
                if knitter.lookup(keyword, &key).is_none() {
                    tracing::debug!("wrapping unreferenced {keyword} {key:?}");
                    knitter.wrap_as(keyword, definition, Some(root));
                }
            }
        }

        knitter.finish(name, root)
    }

    /// Wraps every module of the schema, in load order.
    pub fn wrap_all(schema: &Schema, wool: &Wool) -> Vec<Self> {
        schema
            .modules()
            .map(|(_, module)| Self::wrap(schema, wool, module))
            .collect()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn root(&self) -> NodeRef {
        self.root
    }

    pub fn node(&self, ref_: NodeRef) -> &Node {
        self.nodes.get(ref_)
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeRef, &Node)> {
        self.nodes.iter()
    }

    /// The dedup ledger: keyword, then key.
    pub fn all_nodes(&self) -> &HashMap<String, IndexMap<String, NodeRef>> {
        &self.all_nodes
    }

    /// Referenced typedefs by name, in order of first reference.
    pub fn derived_types(&self) -> &IndexMap<String, NodeRef> {
        &self.derived_types
    }

    pub fn lookup(&self, keyword: &str, key: &str) -> Option<NodeRef> {
        self.all_nodes.get(keyword)?.get(key).copied()
    }

    /// The module node above `node`.
    pub fn top(&self, mut node: NodeRef) -> NodeRef {
        while let Some(parent) = self[node].parent {
            node = parent;
        }
        node
    }

    /// Follows [`Node::child()`] from the module node.
    pub fn path(&self, names: &[&str]) -> Option<NodeRef> {
        names
            .iter()
            .try_fold(self.root, |node, name| self[node].child(name))
    }
}

impl Index<NodeRef> for Module {
    type Output = Node;

    fn index(&self, ref_: NodeRef) -> &Node {
        self.nodes.get(ref_)
    }
}

#[cfg(test)]
mod tests {
    use crate::node::NodeKind;
    use crate::test_util::{load, wrap, yin};

    #[test]
    fn keys_follow_the_tree_except_for_definitions() {
        let schema = load(&[yin(
            "m",
            r#"<typedef name="t1"><type name="string"/></typedef>
               <grouping name="g1"><leaf name="x"><type name="t1"/></leaf></grouping>
               <container name="c">
                 <list name="l">
                   <key value="id name"/>
                   <leaf name="id"><type name="uint32"/></leaf>
                   <leaf name="name"><type name="string"/></leaf>
                 </list>
                 <uses name="g1"/>
               </container>
               <rpc name="reboot">
                 <input><leaf name="delay"><type name="uint32"/></leaf></input>
               </rpc>"#,
        )]);
        let module = wrap(&schema, "m");

        assert_eq!(module[module.root()].key, "m");
        assert_eq!(module[module.root()].parent, None);
        assert!(matches!(module[module.root()].kind, NodeKind::Module { .. }));

        let l = module.path(&["c", "l"]).unwrap();
        assert_eq!(module[l].key, "m/c/l");
        assert_eq!(
            module[l].kind,
            NodeKind::List {
                keys: vec!["id".into(), "name".into()]
            }
        );
        let c = module.path(&["c"]).unwrap();
        assert_eq!(module.lookup("grouping", "m/g1"), module[c].child("g1"));
        assert!(module.lookup("typedef", "m/t1").is_some());

        let delay = module.path(&["reboot", "input", "delay"]).unwrap();
        assert_eq!(module[delay].key, "m/reboot/input/delay");
        // input and output are transient
        assert!(!module.all_nodes().contains_key("input"));
        assert_eq!(module.top(delay), module.root());
    }

    #[test]
    fn wrapping_is_deterministic() {
        let body = r#"<grouping name="g"><leaf name="x"><type name="string"/></leaf></grouping>
                      <container name="a"><uses name="g"/></container>
                      <container name="b"><uses name="g"/></container>"#;
        let schema = load(&[yin("m", body)]);
        let first = wrap(&schema, "m");
        let second = wrap(&schema, "m");

        let keys = |module: &crate::Module| -> Vec<String> {
            module.nodes().map(|(_, node)| node.key.clone()).collect()
        };
        assert_eq!(keys(&first), keys(&second));
    }

    #[test]
    fn descriptions_and_config_are_extracted() {
        let schema = load(&[yin(
            "m",
            r#"<container name="c">
                 <description><text>Holds things.</text></description>
                 <config value="false"/>
                 <leaf name="x">
                   <description><text>None</text></description>
                   <type name="string"/>
                 </leaf>
               </container>"#,
        )]);
        let module = wrap(&schema, "m");

        let c = module.path(&["c"]).unwrap();
        assert_eq!(module[c].description.as_deref(), Some("Holds things."));
        assert_eq!(module[c].config, Some(false));
        let x = module.path(&["c", "x"]).unwrap();
        assert_eq!(module[x].description, None);
        assert_eq!(module[x].config, None);
    }

    #[test]
    fn unreferenced_definitions_are_registered() {
        let schema = load(&[yin(
            "m",
            r#"<typedef name="unused"><type name="string"/></typedef>
               <grouping name="lonely"><leaf name="x"><type name="string"/></leaf></grouping>"#,
        )]);
        let module = wrap(&schema, "m");

        assert!(module.lookup("typedef", "m/unused").is_some());
        assert!(module.lookup("grouping", "m/lonely").is_some());
        assert!(module.derived_types().is_empty());
    }
}
