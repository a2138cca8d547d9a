use std::collections::HashMap;

use indexmap::{map::Entry, IndexMap};
use knit_yang::{Schema, StmtRef};

use crate::module::Module;
use crate::node::{Node, NodeKind, NodeRef, NodeTable};
use crate::wool::Wool;

/// Statements wrapped for their structure only; they never enter the `all_nodes` ledger.
pub const TRANSIENT_KEYWORDS: &[&str] = &["enum", "input", "output", "type"];

/// Statements keyed by where they are defined instead of where they are used.
const DEFINITION_KEYWORDS: &[&str] = &["grouping", "typedef"];

/// Construction context of one [`Module`]: the schema being read, the active wool and the ledgers
/// filled while wrapping.
pub struct Knitter<'a> {
    schema: &'a Schema,
    wool: &'a Wool,

    nodes: NodeTable,
    all_nodes: HashMap<String, IndexMap<String, NodeRef>>,
    derived_types: IndexMap<String, NodeRef>,

    /// Leafref targets whose wrapping is in progress
    references_in_progress: Vec<StmtRef>,
}

impl<'a> Knitter<'a> {
    pub(crate) fn new(schema: &'a Schema, wool: &'a Wool) -> Self {
        Self {
            schema,
            wool,
            nodes: NodeTable::default(),
            all_nodes: HashMap::new(),
            derived_types: IndexMap::new(),
            references_in_progress: Vec::new(),
        }
    }

    pub fn schema(&self) -> &'a Schema {
        self.schema
    }

    pub fn wool(&self) -> &'a Wool {
        self.wool
    }

    pub fn node(&self, ref_: NodeRef) -> &Node {
        self.nodes.get(ref_)
    }

    pub fn node_mut(&mut self, ref_: NodeRef) -> &mut Node {
        self.nodes.get_mut(ref_)
    }

    /// The module node above `node`.
    pub fn top(&self, mut node: NodeRef) -> NodeRef {
        while let Some(parent) = self.node(node).parent {
            node = parent;
        }
        node
    }

    pub fn lookup(&self, keyword: &str, key: &str) -> Option<NodeRef> {
        self.all_nodes.get(keyword)?.get(key).copied()
    }

    /// Key of a grouping or typedef: `<defining parent name>/<name>`, the same for every use.
    pub fn definition_key(&self, definition: StmtRef) -> String {
        let statement = self.schema.get(definition);
        let parent = statement
            .parent
            .map(|parent| self.schema.get(parent).name())
            .unwrap_or_default();
        format!("{parent}/{}", statement.name())
    }

    fn key_for(&self, stmt: StmtRef, parent: Option<NodeRef>) -> String {
        let statement = self.schema.get(stmt);
        match parent {
            None => statement.name().to_string(),
            Some(_) if DEFINITION_KEYWORDS.contains(&statement.keyword.as_str()) => {
                self.definition_key(stmt)
            }
            Some(parent) => format!("{}/{}", self.node(parent).key, statement.name()),
        }
    }

    /// Creates and registers a node without wrapping its substructure.
    ///
    /// Registration happens here, before the caller recurses, so that re-entrant lookups of the
    /// same key find the node under construction.
    pub fn create_node(&mut self, stmt: StmtRef, parent: Option<NodeRef>, kind: NodeKind) -> NodeRef {
        let table = self.schema.table();
        let statement = self.schema.get(stmt);

        let description = table
            .search_arg(stmt, "description")
            .filter(|text| !text.eq_ignore_ascii_case("none"))
            .map(String::from);
        let config = match table.search_arg(stmt, "config") {
            Some("true") => Some(true),
            Some("false") => Some(false),
            _ => None,
        };

        let node = Node {
            statement: stmt,
            parent,
            yang_type: statement.keyword.clone(),
            yang_name: statement.name().to_string(),
            yang_module: statement.module.clone(),
            key: self.key_for(stmt, parent),
            description,
            config,
            is_augmented: false,
            kind,
            grouponder: None,
            typonder: None,
        };
        let ref_ = self.nodes.create(node);

        if parent.is_some() && !TRANSIENT_KEYWORDS.contains(&statement.keyword.as_str()) {
            self.register(ref_);
        }
        ref_
    }

    fn register(&mut self, ref_: NodeRef) {
        let node = self.nodes.get(ref_);
        let ledger = self.all_nodes.entry(node.yang_type.clone()).or_default();
        match ledger.entry(node.key.clone()) {
            Entry::Vacant(entry) => {
                entry.insert(ref_);
            }
            Entry::Occupied(entry) => {
                tracing::debug!(
                    "{} {:?} is already registered, keeping {:?}",
                    node.yang_type,
                    node.key,
                    entry.get()
                );
            }
        }
    }

    /// Records a referenced typedef; the first typedef of a name wins.
    pub fn add_derived_type(&mut self, name: &str, typedef: NodeRef) {
        match self.derived_types.entry(name.to_string()) {
            Entry::Vacant(entry) => {
                entry.insert(typedef);
            }
            Entry::Occupied(entry) if *entry.get() != typedef => {
                tracing::warn!(
                    "typedefs {:?} and {:?} share the name {name:?}, keeping the first",
                    self.nodes.get(*entry.get()).key,
                    self.nodes.get(typedef).key
                );
            }
            Entry::Occupied(_) => {}
        }
    }

    /// Wraps `stmt` with the wool's wrapper for its keyword.
    pub fn wrap(&mut self, stmt: StmtRef, parent: NodeRef) -> Option<NodeRef> {
        let schema = self.schema;
        self.wrap_as(&schema.get(stmt).keyword, stmt, Some(parent))
    }

    /// Wraps `stmt` with the wool's wrapper for `keyword`; statements the wool has no wrapper for
    /// are skipped.
    pub fn wrap_as(
        &mut self,
        keyword: &str,
        stmt: StmtRef,
        parent: Option<NodeRef>,
    ) -> Option<NodeRef> {
        let Some(wrap) = self.wool.lookup(keyword) else {
            tracing::debug!(
                "no wrapper for yang statement {keyword} ({})",
                self.schema.get(stmt).name()
            );
            return None;
        };
        Some(wrap(self, stmt, parent))
    }

    /// Runs `f` unless `target` is already being wrapped as a leafref target.
    pub(crate) fn with_reference<T>(
        &mut self,
        target: StmtRef,
        f: impl FnOnce(&mut Self) -> Option<T>,
    ) -> Option<T> {
        if self.references_in_progress.contains(&target) {
            tracing::debug!(
                "leafref cycle through {:?}, not wrapping the target again",
                self.schema.get(target).name()
            );
            return None;
        }
        self.references_in_progress.push(target);
        let result = f(self);
        self.references_in_progress.pop();
        result
    }

    pub(crate) fn finish(self, name: String, root: NodeRef) -> Module {
        Module::new(name, self.nodes, root, self.all_nodes, self.derived_types)
    }
}
