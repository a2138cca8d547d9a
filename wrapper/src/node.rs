use std::fmt;
use std::num::{NonZeroU32, NonZeroUsize};

use indexmap::IndexMap;
use knit_yang::StmtRef;

/// A reference to a [`Node`] stored in a [`NodeTable`]
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeRef(NonZeroU32);

impl NodeRef {
    fn index(self) -> usize {
        let size: NonZeroUsize = self
            .0
            .try_into()
            .expect("Could not convert node reference to usize index");
        usize::from(size) - 1
    }

    pub fn get(self, table: &NodeTable) -> &Node {
        table.get(self)
    }
}

impl fmt::Debug for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "<Node #{}>", self.0)
    }
}

/// Keyword-specific details of a wrapped node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeKind {
    Module {
        prefix: Option<String>,
        namespace: Option<String>,
    },
    Container,
    Grouping,
    List {
        keys: Vec<String>,
    },
    Choice,
    Case,
    Rpc,
    Input,
    Output,
    Notification,
    Leaf,
    LeafList,
    TypeDef,
    /// An inline `type enumeration`; the enums are in declaration order
    Enumeration {
        enums: Vec<NodeRef>,
    },
    Enum {
        value: Option<i64>,
    },
    /// An inline `type union`, members keyed by builtin or typedef name
    Union {
        members: IndexMap<String, UnionMember>,
    },
    /// Wrapped by a constructor a wool added for its own keywords
    Custom,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UnionMember {
    Builtin(String),
    TypeDef(NodeRef),
}

/// The child structure of nodes that group other nodes.
#[derive(Clone, Debug, Default)]
pub struct Grouponder {
    /// Effective children by name (direct, grouping instantiations and augmentations)
    pub children: IndexMap<String, NodeRef>,
    /// Wrapped groupings referenced by `uses`, by grouping name
    pub uses: IndexMap<String, NodeRef>,
}

/// How the type of a typed node was resolved.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeClass {
    Builtin,
    Enumeration,
    Union,
    Leafref,
    TypedefRef,
    /// Neither a builtin nor a resolvable typedef
    Unresolved,
}

/// The type facet of leaves, leaf-lists and typedefs.
#[derive(Clone, Debug, Default)]
pub struct Typonder {
    /// The builtin as mapped by the wool, or the referenced typedef's name
    pub data_type: Option<String>,
    pub is_build_in_type: bool,
    /// Name of the builtin type, before any wool mapping
    pub builtin: Option<String>,
    pub typedef: Option<NodeRef>,
    pub enumeration: Option<NodeRef>,
    pub union: Option<NodeRef>,
    /// The wrapped leafref target
    pub reference: Option<NodeRef>,
    /// The raw leafref path
    pub path: Option<String>,
    pub default: Option<String>,
    pub mandatory: bool,
}

impl Typonder {
    pub fn classification(&self) -> TypeClass {
        match self.builtin.as_deref() {
            Some("enumeration") => TypeClass::Enumeration,
            Some("union") => TypeClass::Union,
            Some("leafref") => TypeClass::Leafref,
            Some(_) => TypeClass::Builtin,
            None if self.typedef.is_some() => TypeClass::TypedefRef,
            None => TypeClass::Unresolved,
        }
    }
}

/// One wrapped schema statement.
#[derive(Clone, Debug)]
pub struct Node {
    pub statement: StmtRef,
    /// `None` only for the module node
    pub parent: Option<NodeRef>,
    /// The statement keyword
    pub yang_type: String,
    /// The statement argument (or keyword, for `input`/`output`)
    pub yang_name: String,
    /// The module the statement was written in
    pub yang_module: String,
    pub key: String,
    pub description: Option<String>,
    pub config: Option<bool>,
    pub is_augmented: bool,
    pub kind: NodeKind,
    pub grouponder: Option<Grouponder>,
    pub typonder: Option<Typonder>,
}

impl Node {
    pub fn default_value(&self) -> Option<&str> {
        self.typonder.as_ref()?.default.as_deref()
    }

    pub fn is_mandatory(&self) -> bool {
        self.typonder.as_ref().map_or(false, |t| t.mandatory)
    }

    pub fn children(&self) -> impl Iterator<Item = (&str, NodeRef)> {
        self.grouponder
            .iter()
            .flat_map(|g| g.children.iter().map(|(name, node)| (name.as_str(), *node)))
    }

    pub fn uses(&self) -> impl Iterator<Item = (&str, NodeRef)> {
        self.grouponder
            .iter()
            .flat_map(|g| g.uses.iter().map(|(name, node)| (name.as_str(), *node)))
    }

    /// A child by name, looking at the children first, then at the used groupings.
    pub fn child(&self, name: &str) -> Option<NodeRef> {
        let grouponder = self.grouponder.as_ref()?;
        grouponder
            .children
            .get(name)
            .or_else(|| grouponder.uses.get(name))
            .copied()
    }
}

#[derive(Clone, Debug, Default)]
pub struct NodeTable {
    nodes: Vec<Node>,
}

impl NodeTable {
    pub fn get(&self, ref_: NodeRef) -> &Node {
        self.nodes
            .get(ref_.index())
            .expect("Invalid node reference (out-of-bounds)")
    }

    pub(crate) fn get_mut(&mut self, ref_: NodeRef) -> &mut Node {
        self.nodes
            .get_mut(ref_.index())
            .expect("Invalid node reference (out-of-bounds)")
    }

    pub(crate) fn create(&mut self, node: Node) -> NodeRef {
        self.nodes.push(node);

        // We use the size for the ref's ID, which is non-zero after the push
        let size = NonZeroUsize::new(self.nodes.len()).unwrap();
        let id: NonZeroU32 = size.try_into().expect("ID did not fit into 32-bit integer");
        NodeRef(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All nodes in creation (depth-first) order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeRef, &Node)> {
        self.nodes.iter().enumerate().map(|(index, node)| {
            let id = u32::try_from(index + 1).expect("ID did not fit into 32-bit integer");
            (NodeRef(NonZeroU32::new(id).unwrap()), node)
        })
    }
}
