//! The wrappers of the default wool.

use knit_yang::StmtRef;

use crate::knitter::Knitter;
use crate::node::{NodeKind, NodeRef};
use crate::{grouponder, typonder};

fn grouping_node(
    knitter: &mut Knitter,
    stmt: StmtRef,
    parent: Option<NodeRef>,
    kind: NodeKind,
) -> NodeRef {
    let node = knitter.create_node(stmt, parent, kind);
    grouponder::knit(knitter, node);
    node
}

fn typed_node(
    knitter: &mut Knitter,
    stmt: StmtRef,
    parent: Option<NodeRef>,
    kind: NodeKind,
) -> NodeRef {
    let node = knitter.create_node(stmt, parent, kind);
    typonder::knit(knitter, node);
    node
}

pub fn wrap_module(knitter: &mut Knitter, stmt: StmtRef, parent: Option<NodeRef>) -> NodeRef {
    let table = knitter.schema().table();
    let kind = NodeKind::Module {
        prefix: table.search_arg(stmt, "prefix").map(String::from),
        namespace: table.search_arg(stmt, "namespace").map(String::from),
    };
    grouping_node(knitter, stmt, parent, kind)
}

pub fn wrap_container(knitter: &mut Knitter, stmt: StmtRef, parent: Option<NodeRef>) -> NodeRef {
    grouping_node(knitter, stmt, parent, NodeKind::Container)
}

pub fn wrap_grouping(knitter: &mut Knitter, stmt: StmtRef, parent: Option<NodeRef>) -> NodeRef {
    grouping_node(knitter, stmt, parent, NodeKind::Grouping)
}

pub fn wrap_list(knitter: &mut Knitter, stmt: StmtRef, parent: Option<NodeRef>) -> NodeRef {
    // The key statement holds a space separated list of leaf names
    let keys = knitter
        .schema()
        .table()
        .search_arg(stmt, "key")
        .map(|keys| keys.split_whitespace().map(String::from).collect())
        .unwrap_or_default();
    grouping_node(knitter, stmt, parent, NodeKind::List { keys })
}

pub fn wrap_choice(knitter: &mut Knitter, stmt: StmtRef, parent: Option<NodeRef>) -> NodeRef {
    grouping_node(knitter, stmt, parent, NodeKind::Choice)
}

pub fn wrap_case(knitter: &mut Knitter, stmt: StmtRef, parent: Option<NodeRef>) -> NodeRef {
    grouping_node(knitter, stmt, parent, NodeKind::Case)
}

pub fn wrap_rpc(knitter: &mut Knitter, stmt: StmtRef, parent: Option<NodeRef>) -> NodeRef {
    grouping_node(knitter, stmt, parent, NodeKind::Rpc)
}

pub fn wrap_input(knitter: &mut Knitter, stmt: StmtRef, parent: Option<NodeRef>) -> NodeRef {
    grouping_node(knitter, stmt, parent, NodeKind::Input)
}

pub fn wrap_output(knitter: &mut Knitter, stmt: StmtRef, parent: Option<NodeRef>) -> NodeRef {
    grouping_node(knitter, stmt, parent, NodeKind::Output)
}

pub fn wrap_notification(
    knitter: &mut Knitter,
    stmt: StmtRef,
    parent: Option<NodeRef>,
) -> NodeRef {
    grouping_node(knitter, stmt, parent, NodeKind::Notification)
}

pub fn wrap_leaf(knitter: &mut Knitter, stmt: StmtRef, parent: Option<NodeRef>) -> NodeRef {
    typed_node(knitter, stmt, parent, NodeKind::Leaf)
}

pub fn wrap_leaf_list(knitter: &mut Knitter, stmt: StmtRef, parent: Option<NodeRef>) -> NodeRef {
    typed_node(knitter, stmt, parent, NodeKind::LeafList)
}

pub fn wrap_typedef(knitter: &mut Knitter, stmt: StmtRef, parent: Option<NodeRef>) -> NodeRef {
    typed_node(knitter, stmt, parent, NodeKind::TypeDef)
}

pub fn wrap_enum(knitter: &mut Knitter, stmt: StmtRef, parent: Option<NodeRef>) -> NodeRef {
    let value = knitter
        .schema()
        .table()
        .search_arg(stmt, "value")
        .and_then(|value| value.parse().ok());
    knitter.create_node(stmt, parent, NodeKind::Enum { value })
}
