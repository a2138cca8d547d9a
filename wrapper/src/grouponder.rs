use knit_yang::StmtRef;

use crate::knitter::Knitter;
use crate::node::{Grouponder, NodeRef};

/// Wraps the children, used groupings and augmentations of a grouping node.
pub fn knit(knitter: &mut Knitter, node: NodeRef) {
    let schema = knitter.schema();
    let stmt = knitter.node(node).statement;
    let statement = schema.get(stmt);

    let mut grouponder = Grouponder::default();

    for child in statement.i_children.iter().copied() {
        if let Some(wrapped) = knitter.wrap(child, node) {
            grouponder
                .children
                .entry(schema.get(child).name().to_string())
                .or_insert(wrapped);
        }
    }

    for uses in schema.table().search(stmt, "uses") {
        if let Some((name, grouping)) = used_grouping(knitter, uses, node) {
            grouponder.uses.insert(name, grouping);
        }
    }

    // Groupings used inside an augment belong to the augmented node; every augment is looked
    // at once, however many children it contributed
    let mut is_augmented = false;
    let mut augments: Vec<StmtRef> = Vec::new();
    for child in statement.i_children.iter().copied() {
        let Some(augment) = schema.get(child).i_augment else {
            continue;
        };
        is_augmented = true;

        if augments.contains(&augment) {
            continue;
        }
        augments.push(augment);

        for uses in schema.table().search(augment, "uses") {
            if let Some((name, grouping)) = used_grouping(knitter, uses, node) {
                grouponder.uses.insert(name, grouping);
            }
        }
    }

    let node = knitter.node_mut(node);
    node.is_augmented = is_augmented;
    node.grouponder = Some(grouponder);
}

/// The wrapped grouping of a `uses`, reusing the one wrapped first.
fn used_grouping(
    knitter: &mut Knitter,
    uses: StmtRef,
    node: NodeRef,
) -> Option<(String, NodeRef)> {
    let schema = knitter.schema();
    let grouping = schema
        .get(uses)
        .i_grouping
        .expect("uses statements are resolved by the schema context");

    let key = knitter.definition_key(grouping);
    if let Some(existing) = knitter.lookup("grouping", &key) {
        return Some((knitter.node(existing).yang_name.clone(), existing));
    }

    let top = knitter.top(node);
    let wrapped = knitter.wrap_as("grouping", grouping, Some(top))?;
    Some((schema.get(grouping).name().to_string(), wrapped))
}
