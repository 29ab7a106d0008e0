//! Reference discovery: one pre-order pass producing every reference node.

use crate::error::Error;
use crate::location::Location;
use crate::tree::{Node, NodeId, Tree};

/// A reference node found in a tree, with the slot that holds it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredReference {
    /// Slot containing the reference node.
    pub location: Location,
    /// The reference node itself. Kept so the node can still be rewritten
    /// after its slot has been overwritten.
    pub node: NodeId,
    /// The `$ref` string as written.
    pub path: String,
}

/// Every reference reachable from the root of `tree`, in pre-order.
///
/// # Errors
///
/// Returns `Error::UnsupportedNodeKind` if the walk reaches a scalar root.
pub fn discover(tree: &Tree) -> Result<Vec<DiscoveredReference>, Error> {
    return discover_from(tree, &Location::Root);
}

/// Every reference reachable from `start`, in pre-order. A zero value at
/// `start` yields no references.
///
/// # Errors
///
/// Returns `Error::LocationUnresolvable` if `start` cannot be read, or
/// `Error::UnsupportedNodeKind` if it holds a scalar.
pub fn discover_from(tree: &Tree, start: &Location) -> Result<Vec<DiscoveredReference>, Error> {
    let mut found = Vec::new();
    if let Some(id) = start.get(tree)? {
        walk_node(tree, start, id, &mut found)?;
    }
    return Ok(found);
}

/// Record `id` if it is reference-only, otherwise descend into it.
fn walk_node(
    tree: &Tree,
    location: &Location,
    id: NodeId,
    found: &mut Vec<DiscoveredReference>,
) -> Result<(), Error> {
    // A reference object's sibling keys are ignored, so don't look inside it.
    if let Some(path) = tree.reference_of(id) {
        found.push(DiscoveredReference {
            location: location.clone(),
            node: id,
            path: path.to_string(),
        });
        return Ok(());
    }

    match tree.node(id)? {
        Node::Map { entries, .. } => {
            for (key, slot) in entries {
                visit_child(tree, Location::key(id, key.as_str()), *slot, found)?;
            }
        },
        Node::Record { fields, kind, .. } => {
            for (field, slot) in kind.schema().fields.iter().zip(fields) {
                visit_child(tree, Location::field(id, field.key), *slot, found)?;
            }
        },
        Node::Sequence { items, .. } => {
            for (idx, slot) in items.iter().enumerate() {
                visit_child(tree, Location::index(id, idx), *slot, found)?;
            }
        },
        node @ Node::Scalar(_) => {
            return Err(Error::UnsupportedNodeKind { kind: node.kind_name() });
        },
    }

    return Ok(());
}

/// Walk a child slot when it holds a reference or a non-empty composite.
fn visit_child(
    tree: &Tree,
    location: Location,
    slot: Option<NodeId>,
    found: &mut Vec<DiscoveredReference>,
) -> Result<(), Error> {
    let Some(child) = slot else {
        return Ok(());
    };
    if tree.reference_of(child).is_some() || tree.node(child)?.is_walkable() {
        walk_node(tree, &location, child, found)?;
    }
    return Ok(());
}
