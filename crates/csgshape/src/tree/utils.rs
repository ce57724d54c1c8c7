//! Whole-tree rewrites and queries.

use itertools::Itertools;

use super::{CsgTree, JoinOp, Node, NodeId};
use crate::surface::LocalSurfaceId;

/// Substitutes a known truth value for `key` and propagates the consequences
/// through the whole tree.
///
/// Knowledge flows downward first: a node known to be true or false may imply
/// the values of its children (e.g. a true intersection implies that every
/// child is true). Every node whose value is implied is replaced with an
/// alias to the corresponding constant, and then every node above the lowest
/// replaced node is re-simplified.
///
/// Returns the lowest node ID that was modified, if any.
#[tracing::instrument(skip(tree))]
pub fn replace_and_simplify(tree: &mut CsgTree, key: NodeId, value: bool) -> Option<NodeId> {
    let known = infer_known_values(tree, key, value);

    let mut lowest = None;
    for (id, v) in tree.node_ids().zip(known).rev() {
        let Some(v) = v else { continue };
        if id <= NodeId::FALSE || tree[id].as_aliased().is_some() {
            continue;
        }
        let replacement = if v { Node::True } else { Node::False };
        tracing::trace!("replacing node {id} ({}) with {replacement}", tree[id]);
        tree.exchange(id, replacement);
        lowest = Some(id);
    }

    let lowest = lowest?;
    simplify_from(tree, lowest);
    Some(lowest)
}

/// Returns the value implied for every node by `key` having `value`.
fn infer_known_values(tree: &CsgTree, key: NodeId, value: bool) -> Vec<Option<bool>> {
    let mut known = vec![None; tree.len()];
    known[NodeId::TRUE.0 as usize] = Some(true);
    known[NodeId::FALSE.0 as usize] = Some(false);

    let set = |known: &mut Vec<Option<bool>>, id: NodeId, v: bool| -> bool {
        let id = tree.resolve_alias(id);
        match &mut known[id.0 as usize] {
            Some(existing) => {
                if *existing != v {
                    tracing::warn!("node {id} is implied to be both true and false");
                }
                false
            }
            slot @ None => {
                *slot = Some(v);
                true
            }
        }
    };

    set(&mut known, key, value);

    // Repeat until no new values can be inferred, since inferring a value for
    // one child of a join may pin down another child
    let mut changed = true;
    while changed {
        changed = false;
        for id in tree.node_ids().rev() {
            let Some(v) = known[id.0 as usize] else {
                continue;
            };
            match &tree[id] {
                Node::Aliased(target) => changed |= set(&mut known, *target, v),
                Node::Negated(target) => changed |= set(&mut known, *target, !v),
                Node::Joined(op, children) => {
                    if v == (*op == JoinOp::And) {
                        // all(...) = T or any(...) = F: every child shares the value
                        for &child in children {
                            changed |= set(&mut known, child, v);
                        }
                    } else {
                        // all(...) = F or any(...) = T: if every child but one is
                        // known to have the other value, the last one has this value
                        let child_value =
                            |c: NodeId| known[tree.resolve_alias(c).0 as usize];
                        if children.iter().any(|&c| child_value(c) == Some(v)) {
                            continue;
                        }
                        let last = children
                            .iter()
                            .filter(|&&c| child_value(c).is_none())
                            .exactly_one()
                            .ok()
                            .copied();
                        if let Some(last) = last {
                            changed |= set(&mut known, last, v);
                        }
                    }
                }
                Node::True | Node::False | Node::Surface(_) => (),
            }
        }
    }

    known
}

/// Repeatedly re-simplifies every node at or above `start` until nothing
/// changes.
///
/// Returns the lowest node ID that changed, if any.
pub fn simplify_from(tree: &mut CsgTree, start: NodeId) -> Option<NodeId> {
    let start = start.max(NodeId(NodeId::FALSE.0 + 1));
    let mut lowest: Option<NodeId> = None;
    loop {
        let mut changed = false;
        for id in tree.node_ids().filter(|&id| id >= start) {
            if let Some(old) = tree.simplify(id) {
                tracing::trace!("simplified node {id}: {old} -> {}", tree[id]);
                lowest = Some(lowest.map_or(id, |l| l.min(id)));
                changed = true;
            }
        }
        if !changed {
            return lowest;
        }
    }
}

/// Returns the sorted, unique list of surfaces referenced by the tree.
pub fn calc_surfaces(tree: &CsgTree) -> Vec<LocalSurfaceId> {
    tree.iter()
        .filter_map(|(_, node)| match node {
            Node::Surface(s) => Some(*s),
            _ => None,
        })
        .sorted_unstable()
        .dedup()
        .collect()
}

/// Renders a node as a human-readable infix expression such as
/// `all(+0, -1, !any(+2, -3))`.
///
/// Surfaces are printed with their sense; other negated nodes are prefixed
/// with `!`.
pub fn build_infix_string(tree: &CsgTree, node: NodeId) -> String {
    let mut out = String::new();
    write_infix(tree, node, &mut out);
    out
}

fn write_infix(tree: &CsgTree, id: NodeId, out: &mut String) {
    match &tree[id] {
        Node::True => out.push_str("true"),
        Node::False => out.push_str("false"),
        Node::Aliased(target) => write_infix(tree, *target, out),
        Node::Surface(s) => out.push_str(&format!("+{s}")),
        Node::Negated(target) => match &tree[*target] {
            Node::Surface(s) => out.push_str(&format!("-{s}")),
            _ => {
                out.push('!');
                write_infix(tree, *target, out);
            }
        },
        Node::Joined(op, children) => {
            out.push_str(op.name());
            out.push('(');
            for (i, &child) in children.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_infix(tree, child, out);
            }
            out.push(')');
        }
    }
}
