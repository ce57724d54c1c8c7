//! Local simplification of a single node against an existing tree.

use std::collections::HashSet;

use super::{CsgTree, JoinOp, Node, NodeId, NodeList};

/// Returns a simplified version of `node`, or `None` if it cannot be
/// simplified further.
///
/// Only the node's immediate children are inspected. Aliases among the
/// children are resolved, so the result never refers to an aliased node.
/// A result of [`Node::Aliased`] means the whole node is equivalent to an
/// existing node.
pub fn simplify_node(tree: &CsgTree, node: &Node) -> Option<Node> {
    match node {
        Node::True | Node::False | Node::Surface(_) => None,
        Node::Aliased(target) => {
            let resolved = tree.resolve_alias(*target);
            (resolved != *target).then_some(Node::Aliased(resolved))
        }
        Node::Negated(target) => {
            let resolved = tree.resolve_alias(*target);
            match tree[resolved] {
                Node::True => Some(Node::False),
                Node::False => Some(Node::True),
                Node::Negated(inner) => Some(Node::Aliased(inner)),
                _ => (resolved != *target).then_some(Node::Negated(resolved)),
            }
        }
        Node::Joined(op, nodes) => simplify_joined(tree, *op, nodes),
    }
}

fn simplify_joined(tree: &CsgTree, op: JoinOp, nodes: &[NodeId]) -> Option<Node> {
    let absorbing = op.absorbing_node();
    let identity = op.identity_node();

    let mut result = NodeList::new();
    let mut queue = nodes.iter().rev().copied().collect::<NodeList>();
    while let Some(d) = queue.pop() {
        let d = tree.resolve_alias(d);
        if d == absorbing {
            // A & F = F, A | T = T
            return Some(Node::Aliased(absorbing));
        } else if d == identity {
            continue;
        }
        match &tree[d] {
            Node::Joined(child_op, grandchildren) if *child_op == op => {
                queue.extend(grandchildren.iter().rev().copied());
            }
            _ => result.push(d),
        }
    }

    result.sort_unstable();
    result.dedup();

    match result.as_slice() {
        [] => return Some(Node::Aliased(identity)),
        [single] => return Some(Node::Aliased(*single)),
        _ => (),
    }

    // A & ~A = F, A | ~A = T, if the negation already exists in the tree
    let mut negated = HashSet::new();
    for &d in &result {
        if negated.contains(&d) {
            return Some(Node::Aliased(absorbing));
        }
        if let Some(n) = tree.find(&Node::Negated(d)) {
            negated.insert(tree.resolve_alias(n));
        }
    }

    (result.as_slice() != nodes).then_some(Node::Joined(op, result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::LocalSurfaceId;

    fn tree_with_surfaces(n: u32) -> (CsgTree, Vec<NodeId>) {
        let mut tree = CsgTree::new();
        let ids = (0..n)
            .map(|i| tree.insert(Node::Surface(LocalSurfaceId(i))).unwrap().0)
            .collect();
        (tree, ids)
    }

    #[test]
    fn test_simplify_negated() {
        let (mut tree, s) = tree_with_surfaces(1);
        let not_s = tree.insert(Node::Negated(s[0])).unwrap().0;
        assert_eq!(
            simplify_node(&tree, &Node::Negated(NodeId::TRUE)),
            Some(Node::False)
        );
        assert_eq!(
            simplify_node(&tree, &Node::Negated(not_s)),
            Some(Node::Aliased(s[0]))
        );
        assert_eq!(simplify_node(&tree, &Node::Negated(s[0])), None);
    }

    #[test]
    fn test_simplify_joined() {
        let (mut tree, s) = tree_with_surfaces(3);
        let not_s0 = tree.insert(Node::Negated(s[0])).unwrap().0;

        // Identities
        assert_eq!(
            simplify_node(&tree, &Node::all([])),
            Some(Node::Aliased(NodeId::TRUE))
        );
        assert_eq!(
            simplify_node(&tree, &Node::any([])),
            Some(Node::Aliased(NodeId::FALSE))
        );
        assert_eq!(
            simplify_node(&tree, &Node::all([s[1]])),
            Some(Node::Aliased(s[1]))
        );
        assert_eq!(
            simplify_node(&tree, &Node::all([s[1], NodeId::TRUE])),
            Some(Node::Aliased(s[1]))
        );
        assert_eq!(
            simplify_node(&tree, &Node::all([s[1], NodeId::FALSE])),
            Some(Node::Aliased(NodeId::FALSE))
        );
        assert_eq!(
            simplify_node(&tree, &Node::any([s[1], NodeId::TRUE])),
            Some(Node::Aliased(NodeId::TRUE))
        );

        // Complements
        assert_eq!(
            simplify_node(&tree, &Node::all([s[0], s[1], not_s0])),
            Some(Node::Aliased(NodeId::FALSE))
        );
        assert_eq!(
            simplify_node(&tree, &Node::any([not_s0, s[0]])),
            Some(Node::Aliased(NodeId::TRUE))
        );

        // Sorting, deduplication, and flattening
        let j = tree.insert(Node::all([s[1], s[2]])).unwrap().0;
        assert_eq!(
            simplify_node(&tree, &Node::all([s[2], s[0], s[2]])),
            Some(Node::all([s[0], s[2]]))
        );
        assert_eq!(
            simplify_node(&tree, &Node::all([j, s[0]])),
            Some(Node::all([s[0], s[1], s[2]]))
        );
        assert_eq!(simplify_node(&tree, &Node::any([s[0], j])), None);
        assert_eq!(simplify_node(&tree, &Node::all([s[0], s[1]])), None);
    }
}
