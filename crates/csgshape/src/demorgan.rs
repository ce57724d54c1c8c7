//! Rewriting of a CSG tree so that negations only apply to leaves.
//!
//! A negated join `not{all{a, b}}` is replaced by the opposite join of the
//! negated operands, `any{not{a}, not{b}}`, recursively. Double negations
//! cancel. The original join is kept only if something other than a negation
//! still refers to it.

use csgmath::IndexOverflow;
use tinyset::Set64;

use crate::tree::{CsgTree, JoinOp, Node, NodeId};

/// Result of [`transform_negated_joins()`].
#[derive(Debug, Clone)]
pub struct TransformedTree {
    /// Tree with no negated joins.
    pub tree: CsgTree,
    /// For each node in the original tree, the equivalent node in the new
    /// tree, if one was kept.
    pub new_nodes: Vec<Option<NodeId>>,
}

/// Builds a copy of `tree` in which no [`Node::Negated`] refers to a
/// [`Node::Joined`].
///
/// Every volume in the original tree maps to an equivalent volume in the
/// new tree.
#[tracing::instrument(skip(tree))]
pub fn transform_negated_joins(tree: &CsgTree) -> Result<TransformedTree, IndexOverflow> {
    let mut simplifier = DeMorganSimplifier::new(tree);
    simplifier.find_join_negations();
    let new_tree = simplifier.build_simplified_tree()?;
    let new_nodes = simplifier
        .matches
        .iter()
        .map(MatchingNodes::equivalent)
        .collect();
    Ok(TransformedTree {
        tree: new_tree,
        new_nodes,
    })
}

/// Nodes in the new tree that correspond to one node in the original tree.
#[derive(Debug, Default, Copy, Clone)]
struct MatchingNodes {
    /// Same node with its children remapped.
    unmodified: Option<NodeId>,
    /// Opposite join that replaces a negated join.
    simplified_to: Option<NodeId>,
    /// Opposite join of negated operands, for a join whose negation is used.
    opposite_join: Option<NodeId>,
    /// Negation of a leaf that appears under a negated join.
    new_negation: Option<NodeId>,
}
impl MatchingNodes {
    fn equivalent(&self) -> Option<NodeId> {
        self.simplified_to.or(self.unmodified)
    }
}

struct DeMorganSimplifier<'a> {
    tree: &'a CsgTree,
    matches: Vec<MatchingNodes>,
    parents: Vec<Set64<NodeId>>,
    /// Joins that are (possibly indirectly) under a negation.
    negated_join_nodes: Set64<NodeId>,
    /// Non-join operands of negated joins, which need a negated copy.
    new_negated_nodes: Set64<NodeId>,
    is_volume: Vec<bool>,
}

impl<'a> DeMorganSimplifier<'a> {
    fn new(tree: &'a CsgTree) -> Self {
        let mut is_volume = vec![false; tree.len()];
        for &v in tree.volumes() {
            is_volume[v.0 as usize] = true;
        }
        Self {
            tree,
            matches: vec![MatchingNodes::default(); tree.len()],
            parents: vec![Set64::new(); tree.len()],
            negated_join_nodes: Set64::new(),
            new_negated_nodes: Set64::new(),
            is_volume,
        }
    }

    fn get_node(&self, id: NodeId) -> &'a Node {
        let tree = self.tree;
        &tree[tree.resolve_alias(id)]
    }
    fn is_joined(&self, id: NodeId) -> bool {
        matches!(self.get_node(id), Node::Joined(..))
    }
    fn translation(&mut self, id: NodeId) -> &mut MatchingNodes {
        &mut self.matches[id.0 as usize]
    }
    fn parents_of(&self, id: NodeId) -> &Set64<NodeId> {
        &self.parents[id.0 as usize]
    }

    /// Records parent relationships and marks every join under a negation.
    fn find_join_negations(&mut self) {
        for id in self.tree.node_ids() {
            match self.get_node(id) {
                Node::Negated(child) => {
                    self.parents[child.0 as usize].insert(id);
                    if self.is_joined(*child) {
                        self.insert_negated_children(*child);
                    }
                }
                Node::Joined(_, children) => {
                    for &child in children {
                        self.parents[child.0 as usize].insert(id);
                    }
                }
                _ => (),
            }
        }
    }

    fn insert_negated_children(&mut self, id: NodeId) {
        if !self.negated_join_nodes.insert(id) {
            return;
        }
        let Node::Joined(_, children) = self.get_node(id) else {
            return;
        };
        for &child in children {
            match self.get_node(child) {
                Node::Joined(..) => self.insert_negated_children(child),
                // Double negation cancels
                Node::Negated(_) => (),
                _ => {
                    self.new_negated_nodes.insert(child);
                }
            }
        }
    }

    fn build_simplified_tree(&mut self) -> Result<CsgTree, IndexOverflow> {
        let mut result = CsgTree::new();

        for id in self.tree.node_ids() {
            if !self.process_negated_joined_nodes(id, &mut result)? {
                continue;
            }

            let mut new_node = self.get_node(id).clone();
            match &mut new_node {
                Node::Negated(child) => {
                    *child = self.matches[child.0 as usize]
                        .unmodified
                        .expect("negated leaf must already be in the new tree");
                }
                Node::Joined(_, children) => {
                    for child in children.iter_mut() {
                        *child = self.matches[child.0 as usize]
                            .equivalent()
                            .expect("join operand must have an equivalent in the new tree");
                    }
                }
                _ => (),
            }

            let (new_id, _) = result.insert(new_node)?;
            self.translation(id).unmodified = Some(new_id);

            if self.new_negated_nodes.contains(id) {
                let (negated_id, _) = result.insert(Node::Negated(new_id))?;
                self.translation(id).new_negation = Some(negated_id);
            }
        }

        for &volume in self.tree.volumes() {
            let new_volume = self.matches[volume.0 as usize]
                .equivalent()
                .expect("volume must have an equivalent in the new tree");
            result.insert_volume(new_volume);
        }

        Ok(result)
    }

    /// Handles negations and joins specially. Returns whether the node
    /// should be copied into the new tree with its children remapped.
    ///
    /// A negated join is never copied. A join with a negated ancestor gets
    /// its opposite join inserted here.
    fn process_negated_joined_nodes(
        &mut self,
        id: NodeId,
        result: &mut CsgTree,
    ) -> Result<bool, IndexOverflow> {
        match self.get_node(id) {
            Node::Negated(child) if self.is_joined(*child) => {
                let opposite = self.matches[child.0 as usize]
                    .opposite_join
                    .expect("negated join must have an opposite join");
                self.translation(id).simplified_to = Some(opposite);
                Ok(false)
            }
            Node::Negated(_) => {
                if self.is_volume[id.0 as usize] || self.parents_of(id).len() == 0 {
                    return Ok(true);
                }
                // Only needed if some join that is kept refers to it
                for p in self.parents_of(id).iter() {
                    debug_assert!(
                        !matches!(self.get_node(p), Node::Negated(_)),
                        "double negation of {id} should have been simplified",
                    );
                    if self.is_joined(p) && self.should_insert_join(p) {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            Node::Joined(op, children) => {
                if self.negated_join_nodes.contains(id) {
                    let negated = self.build_negated_node(*op, children);
                    let (new_id, _) = result.insert(negated)?;
                    self.translation(id).opposite_join = Some(new_id);
                }
                Ok(self.should_insert_join(id))
            }
            _ => Ok(true),
        }
    }

    fn build_negated_node(&self, op: JoinOp, children: &[NodeId]) -> Node {
        let operands = children.iter().map(|&n| match self.get_node(n) {
            Node::Negated(inner) => self.matches[inner.0 as usize]
                .unmodified
                .expect("operand of double negation must be in the new tree"),
            _ => {
                let m = &self.matches[n.0 as usize];
                m.new_negation
                    .or(m.opposite_join)
                    .expect("operand of negated join must have a negation")
            }
        });
        Node::Joined(op.opposite(), operands.collect())
    }

    /// Returns whether a join must be kept in its original form.
    ///
    /// That is the case for volumes, roots, and joins that are used by a kept
    /// join or whose negation is itself under a negated join.
    fn should_insert_join(&self, id: NodeId) -> bool {
        if self.is_volume[id.0 as usize] {
            return true;
        }
        let parents = self.parents_of(id);
        if parents.len() == 0 {
            return true;
        }
        parents.iter().any(|p| match self.get_node(p) {
            Node::Joined(..) => self.should_insert_join(p),
            Node::Negated(_) => self
                .parents_of(p)
                .iter()
                .any(|gp| self.negated_join_nodes.contains(gp)),
            _ => false,
        })
    }
}

#[cfg(test)]
mod tests {
    use csgmath::SignedSense;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    use super::*;
    use crate::eval::SenseEvaluator;
    use crate::surface::LocalSurfaceId;

    fn insert(tree: &mut CsgTree, node: Node) -> NodeId {
        tree.insert(node).unwrap().0
    }
    fn surface(tree: &mut CsgTree, i: u32) -> NodeId {
        insert(tree, Node::Surface(LocalSurfaceId(i)))
    }

    #[track_caller]
    fn check(tree: &CsgTree, expected_tree: &str, expected_nodes: &[Option<u32>]) {
        let result = transform_negated_joins(tree).unwrap();
        assert_eq!(result.tree.to_string(), expected_tree);
        let actual_nodes = result
            .new_nodes
            .iter()
            .map(|n| n.map(|n| n.0))
            .collect::<Vec<_>>();
        assert_eq!(actual_nodes, expected_nodes);
    }

    const N: Option<u32> = None;

    #[test]
    fn test_transform_negated_joins() {
        let mut tree = CsgTree::new();
        let s0 = surface(&mut tree, 0);
        let s1 = surface(&mut tree, 1);
        let n0 = insert(&mut tree, Node::Negated(s1));
        let j0 = insert(&mut tree, Node::all([s0, n0]));
        check(
            &tree,
            "{0: true, 1: not{0}, 2: surface 0, 3: surface 1, 4: not{3}, 5: all{2,4}, }",
            &[Some(0), Some(1), Some(2), Some(3), Some(4), Some(5)],
        );

        let n1 = insert(&mut tree, Node::Negated(j0));
        check(
            &tree,
            "{0: true, 1: not{0}, 2: surface 0, 3: not{2}, 4: surface 1, 5: any{3,4}, }",
            &[Some(0), Some(1), Some(2), Some(4), N, N, Some(5)],
        );

        let j1 = insert(&mut tree, Node::any([s0, n0]));
        check(
            &tree,
            "{0: true, 1: not{0}, 2: surface 0, 3: not{2}, 4: surface 1, 5: not{4}, \
             6: any{3,4}, 7: any{2,5}, }",
            &[Some(0), Some(1), Some(2), Some(4), Some(5), N, Some(6), Some(7)],
        );

        let n2 = insert(&mut tree, Node::Negated(j1));
        check(
            &tree,
            "{0: true, 1: not{0}, 2: surface 0, 3: not{2}, 4: surface 1, 5: any{3,4}, \
             6: all{3,4}, }",
            &[Some(0), Some(1), Some(2), Some(4), N, N, Some(5), N, Some(6)],
        );

        let s2 = surface(&mut tree, 2);
        insert(&mut tree, Node::Negated(s2));
        check(
            &tree,
            "{0: true, 1: not{0}, 2: surface 0, 3: not{2}, 4: surface 1, 5: any{3,4}, \
             6: all{3,4}, 7: surface 2, 8: not{7}, }",
            &[Some(0), Some(1), Some(2), Some(4), N, N, Some(5), N, Some(6), Some(7), Some(8)],
        );

        let j2 = insert(&mut tree, Node::all([j0, j1]));
        assert_eq!(tree[j2].to_string(), "all{2,4,7}");
        check(
            &tree,
            "{0: true, 1: not{0}, 2: surface 0, 3: not{2}, 4: surface 1, 5: not{4}, \
             6: any{3,4}, 7: all{3,4}, 8: any{2,5}, 9: surface 2, 10: not{9}, \
             11: all{2,5,8}, }",
            &[
                Some(0), Some(1), Some(2), Some(4), Some(5), N, Some(6), Some(8), Some(7),
                Some(9), Some(10), Some(11),
            ],
        );

        let n3 = insert(&mut tree, Node::Negated(j2));
        check(
            &tree,
            "{0: true, 1: not{0}, 2: surface 0, 3: not{2}, 4: surface 1, 5: any{3,4}, \
             6: all{3,4}, 7: surface 2, 8: not{7}, 9: any{3,4,6}, }",
            &[
                Some(0), Some(1), Some(2), Some(4), N, N, Some(5), N, Some(6), Some(7),
                Some(8), N, Some(9),
            ],
        );

        let j3 = insert(&mut tree, Node::all([n1, n2, n3]));
        check(
            &tree,
            "{0: true, 1: not{0}, 2: surface 0, 3: not{2}, 4: surface 1, 5: any{3,4}, \
             6: all{3,4}, 7: surface 2, 8: not{7}, 9: any{3,4,6}, 10: all{3,4,5,9}, }",
            &[
                Some(0), Some(1), Some(2), Some(4), N, N, Some(5), N, Some(6), Some(7),
                Some(8), N, Some(9), Some(10),
            ],
        );

        insert(&mut tree, Node::Negated(j3));
        check(
            &tree,
            "{0: true, 1: not{0}, 2: surface 0, 3: not{2}, 4: surface 1, 5: not{4}, \
             6: any{3,4}, 7: all{2,5}, 8: all{3,4}, 9: any{2,5}, 10: surface 2, \
             11: not{10}, 12: any{3,4,8}, 13: all{2,5,9}, 14: any{2,5,7,13}, }",
            &[
                Some(0), Some(1), Some(2), Some(4), Some(5), Some(7), Some(6), Some(9),
                Some(8), Some(10), Some(11), Some(13), Some(12), N, Some(14),
            ],
        );
    }

    #[test]
    fn test_negated_join_of_negations() {
        let mut tree = CsgTree::new();
        let s0 = surface(&mut tree, 0);
        let s1 = surface(&mut tree, 1);
        let n0 = insert(&mut tree, Node::Negated(s0));
        let n1 = insert(&mut tree, Node::Negated(s1));
        let j0 = insert(&mut tree, Node::any([n0, n1]));
        let n2 = insert(&mut tree, Node::Negated(j0));
        let s2 = surface(&mut tree, 2);
        let n3 = insert(&mut tree, Node::Negated(s2));
        insert(&mut tree, Node::all([n2, n3]));
        assert_eq!(
            tree.to_string(),
            "{0: true, 1: not{0}, 2: surface 0, 3: surface 1, 4: not{2}, 5: not{3}, \
             6: any{4,5}, 7: not{6}, 8: surface 2, 9: not{8}, 10: all{7,9}, }",
        );
        check(
            &tree,
            "{0: true, 1: not{0}, 2: surface 0, 3: surface 1, 4: all{2,3}, \
             5: surface 2, 6: not{5}, 7: all{2,3,6}, }",
            &[
                Some(0), Some(1), Some(2), Some(3), N, N, N, Some(4), Some(5), Some(6),
                Some(7),
            ],
        );
    }

    #[test]
    fn test_join_used_both_ways() {
        let mut tree = CsgTree::new();
        let s0 = surface(&mut tree, 0);
        let s1 = surface(&mut tree, 1);
        let n0 = insert(&mut tree, Node::Negated(s0));
        let n1 = insert(&mut tree, Node::Negated(s1));
        insert(&mut tree, Node::all([n0, n1]));
        let j1 = insert(&mut tree, Node::any([n0, n1]));
        insert(&mut tree, Node::Negated(j1));
        check(
            &tree,
            "{0: true, 1: not{0}, 2: surface 0, 3: surface 1, 4: not{2}, 5: not{3}, \
             6: all{4,5}, 7: all{2,3}, }",
            &[Some(0), Some(1), Some(2), Some(3), Some(4), Some(5), Some(6), N, Some(7)],
        );
    }

    #[test]
    fn test_transform_with_volumes() {
        let mut tree = CsgTree::new();
        let s0 = surface(&mut tree, 0);
        let s1 = surface(&mut tree, 1);
        let n0 = insert(&mut tree, Node::Negated(s0));
        let n1 = insert(&mut tree, Node::Negated(s1));
        let j0 = insert(&mut tree, Node::any([n0, n1]));
        let n2 = insert(&mut tree, Node::Negated(j0));
        let s2 = surface(&mut tree, 2);
        let n3 = insert(&mut tree, Node::Negated(s2));
        let j1 = insert(&mut tree, Node::all([n2, n3]));
        tree.insert_volume(j0);
        tree.insert_volume(j1);
        tree.insert_volume(n2);

        let result = transform_negated_joins(&tree).unwrap();
        assert_eq!(
            result.tree.to_string(),
            "{0: true, 1: not{0}, 2: surface 0, 3: surface 1, 4: not{2}, 5: not{3}, \
             6: all{2,3}, 7: any{4,5}, 8: surface 2, 9: not{8}, 10: all{2,3,9}, }",
        );
        let actual_nodes = result.new_nodes.iter().map(|n| n.map(|n| n.0)).collect::<Vec<_>>();
        assert_eq!(
            actual_nodes,
            [
                Some(0), Some(1), Some(2), Some(3), Some(4), Some(5), Some(7), Some(6),
                Some(8), Some(9), Some(10),
            ],
        );
        assert_eq!(result.tree.volumes(), [NodeId(7), NodeId(10), NodeId(6)]);
    }

    /// Tree built from random operations on a handful of surfaces.
    #[derive(Debug, Clone, proptest_derive::Arbitrary)]
    enum Op {
        Surface(#[proptest(strategy = "0..4_u32")] u32),
        Negate(usize),
        All(usize, usize),
        Any(usize, usize),
    }

    fn arb_ops() -> impl Strategy<Value = Vec<Op>> {
        prop::collection::vec(any::<Op>(), 1..24)
    }

    fn build_tree(ops: &[Op]) -> CsgTree {
        let mut tree = CsgTree::new();
        let mut built = vec![];
        for op in ops {
            let pick = |i: &usize| -> NodeId {
                built
                    .get(i % built.len().max(1))
                    .copied()
                    .unwrap_or(NodeId::TRUE)
            };
            let node = match op {
                Op::Surface(s) => Node::Surface(LocalSurfaceId(*s)),
                Op::Negate(a) => Node::Negated(pick(a)),
                Op::All(a, b) => Node::all([pick(a), pick(b)]),
                Op::Any(a, b) => Node::any([pick(a), pick(b)]),
            };
            built.push(insert(&mut tree, node));
        }
        if let Some(&last) = built.last() {
            tree.insert_volume(last);
        }
        tree
    }

    proptest! {
        #[test]
        fn proptest_transform_negated_joins_preserves_values(
            ops in arb_ops(),
            values in prop::collection::vec(any::<bool>(), 4),
        ) {
            let tree = build_tree(&ops);
            let result = transform_negated_joins(&tree).unwrap();

            for (_, node) in result.tree.iter() {
                if let Node::Negated(child) = node {
                    prop_assert!(!matches!(result.tree[*child], Node::Joined(..)), "{}", result.tree);
                }
            }

            let surface_sense = |s: LocalSurfaceId| match values[s.0 as usize] {
                true => SignedSense::Outside,
                false => SignedSense::Inside,
            };
            let eval_old = SenseEvaluator::new(&tree, surface_sense);
            let eval_new = SenseEvaluator::new(&result.tree, surface_sense);
            for (old_id, new_id) in tree.node_ids().zip(&result.new_nodes) {
                if let Some(new_id) = new_id {
                    prop_assert_eq!(eval_old.eval(old_id), eval_new.eval(*new_id), "node {}", old_id);
                }
            }
            for &v in tree.volumes() {
                prop_assert!(result.new_nodes[v.0 as usize].is_some());
            }
        }
    }
}
