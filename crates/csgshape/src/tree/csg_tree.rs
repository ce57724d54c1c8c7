use std::collections::{HashMap, hash_map};
use std::fmt;
use std::ops::Index;

use csgmath::collections::generic_vec::IndexIter;
use csgmath::collections::{GenericVec, IndexOverflow};

use super::{Node, NodeId, simplify_node};

/// Append-only store of deduplicated boolean-expression nodes.
///
/// Every node's children have lower IDs than the node itself. Nodes are
/// simplified one level on insertion and deduplicated by content, so that
/// building the same expression twice yields the same ID.
///
/// Node 0 is always `true` and node 1 is always `not{0}` (false).
#[derive(Debug, Clone)]
pub struct CsgTree {
    nodes: GenericVec<NodeId, Node>,
    ids: HashMap<Node, NodeId>,
    volumes: Vec<NodeId>,
}

impl Default for CsgTree {
    fn default() -> Self {
        Self::new()
    }
}

impl Index<NodeId> for CsgTree {
    type Output = Node;

    fn index(&self, index: NodeId) -> &Self::Output {
        &self.nodes[index]
    }
}

impl fmt::Display for CsgTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (id, node) in self.nodes.iter() {
            write!(f, "{id}: {node}, ")?;
        }
        write!(f, "}}")
    }
}

impl CsgTree {
    /// Constructs a tree containing only the `true` and `false` constants.
    pub fn new() -> Self {
        let nodes = [Node::True, Node::Negated(NodeId::TRUE)]
            .into_iter()
            .collect();
        let ids = HashMap::from_iter([
            (Node::True, NodeId::TRUE),
            (Node::False, NodeId::FALSE),
            (Node::Negated(NodeId::TRUE), NodeId::FALSE),
            (Node::Negated(NodeId::FALSE), NodeId::TRUE),
        ]);
        Self {
            nodes,
            ids,
            volumes: vec![],
        }
    }

    /// Returns the number of nodes, including aliases.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }
    /// Returns `false`; a tree always contains its two constants.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Returns an iterator over all node IDs.
    pub fn node_ids(&self) -> IndexIter<NodeId> {
        self.nodes.iter_keys()
    }
    /// Returns an iterator over all nodes.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (NodeId, &Node)> {
        self.nodes.iter()
    }

    /// Adds a node, simplifying it one level, and returns its ID along with
    /// whether it was newly inserted.
    ///
    /// If the node simplifies to an existing node, that node's ID is
    /// returned.
    ///
    /// # Panics
    ///
    /// Panics if the node refers to a node that is not in the tree.
    pub fn insert(&mut self, mut node: Node) -> Result<(NodeId, bool), IndexOverflow> {
        self.assert_valid_children(&node, self.len());
        if let Node::Aliased(target) = node {
            return Ok((self.resolve_alias(target), false));
        }

        if let Some(simplified) = simplify_node(self, &node) {
            if let Node::Aliased(target) = simplified {
                return Ok((target, false));
            }
            node = simplified;
        }

        match self.ids.entry(node) {
            hash_map::Entry::Occupied(e) => {
                let existing = *e.get();
                Ok((self.resolve_alias(existing), false))
            }
            hash_map::Entry::Vacant(e) => {
                let id = self.nodes.push(e.key().clone())?;
                e.insert(id);
                Ok((id, true))
            }
        }
    }

    /// Returns the ID of an existing node equivalent to `node` after one level
    /// of simplification, or `None` if there is none.
    pub fn find(&self, node: &Node) -> Option<NodeId> {
        if let Node::Aliased(target) = *node {
            return Some(self.resolve_alias(target));
        }
        match simplify_node(self, node) {
            Some(Node::Aliased(target)) => Some(target),
            Some(simplified) => self.ids.get(&simplified).copied(),
            None => self.ids.get(node).copied(),
        }
        .map(|id| self.resolve_alias(id))
    }

    /// Follows aliases until reaching a node that is not an alias.
    pub fn resolve_alias(&self, mut id: NodeId) -> NodeId {
        while let Node::Aliased(target) = self.nodes[id] {
            id = target;
        }
        id
    }

    /// Replaces the definition of an existing node and returns the old
    /// definition.
    ///
    /// The new definition is simplified one level. If it is equivalent to a
    /// node with a lower ID, this node becomes an alias to that node. If it
    /// is equivalent to a node with a *higher* ID, the two definitions are
    /// swapped so that the higher node becomes the alias. The old
    /// definition's dedup entry is left in place.
    ///
    /// # Panics
    ///
    /// Panics if `id` is one of the constants, or if `node` refers to a node
    /// whose ID is not lower than `id`.
    pub fn exchange(&mut self, id: NodeId, mut node: Node) -> Node {
        assert!(id > NodeId::FALSE, "cannot replace constant node {id}");
        self.assert_valid_children(&node, id.0 as usize);

        if let Some(simplified) = simplify_node(self, &node) {
            node = simplified;
        }

        if let Node::Aliased(target) = node {
            assert!(target < id, "alias {target} must be lower than {id}");
            return std::mem::replace(&mut self.nodes[id], node);
        }

        let existing = match self.ids.entry(node) {
            hash_map::Entry::Vacant(e) => {
                let new_node = e.key().clone();
                e.insert(id);
                return std::mem::replace(&mut self.nodes[id], new_node);
            }
            hash_map::Entry::Occupied(mut e) => {
                let existing = *e.get();
                if existing == id {
                    return self.nodes[id].clone();
                }
                if existing > id {
                    // The higher node takes the lower ID's definition and
                    // then becomes the alias
                    e.insert(id);
                }
                existing
            }
        };

        if existing > id {
            let higher_def = std::mem::replace(&mut self.nodes[existing], Node::True);
            let old = std::mem::replace(&mut self.nodes[id], higher_def);
            self.nodes[existing] = Node::Aliased(id);
            old
        } else {
            std::mem::replace(&mut self.nodes[id], Node::Aliased(existing))
        }
    }

    /// Re-simplifies a stored node in place. Returns the old definition if
    /// anything changed.
    pub fn simplify(&mut self, id: NodeId) -> Option<Node> {
        let old = self.exchange(id, self.nodes[id].clone());
        (old != self.nodes[id]).then_some(old)
    }

    /// Marks a node as a volume, which must be preserved by tree rewrites.
    pub fn insert_volume(&mut self, id: NodeId) {
        assert!((id.0 as usize) < self.len(), "volume {id} is not in the tree");
        self.volumes.push(id);
    }
    /// Returns the volumes in the order they were inserted.
    pub fn volumes(&self) -> &[NodeId] {
        &self.volumes
    }

    fn assert_valid_children(&self, node: &Node, max_id: usize) {
        for &child in node.children() {
            assert!(
                (child.0 as usize) < max_id,
                "child {child} of {node} must be lower than {max_id}",
            );
        }
    }
}
