//! Boolean-expression nodes of a CSG tree.

use std::fmt;

use itertools::Itertools;
use smallvec::SmallVec;

use crate::surface::LocalSurfaceId;

csgmath::idx_struct! {
    /// ID of a node in a [`super::CsgTree`].
    pub struct NodeId(pub u32);
}

impl NodeId {
    /// Node that is always true.
    pub const TRUE: Self = NodeId(0);
    /// Node that is always false, stored as the negation of [`NodeId::TRUE`].
    pub const FALSE: Self = NodeId(1);
}

/// List of child nodes of a [`Node::Joined`].
pub type NodeList = SmallVec<[NodeId; 4]>;

/// Boolean operator that joins two or more nodes.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum JoinOp {
    /// Intersection: all children must be true.
    And,
    /// Union: any child may be true.
    Or,
}
impl JoinOp {
    /// Returns the other operator.
    pub fn opposite(self) -> Self {
        match self {
            JoinOp::And => JoinOp::Or,
            JoinOp::Or => JoinOp::And,
        }
    }

    /// Returns the constant that makes the whole join equal to itself
    /// (false for AND, true for OR).
    pub fn absorbing_node(self) -> NodeId {
        match self {
            JoinOp::And => NodeId::FALSE,
            JoinOp::Or => NodeId::TRUE,
        }
    }
    /// Returns the constant that has no effect on the join (true for AND,
    /// false for OR).
    pub fn identity_node(self) -> NodeId {
        match self {
            JoinOp::And => NodeId::TRUE,
            JoinOp::Or => NodeId::FALSE,
        }
    }

    /// Returns the name used when printing nodes.
    pub fn name(self) -> &'static str {
        match self {
            JoinOp::And => "all",
            JoinOp::Or => "any",
        }
    }
}

/// Node in a CSG tree.
///
/// Surfaces are true on their positive ("outside") side.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Node {
    /// Always true.
    True,
    /// Always false. Only ever stored as [`Node::Negated`] of
    /// [`NodeId::TRUE`].
    False,
    /// Transparent reference to another node, created by simplification.
    Aliased(NodeId),
    /// Logical complement of another node.
    Negated(NodeId),
    /// Positive side of a surface.
    Surface(LocalSurfaceId),
    /// Union or intersection of two or more nodes, sorted and unique.
    Joined(JoinOp, NodeList),
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::True => write!(f, "true"),
            Node::False => write!(f, "false"),
            Node::Aliased(n) => write!(f, "->{{{n}}}"),
            Node::Negated(n) => write!(f, "not{{{n}}}"),
            Node::Surface(s) => write!(f, "surface {s}"),
            Node::Joined(op, nodes) => write!(f, "{}{{{}}}", op.name(), nodes.iter().join(",")),
        }
    }
}

impl Node {
    /// Constructs an intersection node.
    pub fn all(nodes: impl IntoIterator<Item = NodeId>) -> Self {
        Node::Joined(JoinOp::And, nodes.into_iter().collect())
    }
    /// Constructs a union node.
    pub fn any(nodes: impl IntoIterator<Item = NodeId>) -> Self {
        Node::Joined(JoinOp::Or, nodes.into_iter().collect())
    }

    /// Returns the direct children of the node.
    pub fn children(&self) -> &[NodeId] {
        match self {
            Node::True | Node::False | Node::Surface(_) => &[],
            Node::Aliased(n) | Node::Negated(n) => std::slice::from_ref(n),
            Node::Joined(_, nodes) => nodes.as_slice(),
        }
    }

    /// Returns the children of the node, mutably.
    pub fn children_mut(&mut self) -> &mut [NodeId] {
        match self {
            Node::True | Node::False | Node::Surface(_) => &mut [],
            Node::Aliased(n) | Node::Negated(n) => std::slice::from_mut(n),
            Node::Joined(_, nodes) => nodes.as_mut_slice(),
        }
    }

    /// Returns the target of an alias.
    pub fn as_aliased(&self) -> Option<NodeId> {
        match self {
            Node::Aliased(n) => Some(*n),
            _ => None,
        }
    }
    /// Returns the target of a negation.
    pub fn as_negated(&self) -> Option<NodeId> {
        match self {
            Node::Negated(n) => Some(*n),
            _ => None,
        }
    }
    /// Returns the operator and children of a join.
    pub fn as_joined(&self) -> Option<(JoinOp, &[NodeId])> {
        match self {
            Node::Joined(op, nodes) => Some((*op, nodes.as_slice())),
            _ => None,
        }
    }
}
