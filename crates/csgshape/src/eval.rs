//! Point classification against CSG nodes.

use csgmath::{GenericVec, Real3, SignedSense};

use crate::surface::{LocalSurfaceId, VariantSurface};
use crate::tree::{CsgTree, JoinOp, Node, NodeId};

/// Classifies a point against nodes of a tree, given its sense with respect
/// to each surface.
///
/// The result is [`SignedSense::Inside`] if the node is true at the point,
/// [`SignedSense::Outside`] if it is false, and [`SignedSense::On`] if the
/// point lies on a boundary that decides the result. Since a surface node is
/// true on the positive side of its surface, its result is the *opposite* of
/// the surface's sense.
#[derive(Debug, Clone)]
pub struct SenseEvaluator<'a, F> {
    tree: &'a CsgTree,
    surface_sense: F,
}

impl<'a, F: Fn(LocalSurfaceId) -> SignedSense> SenseEvaluator<'a, F> {
    /// Constructs an evaluator from a function giving the sense of the point
    /// with respect to each surface.
    pub fn new(tree: &'a CsgTree, surface_sense: F) -> Self {
        Self {
            tree,
            surface_sense,
        }
    }

    /// Evaluates a node.
    pub fn eval(&self, id: NodeId) -> SignedSense {
        match &self.tree[id] {
            Node::True => SignedSense::Inside,
            Node::False => SignedSense::Outside,
            Node::Aliased(target) => self.eval(*target),
            Node::Negated(target) => -self.eval(*target),
            Node::Surface(s) => -(self.surface_sense)(*s),
            Node::Joined(op, children) => {
                // Sense that decides the join as soon as any child has it
                let short_circuit = match op {
                    JoinOp::And => SignedSense::Outside,
                    JoinOp::Or => SignedSense::Inside,
                };
                let mut on = false;
                for &child in children {
                    match self.eval(child) {
                        s if s == short_circuit => return s,
                        SignedSense::On => on = true,
                        _ => (),
                    }
                }
                if on { SignedSense::On } else { -short_circuit }
            }
        }
    }
}

/// Returns an evaluator that classifies `pos` using the tree's surfaces.
pub fn point_evaluator<'a>(
    tree: &'a CsgTree,
    surfaces: &'a GenericVec<LocalSurfaceId, VariantSurface>,
    pos: Real3,
) -> SenseEvaluator<'a, impl Fn(LocalSurfaceId) -> SignedSense + 'a> {
    SenseEvaluator::new(tree, move |s| surfaces[s].calc_sense(pos))
}

#[cfg(test)]
mod tests {
    use csgmath::{Axis, Float, real3};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::surface::{CylCentered, PlaneAligned};

    struct Fixture {
        tree: CsgTree,
        surfaces: GenericVec<LocalSurfaceId, VariantSurface>,
    }
    impl Fixture {
        fn insert(&mut self, node: Node) -> NodeId {
            self.tree.insert(node).unwrap().0
        }
        fn insert_surface(&mut self, surf: impl Into<VariantSurface>) -> NodeId {
            let id = self.surfaces.push(surf.into()).unwrap();
            self.insert(Node::Surface(id))
        }
        fn is_inside(&self, id: NodeId, pos: [Float; 3]) -> SignedSense {
            point_evaluator(&self.tree, &self.surfaces, real3(pos[0], pos[1], pos[2])).eval(id)
        }
    }

    #[test]
    fn test_sense_evaluator() {
        let mut f = Fixture {
            tree: CsgTree::new(),
            surfaces: GenericVec::new(),
        };
        // Surface nodes are true "above" the plane
        let mz = f.insert_surface(PlaneAligned::new(Axis::Z, -1.0));
        let pz = f.insert_surface(PlaneAligned::new(Axis::Z, 1.0));
        let below_pz = f.insert(Node::Negated(pz));
        let r_inner = f.insert_surface(CylCentered::new(Axis::Z, 0.5));
        let inside_inner = f.insert(Node::Negated(r_inner));
        let inner_cyl = f.insert(Node::all([mz, below_pz, inside_inner]));
        let r_outer = f.insert_surface(CylCentered::new(Axis::Z, 1.0));
        let inside_outer = f.insert(Node::Negated(r_outer));
        let outer_cyl = f.insert(Node::all([mz, below_pz, inside_outer]));
        let not_inner = f.insert(Node::Negated(inner_cyl));
        let shell = f.insert(Node::all([not_inner, outer_cyl]));
        let zslab = f.insert(Node::all([mz, below_pz]));

        use SignedSense::{Inside, On, Outside};

        assert_eq!(f.is_inside(mz, [0.0, 0.0, -2.0]), Outside);
        assert_eq!(f.is_inside(mz, [0.0, 0.0, -1.0]), On);
        assert_eq!(f.is_inside(mz, [0.0, 0.0, 2.0]), Inside);

        assert_eq!(f.is_inside(below_pz, [0.0, 0.0, 0.5]), Inside);
        assert_eq!(f.is_inside(below_pz, [0.0, 0.0, 1.0]), On);
        assert_eq!(f.is_inside(below_pz, [0.0, 0.0, 2.0]), Outside);

        assert_eq!(f.is_inside(zslab, [0.0, 0.0, 0.0]), Inside);
        assert_eq!(f.is_inside(zslab, [0.0, 0.0, 1.0]), On);
        assert_eq!(f.is_inside(zslab, [0.0, 0.0, -2.0]), Outside);

        assert_eq!(f.is_inside(shell, [0.0, 0.0, 0.0]), Outside);
        assert_eq!(f.is_inside(shell, [0.0, 0.0, 1.0]), On);
        assert_eq!(f.is_inside(shell, [0.75, 0.0, 0.0]), Inside);
        assert_eq!(f.is_inside(shell, [1.25, 0.0, 0.0]), Outside);
        assert_eq!(f.is_inside(shell, [0.0, 0.0, -2.0]), Outside);
    }

    #[test]
    fn test_constants() {
        let tree = CsgTree::new();
        let eval = SenseEvaluator::new(&tree, |_| SignedSense::On);
        assert_eq!(eval.eval(NodeId::TRUE), SignedSense::Inside);
        assert_eq!(eval.eval(NodeId::FALSE), SignedSense::Outside);
    }
}
