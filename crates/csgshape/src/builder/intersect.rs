use csgmath::{BBox, Sense, Tolerance, Transform, VariantTransform, bbox};

use super::{CsgUnitBuilder, Label};
use crate::surface::{
    NegatedSurfaceClipper, RecursiveSimplifier, SurfaceClipper, VariantSurface, apply_transform,
};
use crate::tree::{Node, NodeId};
use crate::zone::{self, BoundingZone};
use crate::CsgError;

/// Surfaces and bounds accumulated while building one intersection region.
#[derive(Debug, Clone)]
pub struct IntersectSurfaceState {
    /// Transform from the region's local coordinates to the unit
    pub transform: VariantTransform,
    /// Name of the object being built, used for metadata
    pub object_name: String,
    /// Prefix for automatically generated face names
    pub face_prefix: String,
    /// Bounds in local coordinates
    pub local_bzone: BoundingZone,
    /// Bounds in unit coordinates
    pub global_bzone: BoundingZone,
    /// Sensed surface nodes to intersect
    pub nodes: Vec<NodeId>,
}

impl IntersectSurfaceState {
    /// Constructs an empty state for an object.
    pub fn new(object_name: impl Into<String>, transform: VariantTransform) -> Self {
        Self {
            transform,
            object_name: object_name.into(),
            face_prefix: String::new(),
            local_bzone: BoundingZone::from_infinite(),
            global_bzone: BoundingZone::from_infinite(),
            nodes: vec![],
        }
    }

    /// Returns the default face name for a surface, such as `-pz` for the
    /// inside of a z-aligned plane.
    pub fn make_face_name(&self, sense: Sense, surf: &VariantSurface) -> String {
        format!("{}{sense}{}", self.face_prefix, surf.surface_type())
    }

    /// Returns the intersection of the transformed local zone with the
    /// global zone.
    pub fn calc_merged_bzone(&self) -> BoundingZone {
        let local = &self.local_bzone;
        debug_assert!(!local.negated && !self.global_bzone.negated);
        let transformed_local = BoundingZone {
            interior: match local.interior.is_null() {
                true => BBox::NULL,
                false => self.transform.transform_bbox(&local.interior),
            },
            exterior: self.transform.transform_bbox(&local.exterior),
            negated: false,
        };
        zone::calc_intersection(&transformed_local, &self.global_bzone)
    }
}

/// Clips a zone to one side of a surface.
fn clip_zone(zone: &mut BoundingZone, sense: Sense, surf: &VariantSurface) {
    match sense {
        Sense::Inside => SurfaceClipper::new(zone).clip(surf),
        Sense::Outside => NegatedSurfaceClipper::new(zone).clip(surf),
    }
}

/// Builds an intersection region from `(sense, surface)` pairs in local
/// coordinates.
///
/// Each surface is transformed into unit coordinates, canonicalized,
/// deduplicated, and added as a node. The local and global bounding zones
/// are clipped along the way.
#[derive(Debug)]
pub struct IntersectSurfaceBuilder<'a> {
    ub: &'a mut CsgUnitBuilder,
    state: &'a mut IntersectSurfaceState,
}

impl<'a> IntersectSurfaceBuilder<'a> {
    /// Constructs a builder, truncating the region's global zone to the
    /// unit's extents.
    pub fn new(ub: &'a mut CsgUnitBuilder, state: &'a mut IntersectSurfaceState) -> Self {
        let extents = ub.extents();
        state.global_bzone.interior = extents;
        state.global_bzone.exterior = extents;
        Self { ub, state }
    }

    /// Returns the construction tolerance.
    pub fn tol(&self) -> Tolerance {
        self.ub.tol()
    }

    /// Adds a surface with a default face name.
    pub fn insert(&mut self, sense: Sense, surf: impl Into<VariantSurface>) -> Result<(), CsgError> {
        let surf = surf.into();
        let ext = self.state.make_face_name(sense, &surf);
        self.insert_named(sense, surf, ext)
    }

    /// Adds a surface whose node is labeled `ext`.
    pub fn insert_named(
        &mut self,
        sense: Sense,
        surf: impl Into<VariantSurface>,
        ext: impl Into<String>,
    ) -> Result<(), CsgError> {
        let surf = surf.into();
        let simplifier = RecursiveSimplifier::new(self.ub.tol());

        let (local_sense, local_surf) = simplifier.simplify(sense, surf);
        clip_zone(&mut self.state.local_bzone, local_sense, &local_surf);

        let transformed = apply_transform(&self.state.transform, &surf)?;
        let (final_sense, final_surf) = simplifier.simplify(sense, transformed);
        let (mut node, _) = self.ub.insert_surface(final_surf)?;

        // Clip with the deduplicated surface so that the zone is consistent
        // with what is actually stored
        let stored = *self
            .ub
            .surface(node)
            .expect("inserted surface node must be a surface");
        clip_zone(&mut self.state.global_bzone, final_sense, &stored);

        self.ub
            .insert_md(node, Label::new(self.state.object_name.clone(), ext));

        if final_sense == Sense::Inside {
            // Surface nodes are true outside
            node = self.ub.insert_csg(Node::Negated(node))?.0;
        }
        self.state.nodes.push(node);
        Ok(())
    }

    /// Truncates the exterior boxes to a box in local coordinates that is
    /// known to enclose the region.
    ///
    /// The interior boxes are truncated to match.
    pub fn shrink_exterior(&mut self, bbox: &BBox) {
        assert!(
            !bbox.is_null() && !bbox.is_degenerate(),
            "cannot shrink exterior to {bbox:?}",
        );
        let global_bbox = self.state.transform.transform_bbox(bbox);
        for (zone, b) in [
            (&mut self.state.local_bzone, bbox),
            (&mut self.state.global_bzone, &global_bbox),
        ] {
            zone.exterior = bbox::calc_intersection(&zone.exterior, b);
            if !zone.interior.is_null() {
                zone.interior = bbox::calc_intersection(&zone.interior, &zone.exterior);
            }
        }
    }

    /// Expands the interior boxes to a box in local coordinates that is
    /// known to be enclosed by the region.
    ///
    /// The exterior boxes are expanded to match.
    pub fn grow_interior(&mut self, bbox: &BBox) {
        assert!(!bbox.is_null(), "cannot grow interior by a null box");
        let global_bbox = self.state.transform.transform_bbox(bbox);
        for (zone, b) in [
            (&mut self.state.local_bzone, bbox),
            (&mut self.state.global_bzone, &global_bbox),
        ] {
            zone.interior = bbox::calc_union(&zone.interior, b);
            if !zone.exterior.is_null() {
                zone.exterior = bbox::calc_union(&zone.interior, &zone.exterior);
            }
        }
    }

    /// Intersects the accumulated surfaces and records the result as a
    /// region of the unit.
    pub fn finish(self) -> Result<NodeId, CsgError> {
        if self.state.nodes.is_empty() {
            return Err(CsgError::EmptyRegion(self.state.object_name.clone()));
        }
        let bounds = self.state.calc_merged_bzone();

        let nodes = std::mem::take(&mut self.state.nodes);
        let (node, _) = self.ub.insert_csg(Node::all(nodes))?;
        self.ub
            .insert_md(node, Label::from_name(self.state.object_name.clone()));
        let transform_id = self.ub.insert_transform(&self.state.transform)?;
        self.ub.insert_region(node, bounds, transform_id);
        Ok(node)
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::FRAC_1_SQRT_2;

    use csgmath::{Axis, Float, Real3, Translation, assert_approx_eq, real3};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::surface::{CylCentered, PlaneAligned, SphereCentered};
    use crate::tree::build_infix_string;

    fn unit_builder() -> CsgUnitBuilder {
        CsgUnitBuilder::new(Tolerance::from_relative(1e-4, 1.0).unwrap(), BBox::INFINITE)
    }

    fn build_box(ub: &mut CsgUnitBuilder, name: &str, hw: Real3, transform: VariantTransform) -> NodeId {
        let mut state = IntersectSurfaceState::new(name, transform);
        let mut isb = IntersectSurfaceBuilder::new(ub, &mut state);
        for ax in Axis::ALL {
            isb.insert(Sense::Outside, PlaneAligned::new(ax, -hw[ax])).unwrap();
            isb.insert(Sense::Inside, PlaneAligned::new(ax, hw[ax])).unwrap();
        }
        isb.finish().unwrap()
    }

    #[test]
    fn test_box() {
        let mut ub = unit_builder();
        let node = build_box(&mut ub, "box", real3(1.0, 2.0, 3.0), VariantTransform::default());

        let unit = ub.unit();
        assert_eq!(build_infix_string(&unit.tree, node), "all(+0, -1, +2, -3, +4, -5)");
        let surfaces = unit.surfaces.iter().map(|(_, s)| s.to_string()).collect::<Vec<_>>();
        assert_eq!(
            surfaces,
            ["px: x=-1", "px: x=1", "py: y=-2", "py: y=2", "pz: z=-3", "pz: z=3"],
        );

        let expected = BBox::from_half_widths(real3(1.0, 2.0, 3.0));
        let region = unit.regions[&node];
        assert_eq!(region.bounds.interior, expected);
        assert_eq!(region.bounds.exterior, expected);
        assert!(!region.bounds.negated);

        assert_eq!(unit.labels(node), "box");
        let face = unit.tree.find(&Node::Surface(crate::surface::LocalSurfaceId(1))).unwrap();
        assert_eq!(unit.labels(face), "box@-px");
    }

    #[test]
    fn test_translated_box() {
        let mut ub = unit_builder();
        let transform = Translation(real3(1.0, 0.0, 0.0)).into();
        let node = build_box(&mut ub, "box", real3(1.0, 1.0, 1.0), transform);

        let unit = ub.unit();
        assert_eq!(unit.surfaces[crate::surface::LocalSurfaceId(0)].to_string(), "px: x=0");
        let expected = BBox::new(real3(0.0, -1.0, -1.0), real3(2.0, 1.0, 1.0));
        assert_eq!(unit.regions[&node].bounds.exterior, expected);
        assert_eq!(unit.regions[&node].bounds.interior, expected);
        assert_eq!(*ub.transform(unit.regions[&node].transform_id), transform);
    }

    #[test]
    fn test_shared_faces() {
        let mut ub = unit_builder();
        let a = build_box(&mut ub, "a", real3(1.0, 1.0, 1.0), VariantTransform::default());
        let b = build_box(
            &mut ub,
            "b",
            real3(1.0, 1.0, 1.0),
            Translation(real3(2.0, 0.0, 0.0)).into(),
        );
        assert_ne!(a, b);
        // Only the +x face of `b` is new
        assert_eq!(ub.unit().surfaces.len(), 7);
        let shared = ub.unit().tree.find(&Node::Surface(crate::surface::LocalSurfaceId(1))).unwrap();
        assert_eq!(ub.unit().labels(shared), "a@-px' = 'b@+px");
    }

    #[test]
    fn test_hollow_sphere() {
        let mut ub = unit_builder();
        let mut state = IntersectSurfaceState::new("shell", VariantTransform::default());
        let mut isb = IntersectSurfaceBuilder::new(&mut ub, &mut state);
        isb.insert(Sense::Inside, SphereCentered::new(2.0)).unwrap();
        isb.insert(Sense::Outside, SphereCentered::new(1.0)).unwrap();
        let node = isb.finish().unwrap();

        let unit = ub.unit();
        assert_eq!(
            unit.tree.to_string(),
            "{0: true, 1: not{0}, 2: surface 0, 3: not{2}, 4: surface 1, 5: all{3,4}, }",
        );
        assert_eq!(node, NodeId(5));
        let bounds = unit.regions[&node].bounds;
        assert!(bounds.interior.is_null());
        assert_eq!(bounds.exterior, BBox::from_half_widths(real3(2.0, 2.0, 2.0)));
    }

    #[test]
    fn test_cylinder_zones() {
        let mut ub = unit_builder();
        let mut state = IntersectSurfaceState::new("cyl", VariantTransform::default());
        let mut isb = IntersectSurfaceBuilder::new(&mut ub, &mut state);
        isb.insert(Sense::Outside, PlaneAligned::new(Axis::Z, -1.0)).unwrap();
        isb.insert(Sense::Inside, PlaneAligned::new(Axis::Z, 1.0)).unwrap();
        isb.insert(Sense::Inside, CylCentered::new(Axis::Z, 2.0)).unwrap();
        let local = isb.state.local_bzone;
        let node = isb.finish().unwrap();

        let h = 2.0 * FRAC_1_SQRT_2;
        assert_approx_eq!(local.interior.upper(), real3(h, h, 1.0));
        assert_eq!(local.exterior, BBox::new(real3(-2.0, -2.0, -1.0), real3(2.0, 2.0, 1.0)));
        assert_eq!(ub.unit().regions[&node].bounds.exterior, local.exterior);
    }

    #[test]
    fn test_bbox_hints() {
        let mut ub = unit_builder();
        let mut state = IntersectSurfaceState::new("hint", Translation(real3(0.0, 0.0, 1.0)).into());
        let mut isb = IntersectSurfaceBuilder::new(&mut ub, &mut state);
        isb.insert(Sense::Inside, PlaneAligned::new(Axis::Z, 0.0)).unwrap();
        let inf = Float::INFINITY;
        isb.shrink_exterior(&BBox::new(real3(-1.0, -1.0, -inf), real3(1.0, 1.0, inf)));
        isb.grow_interior(&BBox::new(real3(-0.5, -0.5, -1.0), real3(0.5, 0.5, 0.0)));

        let merged = isb.state.calc_merged_bzone();
        assert_eq!(merged.exterior, BBox::new(real3(-1.0, -1.0, -inf), real3(1.0, 1.0, 1.0)));
        assert_eq!(merged.interior, BBox::new(real3(-1.0, -1.0, -inf), real3(1.0, 1.0, 1.0)));
        assert!(merged.is_valid());
    }

    #[test]
    fn test_empty_region() {
        let mut ub = unit_builder();
        let mut state = IntersectSurfaceState::new("nothing", VariantTransform::default());
        let isb = IntersectSurfaceBuilder::new(&mut ub, &mut state);
        let err = isb.finish().unwrap_err();
        assert!(matches!(err, CsgError::EmptyRegion(name) if name == "nothing"));
    }
}
