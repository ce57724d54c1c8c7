use std::f64::consts::FRAC_1_SQRT_2;

use csgmath::{Axis, BBox, Bound, Float, Real3};

use super::*;
use crate::zone::BoundingZone;

/// Truncates a bounding zone to the inside (negative side) of a surface.
///
/// The exterior shrinks to a box enclosing the surface's inside and the
/// interior shrinks to a box enclosed by it. Surfaces whose inside has no
/// useful enclosed box clear the interior.
#[derive(Debug)]
pub struct SurfaceClipper<'a> {
    interior: &'a mut BBox,
    exterior: &'a mut BBox,
}

impl<'a> SurfaceClipper<'a> {
    /// Constructs a clipper that modifies a zone in place.
    pub fn new(zone: &'a mut BoundingZone) -> Self {
        debug_assert!(!zone.negated, "cannot clip a negated zone");
        Self {
            interior: &mut zone.interior,
            exterior: &mut zone.exterior,
        }
    }

    /// Clips the zone to the inside of a surface.
    pub fn clip(&mut self, surf: &VariantSurface) {
        match surf {
            VariantSurface::PlaneAligned(s) => {
                self.interior.shrink(Bound::Hi, s.axis, s.position);
                self.exterior.shrink(Bound::Hi, s.axis, s.position);
            }
            VariantSurface::CylCentered(s) => {
                self.clip_cylinder(s.axis, Real3::ZERO, s.radius_sq.sqrt());
            }
            VariantSurface::CylAligned(s) => {
                self.clip_cylinder(s.axis, s.origin, s.radius_sq.sqrt());
            }
            VariantSurface::SphereCentered(s) => {
                self.clip_sphere(Real3::ZERO, s.radius_sq.sqrt());
            }
            VariantSurface::Sphere(s) => {
                self.clip_sphere(s.origin, s.radius_sq.sqrt());
            }
            VariantSurface::Plane(_)
            | VariantSurface::ConeAligned(_)
            | VariantSurface::SimpleQuadric(_)
            | VariantSurface::GeneralQuadric(_)
            | VariantSurface::Involute(_) => *self.interior = BBox::NULL,
        }
    }

    fn clip_cylinder(&mut self, axis: Axis, origin: Real3, radius: Float) {
        let inner = radius * FRAC_1_SQRT_2;
        for ax in axis.perpendicular() {
            shrink_about(self.interior, ax, origin[ax], inner);
            shrink_about(self.exterior, ax, origin[ax], radius);
        }
    }

    fn clip_sphere(&mut self, origin: Real3, radius: Float) {
        let inner = radius / (3.0 as Float).sqrt();
        for ax in Axis::ALL {
            shrink_about(self.interior, ax, origin[ax], inner);
            shrink_about(self.exterior, ax, origin[ax], radius);
        }
    }
}

/// Truncates a bounding zone to the outside (positive side) of a surface.
///
/// Only axis-aligned planes bound their outside; every other surface clears
/// the interior and leaves the exterior unchanged.
#[derive(Debug)]
pub struct NegatedSurfaceClipper<'a> {
    interior: &'a mut BBox,
    exterior: &'a mut BBox,
}

impl<'a> NegatedSurfaceClipper<'a> {
    /// Constructs a clipper that modifies a zone in place.
    pub fn new(zone: &'a mut BoundingZone) -> Self {
        debug_assert!(!zone.negated, "cannot clip a negated zone");
        Self {
            interior: &mut zone.interior,
            exterior: &mut zone.exterior,
        }
    }

    /// Clips the zone to the outside of a surface.
    pub fn clip(&mut self, surf: &VariantSurface) {
        match surf {
            VariantSurface::PlaneAligned(s) => {
                self.interior.shrink(Bound::Lo, s.axis, s.position);
                self.exterior.shrink(Bound::Lo, s.axis, s.position);
            }
            _ => *self.interior = BBox::NULL,
        }
    }
}

fn shrink_about(bbox: &mut BBox, axis: Axis, center: Float, half_width: Float) {
    bbox.shrink(Bound::Lo, axis, center - half_width);
    bbox.shrink(Bound::Hi, axis, center + half_width);
}

#[cfg(test)]
mod tests {
    use csgmath::{assert_approx_eq, real3};
    use pretty_assertions::assert_eq;

    use super::*;

    fn clipped(surf: impl Into<VariantSurface>) -> BoundingZone {
        let mut zone = BoundingZone::from_infinite();
        SurfaceClipper::new(&mut zone).clip(&surf.into());
        zone
    }
    fn clipped_outside(surf: impl Into<VariantSurface>) -> BoundingZone {
        let mut zone = BoundingZone::from_infinite();
        NegatedSurfaceClipper::new(&mut zone).clip(&surf.into());
        zone
    }

    const INF: Float = Float::INFINITY;

    #[test]
    fn test_plane_aligned() {
        let below = BBox::new(real3(-INF, -INF, -INF), real3(INF, 2.0, INF));
        let bz = clipped(PlaneAligned::new(Axis::Y, 2.0));
        assert_eq!(bz.interior, below);
        assert_eq!(bz.exterior, below);

        let above = BBox::new(real3(-INF, 2.0, -INF), real3(INF, INF, INF));
        let bz = clipped_outside(PlaneAligned::new(Axis::Y, 2.0));
        assert_eq!(bz.interior, above);
        assert_eq!(bz.exterior, above);
    }

    #[test]
    fn test_cylinder() {
        let bz = clipped(CylAligned::new(Axis::Z, real3(1.0, 2.0, 0.0), 2.0));
        assert_eq!(
            bz.exterior,
            BBox::new(real3(-1.0, 0.0, -INF), real3(3.0, 4.0, INF)),
        );
        let h = 2.0 * FRAC_1_SQRT_2;
        assert_approx_eq!(bz.interior.lower()[0], 1.0 - h);
        assert_approx_eq!(bz.interior.upper()[1], 2.0 + h);
        assert_eq!(bz.interior.upper()[2], INF);

        let bz = clipped(CylCentered::new(Axis::X, 1.0));
        assert_eq!(
            bz.exterior,
            BBox::new(real3(-INF, -1.0, -1.0), real3(INF, 1.0, 1.0)),
        );
    }

    #[test]
    fn test_sphere() {
        let bz = clipped(SphereCentered::new(3.0));
        assert_eq!(bz.exterior, BBox::from_half_widths(real3(3.0, 3.0, 3.0)));
        let h = 3.0 / (3.0 as Float).sqrt();
        assert_approx_eq!(bz.interior.upper(), real3(h, h, h));
        assert!(bz.is_valid());

        let bz = clipped(Sphere::new(real3(1.0, 0.0, 0.0), 1.0));
        assert_eq!(
            bz.exterior,
            BBox::new(real3(0.0, -1.0, -1.0), real3(2.0, 1.0, 1.0)),
        );
    }

    #[test]
    fn test_unbounded_kinds() {
        for surf in [
            VariantSurface::from(Plane::new(real3(0.6, 0.8, 0.0), 1.0)),
            ConeAligned::new(Axis::Z, Real3::ZERO, 1.0).into(),
            GeneralQuadric::new(
                real3(1.0, 1.0, 1.0),
                real3(1.0, 0.0, 0.0),
                Real3::ZERO,
                -1.0,
            )
            .into(),
        ] {
            let bz = clipped(surf);
            assert!(bz.interior.is_null(), "{surf}");
            assert!(bz.exterior.is_infinite(), "{surf}");
        }

        // Outside of a closed surface
        let bz = clipped_outside(SphereCentered::new(1.0));
        assert!(bz.interior.is_null());
        assert!(bz.exterior.is_infinite());
    }
}
