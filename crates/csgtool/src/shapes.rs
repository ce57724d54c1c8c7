//! Primitive shapes built as intersections of sensed surfaces.

use std::f64::consts::FRAC_1_SQRT_2;
use std::fmt;

use csgmath::{Axis, BBox, Float, Real3, Sense, VariantTransform, real3};
use csgshape::CsgError;
use csgshape::builder::{CsgUnitBuilder, IntersectSurfaceBuilder, IntersectSurfaceState};
use csgshape::surface::{ConeAligned, CylCentered, PlaneAligned, SphereCentered};
use csgshape::tree::NodeId;
use eyre::{Result, ensure};

/// Shape defined by the intersection of sensed surfaces in local coordinates.
pub(crate) trait IntersectRegion: fmt::Debug {
    /// Adds the shape's surfaces and bounding hints.
    fn build(&self, isb: &mut IntersectSurfaceBuilder<'_>) -> Result<(), CsgError>;
}

/// Builds a region and records it in the unit.
pub(crate) fn build_region(
    ub: &mut CsgUnitBuilder,
    name: &str,
    transform: VariantTransform,
    region: &dyn IntersectRegion,
) -> Result<NodeId, CsgError> {
    let mut state = IntersectSurfaceState::new(name, transform);
    let mut isb = IntersectSurfaceBuilder::new(ub, &mut state);
    region.build(&mut isb)?;
    isb.finish()
}

/// Box that is infinite along the z axis.
fn xy_radial_bbox(r: Float) -> BBox {
    let inf = Float::INFINITY;
    BBox::new(real3(-r, -r, -inf), real3(r, r, inf))
}

/// Axis-aligned box centered on the origin.
#[derive(Debug, Copy, Clone, PartialEq)]
pub(crate) struct Cuboid {
    half_widths: Real3,
}
impl Cuboid {
    pub fn new(half_widths: Real3) -> Result<Self> {
        ensure!(
            half_widths.0.iter().all(|&hw| hw > 0.0),
            "box half-widths must be positive: {half_widths}",
        );
        Ok(Self { half_widths })
    }
}
impl IntersectRegion for Cuboid {
    fn build(&self, isb: &mut IntersectSurfaceBuilder<'_>) -> Result<(), CsgError> {
        for ax in Axis::ALL {
            isb.insert(Sense::Outside, PlaneAligned::new(ax, -self.half_widths[ax]))?;
            isb.insert(Sense::Inside, PlaneAligned::new(ax, self.half_widths[ax]))?;
        }
        Ok(())
    }
}

/// Sphere centered on the origin.
#[derive(Debug, Copy, Clone, PartialEq)]
pub(crate) struct Sphere {
    radius: Float,
}
impl Sphere {
    pub fn new(radius: Float) -> Result<Self> {
        ensure!(radius > 0.0, "sphere radius must be positive: {radius}");
        Ok(Self { radius })
    }
}
impl IntersectRegion for Sphere {
    fn build(&self, isb: &mut IntersectSurfaceBuilder<'_>) -> Result<(), CsgError> {
        isb.insert(Sense::Inside, SphereCentered::new(self.radius))
    }
}

/// Space between two concentric spheres.
#[derive(Debug, Copy, Clone, PartialEq)]
pub(crate) struct Shell {
    inner: Float,
    outer: Float,
}
impl Shell {
    pub fn new(inner: Float, outer: Float) -> Result<Self> {
        ensure!(inner > 0.0, "inner radius must be positive: {inner}");
        ensure!(
            outer > inner,
            "outer radius {outer} must exceed inner radius {inner}",
        );
        Ok(Self { inner, outer })
    }
}
impl IntersectRegion for Shell {
    fn build(&self, isb: &mut IntersectSurfaceBuilder<'_>) -> Result<(), CsgError> {
        isb.insert_named(Sense::Inside, SphereCentered::new(self.outer), "outer")?;
        isb.insert_named(Sense::Outside, SphereCentered::new(self.inner), "inner")
    }
}

/// Z-aligned cylinder centered on the origin.
#[derive(Debug, Copy, Clone, PartialEq)]
pub(crate) struct Cylinder {
    radius: Float,
    half_height: Float,
}
impl Cylinder {
    pub fn new(radius: Float, half_height: Float) -> Result<Self> {
        ensure!(radius > 0.0, "cylinder radius must be positive: {radius}");
        ensure!(
            half_height > 0.0,
            "cylinder half-height must be positive: {half_height}",
        );
        Ok(Self {
            radius,
            half_height,
        })
    }
}
impl IntersectRegion for Cylinder {
    fn build(&self, isb: &mut IntersectSurfaceBuilder<'_>) -> Result<(), CsgError> {
        isb.insert(Sense::Outside, PlaneAligned::new(Axis::Z, -self.half_height))?;
        isb.insert(Sense::Inside, PlaneAligned::new(Axis::Z, self.half_height))?;
        isb.insert(Sense::Inside, CylCentered::new(Axis::Z, self.radius))
    }
}

/// Truncated z-aligned cone centered on the origin, with radii at `-hh` and
/// `+hh`. One radius may be zero.
#[derive(Debug, Copy, Clone, PartialEq)]
pub(crate) struct Cone {
    lo: Float,
    hi: Float,
    half_height: Float,
}
impl Cone {
    pub fn new(lo: Float, hi: Float, half_height: Float) -> Result<Self> {
        ensure!(
            lo >= 0.0 && hi >= 0.0,
            "cone radii must be nonnegative: {lo}, {hi}",
        );
        ensure!(lo > 0.0 || hi > 0.0, "cone radii cannot both be zero");
        ensure!(
            half_height > 0.0,
            "cone half-height must be positive: {half_height}",
        );
        Ok(Self { lo, hi, half_height })
    }
}
impl IntersectRegion for Cone {
    fn build(&self, isb: &mut IntersectSurfaceBuilder<'_>) -> Result<(), CsgError> {
        let Self { lo, hi, half_height: hh } = *self;
        if isb.tol().soft_equal().eq(lo, hi) {
            return Cylinder {
                radius: 0.5 * (lo + hi),
                half_height: hh,
            }
            .build(isb);
        }

        isb.insert(Sense::Outside, PlaneAligned::new(Axis::Z, -hh))?;
        isb.insert(Sense::Inside, PlaneAligned::new(Axis::Z, hh))?;

        // Tangent of the half-angle
        let tangent = (lo - hi).abs() / (2.0 * hh);
        let vanish_z = if lo > hi {
            // Base on the bottom
            -hh + lo / tangent
        } else {
            hh - hi / tangent
        };
        let cone = ConeAligned::new(Axis::Z, real3(0.0, 0.0, vanish_z), tangent);
        isb.insert(Sense::Inside, cone)?;

        let base = lo.max(hi);
        isb.shrink_exterior(&xy_radial_bbox(base));

        // Largest box in the triangle cut through the axis, limited to the
        // lower half of the apex height
        let z = (0.5 * base / tangent).min(2.0 * hh);
        let r = base - tangent * z;
        let (zmin, zmax) = if lo < hi { (hh - z, hh) } else { (-hh, -hh + z) };
        debug_assert!(zmin < zmax);
        let rbox = FRAC_1_SQRT_2 * r;
        isb.grow_interior(&BBox::new(real3(-rbox, -rbox, zmin), real3(rbox, rbox, zmax)));
        Ok(())
    }
}
