use csgmath::{Axis, Float, Real3, Sense, SoftEqual, Tolerance};

use super::*;

/// Maximum number of simplification steps applied to a single surface.
const MAX_SIMPLIFY_STEPS: usize = 8;

/// Returns whether any component is negative zero, which hashes and prints
/// differently from zero.
fn has_negative_zero(r: Real3) -> bool {
    r.iter().any(|x| x == 0.0 && x.is_sign_negative())
}
/// Replaces negative zeros with positive zeros.
fn without_negative_zero(r: Real3) -> Real3 {
    Real3(r.0.map(|x| x + 0.0))
}

/// Replaces a surface with a simpler or more canonical equivalent, one step
/// at a time.
///
/// Every rule either reduces the surface to a more specific kind or puts it
/// in a canonical orientation, so repeated application always terminates.
#[derive(Debug, Copy, Clone)]
pub struct SurfaceSimplifier {
    tol: Tolerance,
}

impl SurfaceSimplifier {
    /// Constructs a simplifier using a construction tolerance.
    pub fn new(tol: Tolerance) -> Self {
        Self { tol }
    }

    /// Returns an equivalent surface along with whether the sense of the
    /// region it bounds must be flipped, or `None` if the surface cannot be
    /// simplified.
    pub fn simplify(&self, surf: &VariantSurface) -> Option<(VariantSurface, bool)> {
        match surf {
            VariantSurface::PlaneAligned(s) => self.simplify_plane_aligned(s),
            VariantSurface::CylAligned(s) => self.simplify_cyl_aligned(s),
            VariantSurface::Sphere(s) => self.simplify_sphere(s),
            VariantSurface::Plane(s) => self.simplify_plane(s),
            VariantSurface::SimpleQuadric(s) => self.simplify_simple_quadric(s),
            VariantSurface::GeneralQuadric(s) => self.simplify_general_quadric(s),
            VariantSurface::ConeAligned(s) => has_negative_zero(s.origin).then(|| {
                let origin = without_negative_zero(s.origin);
                (ConeAligned::from_tangent_sq(s.axis, origin, s.tangent_sq).into(), false)
            }),
            VariantSurface::CylCentered(_)
            | VariantSurface::SphereCentered(_)
            | VariantSurface::Involute(_) => None,
        }
    }

    fn simplify_plane_aligned(&self, s: &PlaneAligned) -> Option<(VariantSurface, bool)> {
        // Negative zero would hash and print differently from zero
        (s.position == 0.0 && s.position.is_sign_negative())
            .then(|| (PlaneAligned::new(s.axis, 0.0).into(), false))
    }

    fn simplify_cyl_aligned(&self, s: &CylAligned) -> Option<(VariantSurface, bool)> {
        let [u, v] = s.axis.perpendicular();
        let soft = self.tol.soft_equal();
        if soft.eq_zero(s.origin[u]) && soft.eq_zero(s.origin[v]) {
            return Some((CylCentered::from_radius_sq(s.axis, s.radius_sq).into(), false));
        }
        has_negative_zero(s.origin).then(|| {
            let origin = without_negative_zero(s.origin);
            (CylAligned::from_radius_sq(s.axis, origin, s.radius_sq).into(), false)
        })
    }

    fn simplify_sphere(&self, s: &Sphere) -> Option<(VariantSurface, bool)> {
        let soft = self.tol.soft_equal();
        if s.origin.iter().all(|x| soft.eq_zero(x)) {
            return Some((SphereCentered::from_radius_sq(s.radius_sq).into(), false));
        }
        has_negative_zero(s.origin).then(|| {
            let origin = without_negative_zero(s.origin);
            (Sphere::from_radius_sq(origin, s.radius_sq).into(), false)
        })
    }

    fn simplify_plane(&self, s: &Plane) -> Option<(VariantSurface, bool)> {
        let n = s.normal;
        let is_zero = |x: Float| x.abs() <= self.tol.rel;

        // Snap to an axis
        for axis in Axis::ALL {
            let [u, v] = axis.perpendicular();
            if is_zero(n[u]) && is_zero(n[v]) {
                let flip = n[axis] < 0.0;
                let position = if flip { -s.displacement } else { s.displacement };
                return Some((PlaneAligned::new(axis, position).into(), flip));
            }
        }

        // Point the normal so that its first nonzero component is positive
        let first = n.iter().find(|&x| !is_zero(x))?;
        (first < 0.0).then(|| (Plane::new(-n, -s.displacement).into(), true))
    }

    fn simplify_simple_quadric(&self, s: &SimpleQuadric) -> Option<(VariantSurface, bool)> {
        let scale = s.second.max_abs().max(s.first.max_abs());
        if scale == 0.0 {
            return None;
        }
        let is_zero = |x: Float| x.abs() <= self.tol.rel * scale;

        if s.second.iter().all(is_zero) {
            let norm = s.first.norm();
            let plane = Plane::new(s.first / norm, -s.zeroth / norm);
            return Some((plane.into(), false));
        }

        let positive = s.second.iter().filter(|&x| !is_zero(x) && x > 0.0).count();
        let negative = s.second.iter().filter(|&x| !is_zero(x) && x < 0.0).count();
        if negative > positive {
            return Some((s.negated().into(), true));
        }

        // Coefficients that should match up to roundoff
        let coeff_eq = SoftEqual {
            rel: self.tol.rel,
            abs: self.tol.rel * scale,
        };
        let zero_axes = Axis::ALL.into_iter().filter(|&ax| is_zero(s.second[ax]));
        let neg_axes = Axis::ALL.into_iter().filter(|&ax| s.second[ax] < 0.0 && !is_zero(s.second[ax]));

        match (positive, negative) {
            (3, 0) => {
                let [a, b, c] = s.second.0;
                if !(coeff_eq.eq(a, b) && coeff_eq.eq(b, c)) {
                    return None;
                }
                let a = (a + b + c) / 3.0;
                let origin = without_negative_zero(s.first / (-2.0 * a));
                let radius_sq = origin.norm_sq() - s.zeroth / a;
                (radius_sq > 0.0).then(|| (Sphere::from_radius_sq(origin, radius_sq).into(), false))
            }
            (2, 0) => {
                let axis = zero_axes.into_iter().next()?;
                let [u, v] = axis.perpendicular();
                if !coeff_eq.eq(s.second[u], s.second[v]) || !is_zero(s.first[axis]) {
                    return None;
                }
                let a = (s.second[u] + s.second[v]) / 2.0;
                let mut origin = Real3::ZERO;
                origin[u] = s.first[u] / (-2.0 * a);
                origin[v] = s.first[v] / (-2.0 * a);
                let origin = without_negative_zero(origin);
                let radius_sq = origin.norm_sq() - s.zeroth / a;
                (radius_sq > 0.0)
                    .then(|| (CylAligned::from_radius_sq(axis, origin, radius_sq).into(), false))
            }
            (2, 1) => {
                let axis = neg_axes.into_iter().next()?;
                let [u, v] = axis.perpendicular();
                if !coeff_eq.eq(s.second[u], s.second[v]) {
                    return None;
                }
                let a = (s.second[u] + s.second[v]) / 2.0;
                let origin = Real3(std::array::from_fn(|i| s.first[i] / (-2.0 * s.second[i])));
                let origin = without_negative_zero(origin);
                let expected_zeroth: Float =
                    (0..3).map(|i| s.second[i] * origin[i] * origin[i]).sum();
                if !coeff_eq.eq(s.zeroth, expected_zeroth) {
                    return None;
                }
                let tangent_sq = -s.second[axis] / a;
                Some((ConeAligned::from_tangent_sq(axis, origin, tangent_sq).into(), false))
            }
            _ => None,
        }
    }

    fn simplify_general_quadric(&self, s: &GeneralQuadric) -> Option<(VariantSurface, bool)> {
        let scale = s.second.max_abs().max(s.cross.max_abs()).max(s.first.max_abs());
        s.cross
            .iter()
            .all(|x| x.abs() <= self.tol.rel * scale)
            .then(|| (SimpleQuadric::new(s.second, s.first, s.zeroth).into(), false))
    }
}

/// Applies [`SurfaceSimplifier`] until the surface no longer changes,
/// tracking the sense of the region it bounds.
#[derive(Debug, Copy, Clone)]
pub struct RecursiveSimplifier {
    simplifier: SurfaceSimplifier,
}

impl RecursiveSimplifier {
    /// Constructs a recursive simplifier using a construction tolerance.
    pub fn new(tol: Tolerance) -> Self {
        Self {
            simplifier: SurfaceSimplifier::new(tol),
        }
    }

    /// Returns the fully simplified surface and the corresponding sense.
    pub fn simplify(&self, mut sense: Sense, mut surf: VariantSurface) -> (Sense, VariantSurface) {
        for _ in 0..MAX_SIMPLIFY_STEPS {
            let Some((simplified, flip)) = self.simplifier.simplify(&surf) else {
                return (sense, surf);
            };
            tracing::trace!("simplified {surf} -> {simplified}");
            surf = simplified;
            sense = sense.flipped_if(flip);
        }
        csgmath::debug_panic!("simplification of {surf} did not converge");
        (sense, surf)
    }
}
