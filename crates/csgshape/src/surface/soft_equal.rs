use csgmath::{Float, Real3, SoftEqual, Tolerance};

use super::VariantSurface;

/// Approximate equality of two surfaces of the same type.
///
/// Lengths are compared with the relative-and-absolute tolerance of
/// [`SoftEqual`]. Squared quantities are compared by their square roots so
/// that the tolerance applies to lengths. Quadric coefficients are scaled by
/// their largest magnitude before being compared.
#[derive(Debug, Copy, Clone)]
pub struct SoftSurfaceEqual {
    soft: SoftEqual,
}

impl SoftSurfaceEqual {
    /// Constructs a comparator from a construction tolerance.
    pub fn new(tol: Tolerance) -> Self {
        Self {
            soft: tol.soft_equal(),
        }
    }

    /// Returns whether two surfaces are equal within tolerance. Surfaces of
    /// different types are never equal.
    pub fn eq(&self, a: &VariantSurface, b: &VariantSurface) -> bool {
        use VariantSurface as S;

        match (a, b) {
            (S::PlaneAligned(a), S::PlaneAligned(b)) => {
                a.axis == b.axis && self.soft.eq(a.position, b.position)
            }
            (S::CylCentered(a), S::CylCentered(b)) => {
                a.axis == b.axis && self.eq_sq(a.radius_sq, b.radius_sq)
            }
            (S::SphereCentered(a), S::SphereCentered(b)) => self.eq_sq(a.radius_sq, b.radius_sq),
            (S::CylAligned(a), S::CylAligned(b)) => {
                a.axis == b.axis
                    && self.eq_sq(a.radius_sq, b.radius_sq)
                    && self.eq_point(a.origin, b.origin)
            }
            (S::Plane(a), S::Plane(b)) => {
                (a.normal - b.normal).norm() <= self.soft.rel
                    && self.soft.eq(a.displacement, b.displacement)
            }
            (S::Sphere(a), S::Sphere(b)) => {
                self.eq_sq(a.radius_sq, b.radius_sq) && self.eq_point(a.origin, b.origin)
            }
            (S::ConeAligned(a), S::ConeAligned(b)) => {
                a.axis == b.axis
                    && self.eq_sq(a.tangent_sq, b.tangent_sq)
                    && self.eq_point(a.origin, b.origin)
            }
            (S::SimpleQuadric(a), S::SimpleQuadric(b)) => {
                let coeffs = |q: &super::SimpleQuadric| {
                    let mut ret = [0.0; 7];
                    ret[..3].copy_from_slice(&q.second.0);
                    ret[3..6].copy_from_slice(&q.first.0);
                    ret[6] = q.zeroth;
                    ret
                };
                self.eq_coeffs(&coeffs(a), &coeffs(b))
            }
            (S::GeneralQuadric(a), S::GeneralQuadric(b)) => {
                let coeffs = |q: &super::GeneralQuadric| {
                    let mut ret = [0.0; 10];
                    ret[..3].copy_from_slice(&q.second.0);
                    ret[3..6].copy_from_slice(&q.cross.0);
                    ret[6..9].copy_from_slice(&q.first.0);
                    ret[9] = q.zeroth;
                    ret
                };
                self.eq_coeffs(&coeffs(a), &coeffs(b))
            }
            (S::Involute(a), S::Involute(b)) => {
                a.sign == b.sign
                    && self.soft.eq(a.radius, b.radius)
                    && self.soft.eq(a.displacement, b.displacement)
                    && self.soft.eq(a.tmin, b.tmin)
                    && self.soft.eq(a.tmax, b.tmax)
                    && self.soft.eq(a.origin[0], b.origin[0])
                    && self.soft.eq(a.origin[1], b.origin[1])
            }
            _ => false,
        }
    }

    /// Returns the largest hash-point difference between two surfaces that
    /// could compare equal, given the magnitude of one hash point.
    pub(super) fn hash_window(&self, hash_point: Float) -> Float {
        2.0 * self.soft.allowed(hash_point.abs())
    }

    fn eq_sq(&self, a: Float, b: Float) -> bool {
        self.soft.eq(a.sqrt(), b.sqrt())
    }

    fn eq_point(&self, a: Real3, b: Real3) -> bool {
        a.distance(b) <= self.soft.allowed(a.norm().max(b.norm()))
    }

    fn eq_coeffs(&self, a: &[Float], b: &[Float]) -> bool {
        let scale = |c: &[Float]| c.iter().map(|x| x.abs()).fold(0.0, Float::max);
        let (sa, sb) = (scale(a), scale(b));
        if sa == 0.0 || sb == 0.0 {
            return sa == sb;
        }
        std::iter::zip(a, b).all(|(x, y)| (x / sa - y / sb).abs() <= self.soft.rel)
    }
}

#[cfg(test)]
mod tests {
    use csgmath::{Axis, real3};

    use super::*;
    use crate::surface::*;

    const SMALL: Float = 1e-5;
    const EPS: Float = 1e-4;
    const LARGE: Float = 1e-3;

    fn softeq() -> SoftSurfaceEqual {
        SoftSurfaceEqual::new(Tolerance::from_relative(EPS, 1.0).unwrap())
    }

    fn check(
        reference: impl Into<VariantSurface>,
        close: impl Into<VariantSurface>,
        far: impl Into<VariantSurface>,
    ) {
        let (reference, close, far) = (reference.into(), close.into(), far.into());
        let eq = softeq();
        assert!(eq.eq(&reference, &reference), "{reference}");
        assert!(eq.eq(&reference, &close), "{reference} vs {close}");
        assert!(eq.eq(&close, &reference), "{close} vs {reference}");
        assert!(!eq.eq(&reference, &far), "{reference} vs {far}");
    }

    #[test]
    fn test_plane_aligned() {
        check(
            PlaneAligned::new(Axis::X, 2.0),
            PlaneAligned::new(Axis::X, 2.0 + SMALL),
            PlaneAligned::new(Axis::X, 2.0 + LARGE),
        );
        assert!(!softeq().eq(
            &PlaneAligned::new(Axis::X, 2.0).into(),
            &PlaneAligned::new(Axis::Y, 2.0).into(),
        ));
    }

    #[test]
    fn test_centered() {
        check(
            CylCentered::new(Axis::Z, 3.0),
            CylCentered::new(Axis::Z, 3.0 + SMALL),
            CylCentered::new(Axis::Z, 3.0 + 10.0 * LARGE),
        );
        check(
            SphereCentered::new(1.0),
            SphereCentered::new(1.0 + SMALL),
            SphereCentered::new(1.0 + LARGE),
        );
    }

    #[test]
    fn test_offset() {
        let origin = real3(1.0, 1.0, 0.0);
        check(
            CylAligned::new(Axis::Z, origin, 1.0),
            CylAligned::new(Axis::Z, origin + real3(SMALL, 0.0, 0.0), 1.0),
            CylAligned::new(Axis::Z, origin + real3(LARGE, 0.0, 0.0), 1.0),
        );
        check(
            Sphere::new(origin, 2.0),
            Sphere::new(origin, 2.0 + SMALL),
            Sphere::new(origin + real3(0.0, 0.0, LARGE), 2.0),
        );
        check(
            ConeAligned::new(Axis::Y, origin, 0.5),
            ConeAligned::new(Axis::Y, origin - real3(SMALL, SMALL, SMALL), 0.5),
            ConeAligned::new(Axis::Y, origin, 0.5 + LARGE),
        );
    }

    #[test]
    fn test_plane() {
        let n = real3(0.6, 0.8, 0.0);
        let tilted = |d: Float| real3(0.6 + d, 0.8, 0.0).normalize().unwrap();
        check(
            Plane::new(n, 2.0),
            Plane::new(tilted(SMALL), 2.0 + SMALL),
            Plane::new(tilted(LARGE), 2.0),
        );
    }

    #[test]
    fn test_quadrics() {
        let sq = SimpleQuadric::new(real3(1.0, 2.0, 3.0), real3(0.0, 1.0, 0.0), -4.0);
        let scaled = SimpleQuadric::new(sq.second * 2.0, sq.first * 2.0, sq.zeroth * 2.0);
        check(
            sq,
            scaled,
            SimpleQuadric::new(sq.second, sq.first, sq.zeroth + 4.0 * LARGE),
        );
        // Opposite orientation
        assert!(!softeq().eq(&sq.into(), &sq.negated().into()));

        let gq = GeneralQuadric::new(
            real3(1.0, 2.0, 3.0),
            real3(0.5, 0.0, 0.0),
            real3(0.0, 1.0, 0.0),
            -4.0,
        );
        check(
            gq,
            GeneralQuadric {
                zeroth: gq.zeroth + SMALL,
                ..gq
            },
            GeneralQuadric {
                cross: real3(0.5 + 10.0 * LARGE, 0.0, 0.0),
                ..gq
            },
        );
    }

    #[test]
    fn test_different_types() {
        assert!(!softeq().eq(
            &SphereCentered::new(1.0).into(),
            &Sphere::new(Real3::ZERO, 1.0).into(),
        ));
    }
}
