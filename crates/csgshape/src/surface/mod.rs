//! Surfaces that bound CSG regions, and the operations that canonicalize,
//! deduplicate, transform, and bound them.

use std::fmt;

use csgmath::{Axis, Float, Real3, SignedSense};

mod clipper;
mod inserter;
mod kinds;
mod simplifier;
mod soft_equal;
mod transformer;

pub use clipper::{NegatedSurfaceClipper, SurfaceClipper};
pub use inserter::LocalSurfaceInserter;
pub use kinds::*;
pub use simplifier::{RecursiveSimplifier, SurfaceSimplifier};
pub use soft_equal::SoftSurfaceEqual;
pub use transformer::{SurfaceTransformer, SurfaceTranslator, apply_transform};

csgmath::idx_struct! {
    /// ID of a surface within a single CSG unit.
    pub struct LocalSurfaceId(pub u32);
}

/// Kind of a surface, including the axis for axis-aligned kinds.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SurfaceType {
    /// Axis-aligned plane
    PlaneAligned(Axis),
    /// Cylinder along an axis through the origin
    CylCentered(Axis),
    /// Sphere at the origin
    SphereCentered,
    /// Cylinder parallel to an axis
    CylAligned(Axis),
    /// General plane
    Plane,
    /// Sphere
    Sphere,
    /// Cone along an axis
    ConeAligned(Axis),
    /// Quadric without cross terms
    SimpleQuadric,
    /// General quadric
    GeneralQuadric,
    /// Involute of a circle
    Involute,
}

impl SurfaceType {
    /// Returns the short name of the surface type, such as `px` or `gq`.
    pub fn name(self) -> &'static str {
        use SurfaceType as T;
        match self {
            T::PlaneAligned(Axis::X) => "px",
            T::PlaneAligned(Axis::Y) => "py",
            T::PlaneAligned(Axis::Z) => "pz",
            T::CylCentered(Axis::X) => "cxc",
            T::CylCentered(Axis::Y) => "cyc",
            T::CylCentered(Axis::Z) => "czc",
            T::SphereCentered => "sc",
            T::CylAligned(Axis::X) => "cx",
            T::CylAligned(Axis::Y) => "cy",
            T::CylAligned(Axis::Z) => "cz",
            T::Plane => "p",
            T::Sphere => "s",
            T::ConeAligned(Axis::X) => "kx",
            T::ConeAligned(Axis::Y) => "ky",
            T::ConeAligned(Axis::Z) => "kz",
            T::SimpleQuadric => "sq",
            T::GeneralQuadric => "gq",
            T::Involute => "inv",
        }
    }
}

impl fmt::Display for SurfaceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Any surface.
#[derive(Debug, Copy, Clone, PartialEq)]
#[allow(missing_docs)]
pub enum VariantSurface {
    PlaneAligned(PlaneAligned),
    CylCentered(CylCentered),
    SphereCentered(SphereCentered),
    CylAligned(CylAligned),
    Plane(Plane),
    Sphere(Sphere),
    ConeAligned(ConeAligned),
    SimpleQuadric(SimpleQuadric),
    GeneralQuadric(GeneralQuadric),
    Involute(Involute),
}

macro_rules! impl_from_surface {
    ($($kind:ident),* $(,)?) => {
        $(
            impl From<$kind> for VariantSurface {
                fn from(value: $kind) -> Self {
                    Self::$kind(value)
                }
            }
        )*
    };
}
impl_from_surface!(
    PlaneAligned,
    CylCentered,
    SphereCentered,
    CylAligned,
    Plane,
    Sphere,
    ConeAligned,
    SimpleQuadric,
    GeneralQuadric,
    Involute,
);

impl fmt::Display for VariantSurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ty = self.surface_type();
        match self {
            Self::PlaneAligned(s) => write!(f, "{ty}: {s}"),
            Self::CylCentered(s) => write!(f, "{ty}: {s}"),
            Self::SphereCentered(s) => write!(f, "{ty}: {s}"),
            Self::CylAligned(s) => write!(f, "{ty}: {s}"),
            Self::Plane(s) => write!(f, "{ty}: {s}"),
            Self::Sphere(s) => write!(f, "{ty}: {s}"),
            Self::ConeAligned(s) => write!(f, "{ty}: {s}"),
            Self::SimpleQuadric(s) => write!(f, "{ty}: {s}"),
            Self::GeneralQuadric(s) => write!(f, "{ty}: {s}"),
            Self::Involute(s) => write!(f, "{ty}: {s}"),
        }
    }
}

impl VariantSurface {
    /// Returns the kind of surface.
    pub fn surface_type(&self) -> SurfaceType {
        match self {
            Self::PlaneAligned(s) => SurfaceType::PlaneAligned(s.axis),
            Self::CylCentered(s) => SurfaceType::CylCentered(s.axis),
            Self::SphereCentered(_) => SurfaceType::SphereCentered,
            Self::CylAligned(s) => SurfaceType::CylAligned(s.axis),
            Self::Plane(_) => SurfaceType::Plane,
            Self::Sphere(_) => SurfaceType::Sphere,
            Self::ConeAligned(s) => SurfaceType::ConeAligned(s.axis),
            Self::SimpleQuadric(_) => SurfaceType::SimpleQuadric,
            Self::GeneralQuadric(_) => SurfaceType::GeneralQuadric,
            Self::Involute(_) => SurfaceType::Involute,
        }
    }

    /// Returns which side of the surface a point is on.
    pub fn calc_sense(&self, pos: Real3) -> SignedSense {
        let value = match self {
            Self::PlaneAligned(s) => s.eval(pos),
            Self::CylCentered(s) => s.eval(pos),
            Self::SphereCentered(s) => s.eval(pos),
            Self::CylAligned(s) => s.eval(pos),
            Self::Plane(s) => s.eval(pos),
            Self::Sphere(s) => s.eval(pos),
            Self::ConeAligned(s) => s.eval(pos),
            Self::SimpleQuadric(s) => s.eval(pos),
            Self::GeneralQuadric(s) => s.eval(pos),
            Self::Involute(s) => return s.calc_sense(pos),
        };
        SignedSense::from_value(value)
    }

    /// Returns a characteristic scalar of the surface, used to bucket
    /// surfaces for approximate deduplication.
    ///
    /// Surfaces that are soft-equal have hash points within tolerance of each
    /// other.
    pub fn hash_point(&self) -> Float {
        match self {
            Self::PlaneAligned(s) => s.position,
            Self::CylCentered(s) => s.radius_sq.sqrt(),
            Self::SphereCentered(s) => s.radius_sq.sqrt(),
            Self::CylAligned(s) => s.radius_sq.sqrt(),
            Self::Plane(s) => s.displacement,
            Self::Sphere(s) => s.radius_sq.sqrt(),
            Self::ConeAligned(s) => s.tangent_sq.sqrt(),
            Self::Involute(s) => s.radius,
            Self::SimpleQuadric(_) | Self::GeneralQuadric(_) => 0.0,
        }
    }

    /// Returns the surface as a general quadric, or `None` if it is not a
    /// quadric.
    pub fn to_general_quadric(&self) -> Option<GeneralQuadric> {
        let zero = Real3::ZERO;
        let gq = |second: Real3, first: Real3, zeroth: Float| {
            GeneralQuadric::new(second, zero, first, zeroth)
        };
        Some(match *self {
            Self::PlaneAligned(s) => gq(zero, Real3::unit(s.axis), -s.position),
            Self::CylCentered(s) => {
                gq(Real3([1.0; 3]) - Real3::unit(s.axis), zero, -s.radius_sq)
            }
            Self::SphereCentered(s) => gq(Real3([1.0; 3]), zero, -s.radius_sq),
            Self::CylAligned(s) => {
                let second = Real3([1.0; 3]) - Real3::unit(s.axis);
                let o = s.origin;
                gq(second, o * -2.0, o.norm_sq() - s.radius_sq)
            }
            Self::Plane(s) => gq(zero, s.normal, -s.displacement),
            Self::Sphere(s) => {
                let o = s.origin;
                gq(Real3([1.0; 3]), o * -2.0, o.norm_sq() - s.radius_sq)
            }
            Self::ConeAligned(s) => {
                let mut second = Real3([1.0; 3]);
                second[s.axis] = -s.tangent_sq;
                let first = Real3(std::array::from_fn(|i| -2.0 * second[i] * s.origin[i]));
                let zeroth = (0..3).map(|i| second[i] * s.origin[i] * s.origin[i]).sum();
                gq(second, first, zeroth)
            }
            Self::SimpleQuadric(s) => gq(s.second, s.first, s.zeroth),
            Self::GeneralQuadric(s) => s,
            Self::Involute(_) => return None,
        })
    }
}

#[cfg(test)]
mod tests {
    use csgmath::{assert_approx_eq, real3};

    use super::*;

    fn all_kinds() -> Vec<VariantSurface> {
        vec![
            PlaneAligned::new(Axis::X, 1.0).into(),
            CylCentered::new(Axis::Y, 2.0).into(),
            SphereCentered::new(3.0).into(),
            CylAligned::new(Axis::Z, real3(1.0, 2.0, 0.0), 0.5).into(),
            Plane::new(real3(0.6, 0.0, 0.8), 1.0).into(),
            Sphere::new(real3(1.0, -1.0, 2.0), 1.5).into(),
            ConeAligned::new(Axis::X, real3(1.0, 2.0, 3.0), 0.5).into(),
            SimpleQuadric::new(real3(1.0, 2.0, 0.0), real3(0.0, 0.0, -1.0), 0.5).into(),
        ]
    }

    #[test]
    fn test_surface_type_names() {
        let names = all_kinds()
            .iter()
            .map(|s| s.surface_type().name())
            .collect::<Vec<_>>();
        assert_eq!(names, ["px", "cyc", "sc", "cz", "p", "s", "kx", "sq"]);
        assert_eq!(
            VariantSurface::from(PlaneAligned::new(Axis::Z, 2.0)).to_string(),
            "pz: z=2",
        );
    }

    #[test]
    fn test_to_general_quadric() {
        let points = [
            real3(0.0, 0.0, 0.0),
            real3(1.0, 2.0, 3.0),
            real3(-2.5, 0.5, 1.0),
        ];
        for surf in all_kinds() {
            let gq = VariantSurface::GeneralQuadric(surf.to_general_quadric().unwrap());
            for p in points {
                let expected = match surf {
                    VariantSurface::PlaneAligned(s) => s.eval(p),
                    VariantSurface::CylCentered(s) => s.eval(p),
                    VariantSurface::SphereCentered(s) => s.eval(p),
                    VariantSurface::CylAligned(s) => s.eval(p),
                    VariantSurface::Plane(s) => s.eval(p),
                    VariantSurface::Sphere(s) => s.eval(p),
                    VariantSurface::ConeAligned(s) => s.eval(p),
                    VariantSurface::SimpleQuadric(s) => s.eval(p),
                    _ => unreachable!(),
                };
                let VariantSurface::GeneralQuadric(gq) = gq else {
                    unreachable!()
                };
                assert_approx_eq!(gq.eval(p), expected);
            }
        }
    }
}
