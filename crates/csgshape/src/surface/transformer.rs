use csgmath::{EPSILON, Float, Real3, Transform, Transformation, Translation, VariantTransform};

use super::*;
use crate::CsgError;

/// Returns a surface moved by a transform, so that a point `x` on the
/// original surface maps to `transform.transform_up(x)` on the new one.
pub fn apply_transform(
    transform: &VariantTransform,
    surf: &VariantSurface,
) -> Result<VariantSurface, CsgError> {
    match transform {
        VariantTransform::None(_) => Ok(*surf),
        VariantTransform::Translation(t) => Ok(SurfaceTranslator(*t).apply(surf)),
        VariantTransform::Transformation(t) => SurfaceTransformer(*t).apply(surf),
    }
}

/// Moves surfaces by a translation. Every surface kind keeps its kind,
/// except that centered kinds become their off-center counterparts.
#[derive(Debug, Copy, Clone)]
pub struct SurfaceTranslator(pub Translation);

impl SurfaceTranslator {
    /// Returns the translated surface.
    pub fn apply(&self, surf: &VariantSurface) -> VariantSurface {
        let Translation(t) = self.0;
        match *surf {
            VariantSurface::PlaneAligned(s) => PlaneAligned::new(s.axis, s.position + t[s.axis]).into(),
            VariantSurface::CylCentered(s) => CylAligned::from_radius_sq(s.axis, t, s.radius_sq).into(),
            VariantSurface::SphereCentered(s) => Sphere::from_radius_sq(t, s.radius_sq).into(),
            VariantSurface::CylAligned(s) => {
                CylAligned::from_radius_sq(s.axis, s.origin + t, s.radius_sq).into()
            }
            VariantSurface::Plane(s) => Plane::new(s.normal, s.displacement + s.normal.dot(t)).into(),
            VariantSurface::Sphere(s) => Sphere::from_radius_sq(s.origin + t, s.radius_sq).into(),
            VariantSurface::ConeAligned(s) => {
                ConeAligned::from_tangent_sq(s.axis, s.origin + t, s.tangent_sq).into()
            }
            VariantSurface::SimpleQuadric(s) => {
                let st = Real3(std::array::from_fn(|i| s.second[i] * t[i]));
                SimpleQuadric::new(
                    s.second,
                    s.first - st * 2.0,
                    s.zeroth + st.dot(t) - s.first.dot(t),
                )
                .into()
            }
            VariantSurface::GeneralQuadric(s) => translate_quadric(&s, t).into(),
            VariantSurface::Involute(s) => Involute {
                origin: [s.origin[0] + t[0], s.origin[1] + t[1]],
                ..s
            }
            .into(),
        }
    }
}

/// Moves surfaces by a rotation and translation.
///
/// Planes stay planes and spheres stay spheres. Other quadrics become
/// general quadrics. Involutes only support rotations about the z axis.
#[derive(Debug, Copy, Clone)]
pub struct SurfaceTransformer(pub Transformation);

impl SurfaceTransformer {
    /// Returns the transformed surface.
    pub fn apply(&self, surf: &VariantSurface) -> Result<VariantSurface, CsgError> {
        let tr = &self.0;
        let t = tr.translation();
        Ok(match *surf {
            VariantSurface::PlaneAligned(s) => {
                let normal = tr.rotate_up(Real3::unit(s.axis));
                Plane::new(normal, s.position + normal.dot(t)).into()
            }
            VariantSurface::Plane(s) => {
                let normal = tr.rotate_up(s.normal);
                Plane::new(normal, s.displacement + normal.dot(t)).into()
            }
            VariantSurface::SphereCentered(s) => Sphere::from_radius_sq(t, s.radius_sq).into(),
            VariantSurface::Sphere(s) => {
                Sphere::from_radius_sq(tr.transform_up(s.origin), s.radius_sq).into()
            }
            VariantSurface::Involute(s) => self.transform_involute(&s)?.into(),
            other => {
                let Some(gq) = other.to_general_quadric() else {
                    return Err(self.unsupported(&other));
                };
                let rot = tr.rotation();
                let a = *rot * gq.to_matrix() * rot.transpose();
                let rotated = GeneralQuadric::from_matrix(&a, *rot * gq.first, gq.zeroth);
                translate_quadric(&rotated, t).into()
            }
        })
    }

    fn transform_involute(&self, s: &Involute) -> Result<Involute, CsgError> {
        let rot = self.0.rotation();
        let preserves_z = (rot[(2, 2)] - 1.0).abs() <= EPSILON && !self.0.reflects();
        if !preserves_z {
            return Err(self.unsupported(&(*s).into()));
        }
        let angle: Float = rot[(1, 0)].atan2(rot[(0, 0)]);
        let origin = self
            .0
            .transform_up(Real3([s.origin[0], s.origin[1], 0.0]));
        let displacement = match s.sign {
            InvoluteSign::Counterclockwise => s.displacement + angle,
            InvoluteSign::Clockwise => s.displacement - angle,
        };
        Ok(Involute {
            origin: [origin[0], origin[1]],
            displacement,
            ..*s
        })
    }

    fn unsupported(&self, surf: &VariantSurface) -> CsgError {
        CsgError::UnsupportedTransform {
            surface_type: surf.surface_type(),
            transform: VariantTransform::from(self.0).to_string(),
        }
    }
}

/// Returns `q(x - t)`.
fn translate_quadric(q: &GeneralQuadric, t: Real3) -> GeneralQuadric {
    let a = q.to_matrix();
    let at = a * t;
    GeneralQuadric::from_matrix(&a, q.first - at * 2.0, q.zeroth + t.dot(at) - q.first.dot(t))
}

#[cfg(test)]
mod tests {
    use csgmath::{Axis, Matrix3, assert_approx_eq, real3};

    use super::*;

    fn sample_surfaces() -> Vec<VariantSurface> {
        vec![
            PlaneAligned::new(Axis::X, 1.0).into(),
            CylCentered::new(Axis::Y, 2.0).into(),
            SphereCentered::new(3.0).into(),
            CylAligned::new(Axis::Z, real3(1.0, 2.0, 0.0), 0.5).into(),
            Plane::new(real3(0.6, 0.0, 0.8), 1.0).into(),
            Sphere::new(real3(1.0, -1.0, 2.0), 1.5).into(),
            ConeAligned::new(Axis::X, real3(1.0, 2.0, 3.0), 0.5).into(),
            SimpleQuadric::new(real3(1.0, 2.0, 0.0), real3(0.0, 0.0, -1.0), 0.5).into(),
            GeneralQuadric::new(
                real3(1.0, 2.0, 3.0),
                real3(0.5, -0.5, 0.25),
                real3(0.0, 1.0, 0.0),
                -2.0,
            )
            .into(),
        ]
    }

    fn value(s: &VariantSurface, p: Real3) -> Float {
        s.to_general_quadric().unwrap().eval(p)
    }

    fn check_transform(transform: VariantTransform) {
        let points = [
            real3(0.0, 0.0, 0.0),
            real3(1.0, 2.0, 3.0),
            real3(-2.5, 0.5, 1.0),
        ];
        for surf in sample_surfaces() {
            let moved = apply_transform(&transform, &surf).unwrap();
            for p in points {
                assert_approx_eq!(value(&moved, transform.transform_up(p)), value(&surf, p));
            }
        }
    }

    #[test]
    fn test_translate() {
        check_transform(Translation(real3(1.0, -2.0, 0.5)).into());

        let moved = SurfaceTranslator(Translation(real3(1.0, 2.0, 3.0)))
            .apply(&SphereCentered::new(1.0).into());
        assert_eq!(moved, Sphere::new(real3(1.0, 2.0, 3.0), 1.0).into());
    }

    #[test]
    fn test_transform() {
        let quarter = Matrix3::from_axis_turns(Axis::Z, 0.25);
        check_transform(Transformation::new(quarter, real3(1.0, 2.0, 3.0)).into());

        let tilted = Matrix3::from_axis_turns(Axis::X, 0.1) * Matrix3::from_axis_turns(Axis::Y, 0.3);
        check_transform(Transformation::new(tilted, real3(-1.0, 0.0, 2.0)).into());

        // Planes stay planes; other quadrics become general quadrics
        let tr = SurfaceTransformer(Transformation::new(tilted, Real3::ZERO));
        let plane = tr.apply(&PlaneAligned::new(Axis::X, 1.0).into()).unwrap();
        assert_eq!(plane.surface_type(), SurfaceType::Plane);
        let cyl = tr.apply(&CylCentered::new(Axis::X, 1.0).into()).unwrap();
        assert_eq!(cyl.surface_type(), SurfaceType::GeneralQuadric);
    }

    #[test]
    fn test_transform_involute() {
        let inv = Involute::new(
            [1.0, 0.0],
            1.0,
            0.5,
            InvoluteSign::Counterclockwise,
            0.0,
            2.0,
        );
        let quarter = Matrix3::from_axis_turns(Axis::Z, 0.25);
        let moved = SurfaceTransformer(Transformation::new(quarter, real3(0.0, 0.0, 5.0)))
            .apply(&inv.into())
            .unwrap();
        let VariantSurface::Involute(moved) = moved else {
            panic!("expected involute, got {moved}");
        };
        assert_approx_eq!(moved.origin[0], 0.0);
        assert_approx_eq!(moved.origin[1], 1.0);
        assert_approx_eq!(moved.displacement, 0.5 + std::f64::consts::FRAC_PI_2);

        let tipped = Matrix3::from_axis_turns(Axis::X, 0.25);
        let result = SurfaceTransformer(Transformation::new(tipped, Real3::ZERO)).apply(&inv.into());
        assert!(matches!(
            result,
            Err(CsgError::UnsupportedTransform {
                surface_type: SurfaceType::Involute,
                ..
            })
        ));
    }
}
