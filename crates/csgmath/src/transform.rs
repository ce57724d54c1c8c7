//! Affine transforms from a local ("daughter") frame to a global ("parent")
//! frame.
//!
//! A point `r` in the local frame maps to `R r + t` in the global frame, where
//! `R` is an orthonormal matrix and `t` is a translation.

use std::fmt;

use crate::{BBox, EPSILON, Float, Matrix3, Real3};

/// Operations shared by every kind of transform.
pub trait Transform {
    /// Transforms a point from the local frame to the global frame.
    fn transform_up(&self, pos: Real3) -> Real3;
    /// Transforms a point from the global frame to the local frame.
    fn transform_down(&self, pos: Real3) -> Real3;
    /// Rotates a direction from the local frame to the global frame.
    fn rotate_up(&self, dir: Real3) -> Real3;
    /// Rotates a direction from the global frame to the local frame.
    fn rotate_down(&self, dir: Real3) -> Real3;

    /// Returns the smallest global-frame box enclosing a local-frame box.
    fn transform_bbox(&self, bbox: &BBox) -> BBox;
}

/// Identity transform.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct NoTransformation;

impl Transform for NoTransformation {
    fn transform_up(&self, pos: Real3) -> Real3 {
        pos
    }
    fn transform_down(&self, pos: Real3) -> Real3 {
        pos
    }
    fn rotate_up(&self, dir: Real3) -> Real3 {
        dir
    }
    fn rotate_down(&self, dir: Real3) -> Real3 {
        dir
    }
    fn transform_bbox(&self, bbox: &BBox) -> BBox {
        *bbox
    }
}

/// Pure translation.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Translation(pub Real3);

impl Transform for Translation {
    fn transform_up(&self, pos: Real3) -> Real3 {
        pos + self.0
    }
    fn transform_down(&self, pos: Real3) -> Real3 {
        pos - self.0
    }
    fn rotate_up(&self, dir: Real3) -> Real3 {
        dir
    }
    fn rotate_down(&self, dir: Real3) -> Real3 {
        dir
    }
    fn transform_bbox(&self, bbox: &BBox) -> BBox {
        if bbox.is_null() {
            return BBox::NULL;
        }
        BBox::new(bbox.lower() + self.0, bbox.upper() + self.0)
    }
}

/// Rotation (possibly improper) followed by a translation.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Transformation {
    rot: Matrix3,
    tra: Real3,
}

impl Transformation {
    /// Constructs a transformation from an orthonormal matrix and a
    /// translation.
    pub fn new(rot: Matrix3, tra: Real3) -> Self {
        if (rot.determinant().abs() - 1.0).abs() > EPSILON {
            debug_panic!("rotation matrix {rot} is not orthonormal");
        }
        Self { rot, tra }
    }

    /// Returns the rotation matrix.
    pub fn rotation(&self) -> &Matrix3 {
        &self.rot
    }
    /// Returns the translation.
    pub fn translation(&self) -> Real3 {
        self.tra
    }

    /// Returns whether the rotation is a reflection.
    pub fn reflects(&self) -> bool {
        self.rot.determinant() < 0.0
    }

    /// Returns the inverse transformation.
    pub fn calc_inverse(&self) -> Self {
        let rot = self.rot.transpose();
        Self {
            rot,
            tra: -(rot * self.tra),
        }
    }
}

impl Transform for Transformation {
    fn transform_up(&self, pos: Real3) -> Real3 {
        self.rot * pos + self.tra
    }
    fn transform_down(&self, pos: Real3) -> Real3 {
        self.rot.transpose() * (pos - self.tra)
    }
    fn rotate_up(&self, dir: Real3) -> Real3 {
        self.rot * dir
    }
    fn rotate_down(&self, dir: Real3) -> Real3 {
        self.rot.transpose() * dir
    }
    fn transform_bbox(&self, bbox: &BBox) -> BBox {
        if bbox.is_null() {
            return BBox::NULL;
        }
        let (lo, hi) = (bbox.lower(), bbox.upper());
        let mut new_lo = self.tra;
        let mut new_hi = self.tra;
        for i in 0..3 {
            for j in 0..3 {
                let r = self.rot[(i, j)];
                if r == 0.0 {
                    // Avoid 0 * inf
                    continue;
                }
                let (a, b) = (r * lo[j], r * hi[j]);
                new_lo[i] += a.min(b);
                new_hi[i] += a.max(b);
            }
        }
        BBox::new(new_lo, new_hi)
    }
}

/// Any transform.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum VariantTransform {
    /// Identity
    None(NoTransformation),
    /// Translation only
    Translation(Translation),
    /// Rotation and translation
    Transformation(Transformation),
}

impl Default for VariantTransform {
    fn default() -> Self {
        Self::None(NoTransformation)
    }
}

impl From<NoTransformation> for VariantTransform {
    fn from(value: NoTransformation) -> Self {
        Self::None(value)
    }
}
impl From<Translation> for VariantTransform {
    fn from(value: Translation) -> Self {
        Self::Translation(value)
    }
}
impl From<Transformation> for VariantTransform {
    fn from(value: Transformation) -> Self {
        Self::Transformation(value)
    }
}

impl fmt::Display for VariantTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None(_) => write!(f, "{{}}"),
            Self::Translation(Translation(t)) => write!(f, "{{{t}}}"),
            Self::Transformation(tr) => write!(f, "{{{}, {}}}", tr.rot, tr.tra),
        }
    }
}

macro_rules! dispatch_transform {
    ($self:ident, $t:ident => $e:expr) => {
        match $self {
            VariantTransform::None($t) => $e,
            VariantTransform::Translation($t) => $e,
            VariantTransform::Transformation($t) => $e,
        }
    };
}

impl Transform for VariantTransform {
    fn transform_up(&self, pos: Real3) -> Real3 {
        dispatch_transform!(self, t => t.transform_up(pos))
    }
    fn transform_down(&self, pos: Real3) -> Real3 {
        dispatch_transform!(self, t => t.transform_down(pos))
    }
    fn rotate_up(&self, dir: Real3) -> Real3 {
        dispatch_transform!(self, t => t.rotate_up(dir))
    }
    fn rotate_down(&self, dir: Real3) -> Real3 {
        dispatch_transform!(self, t => t.rotate_down(dir))
    }
    fn transform_bbox(&self, bbox: &BBox) -> BBox {
        dispatch_transform!(self, t => t.transform_bbox(bbox))
    }
}

impl VariantTransform {
    /// Returns the inverse transform.
    pub fn calc_inverse(&self) -> Self {
        match self {
            Self::None(t) => Self::None(*t),
            Self::Translation(Translation(t)) => Self::Translation(Translation(-*t)),
            Self::Transformation(t) => Self::Transformation(t.calc_inverse()),
        }
    }

    /// Returns a simpler equivalent transform if one exists within `tol`: a
    /// rotation within `tol` of the identity becomes a translation, and a
    /// translation within `tol` of zero becomes the identity.
    pub fn simplify(&self, tol: Float) -> Self {
        match *self {
            Self::Transformation(t) if t.rot.is_near_identity(tol) => {
                Self::Translation(Translation(t.tra)).simplify(tol)
            }
            Self::Translation(Translation(t)) if t.max_abs() <= tol => Self::None(NoTransformation),
            other => other,
        }
    }
}
