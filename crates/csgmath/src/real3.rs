//! Three-dimensional vector.

use std::fmt;
use std::ops::*;

use crate::{Axis, EPSILON, Float};

/// Constructs a [`Real3`] from its components.
pub const fn real3(x: Float, y: Float, z: Float) -> Real3 {
    Real3([x, y, z])
}

/// Three-dimensional vector or point.
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Real3(pub [Float; 3]);

impl fmt::Display for Real3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [x, y, z] = self.0;
        write!(f, "{{{x},{y},{z}}}")
    }
}

impl_componentwise_op!(impl Add, AddAssign for Real3 { fn add(), fn add_assign() });
impl_componentwise_op!(impl Sub, SubAssign for Real3 { fn sub(), fn sub_assign() });
impl_scalar_ops!(impl for Real3);

impl Index<usize> for Real3 {
    type Output = Float;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}
impl IndexMut<usize> for Real3 {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.0[index]
    }
}
impl Index<Axis> for Real3 {
    type Output = Float;

    fn index(&self, axis: Axis) -> &Self::Output {
        &self.0[axis.index()]
    }
}
impl IndexMut<Axis> for Real3 {
    fn index_mut(&mut self, axis: Axis) -> &mut Self::Output {
        &mut self.0[axis.index()]
    }
}

impl approx::AbsDiffEq for Real3 {
    type Epsilon = Float;

    fn default_epsilon() -> Self::Epsilon {
        EPSILON
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
        std::iter::zip(self.0, other.0).all(|(l, r)| l.abs_diff_eq(&r, epsilon))
    }
}

impl Real3 {
    /// Zero vector.
    pub const ZERO: Self = Real3([0.0; 3]);

    /// Returns the unit vector along an axis.
    pub fn unit(axis: Axis) -> Self {
        let mut ret = Self::ZERO;
        ret[axis] = 1.0;
        ret
    }

    /// Returns an iterator over the components.
    pub fn iter(self) -> impl Iterator<Item = Float> {
        self.0.into_iter()
    }

    /// Returns the dot product of this vector with another.
    pub fn dot(self, rhs: Self) -> Float {
        std::iter::zip(self.0, rhs.0).map(|(l, r)| l * r).sum()
    }
    /// Returns the cross product of this vector with another.
    pub fn cross(self, rhs: Self) -> Self {
        let [a0, a1, a2] = self.0;
        let [b0, b1, b2] = rhs.0;
        Real3([a1 * b2 - a2 * b1, a2 * b0 - a0 * b2, a0 * b1 - a1 * b0])
    }

    /// Returns the squared Euclidean norm.
    pub fn norm_sq(self) -> Float {
        self.dot(self)
    }
    /// Returns the Euclidean norm.
    pub fn norm(self) -> Float {
        self.norm_sq().sqrt()
    }
    /// Returns the Euclidean distance to another point.
    pub fn distance(self, rhs: Self) -> Float {
        (self - rhs).norm()
    }
    /// Returns the vector scaled to unit length, or `None` if it is zero.
    pub fn normalize(self) -> Option<Self> {
        let norm = self.norm();
        (norm > 0.0).then(|| self / norm)
    }

    /// Returns the largest absolute value of any component.
    pub fn max_abs(self) -> Float {
        self.iter().map(Float::abs).fold(0.0, Float::max)
    }

    /// Returns the componentwise minimum of two vectors.
    pub fn min(self, rhs: Self) -> Self {
        Real3(std::array::from_fn(|i| self.0[i].min(rhs.0[i])))
    }
    /// Returns the componentwise maximum of two vectors.
    pub fn max(self, rhs: Self) -> Self {
        Real3(std::array::from_fn(|i| self.0[i].max(rhs.0[i])))
    }
}
