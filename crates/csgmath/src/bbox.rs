//! Axis-aligned bounding boxes.

use std::fmt;

use crate::{Axis, Bound, Float, Real3};

const INF: Float = Float::INFINITY;

/// Axis-aligned bounding box, possibly infinite or null.
///
/// A null box (the default) has `lower > upper` along some axis and contains
/// no points. All operations that can produce an empty box return the
/// canonical null box so that null boxes compare equal.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BBox {
    lower: Real3,
    upper: Real3,
}

impl Default for BBox {
    fn default() -> Self {
        Self::NULL
    }
}

impl fmt::Display for BBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            write!(f, "{{}}")
        } else {
            write!(f, "{{{}, {}}}", self.lower, self.upper)
        }
    }
}

impl BBox {
    /// Box containing no points.
    pub const NULL: Self = BBox {
        lower: Real3([INF; 3]),
        upper: Real3([-INF; 3]),
    };
    /// Box containing all of space.
    pub const INFINITE: Self = BBox {
        lower: Real3([-INF; 3]),
        upper: Real3([INF; 3]),
    };

    /// Constructs a box from its corners, returning the null box if
    /// `lower > upper` along any axis.
    pub fn new(lower: Real3, upper: Real3) -> Self {
        BBox { lower, upper }.canonicalize()
    }
    /// Constructs a box centered on the origin with the given half-widths.
    pub fn from_half_widths(half: Real3) -> Self {
        Self::new(-half, half)
    }

    /// Returns the lower corner.
    pub fn lower(&self) -> Real3 {
        self.lower
    }
    /// Returns the upper corner.
    pub fn upper(&self) -> Real3 {
        self.upper
    }
    /// Returns one bound along an axis.
    pub fn bound(&self, bound: Bound, axis: Axis) -> Float {
        match bound {
            Bound::Lo => self.lower[axis],
            Bound::Hi => self.upper[axis],
        }
    }

    /// Returns whether the box contains no points.
    pub fn is_null(&self) -> bool {
        Axis::ALL.iter().any(|&ax| self.lower[ax] > self.upper[ax])
    }
    /// Returns whether the box contains all of space.
    pub fn is_infinite(&self) -> bool {
        *self == Self::INFINITE
    }
    /// Returns whether every bound is finite.
    pub fn is_finite(&self) -> bool {
        !self.is_null() && self.lower.iter().chain(self.upper.iter()).all(Float::is_finite)
    }
    /// Returns whether the box has zero width along any axis.
    pub fn is_degenerate(&self) -> bool {
        !self.is_null() && Axis::ALL.iter().any(|&ax| self.lower[ax] == self.upper[ax])
    }

    /// Returns the center of a non-null box.
    pub fn center(&self) -> Real3 {
        (self.lower + self.upper) / 2.0
    }
    /// Returns the volume of the box, which is zero for the null box.
    pub fn volume(&self) -> Float {
        if self.is_null() {
            return 0.0;
        }
        (self.upper - self.lower).iter().product()
    }
    /// Returns whether `point` is inside or on the boundary of the box.
    pub fn contains(&self, point: Real3) -> bool {
        Axis::ALL
            .iter()
            .all(|&ax| self.lower[ax] <= point[ax] && point[ax] <= self.upper[ax])
    }

    /// Moves a bound inward to `position` if that tightens the box.
    pub fn shrink(&mut self, bound: Bound, axis: Axis, position: Float) {
        if self.is_null() {
            return;
        }
        match bound {
            Bound::Lo => self.lower[axis] = self.lower[axis].max(position),
            Bound::Hi => self.upper[axis] = self.upper[axis].min(position),
        }
        *self = self.canonicalize();
    }
    /// Moves a bound outward to `position` if that loosens the box.
    pub fn grow(&mut self, bound: Bound, axis: Axis, position: Float) {
        match bound {
            Bound::Lo => self.lower[axis] = self.lower[axis].min(position),
            Bound::Hi => self.upper[axis] = self.upper[axis].max(position),
        }
    }

    fn canonicalize(self) -> Self {
        if self.is_null() { Self::NULL } else { self }
    }
}

/// Returns the smallest box enclosing both boxes.
pub fn calc_union(a: &BBox, b: &BBox) -> BBox {
    if a.is_null() {
        return *b;
    }
    if b.is_null() {
        return *a;
    }
    BBox {
        lower: a.lower.min(b.lower),
        upper: a.upper.max(b.upper),
    }
}

/// Returns the intersection of two boxes, which may be null.
pub fn calc_intersection(a: &BBox, b: &BBox) -> BBox {
    BBox::new(a.lower.max(b.lower), a.upper.min(b.upper))
}

/// Returns whether `big` contains or is equal to `small`.
///
/// Every box encloses the null box.
pub fn encloses(big: &BBox, small: &BBox) -> bool {
    Axis::ALL
        .iter()
        .all(|&ax| big.lower[ax] <= small.lower[ax] && big.upper[ax] >= small.upper[ax])
}

#[cfg(test)]
impl proptest::arbitrary::Arbitrary for BBox {
    type Parameters = ();
    type Strategy = proptest::strategy::BoxedStrategy<Self>;

    fn arbitrary_with(_args: Self::Parameters) -> Self::Strategy {
        use proptest::prelude::*;

        let coord = || -4..=4_i32;
        let corner = || [coord(), coord(), coord()];
        (corner(), corner())
            .prop_map(|(a, b)| {
                let a = Real3(a.map(Float::from));
                let b = Real3(b.map(Float::from));
                BBox::new(a.min(b), a.max(b))
            })
            .boxed()
    }
}
