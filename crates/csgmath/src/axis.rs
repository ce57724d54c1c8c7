//! Cartesian axes and box bounds.

use std::fmt;

/// Cartesian axis in 3D.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Axis {
    /// X axis
    X = 0,
    /// Y axis
    Y = 1,
    /// Z axis
    Z = 2,
}
impl Axis {
    /// All three axes, in order.
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Returns the index of the axis (0, 1, or 2).
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Returns the lowercase name of the axis.
    pub const fn name(self) -> char {
        match self {
            Axis::X => 'x',
            Axis::Y => 'y',
            Axis::Z => 'z',
        }
    }

    /// Returns the two axes perpendicular to this one, in cyclic order.
    pub const fn perpendicular(self) -> [Axis; 2] {
        match self {
            Axis::X => [Axis::Y, Axis::Z],
            Axis::Y => [Axis::Z, Axis::X],
            Axis::Z => [Axis::X, Axis::Y],
        }
    }
}
impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Lower or upper bound of a box along an axis.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Bound {
    /// Lower bound
    Lo,
    /// Upper bound
    Hi,
}
