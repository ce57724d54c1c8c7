//! Enums for which side of a surface a point or region lies on.

use std::fmt;
use std::ops::Neg;

use crate::Float;

/// Side of a surface that a region occupies.
///
/// "Inside" corresponds to a negative value of the surface's defining
/// function.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Sense {
    /// Negative side of the surface.
    Inside,
    /// Positive side of the surface.
    Outside,
}
impl Neg for Sense {
    type Output = Self;

    fn neg(self) -> Self::Output {
        match self {
            Sense::Inside => Sense::Outside,
            Sense::Outside => Sense::Inside,
        }
    }
}
impl From<bool> for Sense {
    /// `true` means "outside".
    fn from(value: bool) -> Self {
        match value {
            true => Sense::Outside,
            false => Sense::Inside,
        }
    }
}
impl From<Sense> for bool {
    fn from(value: Sense) -> Self {
        value == Sense::Outside
    }
}
impl fmt::Display for Sense {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sense::Inside => write!(f, "-"),
            Sense::Outside => write!(f, "+"),
        }
    }
}
impl Sense {
    /// Returns the sense with an explicit "flip" applied if `flip` is true.
    pub fn flipped_if(self, flip: bool) -> Self {
        if flip { -self } else { self }
    }
}

/// Position of a point relative to a surface, including "on" the surface.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum SignedSense {
    /// The point evaluates negative.
    Inside,
    /// The point is on the surface.
    On,
    /// The point evaluates positive.
    Outside,
}
impl Neg for SignedSense {
    type Output = Self;

    fn neg(self) -> Self::Output {
        match self {
            SignedSense::Inside => SignedSense::Outside,
            SignedSense::Outside => SignedSense::Inside,
            SignedSense::On => SignedSense::On,
        }
    }
}
impl From<Sense> for SignedSense {
    fn from(value: Sense) -> Self {
        match value {
            Sense::Inside => SignedSense::Inside,
            Sense::Outside => SignedSense::Outside,
        }
    }
}
impl SignedSense {
    /// Returns the signed sense from the value of a surface's defining
    /// function.
    pub fn from_value(value: Float) -> Self {
        if value < 0.0 {
            SignedSense::Inside
        } else if value > 0.0 {
            SignedSense::Outside
        } else {
            SignedSense::On
        }
    }

    /// Converts to an unsigned sense, treating "on" as "outside".
    pub fn to_sense(self) -> Sense {
        match self {
            SignedSense::Inside => Sense::Inside,
            SignedSense::On | SignedSense::Outside => Sense::Outside,
        }
    }
}
