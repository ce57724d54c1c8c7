//! Construction tolerances and soft floating-point comparison.

use crate::Float;

/// Error returned when constructing an invalid [`Tolerance`].
#[allow(missing_docs)]
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum ToleranceError {
    RelativeOutOfRange(Float),
    NonPositiveLength(Float),
}
impl std::fmt::Display for ToleranceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RelativeOutOfRange(rel) => {
                write!(f, "relative tolerance {rel} must be in (0, 1)")
            }
            Self::NonPositiveLength(len) => {
                write!(f, "length scale {len} must be positive")
            }
        }
    }
}
impl std::error::Error for ToleranceError {}

/// Relative and absolute tolerance used for geometry construction.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Tolerance {
    /// Relative tolerance
    pub rel: Float,
    /// Absolute tolerance
    pub abs: Float,
}

impl Default for Tolerance {
    fn default() -> Self {
        Self {
            rel: Self::DEFAULT_RELATIVE,
            abs: Self::DEFAULT_RELATIVE,
        }
    }
}

impl Tolerance {
    /// Default relative tolerance for double-precision construction.
    pub const DEFAULT_RELATIVE: Float = 1.5e-8;

    /// Constructs a tolerance from a relative value and a characteristic
    /// length scale of the geometry.
    pub fn from_relative(rel: Float, length: Float) -> Result<Self, ToleranceError> {
        if !(rel > 0.0 && rel < 1.0) {
            return Err(ToleranceError::RelativeOutOfRange(rel));
        }
        if !(length > 0.0) {
            return Err(ToleranceError::NonPositiveLength(length));
        }
        Ok(Self {
            rel,
            abs: rel * length,
        })
    }

    /// Returns whether both tolerances are in range.
    pub fn is_valid(&self) -> bool {
        self.rel > 0.0 && self.rel < 1.0 && self.abs > 0.0
    }

    /// Returns the soft comparator for this tolerance.
    pub fn soft_equal(&self) -> SoftEqual {
        SoftEqual {
            rel: self.rel,
            abs: self.abs,
        }
    }
}

/// Floating-point comparison with relative and absolute tolerance.
///
/// Two values are equal if they differ by no more than `abs`, or by no more
/// than `rel` times the larger magnitude.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SoftEqual {
    /// Relative tolerance
    pub rel: Float,
    /// Absolute tolerance
    pub abs: Float,
}

impl Default for SoftEqual {
    fn default() -> Self {
        Tolerance::default().soft_equal()
    }
}

impl SoftEqual {
    /// Constructs a comparator whose absolute tolerance equals its relative
    /// tolerance.
    pub fn new(rel: Float) -> Self {
        Self { rel, abs: rel }
    }

    /// Returns whether `a` and `b` are equal within tolerance.
    pub fn eq(&self, a: Float, b: Float) -> bool {
        if a == b {
            // Equal infinities
            return true;
        }
        if a.is_infinite() || b.is_infinite() {
            return false;
        }
        (a - b).abs() <= self.allowed(a.abs().max(b.abs()))
    }

    /// Returns whether `a` is within the absolute tolerance of zero.
    pub fn eq_zero(&self, a: Float) -> bool {
        a.abs() <= self.abs
    }

    /// Returns the largest allowed difference between values of the given
    /// magnitude.
    pub fn allowed(&self, magnitude: Float) -> Float {
        self.abs.max(self.rel * magnitude)
    }
}
