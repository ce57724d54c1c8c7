//! Three-dimensional vector, box, tolerance, and transform primitives used to
//! construct CSG geometry.

pub use {approx, log, num_traits as num, smallvec};

/// Floating-point type used for geometry.
pub type Float = f64;

/// Small floating-point value used for comparisons and tiny offsets.
pub const EPSILON: Float = 0.000001;

/// Asserts that both arguments are approximately equal.
#[macro_export]
macro_rules! assert_approx_eq {
    ($a:expr, $b:expr $(,)?) => {
        $crate::approx::assert_abs_diff_eq!($a, $b, epsilon = $crate::EPSILON)
    };
}

/// Panics in debug builds and logs an error in release builds.
///
/// Use this for internal consistency checks whose failure leaves the result
/// degraded but still usable.
#[macro_export]
macro_rules! debug_panic {
    ($($tok:tt)*) => {
        match cfg!(debug_assertions) {
            true => panic!($($tok)*),
            false => $crate::log::error!($($tok)*),
        }
    };
}

#[macro_use]
mod impl_macros;
#[macro_use]
pub mod collections;

pub mod approx_cmp;
pub mod axis;
pub mod bbox;
pub mod matrix;
pub mod real3;
pub mod sense;
pub mod tolerance;
pub mod transform;

/// Structs, traits, and constants (excluding [`crate::collections`]).
pub mod prelude {
    pub use crate::approx_cmp::*;
    pub use crate::axis::{Axis, Bound};
    pub use crate::bbox::{BBox, calc_intersection, calc_union, encloses};
    pub use crate::collections::{
        ApproxHashMap, ApproxHashMapKey, GenericVec, IndexOutOfRange, IndexOverflow,
    };
    pub use crate::matrix::Matrix3;
    pub use crate::real3::{Real3, real3};
    pub use crate::sense::{Sense, SignedSense};
    pub use crate::tolerance::{SoftEqual, Tolerance, ToleranceError};
    pub use crate::transform::{NoTransformation, Transformation, Translation, VariantTransform};
    pub use crate::{EPSILON, Float};
}
pub use prelude::*;

/// Traits only.
pub mod traits {
    pub use approx::AbsDiffEq;
    pub use tinyset::Fits64;

    pub use crate::collections::{ApproxHashMapKey, IndexNewtype};
    pub use crate::transform::Transform;
}
pub use traits::*;
