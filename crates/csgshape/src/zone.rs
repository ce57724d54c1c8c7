//! Conservative box approximations of CSG regions.

use std::fmt;

use csgmath::{BBox, Real3, bbox, encloses};

/// Pair of boxes approximating a region from inside and outside.
///
/// If `negated` is false, every point in `interior` is in the region and every
/// point in the region is in `exterior`. If `negated` is true, the region is
/// the complement: every point in `interior` is *outside* the region and every
/// point outside `exterior` is inside it.
///
/// A null interior means nothing is known to be inside; a null exterior means
/// the region is empty (or, when negated, everywhere).
///
/// The default zone is empty.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct BoundingZone {
    /// Box enclosed by the region.
    pub interior: BBox,
    /// Box enclosing the region.
    pub exterior: BBox,
    /// Whether the boxes describe the complement of the region.
    pub negated: bool,
}

impl BoundingZone {
    /// Returns a zone that contains all of space, used as the starting point
    /// for intersections.
    pub fn from_infinite() -> Self {
        Self {
            interior: BBox::INFINITE,
            exterior: BBox::INFINITE,
            negated: false,
        }
    }

    /// Flips the zone to describe the complement of the region.
    pub fn negate(&mut self) {
        self.negated = !self.negated;
    }

    /// Returns whether the exterior encloses the interior.
    pub fn is_valid(&self) -> bool {
        encloses(&self.exterior, &self.interior)
    }

    /// Classifies a point: `Some(true)` if it is definitely in the region,
    /// `Some(false)` if it is definitely not, and `None` if unknown.
    ///
    /// Points on the boundary of a box count as inside it.
    pub fn classify(&self, point: Real3) -> Option<bool> {
        if !self.exterior.contains(point) {
            Some(self.negated)
        } else if !self.interior.contains(point) {
            None
        } else {
            Some(!self.negated)
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Zone {
    Interior,
    Exterior,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum BoxExtent {
    Null,
    Finite,
    Infinite,
}
impl From<&BBox> for BoxExtent {
    fn from(b: &BBox) -> Self {
        if b.is_null() {
            BoxExtent::Null
        } else if b.is_infinite() {
            BoxExtent::Infinite
        } else {
            BoxExtent::Finite
        }
    }
}

/// Returns a box approximating `a - b`.
///
/// The true difference of two boxes is generally not a box, so the interior
/// result is null, and the exterior result is `a` unless `b` strictly
/// encloses it.
fn difference_box(a: &BBox, b: &BBox, which: Zone) -> BBox {
    if b.is_null() {
        // Subtracting nothing
        return *a;
    }
    match which {
        Zone::Interior => BBox::NULL,
        // Includes equal boxes: with boundaries counted as "in", the result
        // is not provably empty
        Zone::Exterior if encloses(a, b) => *a,
        Zone::Exterior if encloses(b, a) => BBox::NULL,
        Zone::Exterior => *a,
    }
}

/// Returns a box approximating `a | b`.
fn union_box(a: &BBox, b: &BBox, which: Zone) -> BBox {
    match which {
        Zone::Exterior => bbox::calc_union(a, b),
        Zone::Interior if a.is_null() => *b,
        Zone::Interior if b.is_null() => *a,
        // The result must be enclosed by the union, so take the larger box
        Zone::Interior if a.volume() > b.volume() => *a,
        Zone::Interior => *b,
    }
}

/// Returns the zone of the intersection of two regions.
///
/// | Input    | Interior    | Exterior    | Negated |
/// | -------- | ----------- | ----------- | ------- |
/// | `A & B`  | `Ai & Bi`   | `Ax & Bx`   | false   |
/// | `A & ~B` | `Ai - Bx`   | `Ax - Bi`   | false   |
/// | `~A & B` | `Bi - Ax`   | `Bx - Ai`   | false   |
/// | `~A & ~B`| `Ai \| Bi`  | `Ax \| Bx`  | true    |
pub fn calc_intersection(a: &BoundingZone, b: &BoundingZone) -> BoundingZone {
    let result = match (a.negated, b.negated) {
        (false, false) => BoundingZone {
            interior: bbox::calc_intersection(&a.interior, &b.interior),
            exterior: bbox::calc_intersection(&a.exterior, &b.exterior),
            negated: false,
        },
        (false, true) => subtract(a, b, false),
        (true, false) => subtract(b, a, false),
        (true, true) => BoundingZone {
            interior: union_box(&a.interior, &b.interior, Zone::Interior),
            exterior: union_box(&a.exterior, &b.exterior, Zone::Exterior),
            negated: true,
        },
    };
    debug_assert!(result.is_valid(), "invalid intersection {result:?}");
    result
}

/// Returns the zone of the union of two regions.
///
/// Unions with a negated operand are rewritten as negated differences, e.g.
/// `A | ~B = ~(B - A)`.
pub fn calc_union(a: &BoundingZone, b: &BoundingZone) -> BoundingZone {
    let result = match (a.negated, b.negated) {
        (false, false) => BoundingZone {
            interior: union_box(&a.interior, &b.interior, Zone::Interior),
            exterior: union_box(&a.exterior, &b.exterior, Zone::Exterior),
            negated: false,
        },
        (false, true) => subtract(b, a, true),
        (true, false) => subtract(a, b, true),
        (true, true) => BoundingZone {
            interior: bbox::calc_intersection(&a.interior, &b.interior),
            exterior: bbox::calc_intersection(&a.exterior, &b.exterior),
            negated: true,
        },
    };
    debug_assert!(result.is_valid(), "invalid union {result:?}");
    result
}

/// Returns the zone of `lhs - rhs`, ignoring the polarity of the inputs.
fn subtract(lhs: &BoundingZone, rhs: &BoundingZone, negated: bool) -> BoundingZone {
    BoundingZone {
        interior: difference_box(&lhs.interior, &rhs.exterior, Zone::Interior),
        exterior: difference_box(&lhs.exterior, &rhs.interior, Zone::Exterior),
        negated,
    }
}

/// Returns a box enclosing the region: the exterior, or an infinite box if
/// the zone is negated.
pub fn get_exterior_bbox(bz: &BoundingZone) -> BBox {
    if bz.negated {
        BBox::INFINITE
    } else {
        bz.exterior
    }
}

impl fmt::Display for BoundingZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use BoxExtent as E;

        debug_assert!(self.is_valid(), "invalid zone {self:?}");
        let i = BoxExtent::from(&self.interior);
        let x = BoxExtent::from(&self.exterior);
        let neg = self.negated;

        write!(f, "{{")?;
        if (!neg && x == E::Null) || (neg && i == E::Infinite) {
            write!(f, "nowhere")?;
        } else if (!neg && i == E::Infinite) || (neg && x == E::Null) {
            write!(f, "everywhere")?;
        } else if i == E::Null && x == E::Infinite {
            write!(f, "maybe anywhere")?;
        } else {
            if i != E::Null {
                let always = if neg { "never" } else { "always" };
                write!(f, "{always} inside {}", self.interior)?;
                if x != E::Infinite {
                    write!(f, " and ")?;
                }
            }
            if x != E::Infinite {
                let never = if neg { "always" } else { "never" };
                write!(f, "{never} outside {}", self.exterior)?;
            }
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
impl proptest::arbitrary::Arbitrary for BoundingZone {
    type Parameters = ();
    type Strategy = proptest::strategy::BoxedStrategy<Self>;

    fn arbitrary_with(_args: Self::Parameters) -> Self::Strategy {
        use csgmath::Float;
        use proptest::prelude::*;

        let corner = || [-4..=4_i32, -4..=4_i32, -4..=4_i32];
        let to_real3 = |c: [i32; 3]| Real3(c.map(Float::from));

        // Nested boxes: the interior is the exterior shrunk by some amount,
        // possibly to nothing
        (corner(), corner(), 0..3_i32, any::<bool>(), any::<bool>(), any::<bool>())
            .prop_map(move |(a, b, inset, is_null, has_interior, negated)| {
                let (a, b) = (to_real3(a), to_real3(b));
                let exterior = match is_null {
                    true => BBox::NULL,
                    false => BBox::new(a.min(b), a.max(b)),
                };
                let inset = Real3([Float::from(inset) / 2.0; 3]);
                let interior = match has_interior && !exterior.is_null() {
                    true => BBox::new(exterior.lower() + inset, exterior.upper() - inset),
                    false => BBox::NULL,
                };
                BoundingZone {
                    interior,
                    exterior,
                    negated,
                }
            })
            .boxed()
    }
}
