//! Concrete surface kinds.
//!
//! Every surface is the zero set of a function `f(x)`. Points where `f` is
//! negative are "inside" and points where it is positive are "outside".

use std::fmt;

use csgmath::{Axis, Float, Matrix3, Real3, SignedSense, real3};

/// Plane perpendicular to a Cartesian axis: `x[axis] - position = 0`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PlaneAligned {
    /// Axis normal to the plane
    pub axis: Axis,
    /// Intercept along the axis
    pub position: Float,
}
impl PlaneAligned {
    /// Constructs an axis-aligned plane.
    pub fn new(axis: Axis, position: Float) -> Self {
        Self { axis, position }
    }

    /// Evaluates the defining function at a point.
    pub fn eval(&self, pos: Real3) -> Float {
        pos[self.axis] - self.position
    }
}

/// Infinite cylinder along a Cartesian axis through the origin.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CylCentered {
    /// Axis of the cylinder
    pub axis: Axis,
    /// Squared radius
    pub radius_sq: Float,
}
impl CylCentered {
    /// Constructs a centered cylinder from its radius.
    pub fn new(axis: Axis, radius: Float) -> Self {
        Self::from_radius_sq(axis, radius * radius)
    }
    /// Constructs a centered cylinder from its squared radius.
    pub fn from_radius_sq(axis: Axis, radius_sq: Float) -> Self {
        debug_assert!(radius_sq > 0.0);
        Self { axis, radius_sq }
    }

    /// Evaluates the defining function at a point.
    pub fn eval(&self, pos: Real3) -> Float {
        let [u, v] = self.axis.perpendicular();
        pos[u] * pos[u] + pos[v] * pos[v] - self.radius_sq
    }
}

/// Sphere centered on the origin.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SphereCentered {
    /// Squared radius
    pub radius_sq: Float,
}
impl SphereCentered {
    /// Constructs a centered sphere from its radius.
    pub fn new(radius: Float) -> Self {
        Self::from_radius_sq(radius * radius)
    }
    /// Constructs a centered sphere from its squared radius.
    pub fn from_radius_sq(radius_sq: Float) -> Self {
        debug_assert!(radius_sq > 0.0);
        Self { radius_sq }
    }

    /// Evaluates the defining function at a point.
    pub fn eval(&self, pos: Real3) -> Float {
        pos.norm_sq() - self.radius_sq
    }
}

/// Infinite cylinder parallel to a Cartesian axis.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CylAligned {
    /// Axis the cylinder is parallel to
    pub axis: Axis,
    /// Point on the cylinder's axis, with a zero component along `axis`
    pub origin: Real3,
    /// Squared radius
    pub radius_sq: Float,
}
impl CylAligned {
    /// Constructs an axis-aligned cylinder. The component of `origin` along
    /// `axis` is discarded.
    pub fn new(axis: Axis, origin: Real3, radius: Float) -> Self {
        Self::from_radius_sq(axis, origin, radius * radius)
    }
    /// Constructs an axis-aligned cylinder from its squared radius.
    pub fn from_radius_sq(axis: Axis, mut origin: Real3, radius_sq: Float) -> Self {
        debug_assert!(radius_sq > 0.0);
        origin[axis] = 0.0;
        Self {
            axis,
            origin,
            radius_sq,
        }
    }

    /// Evaluates the defining function at a point.
    pub fn eval(&self, pos: Real3) -> Float {
        let [u, v] = self.axis.perpendicular();
        let d = pos - self.origin;
        d[u] * d[u] + d[v] * d[v] - self.radius_sq
    }
}

/// General plane: `n . x - d = 0` with unit normal `n`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Plane {
    /// Unit normal
    pub normal: Real3,
    /// Signed distance from the origin along the normal
    pub displacement: Float,
}
impl Plane {
    /// Constructs a plane from a unit normal and a displacement.
    pub fn new(normal: Real3, displacement: Float) -> Self {
        debug_assert!((normal.norm() - 1.0).abs() < 1e-6, "normal {normal} is not unit");
        Self {
            normal,
            displacement,
        }
    }
    /// Constructs a plane from a unit normal and a point on the plane.
    pub fn from_point(normal: Real3, point: Real3) -> Self {
        Self::new(normal, normal.dot(point))
    }

    /// Evaluates the defining function at a point.
    pub fn eval(&self, pos: Real3) -> Float {
        self.normal.dot(pos) - self.displacement
    }
}

/// Sphere with an arbitrary center.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Sphere {
    /// Center
    pub origin: Real3,
    /// Squared radius
    pub radius_sq: Float,
}
impl Sphere {
    /// Constructs a sphere from its center and radius.
    pub fn new(origin: Real3, radius: Float) -> Self {
        Self::from_radius_sq(origin, radius * radius)
    }
    /// Constructs a sphere from its center and squared radius.
    pub fn from_radius_sq(origin: Real3, radius_sq: Float) -> Self {
        debug_assert!(radius_sq > 0.0);
        Self { origin, radius_sq }
    }

    /// Evaluates the defining function at a point.
    pub fn eval(&self, pos: Real3) -> Float {
        (pos - self.origin).norm_sq() - self.radius_sq
    }
}

/// Infinite double cone along a Cartesian axis.
///
/// The defining function is `(u - u0)^2 + (v - v0)^2 - t^2 (w - w0)^2` where
/// `w` is the axis and `t` is the tangent of the half-angle.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ConeAligned {
    /// Axis of the cone
    pub axis: Axis,
    /// Vertex
    pub origin: Real3,
    /// Squared tangent of the half-angle
    pub tangent_sq: Float,
}
impl ConeAligned {
    /// Constructs a cone from its vertex and the tangent of its half-angle.
    pub fn new(axis: Axis, origin: Real3, tangent: Float) -> Self {
        Self::from_tangent_sq(axis, origin, tangent * tangent)
    }
    /// Constructs a cone from its vertex and the squared tangent of its
    /// half-angle.
    pub fn from_tangent_sq(axis: Axis, origin: Real3, tangent_sq: Float) -> Self {
        debug_assert!(tangent_sq > 0.0);
        Self {
            axis,
            origin,
            tangent_sq,
        }
    }

    /// Evaluates the defining function at a point.
    pub fn eval(&self, pos: Real3) -> Float {
        let [u, v] = self.axis.perpendicular();
        let d = pos - self.origin;
        let w = self.axis;
        d[u] * d[u] + d[v] * d[v] - self.tangent_sq * d[w] * d[w]
    }
}

/// Quadric without cross terms: `a x^2 + b y^2 + c z^2 + d x + e y + f z + g`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SimpleQuadric {
    /// Second-order coefficients `(a, b, c)`
    pub second: Real3,
    /// First-order coefficients `(d, e, f)`
    pub first: Real3,
    /// Constant `g`
    pub zeroth: Float,
}
impl SimpleQuadric {
    /// Constructs a simple quadric from its coefficients.
    pub fn new(second: Real3, first: Real3, zeroth: Float) -> Self {
        Self {
            second,
            first,
            zeroth,
        }
    }

    /// Evaluates the defining function at a point.
    pub fn eval(&self, pos: Real3) -> Float {
        let sq = Real3(pos.0.map(|x| x * x));
        self.second.dot(sq) + self.first.dot(pos) + self.zeroth
    }

    /// Returns the quadric with every coefficient negated, which swaps its
    /// inside and outside.
    pub fn negated(&self) -> Self {
        Self::new(-self.second, -self.first, -self.zeroth)
    }
}

/// General quadric:
/// `a x^2 + b y^2 + c z^2 + d xy + e yz + f zx + g x + h y + i z + j`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GeneralQuadric {
    /// Second-order coefficients `(a, b, c)`
    pub second: Real3,
    /// Cross coefficients `(d, e, f)` for `xy`, `yz`, and `zx`
    pub cross: Real3,
    /// First-order coefficients `(g, h, i)`
    pub first: Real3,
    /// Constant `j`
    pub zeroth: Float,
}
impl GeneralQuadric {
    /// Constructs a general quadric from its coefficients.
    pub fn new(second: Real3, cross: Real3, first: Real3, zeroth: Float) -> Self {
        Self {
            second,
            cross,
            first,
            zeroth,
        }
    }

    /// Constructs a general quadric `x^T A x + b . x + c` from a symmetric
    /// matrix.
    pub fn from_matrix(a: &Matrix3, b: Real3, c: Float) -> Self {
        Self {
            second: real3(a[(0, 0)], a[(1, 1)], a[(2, 2)]),
            cross: real3(
                a[(0, 1)] + a[(1, 0)],
                a[(1, 2)] + a[(2, 1)],
                a[(2, 0)] + a[(0, 2)],
            ),
            first: b,
            zeroth: c,
        }
    }
    /// Returns the symmetric matrix `A` of `x^T A x + b . x + c`.
    pub fn to_matrix(&self) -> Matrix3 {
        let [a, b, c] = self.second.0;
        let [xy, yz, zx] = (self.cross * 0.5).0;
        Matrix3::from_rows([[a, xy, zx], [xy, b, yz], [zx, yz, c]])
    }

    /// Evaluates the defining function at a point.
    pub fn eval(&self, pos: Real3) -> Float {
        let [x, y, z] = pos.0;
        self.second.dot(real3(x * x, y * y, z * z))
            + self.cross.dot(real3(x * y, y * z, z * x))
            + self.first.dot(pos)
            + self.zeroth
    }
}

/// Handedness of an involute.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum InvoluteSign {
    /// Unwinds counterclockwise when viewed from `+z`
    Counterclockwise,
    /// Unwinds clockwise when viewed from `+z`
    Clockwise,
}
impl InvoluteSign {
    /// Returns the opposite handedness.
    pub fn flipped(self) -> Self {
        match self {
            Self::Counterclockwise => Self::Clockwise,
            Self::Clockwise => Self::Counterclockwise,
        }
    }
}

/// Involute of a circle in the xy plane, extruded along z.
///
/// The curve is `r_b (cos(t + a) + t sin(t + a), sin(t + a) - t cos(t + a))`
/// about `origin` for `t` in `[tmin, tmax]`, mirrored across the x axis for
/// clockwise involutes. Points behind the curve (toward smaller polar angle
/// in the unwinding direction) are inside.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Involute {
    /// Center of the base circle in the xy plane
    pub origin: [Float; 2],
    /// Radius of the base circle
    pub radius: Float,
    /// Angular displacement of the curve's start
    pub displacement: Float,
    /// Handedness
    pub sign: InvoluteSign,
    /// Lower bound of the curve parameter
    pub tmin: Float,
    /// Upper bound of the curve parameter
    pub tmax: Float,
}
impl Involute {
    /// Constructs an involute.
    pub fn new(
        origin: [Float; 2],
        radius: Float,
        displacement: Float,
        sign: InvoluteSign,
        tmin: Float,
        tmax: Float,
    ) -> Self {
        debug_assert!(radius > 0.0);
        debug_assert!(0.0 <= tmin && tmin < tmax);
        Self {
            origin,
            radius,
            displacement,
            sign,
            tmin,
            tmax,
        }
    }

    /// Returns which side of the curve a point lies on.
    ///
    /// Points inside the base circle, or whose curve parameter lies outside
    /// `[tmin, tmax]`, are outside.
    pub fn calc_sense(&self, pos: Real3) -> SignedSense {
        let x = pos[0] - self.origin[0];
        let mut y = pos[1] - self.origin[1];
        if self.sign == InvoluteSign::Clockwise {
            y = -y;
        }
        let rho_sq = x * x + y * y;
        let rb_sq = self.radius * self.radius;
        if rho_sq < rb_sq {
            return SignedSense::Outside;
        }
        let t = (rho_sq / rb_sq - 1.0).sqrt();
        if t < self.tmin || t > self.tmax {
            return SignedSense::Outside;
        }
        let curve_angle = t + self.displacement - t.atan();
        let diff = y.atan2(x) - curve_angle;
        let diff = (diff + std::f64::consts::PI).rem_euclid(std::f64::consts::TAU)
            - std::f64::consts::PI;
        SignedSense::from_value(diff)
    }
}

impl fmt::Display for PlaneAligned {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.axis, self.position)
    }
}
impl fmt::Display for CylCentered {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r^2={}", self.radius_sq)
    }
}
impl fmt::Display for SphereCentered {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r^2={}", self.radius_sq)
    }
}
impl fmt::Display for CylAligned {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} r^2={}", self.origin, self.radius_sq)
    }
}
impl fmt::Display for Plane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n={} d={}", self.normal, self.displacement)
    }
}
impl fmt::Display for Sphere {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} r^2={}", self.origin, self.radius_sq)
    }
}
impl fmt::Display for ConeAligned {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} t^2={}", self.origin, self.tangent_sq)
    }
}
impl fmt::Display for SimpleQuadric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.second, self.first, self.zeroth)
    }
}
impl fmt::Display for GeneralQuadric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.second, self.cross, self.first, self.zeroth,
        )
    }
}
impl fmt::Display for Involute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = match self.sign {
            InvoluteSign::Counterclockwise => "ccw",
            InvoluteSign::Clockwise => "cw",
        };
        write!(
            f,
            "{{{},{}}} r={} a={} {sign} t=[{},{}]",
            self.origin[0], self.origin[1], self.radius, self.displacement, self.tmin, self.tmax,
        )
    }
}
