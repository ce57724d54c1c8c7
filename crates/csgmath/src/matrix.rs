//! 3x3 matrix.

use std::fmt;
use std::ops::{Index, Mul};

use itertools::Itertools;

use crate::{Axis, EPSILON, Float, Real3};

/// Square 3x3 matrix, stored in row-major order.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Matrix3(pub [[Float; 3]; 3]);

impl Default for Matrix3 {
    fn default() -> Self {
        Self::IDENT
    }
}

impl fmt::Display for Matrix3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rows = self.0.iter().map(|row| Real3(*row)).join(",");
        write!(f, "{{{rows}}}")
    }
}

impl Index<(usize, usize)> for Matrix3 {
    type Output = Float;

    fn index(&self, (row, col): (usize, usize)) -> &Self::Output {
        &self.0[row][col]
    }
}

impl Mul<Real3> for Matrix3 {
    type Output = Real3;

    fn mul(self, rhs: Real3) -> Real3 {
        Real3(self.0.map(|row| Real3(row).dot(rhs)))
    }
}
impl Mul for Matrix3 {
    type Output = Matrix3;

    fn mul(self, rhs: Matrix3) -> Matrix3 {
        Matrix3(std::array::from_fn(|i| {
            std::array::from_fn(|j| (0..3).map(|k| self.0[i][k] * rhs.0[k][j]).sum())
        }))
    }
}

impl approx::AbsDiffEq for Matrix3 {
    type Epsilon = Float;

    fn default_epsilon() -> Self::Epsilon {
        EPSILON
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
        std::iter::zip(self.0.as_flattened(), other.0.as_flattened())
            .all(|(l, r)| l.abs_diff_eq(r, epsilon))
    }
}

impl Matrix3 {
    /// Identity matrix.
    pub const IDENT: Self = Matrix3([[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]]);

    /// Constructs a matrix from its rows.
    pub const fn from_rows(rows: [[Float; 3]; 3]) -> Self {
        Matrix3(rows)
    }

    /// Constructs a rotation about a Cartesian axis by an angle given in
    /// turns (1 turn = 360 degrees).
    pub fn from_axis_turns(axis: Axis, turns: Float) -> Self {
        let (s, c) = (turns * std::f64::consts::TAU).sin_cos();
        // Roundoff at quarter turns snaps to zero
        let snap = |x: Float| if x.abs() < EPSILON * EPSILON { 0.0 } else { x };
        let (s, c) = (snap(s), snap(c));
        let [u, v] = axis.perpendicular();
        let mut ret = Self::IDENT;
        ret.0[u.index()][u.index()] = c;
        ret.0[u.index()][v.index()] = -s;
        ret.0[v.index()][u.index()] = s;
        ret.0[v.index()][v.index()] = c;
        ret
    }

    /// Returns a row of the matrix.
    pub fn row(&self, i: usize) -> Real3 {
        Real3(self.0[i])
    }
    /// Returns a column of the matrix.
    pub fn col(&self, j: usize) -> Real3 {
        Real3(self.0.map(|row| row[j]))
    }

    /// Returns the transpose of the matrix.
    pub fn transpose(&self) -> Self {
        Matrix3(std::array::from_fn(|i| std::array::from_fn(|j| self.0[j][i])))
    }

    /// Returns the determinant of the matrix.
    pub fn determinant(&self) -> Float {
        self.row(0).dot(self.row(1).cross(self.row(2)))
    }

    /// Returns whether the matrix is within `tol` of the identity.
    pub fn is_near_identity(&self, tol: Float) -> bool {
        approx::abs_diff_eq!(*self, Self::IDENT, epsilon = tol)
    }
}
