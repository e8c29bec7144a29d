use glam::{DVec3, DVec4};
use std::ops::{Add, AddAssign, Mul};

/// Symmetric 4x4 error matrix, stored as its upper triangle.
///
/// Evaluating the quadric of a plane `[a, b, c, d]` at a point gives the
/// squared distance of the point from the plane. Sums of quadrics give sums
/// of squared distances.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Quadric {
    a00: f64,
    a01: f64,
    a02: f64,
    a03: f64,
    a11: f64,
    a12: f64,
    a13: f64,
    a22: f64,
    a23: f64,
    a33: f64,
}

impl Quadric {
    /// The quadric of the plane with the coefficients `[a, b, c, d]`, scaled
    /// by `weight`. The normal `[a, b, c]` is expected to be unit length.
    pub fn from_plane(plane: DVec4, weight: f64) -> Self {
        let DVec4 { x: a, y: b, z: c, w: d } = plane;
        Self {
            a00: a * a,
            a01: a * b,
            a02: a * c,
            a03: a * d,
            a11: b * b,
            a12: b * c,
            a13: b * d,
            a22: c * c,
            a23: c * d,
            a33: d * d,
        } * weight
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }

    /// Evaluate `[p, 1]^T Q [p, 1]`.
    pub fn evaluate(&self, p: DVec3) -> f64 {
        let DVec3 { x, y, z } = p;
        x * (self.a00 * x + 2.0 * (self.a01 * y + self.a02 * z + self.a03))
            + y * (self.a11 * y + 2.0 * (self.a12 * z + self.a13))
            + z * (self.a22 * z + 2.0 * self.a23)
            + self.a33
    }
}

impl AddAssign for Quadric {
    fn add_assign(&mut self, rhs: Self) {
        self.a00 += rhs.a00;
        self.a01 += rhs.a01;
        self.a02 += rhs.a02;
        self.a03 += rhs.a03;
        self.a11 += rhs.a11;
        self.a12 += rhs.a12;
        self.a13 += rhs.a13;
        self.a22 += rhs.a22;
        self.a23 += rhs.a23;
        self.a33 += rhs.a33;
    }
}

impl Add for Quadric {
    type Output = Self;

    fn add(mut self, rhs: Self) -> Self::Output {
        self += rhs;
        self
    }
}

impl Mul<f64> for Quadric {
    type Output = Self;

    fn mul(self, s: f64) -> Self::Output {
        Self {
            a00: self.a00 * s,
            a01: self.a01 * s,
            a02: self.a02 * s,
            a03: self.a03 * s,
            a11: self.a11 * s,
            a12: self.a12 * s,
            a13: self.a13 * s,
            a22: self.a22 * s,
            a23: self.a23 * s,
            a33: self.a33 * s,
        }
    }
}
