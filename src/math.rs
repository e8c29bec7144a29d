/*!
Geometric predicates shared by the hull builder and the simplifier.
*/

use glam::{DVec3, DVec4};

/// Default tolerance used for plane side tests and endpoint matching.
pub const EPSILON: f64 = 1e-9;

/// Plane in the form `normal . p + d = 0`. The normal is of unit length,
/// unless the plane was built from a degenerate triangle in which case it is
/// zero and every point lies on the plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub normal: DVec3,
    pub d: f64,
}

impl Plane {
    /// Plane through `point` with the given `normal`. The normal is
    /// normalized, a zero normal produces a degenerate plane.
    pub fn from_point_normal(point: DVec3, normal: DVec3) -> Self {
        let normal = normal.normalize_or_zero();
        Plane {
            normal,
            d: -normal.dot(point),
        }
    }

    /// Plane of the triangle `(a, b, c)`, facing the side from which the
    /// triangle's winding is counter clockwise.
    pub fn from_triangle(a: DVec3, b: DVec3, c: DVec3) -> Self {
        Self::from_point_normal(a, triangle_normal(a, b, c))
    }

    pub fn is_degenerate(&self) -> bool {
        self.normal == DVec3::ZERO
    }

    /// Signed distance of `point` from this plane. Positive in front.
    pub fn signed_distance(&self, point: DVec3) -> f64 {
        self.normal.dot(point) + self.d
    }

    /// Check if `point` is strictly in front of this plane, by more than `eps`.
    pub fn is_outside(&self, point: DVec3, eps: f64) -> bool {
        self.signed_distance(point) > eps
    }

    /// The plane coefficients `[a, b, c, d]`.
    pub fn coefficients(&self) -> DVec4 {
        self.normal.extend(self.d)
    }
}

/// Unit normal of the triangle `(a, b, c)`. Zero for degenerate triangles.
pub fn triangle_normal(a: DVec3, b: DVec3, c: DVec3) -> DVec3 {
    (b - a).cross(c - a).normalize_or_zero()
}

pub fn triangle_area(a: DVec3, b: DVec3, c: DVec3) -> f64 {
    0.5 * (b - a).cross(c - a).length()
}

/// Distance of `point` from the infinite line through `a` and `b`.
pub fn distance_from_line(a: DVec3, b: DVec3, point: DVec3) -> f64 {
    let dir = b - a;
    let len = dir.length();
    if len == 0.0 {
        return (point - a).length();
    }
    dir.cross(point - a).length() / len
}

#[cfg(test)]
mod test {
    use super::{Plane, distance_from_line, triangle_area, triangle_normal};
    use crate::macros::assert_f64_eq;
    use glam::dvec3;

    #[test]
    fn t_plane_signed_distance() {
        let plane = Plane::from_point_normal(dvec3(0.0, 0.0, 2.0), dvec3(0.0, 0.0, 5.0));
        assert_eq!(plane.normal, dvec3(0.0, 0.0, 1.0));
        assert_f64_eq!(plane.d, -2.0);
        assert_f64_eq!(plane.signed_distance(dvec3(3.0, -1.0, 5.0)), 3.0);
        assert_f64_eq!(plane.signed_distance(dvec3(3.0, -1.0, 0.0)), -2.0);
        assert!(plane.is_outside(dvec3(0.0, 0.0, 2.1), 1e-9));
        assert!(!plane.is_outside(dvec3(0.0, 0.0, 2.0), 1e-9));
        assert!(!plane.is_outside(dvec3(0.0, 0.0, 2.0 + 1e-12), 1e-9));
    }

    #[test]
    fn t_triangle_plane_faces_ccw_side() {
        let (a, b, c) = (
            dvec3(0.0, 0.0, 0.0),
            dvec3(1.0, 0.0, 0.0),
            dvec3(0.0, 1.0, 0.0),
        );
        assert_eq!(triangle_normal(a, b, c), dvec3(0.0, 0.0, 1.0));
        assert_eq!(triangle_normal(a, c, b), dvec3(0.0, 0.0, -1.0));
        assert_f64_eq!(triangle_area(a, b, c), 0.5);
        let plane = Plane::from_triangle(a, b, c);
        assert!(plane.is_outside(dvec3(0.2, 0.2, 1.0), 1e-9));
        assert_eq!(plane.coefficients(), glam::dvec4(0.0, 0.0, 1.0, 0.0));
    }

    #[test]
    fn t_degenerate_triangle() {
        let a = dvec3(1.0, 1.0, 1.0);
        let b = dvec3(2.0, 2.0, 2.0);
        let c = dvec3(3.0, 3.0, 3.0);
        assert_eq!(triangle_normal(a, b, c), glam::DVec3::ZERO);
        assert_f64_eq!(triangle_area(a, b, c), 0.0);
        let plane = Plane::from_triangle(a, b, c);
        assert!(plane.is_degenerate());
        assert!(!plane.is_outside(dvec3(100.0, 0.0, 0.0), 0.0));
    }

    #[test]
    fn t_distance_from_line() {
        let a = dvec3(0.0, 0.0, 0.0);
        let b = dvec3(0.0, 0.0, 4.0);
        assert_f64_eq!(distance_from_line(a, b, dvec3(3.0, 4.0, 17.0)), 5.0);
        assert_f64_eq!(distance_from_line(a, a, dvec3(3.0, 4.0, 0.0)), 5.0);
    }
}
