use glam::DVec3;

use crate::{
    error::Error,
    math::{self, Plane},
};

/// Indices of the four points that span the initial tetrahedron. The first
/// three form the seed triangle, the fourth is the farthest point from its
/// plane.
pub(super) struct Seed {
    pub triangle: [usize; 3],
    pub apex: usize,
}

/// Index of the item with the largest key. Ties go to the earliest item.
fn argmax(items: impl Iterator<Item = usize>, key: impl Fn(usize) -> f64) -> Option<(usize, f64)> {
    items.fold(None, |best, i| {
        let k = key(i);
        match best {
            Some((_, bk)) if bk >= k => best,
            _ => Some((i, k)),
        }
    })
}

/// Find the points of the initial tetrahedron: the farthest pair among the
/// axis extremes, the point farthest from the line through them, and the
/// point farthest from the plane of those three.
pub(super) fn find_seed(points: &[DVec3], eps: f64) -> Result<Seed, Error> {
    if points.len() < 4 {
        return Err(Error::NotEnoughPoints(points.len()));
    }
    let mut extremes = [0usize; 6];
    for axis in 0..3 {
        for (i, p) in points.iter().enumerate() {
            if p[axis] < points[extremes[2 * axis]][axis] {
                extremes[2 * axis] = i;
            }
            if p[axis] > points[extremes[2 * axis + 1]][axis] {
                extremes[2 * axis + 1] = i;
            }
        }
    }
    let (a, b, dist) = extremes
        .iter()
        .enumerate()
        .flat_map(|(i, &a)| extremes[i + 1..].iter().map(move |&b| (a, b)))
        .fold((extremes[0], extremes[0], 0.0), |best, (a, b)| {
            let d = points[a].distance(points[b]);
            if d > best.2 { (a, b, d) } else { best }
        });
    if dist <= eps {
        return Err(Error::DegenerateInput("all points coincide"));
    }
    let (c, dist) = argmax(0..points.len(), |i| {
        math::distance_from_line(points[a], points[b], points[i])
    })
    .ok_or(Error::NotEnoughPoints(points.len()))?;
    if dist <= eps {
        return Err(Error::DegenerateInput("all points are collinear"));
    }
    let plane = Plane::from_triangle(points[a], points[b], points[c]);
    let (apex, dist) = argmax(0..points.len(), |i| plane.signed_distance(points[i]).abs())
        .ok_or(Error::NotEnoughPoints(points.len()))?;
    if dist <= eps {
        return Err(Error::DegenerateInput("all points are coplanar"));
    }
    Ok(Seed {
        triangle: [a, b, c],
        apex,
    })
}

#[cfg(test)]
mod test {
    use super::find_seed;
    use crate::{error::Error, math::EPSILON};
    use glam::{DVec3, dvec3};

    #[test]
    fn t_seed_tetrahedron() {
        let points = [
            dvec3(0.0, 0.0, 0.0),
            dvec3(0.2, 0.2, 0.2),
            dvec3(1.0, 0.0, 0.0),
            dvec3(0.0, 1.0, 0.0),
            dvec3(0.0, 0.0, 1.0),
        ];
        let seed = find_seed(&points, EPSILON).expect("Cannot find seed");
        let mut chosen = vec![seed.triangle[0], seed.triangle[1], seed.triangle[2], seed.apex];
        chosen.sort();
        assert_eq!(chosen, vec![0, 2, 3, 4]);
    }

    #[test]
    fn t_seed_degenerate() {
        assert!(matches!(
            find_seed(&[DVec3::X, DVec3::Y, DVec3::Z], EPSILON),
            Err(Error::NotEnoughPoints(3))
        ));
        assert!(matches!(
            find_seed(&[DVec3::ONE; 5], EPSILON),
            Err(Error::DegenerateInput(_))
        ));
        let line: Vec<_> = (0..6).map(|i| DVec3::splat(i as f64)).collect();
        assert!(matches!(
            find_seed(&line, EPSILON),
            Err(Error::DegenerateInput("all points are collinear"))
        ));
        let plane: Vec<_> = (0..9)
            .map(|i| dvec3((i % 3) as f64, (i / 3) as f64, 2.0))
            .collect();
        assert!(matches!(
            find_seed(&plane, EPSILON),
            Err(Error::DegenerateInput("all points are coplanar"))
        ));
    }
}
