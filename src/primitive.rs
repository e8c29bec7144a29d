use glam::{DVec3, dvec3};

use crate::{error::Error, mesh::Mesh};

/// Platonic solids with triangular faces.
impl Mesh {
    /// Create a tetrahedron centered at the origin. The vertices of the mesh
    /// will lie on the sphere of the given radius.
    pub fn tetrahedron(radius: f64) -> Result<Self, Error> {
        let a = radius * (1.0f64 / 3.0);
        let b = radius * (8.0 / 9.0f64).sqrt();
        let c = radius * (2.0 / 9.0f64).sqrt();
        let d = radius * (2.0 / 3.0f64).sqrt();
        Self::from_triangles(
            &[
                dvec3(0.0, 0.0, radius),
                dvec3(-c, d, -a),
                dvec3(-c, -d, -a),
                dvec3(b, 0.0, -a),
            ],
            &[[0, 1, 2], [0, 2, 3], [0, 3, 1], [3, 2, 1]],
        )
    }

    /// Create a hexahedron centered at the origin, with every square face
    /// split into two triangles. The vertices of the mesh will lie on the
    /// sphere of the given radius.
    pub fn hexahedron(radius: f64) -> Result<Self, Error> {
        let a = radius / 3.0f64.sqrt();
        Self::from_triangles(
            &[
                dvec3(-a, -a, -a),
                dvec3(a, -a, -a),
                dvec3(a, a, -a),
                dvec3(-a, a, -a),
                dvec3(-a, -a, a),
                dvec3(a, -a, a),
                dvec3(a, a, a),
                dvec3(-a, a, a),
            ],
            &[
                [3, 2, 1],
                [3, 1, 0],
                [2, 6, 5],
                [2, 5, 1],
                [5, 6, 7],
                [5, 7, 4],
                [0, 4, 7],
                [0, 7, 3],
                [3, 7, 6],
                [3, 6, 2],
                [1, 5, 4],
                [1, 4, 0],
            ],
        )
    }

    /// Create an octahedron centered at the origin. The vertices of the mesh
    /// will lie on the sphere of the given radius.
    pub fn octahedron(radius: f64) -> Result<Self, Error> {
        Self::from_triangles(
            &[
                dvec3(radius, 0.0, 0.0),
                dvec3(0.0, radius, 0.0),
                dvec3(-radius, 0.0, 0.0),
                dvec3(0.0, -radius, 0.0),
                dvec3(0.0, 0.0, radius),
                dvec3(0.0, 0.0, -radius),
            ],
            &[
                [0, 4, 3],
                [1, 4, 0],
                [2, 4, 1],
                [3, 4, 2],
                [3, 5, 0],
                [0, 5, 1],
                [1, 5, 2],
                [2, 5, 3],
            ],
        )
    }

    /// Create an icosahedron centered at the origin. The vertices of the mesh
    /// will lie on the sphere of the given radius.
    pub fn icosahedron(radius: f64) -> Result<Self, Error> {
        const A: f64 = 0.5257311121191336;
        const B: f64 = 0.8506508083520399;
        let points: Vec<DVec3> = [
            (0.0, A, -B),
            (A, B, 0.0),
            (-A, B, 0.0),
            (0.0, A, B),
            (0.0, -A, B),
            (-B, 0.0, A),
            (0.0, -A, -B),
            (B, 0.0, -A),
            (B, 0.0, A),
            (-B, 0.0, -A),
            (A, -B, 0.0),
            (-A, -B, 0.0),
        ]
        .into_iter()
        .map(|(x, y, z)| dvec3(x, y, z) * radius)
        .collect();
        Self::from_triangles(
            &points,
            &[
                [2, 1, 0],
                [1, 2, 3],
                [5, 4, 3],
                [4, 8, 3],
                [7, 6, 0],
                [6, 9, 0],
                [11, 10, 4],
                [10, 11, 6],
                [9, 5, 2],
                [5, 9, 11],
                [8, 7, 1],
                [7, 8, 10],
                [2, 5, 3],
                [8, 1, 3],
                [9, 2, 0],
                [1, 7, 0],
                [11, 9, 6],
                [7, 10, 6],
                [5, 11, 4],
                [10, 8, 4],
            ],
        )
    }
}

#[cfg(test)]
mod test {
    use crate::{macros::assert_f64_eq, mesh::Mesh};

    fn assert_outward(mesh: &Mesh) {
        for f in mesh.faces() {
            assert!(
                mesh.face_normal(f).dot(mesh.face_centroid(f)) > 0.0,
                "Face normals of a convex solid centered at the origin must point away from it"
            );
        }
    }

    #[test]
    fn t_platonic_counts() {
        for (mesh, nverts, nfaces) in [
            (Mesh::tetrahedron(2.0), 4, 4),
            (Mesh::hexahedron(2.0), 8, 12),
            (Mesh::octahedron(2.0), 6, 8),
            (Mesh::icosahedron(2.0), 12, 20),
        ] {
            let mesh = mesh.expect("Cannot create primitive");
            assert_eq!(mesh.distinct_points().len(), nverts);
            assert_eq!(mesh.num_faces(), nfaces);
            assert_outward(&mesh);
            for p in mesh.distinct_points() {
                assert_f64_eq!(p.length(), 2.0, 1e-12);
            }
        }
    }
}
