use crate::{element::HasTopology, error::Error, math::EPSILON, mesh::Mesh};

fn check_vertices(mesh: &Mesh) -> Result<(), Error> {
    for v in mesh.vertices() {
        let h = v.halfedge(mesh);
        if !h.is_valid(mesh) {
            return Err(Error::InvalidHalfedge(h));
        }
        // The reference halfedge must point back to this vertex.
        if h.head(mesh) != v {
            return Err(Error::InvalidVertexHalfedgeLink(v, h));
        }
    }
    Ok(())
}

fn check_halfedges(mesh: &Mesh) -> Result<(), Error> {
    let topol = mesh.topology();
    for h in mesh.halfedges() {
        let (next, prev) = (h.next(mesh), h.prev(mesh));
        if !next.is_valid(mesh) {
            return Err(Error::InvalidHalfedge(next));
        }
        if !prev.is_valid(mesh) {
            return Err(Error::InvalidHalfedge(prev));
        }
        if next.prev(mesh) != h || prev.next(mesh) != h {
            return Err(Error::InvalidHalfedgeLink(h));
        }
        if next.next(mesh).next(mesh) != h {
            return Err(Error::BrokenTriangleLoop(h));
        }
        let f = h.face(mesh);
        if !topol.is_valid_face(f) || next.face(mesh) != f || prev.face(mesh) != f {
            return Err(Error::InconsistentFaceInLoop(h));
        }
        if let Some(oh) = h.opposite(mesh) {
            if !oh.is_valid(mesh) {
                return Err(Error::InvalidHalfedge(oh));
            }
            if oh.opposite(mesh) != Some(h) {
                return Err(Error::AsymmetricOpposite(h));
            }
            let (tail, head) = mesh.halfedge_points(h);
            let (otail, ohead) = mesh.halfedge_points(oh);
            if otail.distance(head) > EPSILON || ohead.distance(tail) > EPSILON {
                return Err(Error::MismatchedOpposite(h));
            }
        }
    }
    Ok(())
}

fn check_faces(mesh: &Mesh) -> Result<(), Error> {
    for f in mesh.faces() {
        let h = f.halfedge(mesh);
        if !h.is_valid(mesh) {
            return Err(Error::InvalidHalfedge(h));
        }
        if h.face(mesh) != f {
            return Err(Error::InvalidFaceHalfedgeLink(f, h));
        }
    }
    Ok(())
}

impl Mesh {
    /// Check the topology of the mesh.
    ///
    /// Verifies that every face is a closed loop of three halfedges, that the
    /// links between vertices, halfedges and faces agree, and that opposite
    /// halfedges refer to each other and have reversed endpoints. Missing
    /// opposites are allowed, use [`Mesh::is_closed`] to rule them out.
    pub fn check_topology(&self) -> Result<(), Error> {
        check_vertices(self)?;
        check_halfedges(self)?;
        check_faces(self)?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use crate::{error::Error, mesh::Mesh};
    use glam::dvec3;

    #[test]
    fn t_check_primitives() {
        for mesh in [
            Mesh::tetrahedron(1.0),
            Mesh::hexahedron(1.0),
            Mesh::octahedron(1.0),
            Mesh::icosahedron(1.0),
        ] {
            let mesh = mesh.expect("Cannot create primitive");
            mesh.check_topology().expect("Topology is broken");
            assert!(mesh.is_closed());
        }
    }

    #[test]
    fn t_check_asymmetric_opposite() {
        let mut mesh = Mesh::tetrahedron(1.0).expect("Cannot create tetrahedron");
        let f = mesh.faces().next().expect("Mesh has no faces");
        let [h0, h1, _] = mesh.face_halfedges(f);
        let o0 = mesh.opposite_halfedge(h0).expect("Tetrahedron is closed");
        // Point h1 at the opposite of h0, without relinking the other side.
        mesh.topol.link_opposites(h1, o0);
        assert!(matches!(
            mesh.check_topology(),
            Err(Error::AsymmetricOpposite(_)) | Err(Error::MismatchedOpposite(_))
        ));
    }

    #[test]
    fn t_check_mismatched_opposite() {
        let mut mesh = Mesh::new();
        let f0 = mesh.add_triangle(
            dvec3(0.0, 0.0, 0.0),
            dvec3(1.0, 0.0, 0.0),
            dvec3(0.0, 1.0, 0.0),
        );
        let f1 = mesh.add_triangle(
            dvec3(0.0, 0.0, 0.0),
            dvec3(1.0, 0.0, 0.0),
            dvec3(0.0, -1.0, 0.0),
        );
        // Same direction, so they cannot be opposites.
        mesh.link_opposites(mesh.face_halfedge(f0), mesh.face_halfedge(f1));
        assert!(matches!(
            mesh.check_topology(),
            Err(Error::MismatchedOpposite(_))
        ));
    }
}
