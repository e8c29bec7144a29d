use std::collections::{HashMap, HashSet};

use glam::DVec3;
use tracing::debug;

use crate::{
    element::{FH, HH, Handle, HasTopology, VH},
    error::{Error, Traversal},
    math::{self, Plane},
    topol::{self, Topology},
};

/// Triangle mesh with halfedge connectivity.
///
/// Every triangle owns its three vertex records, so vertices that share a
/// position in space are distinct records, connected only through the
/// opposite links of the halfedges around them. Use [`Mesh::distinct_points`]
/// to count the locations of a mesh.
pub struct Mesh {
    pub(crate) topol: Topology,
    points: Vec<DVec3>,
    normals: Vec<Option<DVec3>>,
}

impl Default for Mesh {
    fn default() -> Self {
        Self::new()
    }
}

impl HasTopology for Mesh {
    fn topology(&self) -> &Topology {
        &self.topol
    }
}

impl Mesh {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(nfaces: usize) -> Self {
        Mesh {
            topol: Topology::with_capacity(nfaces),
            points: Vec::with_capacity(nfaces * 3),
            normals: Vec::with_capacity(nfaces * 3),
        }
    }

    pub fn num_vertices(&self) -> usize {
        self.topol.num_vertices()
    }

    pub fn num_halfedges(&self) -> usize {
        self.topol.num_halfedges()
    }

    pub fn num_faces(&self) -> usize {
        self.topol.num_faces()
    }

    pub fn vertices(&self) -> impl Iterator<Item = VH> {
        self.topol.vertices()
    }

    pub fn halfedges(&self) -> impl Iterator<Item = HH> {
        self.topol.halfedges()
    }

    pub fn faces(&self) -> impl Iterator<Item = FH> {
        self.topol.faces()
    }

    pub fn point(&self, v: VH) -> DVec3 {
        self.points[v.index() as usize]
    }

    pub(crate) fn set_point(&mut self, v: VH, pos: DVec3) {
        self.points[v.index() as usize] = pos;
    }

    /// The normal of the vertex, if one was computed.
    pub fn normal(&self, v: VH) -> Option<DVec3> {
        self.normals[v.index() as usize]
    }

    pub fn head_vertex(&self, h: HH) -> VH {
        self.topol.head_vertex(h)
    }

    pub fn tail_vertex(&self, h: HH) -> VH {
        self.topol.tail_vertex(h)
    }

    pub fn next_halfedge(&self, h: HH) -> HH {
        self.topol.next_halfedge(h)
    }

    pub fn prev_halfedge(&self, h: HH) -> HH {
        self.topol.prev_halfedge(h)
    }

    pub fn opposite_halfedge(&self, h: HH) -> Option<HH> {
        self.topol.opposite_halfedge(h)
    }

    pub fn halfedge_face(&self, h: HH) -> FH {
        self.topol.halfedge_face(h)
    }

    pub fn face_halfedge(&self, f: FH) -> HH {
        self.topol.face_halfedge(f)
    }

    pub fn face_halfedges(&self, f: FH) -> [HH; 3] {
        self.topol.face_halfedges(f)
    }

    pub fn vertex_halfedge(&self, v: VH) -> HH {
        self.topol.vertex_halfedge(v)
    }

    /// The positions of the tail and head of the halfedge.
    pub fn halfedge_points(&self, h: HH) -> (DVec3, DVec3) {
        (self.point(self.tail_vertex(h)), self.point(self.head_vertex(h)))
    }

    /// The positions of the corners of the face, in winding order.
    pub fn face_points(&self, f: FH) -> [DVec3; 3] {
        self.face_halfedges(f)
            .map(|h| self.point(self.tail_vertex(h)))
    }

    pub fn face_plane(&self, f: FH) -> Plane {
        let [a, b, c] = self.face_points(f);
        Plane::from_triangle(a, b, c)
    }

    pub fn face_normal(&self, f: FH) -> DVec3 {
        let [a, b, c] = self.face_points(f);
        math::triangle_normal(a, b, c)
    }

    pub fn face_area(&self, f: FH) -> f64 {
        let [a, b, c] = self.face_points(f);
        math::triangle_area(a, b, c)
    }

    pub fn face_centroid(&self, f: FH) -> DVec3 {
        let [a, b, c] = self.face_points(f);
        (a + b + c) / 3.0
    }

    /// Add a triangle with new vertices at the given positions. The
    /// halfedges run `p1 -> p2 -> p3 -> p1`. No opposite halfedges are
    /// searched for, that is left to the caller.
    pub fn add_triangle(&mut self, p1: DVec3, p2: DVec3, p3: DVec3) -> FH {
        let f = self.topol.add_triangle();
        self.points.extend_from_slice(&[p1, p2, p3]);
        self.normals.extend_from_slice(&[None; 3]);
        f
    }

    /// Delete a face with its halfedges and vertices. See
    /// [`Mesh::stitch_opposites`] and [`Mesh::link_opposites`] for relinking
    /// the neighbors when `clear_opposites` is false.
    pub fn delete_face(&mut self, f: FH, clear_opposites: bool) -> Result<(), Error> {
        self.topol.delete_face(f, clear_opposites)
    }

    pub fn link_opposites(&mut self, a: HH, b: HH) {
        self.topol.link_opposites(a, b)
    }

    /// Remove the deleted elements and renumber the live ones, keeping their
    /// order. Handles obtained before this call are invalidated.
    /// [`Mesh::convex_hull`] and [`Mesh::decimate`] return meshes that are
    /// already compacted.
    pub fn garbage_collection(&mut self) -> Result<(), Error> {
        let status = &self.topol.vstatus;
        let points: Vec<DVec3> = topol::live(&self.points, status).copied().collect();
        let normals: Vec<Option<DVec3>> = topol::live(&self.normals, status).copied().collect();
        self.topol.garbage_collection()?;
        self.points = points;
        self.normals = normals;
        Ok(())
    }

    /// Pair up the candidate halfedges whose endpoints are the reverse of
    /// each other, within `eps`. Candidates that already have an opposite
    /// are ignored. When more than one candidate qualifies, the first one in
    /// the order of `candidates` wins. Returns the candidates that found no
    /// partner.
    pub fn stitch_opposites(
        &mut self,
        candidates: &[HH],
        eps: f64,
        limit: usize,
    ) -> Result<Vec<HH>, Error> {
        let mut pending = Vec::with_capacity(candidates.len());
        for &h in candidates {
            if !self.topol.is_valid_halfedge(h) {
                return Err(Error::InvalidHalfedge(h));
            }
            if self.opposite_halfedge(h).is_none() {
                pending.push(h);
            }
        }
        let mut paired = vec![false; pending.len()];
        let mut unmatched = Vec::new();
        let mut iterations = 0usize;
        for i in 0..pending.len() {
            if paired[i] {
                continue;
            }
            iterations += 1;
            if iterations > limit {
                return Err(Error::SafetyCap {
                    traversal: Traversal::Stitch,
                    limit,
                });
            }
            let h = pending[i];
            let (tail, head) = self.halfedge_points(h);
            let face = self.halfedge_face(h);
            let found = (i + 1..pending.len()).find(|&j| {
                let oh = pending[j];
                let (otail, ohead) = self.halfedge_points(oh);
                !paired[j]
                    && self.halfedge_face(oh) != face
                    && otail.distance(head) <= eps
                    && ohead.distance(tail) <= eps
            });
            match found {
                Some(j) => {
                    paired[i] = true;
                    paired[j] = true;
                    self.link_opposites(h, pending[j]);
                }
                None => unmatched.push(h),
            }
        }
        Ok(unmatched)
    }

    /// Collect the halfedges pointing to the location of `v`, by rotating
    /// around it. This requires a closed ring of faces around `v`. At most
    /// `limit` halfedges are visited.
    pub fn incident_halfedges(&self, v: VH, limit: usize, out: &mut Vec<HH>) -> Result<(), Error> {
        if !self.topol.is_valid_vertex(v) {
            return Err(Error::InvalidVertex(v));
        }
        self.topol
            .incoming_halfedges(self.vertex_halfedge(v), limit, out)
    }

    /// Check if every halfedge has an opposite.
    pub fn is_closed(&self) -> bool {
        self.halfedges()
            .all(|h| self.opposite_halfedge(h).is_some())
    }

    /// The distinct positions of the vertices of this mesh, in the order of
    /// their first appearance.
    pub fn distinct_points(&self) -> Vec<DVec3> {
        let mut seen = HashSet::new();
        self.vertices()
            .map(|v| self.point(v))
            .filter(|p| seen.insert(p.to_array().map(f64::to_bits)))
            .collect()
    }

    /// Create a mesh from indexed triangles. Halfedges sharing a pair of
    /// vertex indices in reverse order are linked as opposites.
    pub fn from_triangles(points: &[DVec3], triangles: &[[u32; 3]]) -> Result<Self, Error> {
        let mut mesh = Self::with_capacity(triangles.len());
        let mut unpaired: HashMap<(u32, u32), Vec<HH>> = HashMap::new();
        for tri in triangles {
            let mut pos = [DVec3::ZERO; 3];
            for (i, &vi) in tri.iter().enumerate() {
                pos[i] = *points
                    .get(vi as usize)
                    .ok_or(Error::IndexOutOfBounds(vi))?;
            }
            let f = mesh.add_triangle(pos[0], pos[1], pos[2]);
            for (i, h) in mesh.face_halfedges(f).into_iter().enumerate() {
                let (from, to) = (tri[i], tri[(i + 1) % 3]);
                match unpaired.get_mut(&(to, from)).and_then(|hs| hs.pop()) {
                    Some(oh) => mesh.link_opposites(h, oh),
                    None => unpaired.entry((from, to)).or_default().push(h),
                }
            }
        }
        let nopen: usize = unpaired.values().map(|hs| hs.len()).sum();
        if nopen > 0 {
            debug!(boundary_halfedges = nopen, "Created a mesh with holes");
        }
        Ok(mesh)
    }

    /// Compute the vertex normals. If `smooth` is false, every vertex gets
    /// the normal of its own face. Otherwise the area weighted normals of the
    /// faces around the vertex are averaged, falling back to the face normal
    /// where the ring of faces is open.
    pub fn update_vertex_normals(&mut self, smooth: bool, ring_limit: usize) -> Result<(), Error> {
        let mut ring = Vec::new();
        let verts: Vec<VH> = self.vertices().collect();
        for v in verts {
            let own = self.face_normal(self.halfedge_face(self.vertex_halfedge(v)));
            let normal = if smooth {
                match self.incident_halfedges(v, ring_limit, &mut ring) {
                    Ok(()) => ring
                        .iter()
                        .map(|h| {
                            let f = self.halfedge_face(*h);
                            self.face_normal(f) * self.face_area(f)
                        })
                        .sum::<DVec3>()
                        .normalize_or_zero(),
                    Err(Error::OpenVertexRing(_)) => own,
                    Err(e) => return Err(e),
                }
            } else {
                own
            };
            self.normals[v.index() as usize] = Some(normal);
        }
        Ok(())
    }
}
