use crate::{
    element::{FH, Face, HH, Halfedge, Handle, VH, Vertex},
    error::{Error, Traversal},
    status::Status,
};

/// Connectivity of a triangle mesh, stored in arenas addressed by stable
/// handles. Every triangle owns its three vertices and three halfedges, and
/// they are created and deleted together.
///
/// This is the read-only view of the connectivity exposed through
/// [`HasTopology`](crate::HasTopology). Edits go through [`Mesh`](crate::Mesh).
pub struct Topology {
    vertices: Vec<Vertex>,
    halfedges: Vec<Halfedge>,
    faces: Vec<Face>,
    pub(crate) vstatus: Vec<Status>,
    pub(crate) hstatus: Vec<Status>,
    pub(crate) fstatus: Vec<Status>,
    num_live_faces: usize,
}

impl Topology {
    pub(crate) fn with_capacity(nfaces: usize) -> Self {
        Topology {
            vertices: Vec::with_capacity(nfaces * 3),
            halfedges: Vec::with_capacity(nfaces * 3),
            faces: Vec::with_capacity(nfaces),
            vstatus: Vec::with_capacity(nfaces * 3),
            hstatus: Vec::with_capacity(nfaces * 3),
            fstatus: Vec::with_capacity(nfaces),
            num_live_faces: 0,
        }
    }

    fn halfedge(&self, h: HH) -> &Halfedge {
        &self.halfedges[h.index() as usize]
    }

    fn halfedge_mut(&mut self, h: HH) -> &mut Halfedge {
        &mut self.halfedges[h.index() as usize]
    }

    pub fn vertex_halfedge(&self, v: VH) -> HH {
        self.vertices[v.index() as usize].halfedge
    }

    pub fn head_vertex(&self, h: HH) -> VH {
        self.halfedge(h).vertex
    }

    pub fn tail_vertex(&self, h: HH) -> VH {
        self.halfedge(self.halfedge(h).prev).vertex
    }

    pub fn next_halfedge(&self, h: HH) -> HH {
        self.halfedge(h).next
    }

    pub fn prev_halfedge(&self, h: HH) -> HH {
        self.halfedge(h).prev
    }

    pub fn opposite_halfedge(&self, h: HH) -> Option<HH> {
        self.halfedge(h).opposite
    }

    pub fn halfedge_face(&self, h: HH) -> FH {
        self.halfedge(h).face
    }

    pub fn face_halfedge(&self, f: FH) -> HH {
        self.faces[f.index() as usize].halfedge
    }

    /// The three halfedges of the face, in the order of the `next` links.
    pub fn face_halfedges(&self, f: FH) -> [HH; 3] {
        let h0 = self.face_halfedge(f);
        let h1 = self.next_halfedge(h0);
        [h0, h1, self.next_halfedge(h1)]
    }

    pub fn is_valid_vertex(&self, v: VH) -> bool {
        let vi = v.index() as usize;
        vi < self.vertices.len() && !self.vstatus[vi].deleted()
    }

    pub fn is_valid_halfedge(&self, h: HH) -> bool {
        let hi = h.index() as usize;
        hi < self.halfedges.len() && !self.hstatus[hi].deleted()
    }

    pub fn is_valid_face(&self, f: FH) -> bool {
        let fi = f.index() as usize;
        fi < self.faces.len() && !self.fstatus[fi].deleted()
    }

    /// Number of live faces.
    pub fn num_faces(&self) -> usize {
        self.num_live_faces
    }

    /// Number of live halfedges.
    pub fn num_halfedges(&self) -> usize {
        self.num_live_faces * 3
    }

    /// Number of live vertex records.
    pub fn num_vertices(&self) -> usize {
        self.num_live_faces * 3
    }

    /// Number of halfedge slots in the arena, including deleted ones.
    pub fn halfedge_capacity(&self) -> usize {
        self.halfedges.len()
    }

    /// Number of vertex slots in the arena, including deleted ones.
    pub fn vertex_capacity(&self) -> usize {
        self.vertices.len()
    }

    /// Number of face slots in the arena, including deleted ones.
    pub fn face_capacity(&self) -> usize {
        self.faces.len()
    }

    pub fn vertices(&self) -> impl Iterator<Item = VH> {
        self.vstatus
            .iter()
            .enumerate()
            .filter(|(_, s)| !s.deleted())
            .map(|(i, _)| (i as u32).into())
    }

    pub fn halfedges(&self) -> impl Iterator<Item = HH> {
        self.hstatus
            .iter()
            .enumerate()
            .filter(|(_, s)| !s.deleted())
            .map(|(i, _)| (i as u32).into())
    }

    pub fn faces(&self) -> impl Iterator<Item = FH> {
        self.fstatus
            .iter()
            .enumerate()
            .filter(|(_, s)| !s.deleted())
            .map(|(i, _)| (i as u32).into())
    }

    /// Allocate a triangle with three new vertices `v0, v1, v2` and the
    /// halfedges `v0 -> v1 -> v2 -> v0`. Opposite links are left unset.
    pub(crate) fn add_triangle(&mut self) -> FH {
        let fi = self.faces.len() as u32;
        let vi = self.vertices.len() as u32;
        let hi = self.halfedges.len() as u32;
        for i in 0..3u32 {
            self.vertices.push(Vertex {
                halfedge: (hi + (i + 2) % 3).into(),
            });
            self.halfedges.push(Halfedge {
                face: fi.into(),
                vertex: (vi + (i + 1) % 3).into(),
                next: (hi + (i + 1) % 3).into(),
                prev: (hi + (i + 2) % 3).into(),
                opposite: None,
            });
            self.vstatus.push(Status::default());
            self.hstatus.push(Status::default());
        }
        self.faces.push(Face {
            halfedge: hi.into(),
        });
        self.fstatus.push(Status::default());
        self.num_live_faces += 1;
        fi.into()
    }

    /// Delete the face along with its halfedges and vertices. If
    /// `clear_opposites` is true, the neighboring halfedges lose their
    /// opposite links. Otherwise they keep pointing at the deleted halfedges
    /// until the caller relinks them.
    pub(crate) fn delete_face(&mut self, f: FH, clear_opposites: bool) -> Result<(), Error> {
        if !self.is_valid_face(f) {
            return Err(Error::InvalidFace(f));
        }
        for h in self.face_halfedges(f) {
            if clear_opposites {
                if let Some(oh) = self.opposite_halfedge(h) {
                    if self.opposite_halfedge(oh) == Some(h) {
                        self.halfedge_mut(oh).opposite = None;
                    }
                }
            }
            let v = self.head_vertex(h);
            self.vstatus[v.index() as usize].set_deleted(true);
            self.hstatus[h.index() as usize].set_deleted(true);
        }
        self.fstatus[f.index() as usize].set_deleted(true);
        self.num_live_faces -= 1;
        Ok(())
    }

    /// Make `a` and `b` each other's opposite.
    pub(crate) fn link_opposites(&mut self, a: HH, b: HH) {
        self.halfedge_mut(a).opposite = Some(b);
        self.halfedge_mut(b).opposite = Some(a);
    }

    /// Remove the deleted elements from the arenas and renumber the live
    /// ones, keeping their order. Opposite links to deleted halfedges are
    /// cleared. Handles obtained before this call are invalidated.
    pub(crate) fn garbage_collection(&mut self) -> Result<(), Error> {
        let vmap: Vec<Option<VH>> = compact_map(&self.vstatus);
        let hmap: Vec<Option<HH>> = compact_map(&self.hstatus);
        let fmap: Vec<Option<FH>> = compact_map(&self.fstatus);
        let vertex = |v: VH| lookup(&vmap, v).ok_or(Error::InvalidVertex(v));
        let halfedge = |h: HH| lookup(&hmap, h).ok_or(Error::InvalidHalfedge(h));
        let face = |f: FH| lookup(&fmap, f).ok_or(Error::InvalidFace(f));
        let nlive = self.num_live_faces;
        let mut vertices = Vec::with_capacity(nlive * 3);
        for v in live(&self.vertices, &self.vstatus) {
            vertices.push(Vertex {
                halfedge: halfedge(v.halfedge)?,
            });
        }
        let mut halfedges = Vec::with_capacity(nlive * 3);
        for h in live(&self.halfedges, &self.hstatus) {
            halfedges.push(Halfedge {
                face: face(h.face)?,
                vertex: vertex(h.vertex)?,
                next: halfedge(h.next)?,
                prev: halfedge(h.prev)?,
                opposite: h.opposite.and_then(|oh| lookup(&hmap, oh)),
            });
        }
        let mut faces = Vec::with_capacity(nlive);
        for f in live(&self.faces, &self.fstatus) {
            faces.push(Face {
                halfedge: halfedge(f.halfedge)?,
            });
        }
        self.vstatus = vec![Status::default(); vertices.len()];
        self.hstatus = vec![Status::default(); halfedges.len()];
        self.fstatus = vec![Status::default(); faces.len()];
        self.vertices = vertices;
        self.halfedges = halfedges;
        self.faces = faces;
        Ok(())
    }

    /// Collect the halfedges pointing to the head of `h` by rotating
    /// `opposite(next(h))` until the rotation returns to `h`. The ring must be
    /// closed. At most `limit` halfedges are visited.
    pub fn incoming_halfedges(&self, h: HH, limit: usize, out: &mut Vec<HH>) -> Result<(), Error> {
        out.clear();
        let mut current = h;
        for _ in 0..limit {
            out.push(current);
            current = match self.opposite_halfedge(self.next_halfedge(current)) {
                Some(oh) if self.is_valid_halfedge(oh) => oh,
                Some(oh) => return Err(Error::InvalidHalfedge(oh)),
                None => return Err(Error::OpenVertexRing(h)),
            };
            if current == h {
                return Ok(());
            }
        }
        Err(Error::SafetyCap {
            traversal: Traversal::VertexRing,
            limit,
        })
    }
}

/// The live items of an arena, in order.
pub(crate) fn live<'a, T>(items: &'a [T], status: &'a [Status]) -> impl Iterator<Item = &'a T> {
    items
        .iter()
        .zip(status)
        .filter(|(_, s)| !s.deleted())
        .map(|(item, _)| item)
}

/// Map the index of every element to its index once the deleted elements are
/// removed. Deleted elements map to `None`.
fn compact_map<H: From<u32>>(status: &[Status]) -> Vec<Option<H>> {
    let mut count = 0u32;
    status
        .iter()
        .map(|s| {
            if s.deleted() {
                None
            } else {
                count += 1;
                Some((count - 1).into())
            }
        })
        .collect()
}

fn lookup<H: Handle>(map: &[Option<H>], h: H) -> Option<H> {
    map.get(h.index() as usize).copied().flatten()
}
