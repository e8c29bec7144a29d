use crate::topol::Topology;
use std::fmt::{Debug, Display};

/**
 * All elements of the mesh implement this trait. They are identified by their
 * index in the arena that owns them.
 */
pub trait Handle: Copy {
    /**
     * The index of the element.
     */
    fn index(&self) -> u32;
}

/**
 * Vertex handle.
 */
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VH {
    idx: u32,
}

/**
 * Halfedge handle.
 */
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HH {
    idx: u32,
}

/**
 * Face handle.
 */
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FH {
    idx: u32,
}

macro_rules! impl_handle {
    ($name:ident, $label:literal) => {
        impl Handle for $name {
            fn index(&self) -> u32 {
                self.idx
            }
        }

        impl From<u32> for $name {
            fn from(idx: u32) -> Self {
                $name { idx }
            }
        }

        impl From<&u32> for $name {
            fn from(idx: &u32) -> Self {
                $name { idx: *idx }
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}({})", $label, self.index())
            }
        }

        impl Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}({})", $label, self.index())
            }
        }
    };
}

impl_handle!(VH, "VH");
impl_handle!(HH, "HH");
impl_handle!(FH, "FH");

pub trait HasTopology {
    fn topology(&self) -> &Topology;
}

impl HasTopology for Topology {
    fn topology(&self) -> &Topology {
        self
    }
}

impl VH {
    /// The halfedge of the owning triangle that points to this vertex.
    pub fn halfedge(self, mesh: &impl HasTopology) -> HH {
        mesh.topology().vertex_halfedge(self)
    }

    /// Check if this vertex is live in the `mesh`.
    ///
    /// The index has to be in bounds, and the vertex must not be deleted.
    pub fn is_valid(self, mesh: &impl HasTopology) -> bool {
        mesh.topology().is_valid_vertex(self)
    }
}

impl HH {
    /// The vertex this halfedge points to.
    pub fn head(self, mesh: &impl HasTopology) -> VH {
        mesh.topology().head_vertex(self)
    }

    /// The vertex this halfedge starts from.
    pub fn tail(self, mesh: &impl HasTopology) -> VH {
        mesh.topology().tail_vertex(self)
    }

    pub fn opposite(self, mesh: &impl HasTopology) -> Option<HH> {
        mesh.topology().opposite_halfedge(self)
    }

    pub fn prev(self, mesh: &impl HasTopology) -> HH {
        mesh.topology().prev_halfedge(self)
    }

    pub fn next(self, mesh: &impl HasTopology) -> HH {
        mesh.topology().next_halfedge(self)
    }

    pub fn face(self, mesh: &impl HasTopology) -> FH {
        mesh.topology().halfedge_face(self)
    }

    /// Check if this halfedge is live in the `mesh`.
    pub fn is_valid(self, mesh: &impl HasTopology) -> bool {
        mesh.topology().is_valid_halfedge(self)
    }

    /// Check if this halfedge has no opposite, i.e. it borders a hole.
    pub fn is_boundary(self, mesh: &impl HasTopology) -> bool {
        mesh.topology().opposite_halfedge(self).is_none()
    }
}

impl FH {
    pub fn halfedge(self, mesh: &impl HasTopology) -> HH {
        mesh.topology().face_halfedge(self)
    }

    /// Check if this face is live in the `mesh`.
    pub fn is_valid(self, mesh: &impl HasTopology) -> bool {
        mesh.topology().is_valid_face(self)
    }
}

#[derive(Debug, Copy, Clone)]
pub(crate) struct Vertex {
    pub(crate) halfedge: HH,
}

#[derive(Debug, Copy, Clone)]
pub(crate) struct Halfedge {
    pub(crate) face: FH,
    pub(crate) vertex: VH,
    pub(crate) next: HH,
    pub(crate) prev: HH,
    pub(crate) opposite: Option<HH>,
}

#[derive(Debug, Copy, Clone)]
pub(crate) struct Face {
    pub(crate) halfedge: HH,
}

#[cfg(test)]
mod test {
    use super::{FH, HasTopology};
    use crate::{Mesh, Topology};

    /// Count the faces adjacent to `f` using only the public navigation
    /// methods.
    fn num_neighbors(mesh: &impl HasTopology, f: FH) -> usize {
        let topol: &Topology = mesh.topology();
        topol
            .face_halfedges(f)
            .into_iter()
            .filter_map(|h| h.opposite(mesh))
            .filter(|oh| oh.is_valid(mesh) && oh.face(mesh) != f)
            .count()
    }

    #[test]
    fn t_navigate_topology() {
        let mesh = Mesh::tetrahedron(1.0).expect("Cannot create tetrahedron");
        for f in mesh.faces() {
            assert!(f.is_valid(&mesh));
            assert_eq!(num_neighbors(&mesh, f), 3);
            let h = f.halfedge(&mesh);
            assert_eq!(h.next(&mesh).next(&mesh).next(&mesh), h);
            assert_eq!(h.head(&mesh).halfedge(&mesh), h);
            assert_eq!(num_neighbors(mesh.topology(), f), 3);
        }
    }
}
