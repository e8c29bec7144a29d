use std::fmt::Display;

use thiserror::Error;

use crate::element::{FH, HH, VH};

/// The loops that are bounded by an explicit iteration limit. Reaching the
/// limit means the connectivity of the mesh is inconsistent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Traversal {
    /// Collecting the faces visible from a point while building a hull.
    FloodFill,
    /// Pairing halfedges with reversed endpoints.
    Stitch,
    /// Rotating around a vertex to collect its incoming halfedges.
    VertexRing,
    /// The main loop of the simplifier.
    Decimate,
}

impl Display for Traversal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Traversal::FloodFill => "flood fill",
            Traversal::Stitch => "opposite stitching",
            Traversal::VertexRing => "vertex rotation",
            Traversal::Decimate => "decimation loop",
        })
    }
}

/// What to do when an operation runs into a recoverable anomaly, such as a
/// missing neighbor or an open vertex ring.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Strictness {
    /// Return an error.
    Strict,
    /// Log a warning, skip the offending element and carry on.
    #[default]
    Lenient,
}

#[derive(Debug, Error)]
pub enum Error {
    // Topology.
    #[error("{0} is deleted or out of bounds")]
    InvalidVertex(VH),
    #[error("{0} is deleted or out of bounds")]
    InvalidHalfedge(HH),
    #[error("{0} is deleted or out of bounds")]
    InvalidFace(FH),
    #[error("{0} has no opposite halfedge")]
    MissingOpposite(HH),
    #[error("The ring of halfedges around the head of {0} is open")]
    OpenVertexRing(HH),
    #[error("{traversal} exceeded its limit of {limit} iterations")]
    SafetyCap { traversal: Traversal, limit: usize },
    #[error("{0} halfedges could not be paired with an opposite")]
    UnmatchedHalfedges(usize),
    // Topology checks.
    #[error("The face loop of {0} is not a triangle")]
    BrokenTriangleLoop(HH),
    #[error("The next and prev links of {0} disagree")]
    InvalidHalfedgeLink(HH),
    #[error("{0} does not belong to the face of its loop")]
    InconsistentFaceInLoop(HH),
    #[error("{0} refers to {1} which is not part of it")]
    InvalidFaceHalfedgeLink(FH, HH),
    #[error("{0} refers to {1} which does not point to it")]
    InvalidVertexHalfedgeLink(VH, HH),
    #[error("The opposite of {0} does not link back to it")]
    AsymmetricOpposite(HH),
    #[error("{0} and its opposite do not have reversed endpoints")]
    MismatchedOpposite(HH),
    // Hull.
    #[error("At least 4 points are required, found {0}")]
    NotEnoughPoints(usize),
    #[error("Degenerate input: {0}")]
    DegenerateInput(&'static str),
    #[error("Point {0} is outside the hull but cannot be incorporated")]
    UnclassifiablePoint(usize),
    // Obj.
    #[error("Failed to load obj: {0}")]
    ObjLoadFailed(String),
    #[error("The number of coordinates {0} is not a multiple of 3")]
    IncorrectNumberOfCoordinates(usize),
    #[error("The number of indices {0} is not a multiple of 3")]
    IncorrectIndexCount(usize),
    #[error("Vertex index {0} is out of bounds")]
    IndexOutOfBounds(u32),
}
