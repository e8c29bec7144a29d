/*!
Halfedge triangle meshes for closed solids, with an incremental convex hull
builder and a quadric error edge contraction simplifier.

# Overview

+ A [`Mesh`] stores its connectivity in arenas addressed by the handles
  [`VH`], [`HH`] and [`FH`]. Every triangle owns its three vertices and three
  halfedges, and neighboring triangles are connected only through the
  `opposite` links of their halfedges. Deleted elements are kept as tombstones,
  so handles stay stable through every edit.

+ [`Mesh::convex_hull`] builds the hull of a point set by starting from a
  tetrahedron and adding one point at a time, replacing the faces visible from
  that point with a fan of triangles. See [`HullParams`] for the tolerances and
  iteration limits.

+ [`Mesh::decimate`] simplifies a closed mesh by repeatedly contracting the
  edge with the lowest quadric error, until a budget, an error ceiling or the
  4 face floor is reached. This requires the `decimate` feature, which is
  enabled by default.

+ Anomalies that can be recovered from, such as a point that cannot be added
  to a hull, are either skipped with a warning or returned as an [`Error`],
  depending on the [`Strictness`] of the operation. Warnings are reported via
  [`tracing`](https://crates.io/crates/tracing).
*/

mod check;
mod element;
mod error;
mod macros;
mod math;
mod mesh;
mod obj;
mod primitive;
mod status;
mod topol;

#[cfg(feature = "decimate")]
pub mod decimate;
pub mod hull;

#[cfg(feature = "decimate")]
pub use decimate::{DecimateParams, DecimateReport, Termination};
pub use element::{FH, HH, Handle, HasTopology, VH};
pub use error::{Error, Strictness, Traversal};
pub use hull::{HullParams, HullReport, HullStatus};
pub use math::{EPSILON, Plane};
pub use mesh::Mesh;
pub use status::Status;
pub use topol::Topology;
