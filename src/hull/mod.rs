/*!
Incremental convex hull construction.

The hull starts as a tetrahedron spanned by four far apart points. Every other
point is then either discarded as interior, or added by replacing the faces it
can see with a fan of triangles connecting it to the horizon.
*/

mod seed;

use glam::DVec3;
use tracing::{debug, info, warn};

use crate::{
    element::{FH, HH, Handle},
    error::{Error, Strictness, Traversal},
    math::EPSILON,
    mesh::Mesh,
};

#[cfg(feature = "decimate")]
use crate::decimate::{DecimateParams, DecimateReport, Termination};

/// Parameters of the hull builder.
#[derive(Debug, Clone, Copy)]
pub struct HullParams {
    /// Points closer than this to a plane are considered to be on it.
    pub epsilon: f64,
    pub strictness: Strictness,
    /// Maximum number of faces a single point can see.
    pub flood_fill_limit: usize,
    /// Limit on the iterations of pairing the new halfedges of a fan.
    pub stitch_limit: usize,
    /// If set, run the simplifier with this error ceiling once the hull is
    /// built, to remove slivers. Requires the `decimate` feature.
    pub cleanup: Option<f64>,
}

impl Default for HullParams {
    fn default() -> Self {
        Self {
            epsilon: EPSILON,
            strictness: Strictness::default(),
            flood_fill_limit: 1 << 20,
            stitch_limit: 1 << 20,
            cleanup: None,
        }
    }
}

impl HullParams {
    #[must_use]
    pub const fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    #[must_use]
    pub const fn with_strictness(mut self, strictness: Strictness) -> Self {
        self.strictness = strictness;
        self
    }

    #[must_use]
    pub const fn with_flood_fill_limit(mut self, limit: usize) -> Self {
        self.flood_fill_limit = limit;
        self
    }

    #[must_use]
    pub const fn with_stitch_limit(mut self, limit: usize) -> Self {
        self.stitch_limit = limit;
        self
    }

    #[must_use]
    pub const fn with_cleanup(mut self, max_error: f64) -> Self {
        self.cleanup = Some(max_error);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HullStatus {
    /// Every point is on or inside the hull.
    Complete,
    /// Some points could not be incorporated and were dropped.
    Partial,
}

#[derive(Debug, Clone)]
pub struct HullReport {
    pub status: HullStatus,
    /// Indices of the points found inside the hull.
    pub interior: Vec<usize>,
    /// Indices of the points outside the hull that could not be added.
    pub dropped: Vec<usize>,
    #[cfg(feature = "decimate")]
    pub cleanup: Option<DecimateReport>,
}

/// Outcome of looking for the faces visible from a point.
enum Visibility {
    Interior,
    Visible { faces: Vec<FH>, border: Vec<HH> },
}

struct HullBuilder<'a> {
    mesh: Mesh,
    params: &'a HullParams,
}

impl HullBuilder<'_> {
    fn recoverable(&self, e: &Error) -> bool {
        self.params.strictness == Strictness::Lenient
            && matches!(
                e,
                Error::MissingOpposite(_)
                    | Error::InvalidHalfedge(_)
                    | Error::UnclassifiablePoint(_)
                    | Error::SafetyCap {
                        traversal: Traversal::FloodFill,
                        ..
                    }
            )
    }

    /// Create a triangle `(head, tail, p)` for each halfedge in `border`,
    /// make it the opposite of that halfedge, and pair up the remaining
    /// halfedges of the new triangles.
    fn patch(&mut self, border: &[HH], p: DVec3) -> Result<(), Error> {
        let mut fan = Vec::with_capacity(border.len() * 2);
        for &h in border {
            let (tail, head) = self.mesh.halfedge_points(h);
            let f = self.mesh.add_triangle(head, tail, p);
            let [h0, h1, h2] = self.mesh.face_halfedges(f);
            self.mesh.link_opposites(h0, h);
            fan.extend_from_slice(&[h1, h2]);
        }
        let unmatched =
            self.mesh
                .stitch_opposites(&fan, self.params.epsilon, self.params.stitch_limit)?;
        if unmatched.is_empty() {
            Ok(())
        } else {
            Err(Error::UnmatchedHalfedges(unmatched.len()))
        }
    }

    /// Build the closed tetrahedron the hull grows from. Two back to back
    /// copies of the seed triangle are created, the one facing the apex is
    /// removed and the apex is connected to the edges of the other.
    fn bootstrap(&mut self, points: &[DVec3], seed: &seed::Seed) -> Result<(), Error> {
        let [a, b, c] = seed.triangle.map(|i| points[i]);
        let apex = points[seed.apex];
        let front = self.mesh.add_triangle(a, b, c);
        let back = self.mesh.add_triangle(a, c, b);
        let mut pair = self.mesh.face_halfedges(front).to_vec();
        pair.extend(self.mesh.face_halfedges(back));
        let unmatched =
            self.mesh
                .stitch_opposites(&pair, self.params.epsilon, self.params.stitch_limit)?;
        if !unmatched.is_empty() {
            return Err(Error::UnmatchedHalfedges(unmatched.len()));
        }
        let (facing, retained) = if self.mesh.face_plane(front).signed_distance(apex) > 0.0 {
            (front, back)
        } else {
            (back, front)
        };
        self.mesh.delete_face(facing, true)?;
        self.patch(&self.mesh.face_halfedges(retained), apex)
    }

    /// Flood fill across opposite links from a face visible from `p`,
    /// tagging the visible faces. The border holds the halfedges of the
    /// hidden faces that neighbor the visible region.
    fn flood_fill(
        &mut self,
        start: FH,
        p: DVec3,
        faces: &mut Vec<FH>,
        border: &mut Vec<HH>,
    ) -> Result<(), Error> {
        let eps = self.params.epsilon;
        let limit = self.params.flood_fill_limit;
        let mut stack = vec![start];
        self.mesh.topol.fstatus[start.index() as usize].set_tagged(true);
        faces.push(start);
        let mut iterations = 0usize;
        while let Some(f) = stack.pop() {
            iterations += 1;
            if iterations > limit {
                return Err(Error::SafetyCap {
                    traversal: Traversal::FloodFill,
                    limit,
                });
            }
            for h in self.mesh.face_halfedges(f) {
                let oh = self
                    .mesh
                    .opposite_halfedge(h)
                    .ok_or(Error::MissingOpposite(h))?;
                if !self.mesh.topol.is_valid_halfedge(oh) {
                    return Err(Error::InvalidHalfedge(oh));
                }
                let nf = self.mesh.halfedge_face(oh);
                let nfi = nf.index() as usize;
                if self.mesh.topol.fstatus[nfi].tagged() {
                    continue;
                }
                if self.mesh.face_plane(nf).is_outside(p, eps) {
                    self.mesh.topol.fstatus[nfi].set_tagged(true);
                    faces.push(nf);
                    stack.push(nf);
                } else {
                    border.push(oh);
                }
            }
        }
        Ok(())
    }

    fn visibility(&mut self, p: DVec3, index: usize) -> Result<Visibility, Error> {
        let eps = self.params.epsilon;
        let Some(start) = self
            .mesh
            .faces()
            .find(|&f| self.mesh.face_plane(f).is_outside(p, eps))
        else {
            return Ok(Visibility::Interior);
        };
        let (mut faces, mut border) = (Vec::new(), Vec::new());
        let result = self.flood_fill(start, p, &mut faces, &mut border);
        for f in &faces {
            self.mesh.topol.fstatus[f.index() as usize].set_tagged(false);
        }
        result?;
        if border.is_empty() {
            return Err(Error::UnclassifiablePoint(index));
        }
        Ok(Visibility::Visible { faces, border })
    }

    /// Add the point to the hull. Returns false if the point is inside.
    fn incorporate(&mut self, p: DVec3, index: usize) -> Result<bool, Error> {
        match self.visibility(p, index)? {
            Visibility::Interior => Ok(false),
            Visibility::Visible { faces, border } => {
                debug!(
                    point = index,
                    visible = faces.len(),
                    horizon = border.len(),
                    "Adding point to hull"
                );
                for f in faces {
                    self.mesh.delete_face(f, false)?;
                }
                self.patch(&border, p)?;
                Ok(true)
            }
        }
    }

    #[cfg(feature = "decimate")]
    fn cleanup(&mut self, max_error: f64) -> Result<DecimateReport, Error> {
        let params = DecimateParams::default()
            .with_max_error(max_error)
            .with_strictness(self.params.strictness);
        let report = self.mesh.decimate(&params)?;
        if report.termination == Termination::SafetyCap
            && self.params.strictness == Strictness::Strict
        {
            return Err(Error::SafetyCap {
                traversal: Traversal::Decimate,
                limit: params.max_iterations,
            });
        }
        Ok(report)
    }
}

impl Mesh {
    /// Build the convex hull of the given points.
    ///
    /// The faces of the hull are wound so that their normals point outwards,
    /// and the returned mesh holds no deleted elements.
    /// Fewer than 4 points, or points that are all coincident, collinear or
    /// coplanar, are rejected as degenerate input.
    pub fn convex_hull(points: &[DVec3], params: &HullParams) -> Result<(Mesh, HullReport), Error> {
        info!(points = points.len(), "Building convex hull");
        let seed = seed::find_seed(points, params.epsilon)?;
        let mut builder = HullBuilder {
            mesh: Mesh::with_capacity(points.len() * 2),
            params,
        };
        builder.bootstrap(points, &seed)?;
        let (mut interior, mut dropped) = (Vec::new(), Vec::new());
        for (i, &p) in points.iter().enumerate() {
            if seed.triangle.contains(&i) || seed.apex == i {
                continue;
            }
            match builder.incorporate(p, i) {
                Ok(true) => {}
                Ok(false) => interior.push(i),
                Err(e) if builder.recoverable(&e) => {
                    warn!(point = i, "Dropping point: {e}");
                    dropped.push(i);
                }
                Err(e) => return Err(e),
            }
        }
        #[cfg(feature = "decimate")]
        let cleanup = match params.cleanup {
            Some(max_error) => Some(builder.cleanup(max_error)?),
            None => None,
        };
        if cfg!(not(feature = "decimate")) && params.cleanup.is_some() {
            warn!("Hull cleanup requires the decimate feature, skipping it");
        }
        builder.mesh.garbage_collection()?;
        info!(
            faces = builder.mesh.num_faces(),
            interior = interior.len(),
            dropped = dropped.len(),
            "Convex hull complete"
        );
        let report = HullReport {
            status: if dropped.is_empty() {
                HullStatus::Complete
            } else {
                HullStatus::Partial
            },
            interior,
            dropped,
            #[cfg(feature = "decimate")]
            cleanup,
        };
        Ok((builder.mesh, report))
    }
}
