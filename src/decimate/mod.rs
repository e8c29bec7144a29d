/*!
Greedy simplification of closed triangle meshes, by contracting the edges with
the lowest quadric error first.
*/

mod quadric;
mod queue;

use std::collections::HashSet;

use glam::DVec3;
use tracing::{debug, info, warn};

use crate::{
    element::{FH, HH, Handle},
    error::{Error, Strictness},
    mesh::Mesh,
};
use quadric::Quadric;
use queue::Queue;

/// The reason the simplifier stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// The maximum number of contractions was performed.
    Budget,
    /// The cheapest remaining contraction exceeds the error ceiling.
    ErrorCeiling,
    /// The mesh is down to 4 faces.
    Floor,
    /// No candidate contractions are left.
    QueueExhausted,
    /// The main loop reached its iteration limit.
    SafetyCap,
}

/// Parameters of the simplifier.
#[derive(Debug, Clone, Copy)]
pub struct DecimateParams {
    /// Maximum number of edges to contract.
    pub max_contractions: usize,
    /// Stop once the cheapest contraction has a larger error than this.
    pub max_error: f64,
    /// Scale the quadric of each face by its area.
    pub normalize_by_area: bool,
    pub strictness: Strictness,
    /// Limit on the iterations of the main loop, including the ones that
    /// skip or reject an edge.
    pub max_iterations: usize,
    /// Limit on the number of halfedges visited when rotating around a
    /// vertex.
    pub ring_limit: usize,
}

impl Default for DecimateParams {
    fn default() -> Self {
        Self {
            max_contractions: usize::MAX,
            max_error: f64::INFINITY,
            normalize_by_area: false,
            strictness: Strictness::default(),
            max_iterations: 1 << 24,
            ring_limit: 256,
        }
    }
}

impl DecimateParams {
    #[must_use]
    pub const fn with_max_contractions(mut self, count: usize) -> Self {
        self.max_contractions = count;
        self
    }

    #[must_use]
    pub const fn with_max_error(mut self, max_error: f64) -> Self {
        self.max_error = max_error;
        self
    }

    #[must_use]
    pub const fn with_normalize_by_area(mut self, flag: bool) -> Self {
        self.normalize_by_area = flag;
        self
    }

    #[must_use]
    pub const fn with_strictness(mut self, strictness: Strictness) -> Self {
        self.strictness = strictness;
        self
    }

    #[must_use]
    pub const fn with_max_iterations(mut self, limit: usize) -> Self {
        self.max_iterations = limit;
        self
    }

    #[must_use]
    pub const fn with_ring_limit(mut self, limit: usize) -> Self {
        self.ring_limit = limit;
        self
    }
}

/// Summary of a simplification run.
#[derive(Debug, Clone, PartialEq)]
pub struct DecimateReport {
    pub contractions: usize,
    /// Queue entries skipped because their halfedge was deleted.
    pub skipped_stale: usize,
    /// Contractions rejected because they would break the topology.
    pub rejected: usize,
    pub termination: Termination,
    /// The largest error among the accepted contractions.
    pub max_error: f64,
    pub faces_before: usize,
    pub faces_after: usize,
}

type Location = [u64; 3];

fn location(p: DVec3) -> Location {
    p.to_array().map(f64::to_bits)
}

struct Decimater<'a> {
    mesh: &'a mut Mesh,
    params: &'a DecimateParams,
    face_quadrics: Vec<Quadric>,
    quadrics: Vec<Quadric>,
    targets: Vec<DVec3>,
    queue: Queue<HH, f64>,
}

impl<'a> Decimater<'a> {
    fn new(mesh: &'a mut Mesh, params: &'a DecimateParams) -> Self {
        let nh = mesh.topol.halfedge_capacity();
        Decimater {
            face_quadrics: vec![Quadric::default(); mesh.topol.face_capacity()],
            quadrics: vec![Quadric::default(); mesh.topol.vertex_capacity()],
            targets: vec![DVec3::ZERO; nh],
            queue: Queue::new(nh),
            mesh,
            params,
        }
    }

    fn recoverable(&self, e: &Error) -> bool {
        self.params.strictness == Strictness::Lenient
            && matches!(
                e,
                Error::OpenVertexRing(_) | Error::MissingOpposite(_) | Error::InvalidHalfedge(_)
            )
    }

    fn face_quadric(&self, f: FH) -> Quadric {
        let plane = self.mesh.face_plane(f);
        if plane.is_degenerate() {
            warn!(face = %f, "Degenerate face contributes a zero quadric");
            return Quadric::default();
        }
        let weight = if self.params.normalize_by_area {
            self.mesh.face_area(f)
        } else {
            1.0
        };
        Quadric::from_plane(plane.coefficients(), weight)
    }

    /// Collect the halfedges pointing to the location of the head of `h`. An
    /// open ring is tolerated in lenient mode, by falling back to `h` alone.
    fn location_ring(&self, h: HH, ring: &mut Vec<HH>) -> Result<(), Error> {
        match self
            .mesh
            .topol
            .incoming_halfedges(h, self.params.ring_limit, ring)
        {
            Ok(()) => Ok(()),
            Err(e) if self.recoverable(&e) => {
                warn!(halfedge = %h, "{e}, using the quadric of a single face");
                ring.clear();
                ring.push(h);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Sum the quadrics of the faces in the ring and assign it to every
    /// corner the ring points to.
    fn assign_quadric(&mut self, ring: &[HH]) {
        let q = ring.iter().fold(Quadric::default(), |q, &h| {
            q + self.face_quadrics[self.mesh.halfedge_face(h).index() as usize]
        });
        for &h in ring {
            self.quadrics[self.mesh.head_vertex(h).index() as usize] = q;
        }
    }

    fn init_quadrics(&mut self) -> Result<(), Error> {
        for f in self.mesh.faces().collect::<Vec<_>>() {
            self.face_quadrics[f.index() as usize] = self.face_quadric(f);
        }
        let mut ring = Vec::new();
        for v in self.mesh.vertices().collect::<Vec<_>>() {
            // Every corner at a location gets the same quadric.
            if self.mesh.topol.vstatus[v.index() as usize].tagged() {
                continue;
            }
            self.location_ring(self.mesh.vertex_halfedge(v), &mut ring)?;
            self.assign_quadric(&ring);
            for &h in &ring {
                let vi = self.mesh.head_vertex(h).index() as usize;
                self.mesh.topol.vstatus[vi].set_tagged(true);
            }
        }
        for s in self.mesh.topol.vstatus.iter_mut() {
            s.set_tagged(false);
        }
        Ok(())
    }

    /// Find the cheapest of the tail, the head and the midpoint of `h` as the
    /// position of the merged vertex, and queue `h` with that cost.
    fn score(&mut self, h: HH) {
        if !self.mesh.topol.is_valid_halfedge(h) {
            self.queue.remove(h);
            return;
        }
        let q = self.quadrics[self.mesh.tail_vertex(h).index() as usize]
            + self.quadrics[self.mesh.head_vertex(h).index() as usize];
        let (pa, pb) = self.mesh.halfedge_points(h);
        let (pos, cost) = [pa, pb, (pa + pb) * 0.5]
            .into_iter()
            .map(|p| (p, q.evaluate(p).max(0.0)))
            .fold((pa, f64::INFINITY), |best, candidate| {
                if candidate.1 < best.1 { candidate } else { best }
            });
        self.targets[h.index() as usize] = pos;
        self.queue.insert(h, cost);
    }

    /// Check whether contracting `h` keeps the mesh a closed manifold. The
    /// rings of halfedges pointing to the tail and the head of `h` are
    /// written to `ring_a` and `ring_b`.
    fn is_legal(
        &self,
        h: HH,
        ring_a: &mut Vec<HH>,
        ring_b: &mut Vec<HH>,
    ) -> Result<bool, Error> {
        match self.check_link(h, ring_a, ring_b) {
            Ok(legal) => Ok(legal),
            Err(e) if self.recoverable(&e) => {
                debug!(halfedge = %h, "Rejecting contraction: {e}");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// The link condition: the locations adjacent to both endpoints must be
    /// the apexes of the two triangles sharing the edge.
    fn check_link(
        &self,
        h: HH,
        ring_a: &mut Vec<HH>,
        ring_b: &mut Vec<HH>,
    ) -> Result<bool, Error> {
        let mesh = &*self.mesh;
        let o = mesh.opposite_halfedge(h).ok_or(Error::MissingOpposite(h))?;
        if !mesh.topol.is_valid_halfedge(o) {
            return Err(Error::InvalidHalfedge(o));
        }
        mesh.topol
            .incoming_halfedges(o, self.params.ring_limit, ring_a)?;
        mesh.topol
            .incoming_halfedges(h, self.params.ring_limit, ring_b)?;
        let head_loc = |h: HH| location(mesh.point(mesh.head_vertex(h)));
        let tail_loc = |h: HH| location(mesh.point(mesh.tail_vertex(h)));
        let (la, lb) = (tail_loc(h), head_loc(h));
        let apexes = [
            head_loc(mesh.next_halfedge(h)),
            head_loc(mesh.next_halfedge(o)),
        ];
        let around_a: HashSet<Location> = ring_a.iter().map(|&r| tail_loc(r)).collect();
        Ok(ring_b
            .iter()
            .map(|&r| tail_loc(r))
            .filter(|l| *l != la && *l != lb && around_a.contains(l))
            .all(|l| apexes.contains(&l)))
    }

    /// Contract `h` into a single location. `ring_a` and `ring_b` must hold
    /// the rings of the tail and head of `h`, as written by
    /// [`Decimater::is_legal`]. `ring` is used as scratch space.
    fn contract(
        &mut self,
        h: HH,
        ring_a: &[HH],
        ring_b: &[HH],
        ring: &mut Vec<HH>,
    ) -> Result<(), Error> {
        let mesh = &mut *self.mesh;
        let o = mesh.opposite_halfedge(h).ok_or(Error::MissingOpposite(h))?;
        let outer =
            |mesh: &Mesh, h: HH| mesh.opposite_halfedge(h).ok_or(Error::MissingOpposite(h));
        let (hn, hp) = (mesh.next_halfedge(h), mesh.prev_halfedge(h));
        let (on, op) = (mesh.next_halfedge(o), mesh.prev_halfedge(o));
        let (xh, yh) = (outer(mesh, hn)?, outer(mesh, hp)?);
        let (xo, yo) = (outer(mesh, on)?, outer(mesh, op)?);
        let target = self.targets[h.index() as usize];
        for &r in ring_a.iter().chain(ring_b) {
            let v = mesh.head_vertex(r);
            mesh.set_point(v, target);
        }
        // The triangles on either side of the edge collapse into edges, so
        // their outer neighbors become each other's opposites.
        mesh.link_opposites(xh, yh);
        mesh.link_opposites(xo, yo);
        mesh.delete_face(mesh.halfedge_face(h), false)?;
        mesh.delete_face(mesh.halfedge_face(o), false)?;
        // xh points to the merged location.
        self.location_ring(xh, ring)?;
        for &r in ring.iter() {
            let f = self.mesh.halfedge_face(r);
            self.face_quadrics[f.index() as usize] = self.face_quadric(f);
        }
        self.assign_quadric(ring);
        for &r in ring.iter() {
            let n = self.mesh.next_halfedge(r);
            let touching = [
                Some(r),
                self.mesh.opposite_halfedge(r),
                Some(n),
                self.mesh.opposite_halfedge(n),
            ];
            for e in touching.into_iter().flatten() {
                self.score(e);
            }
        }
        Ok(())
    }

    fn run(mut self) -> Result<DecimateReport, Error> {
        let faces_before = self.mesh.num_faces();
        info!(faces = faces_before, "Starting mesh decimation");
        self.init_quadrics()?;
        for h in self.mesh.halfedges().collect::<Vec<_>>() {
            self.score(h);
        }
        let (mut ring_a, mut ring_b, mut ring) = (Vec::new(), Vec::new(), Vec::new());
        let (mut contractions, mut skipped_stale, mut rejected) = (0usize, 0usize, 0usize);
        let mut max_error = 0.0f64;
        let mut iterations = 0usize;
        let termination = loop {
            if self.mesh.num_faces() <= 4 {
                break Termination::Floor;
            }
            if contractions >= self.params.max_contractions {
                break Termination::Budget;
            }
            if iterations >= self.params.max_iterations {
                warn!(
                    limit = self.params.max_iterations,
                    "Decimation stopped at its iteration limit"
                );
                break Termination::SafetyCap;
            }
            iterations += 1;
            let Some((h, cost)) = self.queue.pop() else {
                warn!("Decimation queue is empty");
                break Termination::QueueExhausted;
            };
            if !self.mesh.topol.is_valid_halfedge(h) {
                skipped_stale += 1;
                continue;
            }
            if cost > self.params.max_error {
                break Termination::ErrorCeiling;
            }
            if !self.is_legal(h, &mut ring_a, &mut ring_b)? {
                rejected += 1;
                continue;
            }
            self.contract(h, &ring_a, &ring_b, &mut ring)?;
            contractions += 1;
            max_error = max_error.max(cost);
            debug!(halfedge = %h, cost, "Contracted edge");
        };
        let faces_after = self.mesh.num_faces();
        info!(
            faces = faces_after,
            contractions,
            rejected,
            ?termination,
            "Decimation complete"
        );
        Ok(DecimateReport {
            contractions,
            skipped_stale,
            rejected,
            termination,
            max_error,
            faces_before,
            faces_after,
        })
    }
}

impl Mesh {
    /// Simplify this mesh by greedily contracting the edges with the lowest
    /// quadric error, until one of the limits in `params` is reached or the
    /// mesh is down to 4 faces. Each contraction removes 2 faces.
    ///
    /// The mesh is expected to be closed. In lenient mode, edges around holes
    /// are never contracted. In strict mode, a hole is an error.
    ///
    /// The mesh is garbage collected before and after simplification, so
    /// handles obtained before this call are invalidated.
    pub fn decimate(&mut self, params: &DecimateParams) -> Result<DecimateReport, Error> {
        self.garbage_collection()?;
        let report = Decimater::new(self, params).run()?;
        self.garbage_collection()?;
        Ok(report)
    }
}

#[cfg(test)]
mod test {
    use super::{DecimateParams, Decimater, Termination};
    use crate::{
        error::{Error, Strictness},
        mesh::Mesh,
    };
    use glam::dvec3;

    fn decimate(mut mesh: Mesh, params: DecimateParams) -> (Mesh, super::DecimateReport) {
        let report = mesh.decimate(&params).expect("Cannot decimate mesh");
        mesh.check_topology().expect("Topology is broken");
        assert!(mesh.is_closed());
        assert_eq!(report.faces_after, mesh.num_faces());
        assert_eq!(mesh.topol.face_capacity(), mesh.num_faces());
        assert_eq!(mesh.topol.halfedge_capacity(), mesh.num_halfedges());
        assert_eq!(mesh.topol.vertex_capacity(), mesh.num_vertices());
        assert_eq!(
            report.faces_before - report.faces_after,
            2 * report.contractions
        );
        (mesh, report)
    }

    #[test]
    fn t_tetrahedron_is_at_floor() {
        let mesh = Mesh::tetrahedron(1.0).expect("Cannot create tetrahedron");
        let (mesh, report) = decimate(mesh, DecimateParams::default());
        assert_eq!(report.termination, Termination::Floor);
        assert_eq!(report.contractions, 0);
        assert_eq!(mesh.num_faces(), 4);
        assert_eq!(mesh.distinct_points().len(), 4);
    }

    #[test]
    fn t_octahedron_single_contraction() {
        let mesh = Mesh::octahedron(1.0).expect("Cannot create octahedron");
        let (mesh, report) = decimate(mesh, DecimateParams::default().with_max_contractions(1));
        assert_eq!(report.termination, Termination::Budget);
        assert_eq!(report.contractions, 1);
        assert_eq!(mesh.num_faces(), 6);
        assert_eq!(mesh.distinct_points().len(), 5);
    }

    #[test]
    fn t_contractions_remove_two_faces() {
        for budget in 1..=3 {
            let mesh = Mesh::icosahedron(1.0).expect("Cannot create icosahedron");
            let (mesh, report) = decimate(
                mesh,
                DecimateParams::default().with_max_contractions(budget),
            );
            assert_eq!(report.contractions, budget);
            assert_eq!(mesh.num_faces(), 20 - 2 * budget);
            assert_eq!(mesh.distinct_points().len(), 12 - budget);
        }
    }

    #[test]
    fn t_error_ceiling() {
        let mesh = Mesh::icosahedron(1.0).expect("Cannot create icosahedron");
        let (mesh, report) = decimate(mesh, DecimateParams::default().with_max_error(0.0));
        assert_eq!(report.termination, Termination::ErrorCeiling);
        assert_eq!(report.contractions, 0);
        assert_eq!(mesh.num_faces(), 20);
        let ceiling = 0.05;
        let mesh = Mesh::icosahedron(1.0).expect("Cannot create icosahedron");
        let (_, report) = decimate(mesh, DecimateParams::default().with_max_error(ceiling));
        assert!(report.max_error <= ceiling);
    }

    #[test]
    fn t_area_weighted_quadrics() {
        let mesh = Mesh::icosahedron(2.0).expect("Cannot create icosahedron");
        let (_, report) = decimate(
            mesh,
            DecimateParams::default()
                .with_normalize_by_area(true)
                .with_max_contractions(4),
        );
        assert_eq!(report.contractions, 4);
        assert!(report.max_error > 0.0);
    }

    #[test]
    fn t_decimate_until_stuck() {
        let mesh = Mesh::icosahedron(1.0).expect("Cannot create icosahedron");
        let (mesh, report) = decimate(mesh, DecimateParams::default());
        assert!(matches!(
            report.termination,
            Termination::Floor | Termination::QueueExhausted
        ));
        assert!(mesh.num_faces() >= 4);
        assert!(report.contractions > 0);
    }

    #[test]
    fn t_iteration_limit() {
        let mesh = Mesh::icosahedron(1.0).expect("Cannot create icosahedron");
        let (mesh, report) = decimate(mesh, DecimateParams::default().with_max_iterations(1));
        assert_eq!(report.termination, Termination::SafetyCap);
        assert!(report.contractions <= 1);
        assert!(mesh.num_faces() >= 18);
    }

    #[test]
    fn t_degenerate_face_has_zero_quadric() {
        let mut mesh = Mesh::new();
        let f = mesh.add_triangle(
            dvec3(0.0, 0.0, 0.0),
            dvec3(1.0, 0.0, 0.0),
            dvec3(2.0, 0.0, 0.0),
        );
        let params = DecimateParams::default();
        let decimater = Decimater::new(&mut mesh, &params);
        assert!(decimater.face_quadric(f).is_zero());
    }

    /// Octahedron with one face missing.
    fn open_octahedron() -> Mesh {
        let r = 1.0;
        Mesh::from_triangles(
            &[
                dvec3(r, 0.0, 0.0),
                dvec3(0.0, r, 0.0),
                dvec3(-r, 0.0, 0.0),
                dvec3(0.0, -r, 0.0),
                dvec3(0.0, 0.0, r),
                dvec3(0.0, 0.0, -r),
            ],
            &[
                [1, 4, 0],
                [2, 4, 1],
                [3, 4, 2],
                [3, 5, 0],
                [0, 5, 1],
                [1, 5, 2],
                [2, 5, 3],
            ],
        )
        .expect("Cannot create mesh")
    }

    #[test]
    fn t_open_mesh_strict() {
        let mut mesh = open_octahedron();
        assert!(matches!(
            mesh.decimate(&DecimateParams::default().with_strictness(Strictness::Strict)),
            Err(Error::OpenVertexRing(_))
        ));
    }

    #[test]
    fn t_open_mesh_lenient() {
        let mut mesh = open_octahedron();
        let report = mesh
            .decimate(&DecimateParams::default().with_max_contractions(1))
            .expect("Cannot decimate mesh");
        mesh.check_topology().expect("Topology is broken");
        assert_eq!(report.contractions, 1);
        assert_eq!(mesh.num_faces(), 5);
        // Edges around the hole are never contracted.
        let hole = [
            dvec3(1.0, 0.0, 0.0),
            dvec3(0.0, 0.0, 1.0),
            dvec3(0.0, -1.0, 0.0),
        ];
        let boundary: Vec<_> = mesh
            .halfedges()
            .filter(|h| mesh.opposite_halfedge(*h).is_none())
            .collect();
        assert_eq!(boundary.len(), 3);
        for h in boundary {
            let (a, b) = mesh.halfedge_points(h);
            assert!(hole.contains(&a) && hole.contains(&b));
        }
    }
}
