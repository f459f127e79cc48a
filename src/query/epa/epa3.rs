//! Penetration-depth computation using the Expanding Polytope Algorithm.
//!
//! EPA grows a convex polytope inside the Minkowski difference of two
//! overlapping shapes until one of its faces supports the difference's
//! boundary. That face yields the minimum-translation vector resolving the
//! overlap: its closest-point direction is the contact normal, the distance
//! to the origin is the penetration depth, and the barycentric combination
//! of the face's witness points gives the contact points on each shape.

use crate::math::{Isometry, Point, Real, UnitVector, Vector, DEFAULT_EPSILON};
use crate::query::epa::triangle::{link, EdgeEpa};
use crate::query::epa::triangle_store::{TriangleId, TriangleStore};
use crate::query::epa::CsoPoint;
use crate::query::EpaError;
use crate::shape::SupportMap;
use crate::utils;
use na::Unit;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Tuning knobs of an expanding-polytope run.
#[derive(Copy, Clone, Debug)]
pub struct EpaConfig {
    /// Maximum number of expansion iterations before the run is abandoned.
    pub max_iterations: usize,
    /// Absolute tolerance on the gap between the tightest support bound
    /// seen so far and the distance of the face selected for expansion.
    /// The expansion converges once the gap closes below this value.
    pub tolerance: Real,
    /// Capacity of the polytope triangle store. Must be large enough to
    /// hold the faces allocated by `max_iterations` expansions.
    pub max_triangles: usize,
    /// Maximum number of edge crossings of one silhouette traversal.
    pub silhouette_budget: usize,
}

impl Default for EpaConfig {
    fn default() -> Self {
        EpaConfig {
            max_iterations: 100,
            tolerance: DEFAULT_EPSILON.sqrt(),
            max_triangles: 2048,
            silhouette_budget: 6144,
        }
    }
}

/// The separating-contact description produced by a penetration-depth run.
#[derive(Copy, Clone, Debug)]
pub struct ContactResult {
    /// The unit contact normal in the first shape's local frame, pointing
    /// from the first shape toward the second.
    pub normal: UnitVector,
    /// The penetration depth along `normal`. Zero only for exact surface
    /// contact.
    pub depth: Real,
    /// The contact point on the first shape, in its local frame.
    pub local_point1: Point,
    /// The contact point on the second shape, in its local frame.
    pub local_point2: Point,
}

/// A heap entry keyed on the negated squared distance of a face, so that
/// popping the binary max-heap yields the face closest to the origin.
/// Obsolete faces are discarded lazily on pop.
#[derive(Copy, Clone, PartialEq)]
struct FaceId {
    id: TriangleId,
    neg_dist_sq: Real,
}

impl Eq for FaceId {}

impl PartialOrd for FaceId {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FaceId {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        if self.neg_dist_sq < other.neg_dist_sq {
            Ordering::Less
        } else if self.neg_dist_sq > other.neg_dist_sq {
            Ordering::Greater
        } else {
            Ordering::Equal
        }
    }
}

/// A one-shot run of the Expanding Polytope Algorithm.
///
/// The engine moves through four phases: initialization of the seed
/// tetrahedron, the expansion loop, and the terminal converged or failed
/// outcomes surfaced as the `Result` of [`Epa::run`]. `run` consumes the
/// engine: one instance serves exactly one colliding shape pair for one
/// simulation step.
pub struct Epa {
    config: EpaConfig,
    vertices: Vec<CsoPoint>,
    store: TriangleStore,
    heap: BinaryHeap<FaceId>,
}

impl Epa {
    /// Creates an engine with the given configuration.
    pub fn new(config: EpaConfig) -> Self {
        Epa {
            vertices: Vec::new(),
            store: TriangleStore::with_capacity(config.max_triangles),
            heap: BinaryHeap::new(),
            config,
        }
    }

    /// Pushes a face on the candidate heap if it is eligible for expansion.
    fn push_candidate(&mut self, id: TriangleId) {
        let tri = &self.store[id];
        if tri.is_valid() {
            self.heap.push(FaceId {
                id,
                neg_dist_sq: -tri.dist_sq(),
            });
        }
    }

    /// Builds the four seed faces from a tetrahedron enclosing the origin.
    fn initialize(&mut self, simplex: [CsoPoint; 4]) -> Result<(), EpaError> {
        self.vertices.extend_from_slice(&simplex);

        // Reorder so that every face winds counter-clockwise seen from
        // outside the tetrahedron.
        let dp1 = self.vertices[1] - self.vertices[0];
        let dp2 = self.vertices[2] - self.vertices[0];
        let dp3 = self.vertices[3] - self.vertices[0];
        if dp1.cross(&dp2).dot(&dp3) > 0.0 {
            self.vertices.swap(1, 2);
        }

        let t0 = self
            .store
            .create(&self.vertices, 0, 1, 2)
            .ok_or(EpaError::StorageExhausted)?;
        let t1 = self
            .store
            .create(&self.vertices, 1, 3, 2)
            .ok_or(EpaError::StorageExhausted)?;
        let t2 = self
            .store
            .create(&self.vertices, 0, 2, 3)
            .ok_or(EpaError::StorageExhausted)?;
        let t3 = self
            .store
            .create(&self.vertices, 0, 3, 1)
            .ok_or(EpaError::StorageExhausted)?;

        let seams = [
            (EdgeEpa::new(t0, 0), EdgeEpa::new(t3, 2)),
            (EdgeEpa::new(t0, 1), EdgeEpa::new(t1, 2)),
            (EdgeEpa::new(t0, 2), EdgeEpa::new(t2, 0)),
            (EdgeEpa::new(t1, 0), EdgeEpa::new(t3, 1)),
            (EdgeEpa::new(t1, 1), EdgeEpa::new(t2, 1)),
            (EdgeEpa::new(t2, 2), EdgeEpa::new(t3, 0)),
        ];
        for (a, b) in seams {
            if !link(&mut self.store, a, b) {
                return Err(EpaError::DegenerateSimplex);
            }
        }

        for id in [t0, t1, t2, t3] {
            if !self.store[id].is_valid() {
                return Err(EpaError::DegenerateSimplex);
            }
            self.push_candidate(id);
        }

        Ok(())
    }

    /// Runs the expansion to convergence, failure or budget exhaustion.
    ///
    /// `simplex` must describe a non-degenerate tetrahedron enclosing the
    /// origin of the Minkowski difference, as produced by an upstream
    /// simplex (GJK-like) algorithm. `pos12` is the pose of the second
    /// shape in the first shape's local frame.
    pub fn run<G1, G2>(
        mut self,
        pos12: &Isometry,
        g1: &G1,
        g2: &G2,
        simplex: [CsoPoint; 4],
    ) -> Result<ContactResult, EpaError>
    where
        G1: ?Sized + SupportMap,
        G2: ?Sized + SupportMap,
    {
        self.initialize(simplex)?;

        let seed_face = match self.heap.peek() {
            Some(face_id) => face_id.id,
            None => return Err(EpaError::DegenerateSimplex),
        };

        self.expand(pos12, g1, g2, seed_face)
    }

    /// The expansion loop, starting from an initialized polytope.
    ///
    /// `best_face` seeds the running best candidate; the loop tightens it
    /// whenever a popped face improves the support upper bound.
    fn expand<G1, G2>(
        &mut self,
        pos12: &Isometry,
        g1: &G1,
        g2: &G2,
        mut best_face: TriangleId,
    ) -> Result<ContactResult, EpaError>
    where
        G1: ?Sized + SupportMap,
        G2: ?Sized + SupportMap,
    {
        let mut best_bound = Real::MAX;
        let mut niter = 0;

        while let Some(face_id) = self.heap.pop() {
            if self.store[face_id.id].is_obsolete() {
                continue;
            }

            let closest = self.store[face_id.id].closest_point();

            let (dir, dist) = match Unit::try_new_and_get(closest.coords, DEFAULT_EPSILON) {
                Some(res) => res,
                // The face's supporting plane passes through the origin:
                // the shapes are in exact surface contact.
                None => return Ok(self.result_from_face(pos12, face_id.id)),
            };

            let support = CsoPoint::from_shapes_toward(pos12, g1, g2, &dir);
            let bound = support.point.coords.dot(&dir);

            if bound < best_bound {
                best_bound = bound;
                best_face = face_id.id;
            }

            // The closest face reached the tightest support bound seen so
            // far: the polytope cannot grow past the tolerance anymore.
            if best_bound - dist < self.config.tolerance {
                return Ok(self.result_from_face(pos12, best_face));
            }

            let new_vertex = self.vertices.len() as u32;
            self.vertices.push(support);

            let mut budget = self.config.silhouette_budget;
            let new_faces =
                self.store
                    .compute_silhouette(&self.vertices, new_vertex, face_id.id, &mut budget)?;
            for id in new_faces {
                self.push_candidate(id as TriangleId);
            }

            niter += 1;
            if niter >= self.config.max_iterations {
                return Err(EpaError::MaxIterationsExceeded {
                    best: Some(self.result_from_face(pos12, best_face)),
                });
            }
        }

        // The candidate set drained without meeting the tolerance: no live
        // face can be expanded any further, so the best face seen supports
        // the boundary as closely as this polytope can express.
        log::debug!("EPA candidate set drained; using the best face found.");
        Ok(self.result_from_face(pos12, best_face))
    }

    /// Extracts the contact description supported by the given face.
    fn result_from_face(&self, pos12: &Isometry, face: TriangleId) -> ContactResult {
        let tri = &self.store[face];

        let (normal, depth) = match Unit::try_new_and_get(
            tri.closest_point().coords,
            DEFAULT_EPSILON,
        ) {
            Some((dir, dist)) => (dir, dist),
            // Exact surface contact: the supporting plane contains the
            // origin, so fall back to the face's geometric normal.
            None => {
                let n = utils::ccw_face_normal([
                    &self.vertices[tri.vertex_id(0) as usize].point,
                    &self.vertices[tri.vertex_id(1) as usize].point,
                    &self.vertices[tri.vertex_id(2) as usize].point,
                ])
                .unwrap_or(Vector::y_axis());
                (n, 0.0)
            }
        };

        let (p1, p2) = tri.closest_witness_points(&self.vertices);

        ContactResult {
            normal,
            depth,
            local_point1: p1,
            local_point2: pos12.inverse_transform_point(&p2),
        }
    }
}

/// Computes the penetration depth and contact points of two overlapping
/// support-mapped shapes, with the default configuration.
///
/// `simplex` must be a tetrahedron enclosing the origin of the Minkowski
/// difference of the two shapes (supplied by the upstream simplex
/// algorithm) and `pos12` the pose of the second shape in the first shape's
/// local frame.
///
/// # Example
///
/// ```
/// use depth3d::math::{Isometry, Vector};
/// use depth3d::na::Unit;
/// use depth3d::query::epa::{run_epa, CsoPoint};
/// use depth3d::shape::Ball;
///
/// let b1 = Ball::new(1.0);
/// let b2 = Ball::new(1.0);
/// let pos12 = Isometry::translation(1.5, 0.0, 0.0);
///
/// // Four support directions whose Minkowski-difference support points
/// // enclose the origin (normally obtained from GJK).
/// let dirs = [
///     Vector::new(1.0, 0.0, 0.0),
///     Vector::new(-0.5, 0.866, 0.0),
///     Vector::new(-0.5, -0.433, 0.75),
///     Vector::new(-0.5, -0.433, -0.75),
/// ];
/// let simplex =
///     dirs.map(|d| CsoPoint::from_shapes_toward(&pos12, &b1, &b2, &Unit::new_normalize(d)));
///
/// let contact = run_epa(&pos12, &b1, &b2, simplex).unwrap();
/// assert!((contact.depth - 0.5).abs() < 1.0e-3);
/// ```
pub fn run_epa<G1, G2>(
    pos12: &Isometry,
    g1: &G1,
    g2: &G2,
    simplex: [CsoPoint; 4],
) -> Result<ContactResult, EpaError>
where
    G1: ?Sized + SupportMap,
    G2: ?Sized + SupportMap,
{
    Epa::new(EpaConfig::default()).run(pos12, g1, g2, simplex)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vertex(x: Real, y: Real, z: Real) -> CsoPoint {
        CsoPoint::new(Point::new(x, y, z), Point::origin())
    }

    fn seed_tetrahedron() -> [CsoPoint; 4] {
        // Encloses the origin: its barycentric coordinates there are
        // (0.5, 0.25, 0.125, 0.125).
        [
            vertex(1.0, 0.0, 0.0),
            vertex(-1.0, 1.0, 0.0),
            vertex(-1.0, -1.0, 1.0),
            vertex(-1.0, -1.0, -1.0),
        ]
    }

    #[test]
    fn initialization_builds_a_closed_tetrahedron() {
        let mut epa = Epa::new(EpaConfig::default());
        epa.initialize(seed_tetrahedron()).unwrap();

        assert_eq!(epa.store.len(), 4);
        assert_eq!(epa.heap.len(), 4);
        assert!(epa.store.live_triangles().all(|(_, tri)| tri.is_valid()));
        epa.store.check_topology();
    }

    #[test]
    fn initialization_rejects_a_flat_simplex() {
        let flat = [
            vertex(1.0, 0.0, 0.0),
            vertex(-1.0, 1.0, 0.0),
            vertex(-1.0, -1.0, 0.0),
            vertex(0.0, 0.5, 0.0),
        ];
        let mut epa = Epa::new(EpaConfig::default());
        assert!(matches!(
            epa.initialize(flat),
            Err(EpaError::DegenerateSimplex)
        ));
    }

    #[test]
    fn silhouette_preserves_the_manifold_invariant() {
        let mut epa = Epa::new(EpaConfig::default());
        epa.initialize(seed_tetrahedron()).unwrap();

        // Expand the first face toward a point well beyond its plane.
        let root: TriangleId = 0;
        let outside = epa.store[root].closest_point().coords * 3.0;
        epa.vertices
            .push(CsoPoint::new(Point::from(outside), Point::origin()));
        let new_vertex = (epa.vertices.len() - 1) as u32;

        let vertices = epa.vertices.clone();
        let mut budget = epa.config.silhouette_budget;
        let new_faces = epa
            .store
            .compute_silhouette(&vertices, new_vertex, root, &mut budget)
            .unwrap();

        assert!(epa.store[root].is_obsolete());
        assert_eq!(new_faces.len(), 3);
        epa.store.check_topology();
    }

    #[test]
    fn drained_candidates_fall_back_to_the_best_face() {
        let b1 = crate::shape::Ball::new(1.0);
        let b2 = crate::shape::Ball::new(1.0);
        let pos12 = Isometry::translation(1.5, 0.0, 0.0);

        let mut epa = Epa::new(EpaConfig::default());
        epa.initialize(seed_tetrahedron()).unwrap();
        epa.heap.clear();

        // A drained candidate set mid-run resolves to the best face seen
        // instead of reporting an error.
        let contact = epa.expand(&pos12, &b1, &b2, 0).unwrap();
        let expected = epa.store[0].dist_sq().sqrt();
        assert!((contact.depth - expected).abs() < 1.0e-6);
    }

    #[test]
    fn store_exhaustion_is_reported() {
        let config = EpaConfig {
            max_triangles: 4,
            ..EpaConfig::default()
        };
        let b1 = crate::shape::Ball::new(1.0);
        let b2 = crate::shape::Ball::new(1.0);
        let pos12 = Isometry::translation(1.5, 0.0, 0.0);

        let dirs = [
            Vector::new(1.0, 0.0, 0.0),
            Vector::new(-0.5, 0.866, 0.0),
            Vector::new(-0.5, -0.433, 0.75),
            Vector::new(-0.5, -0.433, -0.75),
        ];
        let simplex =
            dirs.map(|d| CsoPoint::from_shapes_toward(&pos12, &b1, &b2, &Unit::new_normalize(d)));

        let res = Epa::new(config).run(&pos12, &b1, &b2, simplex);
        assert!(matches!(res, Err(EpaError::StorageExhausted)));
    }
}
