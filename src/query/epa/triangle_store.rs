use crate::query::epa::triangle::{half_link, link, EdgeEpa, TriangleEpa};
use crate::query::epa::CsoPoint;
use crate::query::EpaError;
use std::ops::{Index, IndexMut, Range};

/// The slot of a triangle inside a [`TriangleStore`].
pub type TriangleId = u32;

/// A fixed-capacity, append-only arena of polytope triangles.
///
/// Slots are never reused during a run: superseded faces are tombstoned
/// with their obsolete bit so that triangle ids stay stable while the
/// silhouette traversal reads the adjacency of faces it is about to
/// replace. Capacity exhaustion is a recoverable failure of the current
/// run, not a crash.
pub struct TriangleStore {
    triangles: Vec<TriangleEpa>,
    capacity: usize,
}

impl TriangleStore {
    /// Creates an empty store holding at most `capacity` triangles.
    pub fn with_capacity(capacity: usize) -> Self {
        TriangleStore {
            triangles: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// The number of triangle slots allocated so far, live or obsolete.
    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    /// Whether no triangle has been allocated yet.
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Allocates a new face joining the given vertex indices.
    ///
    /// Returns `None` when the store capacity is exhausted.
    pub fn create(
        &mut self,
        vertices: &[CsoPoint],
        v0: u32,
        v1: u32,
        v2: u32,
    ) -> Option<TriangleId> {
        if self.triangles.len() == self.capacity {
            return None;
        }

        let id = self.triangles.len() as TriangleId;
        self.triangles.push(TriangleEpa::new(vertices, v0, v1, v2));
        Some(id)
    }

    /// Iterates over the live (non-obsolete) triangles and their slots.
    pub fn live_triangles(&self) -> impl Iterator<Item = (TriangleId, &TriangleEpa)> {
        self.triangles
            .iter()
            .enumerate()
            .filter(|(_, tri)| !tri.is_obsolete())
            .map(|(id, tri)| (id as TriangleId, tri))
    }

    /// Runs the recursive silhouette discovery rooted at `root`, the face
    /// selected for expansion toward the vertex `new_vertex`.
    ///
    /// Faces whose plane faces the new vertex are tombstoned; every
    /// boundary edge toward a non-facing neighbor receives a new fan
    /// triangle joining the new vertex to that edge, half-linked outward at
    /// creation. The fan around the new vertex is then closed by linking
    /// consecutive new triangles and setting the outer back references.
    ///
    /// On success, returns the slots of the newly created triangles.
    /// `budget` bounds the number of edge crossings so that traversal of a
    /// pathological (nearly coplanar) mesh always terminates.
    pub fn compute_silhouette(
        &mut self,
        vertices: &[CsoPoint],
        new_vertex: u32,
        root: TriangleId,
        budget: &mut usize,
    ) -> Result<Range<usize>, EpaError> {
        let first = self.triangles.len();

        self[root].set_obsolete(true);
        for i in 0..3u8 {
            let edge = self[root]
                .adjacent_edge(i)
                .ok_or(EpaError::StructuralInvariantViolated)?;
            self.silhouette_recurse(vertices, new_vertex, edge, budget)?;
        }

        let last = self.triangles.len();
        if first == last {
            // Every neighbor claimed to face the new vertex: the silhouette
            // is empty, which cannot happen on a closed polytope.
            log::debug!("EPA silhouette discovery produced no boundary edge.");
            return Err(EpaError::StructuralInvariantViolated);
        }

        // Close the fan: each new triangle was half-linked toward its
        // pre-existing neighbor when it was created; set the neighbor's
        // back reference and link consecutive fan triangles together.
        let mut prev = (last - 1) as TriangleId;
        for i in first..last {
            let id = i as TriangleId;
            let outer = self[id]
                .adjacent_edge(1)
                .ok_or(EpaError::StructuralInvariantViolated)?;
            half_link(self, outer, EdgeEpa::new(id, 1));

            if !link(self, EdgeEpa::new(id, 0), EdgeEpa::new(prev, 2)) {
                return Err(EpaError::StructuralInvariantViolated);
            }
            prev = id;
        }

        Ok(first..last)
    }

    /// Crosses `edge`, an edge of a not-yet-visited neighbor, during
    /// silhouette discovery.
    fn silhouette_recurse(
        &mut self,
        vertices: &[CsoPoint],
        new_vertex: u32,
        edge: EdgeEpa,
        budget: &mut usize,
    ) -> Result<(), EpaError> {
        if *budget == 0 {
            // The traversal visited more edges than a mesh of this size can
            // hold, which only happens when adjacency is corrupted by
            // near-coplanar degeneracies.
            log::debug!("EPA silhouette traversal exceeded its budget.");
            return Err(EpaError::StructuralInvariantViolated);
        }
        *budget -= 1;

        let owner = edge.triangle;
        if self[owner].is_obsolete() {
            return Ok(());
        }

        if !self[owner].is_visible_from(vertices, new_vertex) {
            // Silhouette boundary: stitch a new fan triangle onto this
            // edge. Its edge 1 runs opposite to `edge`, which makes it the
            // outer seam of the fan.
            let target = edge.target(self);
            let source = edge.source(self);
            let new_id = self
                .create(vertices, new_vertex, target, source)
                .ok_or(EpaError::StorageExhausted)?;
            half_link(self, EdgeEpa::new(new_id, 1), edge);
            Ok(())
        } else {
            self[owner].set_obsolete(true);

            let next = self[owner]
                .adjacent_edge((edge.index + 1) % 3)
                .ok_or(EpaError::StructuralInvariantViolated)?;
            let prev = self[owner]
                .adjacent_edge((edge.index + 2) % 3)
                .ok_or(EpaError::StructuralInvariantViolated)?;

            self.silhouette_recurse(vertices, new_vertex, next, budget)?;
            self.silhouette_recurse(vertices, new_vertex, prev, budget)
        }
    }

    /// Asserts that the live faces form a closed 2-manifold with symmetric
    /// twin links. Intended for tests and debugging.
    pub fn check_topology(&self) {
        for (id, tri) in self.live_triangles() {
            for i in 0..3u8 {
                let edge = EdgeEpa::new(id, i);
                let twin = tri
                    .adjacent_edge(i)
                    .expect("live face with an unlinked edge");

                assert!(
                    !self[twin.triangle].is_obsolete(),
                    "live face adjacent to an obsolete face"
                );
                assert_eq!(edge.source(self), twin.target(self));
                assert_eq!(edge.target(self), twin.source(self));

                let back = self[twin.triangle]
                    .adjacent_edge(twin.index)
                    .expect("twin edge with no back reference");
                assert_eq!(back, edge, "twin links are not symmetric");
            }
        }
    }
}

impl Index<TriangleId> for TriangleStore {
    type Output = TriangleEpa;

    #[inline]
    fn index(&self, id: TriangleId) -> &TriangleEpa {
        &self.triangles[id as usize]
    }
}

impl IndexMut<TriangleId> for TriangleStore {
    #[inline]
    fn index_mut(&mut self, id: TriangleId) -> &mut TriangleEpa {
        &mut self.triangles[id as usize]
    }
}
