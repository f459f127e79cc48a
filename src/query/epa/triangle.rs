use crate::math::{Point, Real, DEFAULT_EPSILON};
use crate::query::epa::triangle_store::{TriangleId, TriangleStore};
use crate::query::epa::CsoPoint;

/// A directed edge of a polytope triangle.
///
/// An edge is a relation, not an owned object: it refers to a triangle slot
/// of the store and to one of its three local edges, and never outlives the
/// store. Edge `i` of a triangle goes from its vertex `i` to its vertex
/// `(i + 1) % 3`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct EdgeEpa {
    /// The slot of the triangle owning this edge.
    pub triangle: TriangleId,
    /// The local index of this edge in its owning triangle (0, 1 or 2).
    pub index: u8,
}

impl EdgeEpa {
    /// Edge `index` of the triangle at slot `triangle`.
    pub fn new(triangle: TriangleId, index: u8) -> Self {
        debug_assert!(index < 3);
        EdgeEpa { triangle, index }
    }

    /// The index of this edge's source vertex in the shared vertex buffer.
    pub fn source(&self, store: &TriangleStore) -> u32 {
        store[self.triangle].vertex_id(self.index)
    }

    /// The index of this edge's target vertex in the shared vertex buffer.
    pub fn target(&self, store: &TriangleStore) -> u32 {
        store[self.triangle].vertex_id((self.index + 1) % 3)
    }
}

/// A triangular face of the expanding polytope.
///
/// The three vertex indices are ordered so that the face winds
/// counter-clockwise seen from outside the polytope. The closest-point
/// result is computed once at creation and never mutated afterward.
#[derive(Clone, Debug)]
pub struct TriangleEpa {
    verts: [u32; 3],
    pub(super) adj: [Option<EdgeEpa>; 3],
    closest_point: Point,
    dist_sq: Real,
    lambda1: Real,
    lambda2: Real,
    det: Real,
    obsolete: bool,
    valid: bool,
}

impl TriangleEpa {
    /// Creates a new face from three vertex indices and computes its
    /// closest point to the origin.
    pub fn new(vertices: &[CsoPoint], v0: u32, v1: u32, v2: u32) -> Self {
        let mut tri = TriangleEpa {
            verts: [v0, v1, v2],
            adj: [None; 3],
            closest_point: Point::origin(),
            dist_sq: 0.0,
            lambda1: 0.0,
            lambda2: 0.0,
            det: 0.0,
            obsolete: false,
            valid: false,
        };
        let _ = tri.compute_closest_point(vertices);
        tri
    }

    /// The index of this triangle's `i`-th vertex in the shared vertex
    /// buffer.
    pub fn vertex_id(&self, i: u8) -> u32 {
        self.verts[i as usize]
    }

    /// The twin edge linked to this triangle's `i`-th edge, if any.
    pub fn adjacent_edge(&self, i: u8) -> Option<EdgeEpa> {
        self.adj[i as usize]
    }

    /// Whether this face has been superseded by newer faces.
    pub fn is_obsolete(&self) -> bool {
        self.obsolete
    }

    pub(super) fn set_obsolete(&mut self, obsolete: bool) {
        self.obsolete = obsolete;
    }

    /// Whether the closest-point computation succeeded for this face.
    ///
    /// Faces with a non-positive Gram determinant are permanently excluded
    /// from the expansion candidate set, but remain in the mesh where they
    /// may still serve as neighbors.
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// The point of this face's supporting plane closest to the origin.
    ///
    /// Only meaningful if [`TriangleEpa::is_valid`] returns `true`.
    pub fn closest_point(&self) -> Point {
        self.closest_point
    }

    /// The squared distance from the origin to this face's supporting
    /// plane.
    pub fn dist_sq(&self) -> Real {
        self.dist_sq
    }

    /// Computes the point of the supporting plane of this triangle closest
    /// to the origin, through the Gram matrix of the two edge vectors from
    /// vertex 0.
    ///
    /// Returns `false` and marks the face invalid when the Gram determinant
    /// is not positive.
    fn compute_closest_point(&mut self, vertices: &[CsoPoint]) -> bool {
        let p0 = vertices[self.verts[0] as usize].point;
        let v1 = vertices[self.verts[1] as usize].point - p0;
        let v2 = vertices[self.verts[2] as usize].point - p0;

        let v1_dot_v1 = v1.dot(&v1);
        let v1_dot_v2 = v1.dot(&v2);
        let v2_dot_v2 = v2.dot(&v2);
        let p0_dot_v1 = p0.coords.dot(&v1);
        let p0_dot_v2 = p0.coords.dot(&v2);

        self.det = v1_dot_v1 * v2_dot_v2 - v1_dot_v2 * v1_dot_v2;
        self.lambda1 = p0_dot_v2 * v1_dot_v2 - p0_dot_v1 * v2_dot_v2;
        self.lambda2 = p0_dot_v1 * v1_dot_v2 - p0_dot_v2 * v1_dot_v1;

        if self.det > DEFAULT_EPSILON {
            self.closest_point = p0 + (v1 * self.lambda1 + v2 * self.lambda2) / self.det;
            self.dist_sq = self.closest_point.coords.norm_squared();
            self.valid = true;
        } else {
            self.valid = false;
        }

        self.valid
    }

    /// Whether this face's supporting plane faces the given vertex.
    ///
    /// Degenerate (invalid) faces count as visible so that silhouette
    /// traversal consumes them instead of keeping them as boundary
    /// neighbors.
    pub fn is_visible_from(&self, vertices: &[CsoPoint], vertex_id: u32) -> bool {
        if !self.valid {
            return true;
        }

        let to_vertex = vertices[vertex_id as usize].point - self.closest_point;
        self.closest_point.coords.dot(&to_vertex) > 0.0
    }

    /// The witness points on each original shape matching this face's
    /// closest point, obtained by the same barycentric combination of the
    /// vertices' witness points.
    pub fn closest_witness_points(&self, vertices: &[CsoPoint]) -> (Point, Point) {
        let w0 = (self.det - self.lambda1 - self.lambda2) / self.det;
        let w1 = self.lambda1 / self.det;
        let w2 = self.lambda2 / self.det;

        let a = &vertices[self.verts[0] as usize];
        let b = &vertices[self.verts[1] as usize];
        let c = &vertices[self.verts[2] as usize];

        (
            Point::from(a.orig1.coords * w0 + b.orig1.coords * w1 + c.orig1.coords * w2),
            Point::from(a.orig2.coords * w0 + b.orig2.coords * w1 + c.orig2.coords * w2),
        )
    }
}

/// Establishes mutual twin adjacency between two edges.
///
/// Returns `false` and mutates nothing unless the edges traverse the same
/// underlying segment in opposite directions, the structural precondition
/// for a valid manifold seam.
pub fn link(store: &mut TriangleStore, edge0: EdgeEpa, edge1: EdgeEpa) -> bool {
    let matched = edge0.source(store) == edge1.target(store)
        && edge0.target(store) == edge1.source(store);

    if matched {
        store[edge0.triangle].adj[edge0.index as usize] = Some(edge1);
        store[edge1.triangle].adj[edge1.index as usize] = Some(edge0);
    }

    matched
}

/// Sets one side of a twin relation whose other side is established by a
/// separate, already-verified operation.
pub fn half_link(store: &mut TriangleStore, edge0: EdgeEpa, edge1: EdgeEpa) {
    debug_assert!(
        edge0.source(store) == edge1.target(store)
            && edge0.target(store) == edge1.source(store),
        "half-linked edges must traverse the same segment in opposite directions"
    );

    store[edge0.triangle].adj[edge0.index as usize] = Some(edge1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{Point, Real};

    fn vertex(x: Real, y: Real, z: Real) -> CsoPoint {
        CsoPoint::new(Point::new(x, y, z), Point::origin())
    }

    #[test]
    fn closest_point_of_unit_simplex_face() {
        let vertices = [
            vertex(1.0, 0.0, 0.0),
            vertex(0.0, 1.0, 0.0),
            vertex(0.0, 0.0, 1.0),
        ];
        let tri = TriangleEpa::new(&vertices, 0, 1, 2);

        assert!(tri.is_valid());
        let expected = Point::new(1.0 / 3.0, 1.0 / 3.0, 1.0 / 3.0);
        assert!((tri.closest_point() - expected).norm() < 1.0e-6);
        assert!((tri.dist_sq() - 1.0 / 3.0).abs() < 1.0e-6);
    }

    #[test]
    fn closest_point_fails_on_degenerate_face() {
        // Three collinear vertices have a zero Gram determinant.
        let vertices = [
            vertex(0.0, 0.0, 1.0),
            vertex(0.0, 0.0, 2.0),
            vertex(0.0, 0.0, 3.0),
        ];
        let tri = TriangleEpa::new(&vertices, 0, 1, 2);
        assert!(!tri.is_valid());
    }

    #[test]
    fn link_rejects_mismatched_edges() {
        let vertices = [
            vertex(1.0, 0.0, 0.0),
            vertex(0.0, 1.0, 0.0),
            vertex(0.0, 0.0, 1.0),
            vertex(0.0, 0.0, -1.0),
        ];
        let mut store = TriangleStore::with_capacity(4);
        let t0 = store.create(&vertices, 0, 1, 2).unwrap();
        let t1 = store.create(&vertices, 0, 1, 3).unwrap();

        // Both edges go 0 -> 1: same direction, not a valid seam.
        assert!(!link(
            &mut store,
            EdgeEpa::new(t0, 0),
            EdgeEpa::new(t1, 0)
        ));
        assert_eq!(store[t0].adjacent_edge(0), None);
        assert_eq!(store[t1].adjacent_edge(0), None);
    }

    #[test]
    fn link_twins_opposite_edges() {
        let vertices = [
            vertex(1.0, 0.0, 0.0),
            vertex(0.0, 1.0, 0.0),
            vertex(0.0, 0.0, 1.0),
            vertex(0.0, 0.0, -1.0),
        ];
        let mut store = TriangleStore::with_capacity(4);
        let t0 = store.create(&vertices, 0, 1, 2).unwrap();
        let t1 = store.create(&vertices, 1, 0, 3).unwrap();

        // t0's edge 0 goes 0 -> 1, t1's edge 0 goes 1 -> 0.
        assert!(link(&mut store, EdgeEpa::new(t0, 0), EdgeEpa::new(t1, 0)));
        assert_eq!(store[t0].adjacent_edge(0), Some(EdgeEpa::new(t1, 0)));
        assert_eq!(store[t1].adjacent_edge(0), Some(EdgeEpa::new(t0, 0)));
    }
}
