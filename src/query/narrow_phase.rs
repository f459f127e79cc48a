//! Per-pair accumulation of narrow-phase contact points.
//!
//! Contact points discovered by the penetration-depth algorithms are
//! collected into an arena-owned forward list, one list per overlapping
//! shape pair, and handed as a batch to manifold construction. Nodes are
//! allocated from and released to a pair-scoped arena; in place of garbage
//! collection, every allocation must be matched by exactly one release,
//! and the record wrapping the list checks at destruction time that
//! nothing leaked.

use crate::math::{Isometry, Point, Real, UnitVector};
use crate::shape::SupportMap;
use slab::Slab;

/// Handle of a contact-point node inside a [`ContactArena`].
pub type ContactPointId = usize;

/// Handle of a carved temporary shape inside a [`ShapeArena`].
pub type ShapeHandle = usize;

/// A single narrow-phase contact point, stored as a node of an
/// arena-owned forward list.
#[derive(Clone, Debug)]
pub struct ContactPointInfo {
    /// The contact normal in the first shape's local frame.
    pub normal: UnitVector,
    /// The penetration depth. Positive by construction.
    pub depth: Real,
    /// The contact point on the first shape, in its local frame.
    pub local_point1: Point,
    /// The contact point on the second shape, in its local frame.
    pub local_point2: Point,
    next: Option<ContactPointId>,
}

/// The pair-scoped arena owning contact-point nodes.
#[derive(Default)]
pub struct ContactArena {
    nodes: Slab<ContactPointInfo>,
}

impl ContactArena {
    /// Creates an empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// The number of live nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the arena holds no live node.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn allocate(&mut self, node: ContactPointInfo) -> ContactPointId {
        self.nodes.insert(node)
    }

    fn release(&mut self, id: ContactPointId) -> ContactPointInfo {
        self.nodes.remove(id)
    }

    fn get(&self, id: ContactPointId) -> &ContactPointInfo {
        &self.nodes[id]
    }
}

/// The pair-scoped arena owning temporary shapes carved for one
/// narrow-phase pass, e.g. a single-triangle proxy extracted from a mesh.
#[derive(Default)]
pub struct ShapeArena {
    shapes: Slab<Box<dyn SupportMap>>,
}

impl ShapeArena {
    /// Creates an empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// The number of live carved shapes.
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    /// Whether the arena holds no live carved shape.
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Stores a carved shape and returns its handle.
    pub fn insert(&mut self, shape: Box<dyn SupportMap>) -> ShapeHandle {
        self.shapes.insert(shape)
    }

    /// Releases a carved shape.
    pub fn release(&mut self, handle: ShapeHandle) {
        let _ = self.shapes.remove(handle);
    }

    /// Resolves a handle to the carved shape it designates.
    pub fn get(&self, handle: ShapeHandle) -> &dyn SupportMap {
        &*self.shapes[handle]
    }
}

/// A shape taking part in a narrow-phase pair: either a persistent shape
/// borrowed from the world, or a temporary shape carved for this pass and
/// owned, exactly once, by the record holding this value.
#[derive(Copy, Clone)]
pub enum PairShape<'a> {
    /// A persistent shape owned elsewhere.
    Shared(&'a dyn SupportMap),
    /// A temporary shape owned by the enclosing record.
    Carved(ShapeHandle),
}

impl<'a> PairShape<'a> {
    /// Resolves this shape against the pair's shape arena.
    pub fn resolve<'b>(&self, shapes: &'b ShapeArena) -> &'b dyn SupportMap
    where
        'a: 'b,
    {
        match *self {
            PairShape::Shared(shape) => shape,
            PairShape::Carved(handle) => shapes.get(handle),
        }
    }

    fn is_carved(&self) -> bool {
        matches!(self, PairShape::Carved(_))
    }
}

/// Receives one candidate contact manifold (a batch of contact points)
/// from a narrow-phase record. Implemented by the manifold builder of the
/// surrounding engine.
pub trait ContactManifoldCollector {
    /// Consumes a read-only traversal of a record's contact points.
    fn add_potential_contact_points(&mut self, points: ContactPointIter<'_>);
}

/// A read-only traversal of an arena-owned contact-point list, most
/// recently added point first.
pub struct ContactPointIter<'a> {
    contacts: &'a ContactArena,
    next: Option<ContactPointId>,
}

impl<'a> Iterator for ContactPointIter<'a> {
    type Item = &'a ContactPointInfo;

    fn next(&mut self) -> Option<&'a ContactPointInfo> {
        let id = self.next?;
        let node = self.contacts.get(id);
        self.next = node.next;
        Some(node)
    }
}

/// Accumulates the contact points discovered by narrow-phase algorithms
/// for one shape pair, then hands the batch to manifold construction.
///
/// One record is created per overlapping shape pair per narrow-phase pass
/// and destroyed at the end of the pass. The contact-point list must be
/// emptied with [`NarrowPhaseContactRecord::reset_contact_points`] before
/// the record is released or dropped; debug builds assert that nothing
/// leaked. If the record owns carved temporary shapes, they are released
/// to the shape arena exactly once by
/// [`NarrowPhaseContactRecord::release`].
pub struct NarrowPhaseContactRecord<'a> {
    /// The first shape of the pair.
    pub shape1: PairShape<'a>,
    /// The second shape of the pair.
    pub shape2: PairShape<'a>,
    /// The world transform of the first shape.
    pub pos1: Isometry,
    /// The world transform of the second shape.
    pub pos2: Isometry,
    contact_points: Option<ContactPointId>,
    released: bool,
}

impl<'a> NarrowPhaseContactRecord<'a> {
    /// Creates the record for one overlapping shape pair.
    pub fn new(
        shape1: PairShape<'a>,
        shape2: PairShape<'a>,
        pos1: Isometry,
        pos2: Isometry,
    ) -> Self {
        NarrowPhaseContactRecord {
            shape1,
            shape2,
            pos1,
            pos2,
            contact_points: None,
            released: false,
        }
    }

    /// The pose of the second shape in the first shape's local frame.
    pub fn pos12(&self) -> Isometry {
        self.pos1.inv_mul(&self.pos2)
    }

    /// Records one contact point at the head of the list.
    ///
    /// The insertion order is reversed on traversal; manifold construction
    /// must not assume the original ordering.
    ///
    /// # Panics
    ///
    /// Panics if `depth` is not positive: a non-positive depth means the
    /// caller ran a penetration query on separating geometry, which is a
    /// programming error rather than a runtime condition.
    pub fn add_contact_point(
        &mut self,
        contacts: &mut ContactArena,
        normal: UnitVector,
        depth: Real,
        local_point1: Point,
        local_point2: Point,
    ) {
        assert!(
            depth > 0.0,
            "contact points must have a positive penetration depth"
        );

        let id = contacts.allocate(ContactPointInfo {
            normal,
            depth,
            local_point1,
            local_point2,
            next: self.contact_points,
        });
        self.contact_points = Some(id);
    }

    /// Iterates over the recorded contact points, most recent first.
    pub fn contact_points<'b>(&self, contacts: &'b ContactArena) -> ContactPointIter<'b> {
        ContactPointIter {
            contacts,
            next: self.contact_points,
        }
    }

    /// Forwards the current contact points, unmodified, to the manifold
    /// builder as a single candidate manifold. The list is not cleared.
    pub fn add_contact_points_as_potential_contact_manifold(
        &self,
        contacts: &ContactArena,
        collector: &mut dyn ContactManifoldCollector,
    ) {
        collector.add_potential_contact_points(self.contact_points(contacts));
    }

    /// Releases every recorded contact point back to the arena and clears
    /// the list. Calling this on an already-empty record is a no-op.
    pub fn reset_contact_points(&mut self, contacts: &mut ContactArena) {
        let mut next = self.contact_points.take();
        while let Some(id) = next {
            next = contacts.release(id).next;
        }
    }

    /// Destroys the record, releasing its carved temporary shapes, if any,
    /// exactly once.
    ///
    /// The contact-point list must have been reset beforehand.
    pub fn release(mut self, shapes: &mut ShapeArena) {
        debug_assert!(
            self.contact_points.is_none(),
            "contact record destroyed with unreleased contact points"
        );

        if let PairShape::Carved(handle) = self.shape1 {
            shapes.release(handle);
        }
        if let PairShape::Carved(handle) = self.shape2 {
            shapes.release(handle);
        }
        self.released = true;
    }
}

impl Drop for NarrowPhaseContactRecord<'_> {
    fn drop(&mut self) {
        debug_assert!(
            self.contact_points.is_none(),
            "contact record dropped with unreleased contact points"
        );
        debug_assert!(
            self.released || !(self.shape1.is_carved() || self.shape2.is_carved()),
            "contact record dropped without releasing its carved shapes"
        );
    }
}
