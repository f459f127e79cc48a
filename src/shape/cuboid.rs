use crate::math::{Point, Vector};
use crate::shape::SupportMap;

/// A cuboid shape centered at its local-space origin, axis-aligned in its
/// local frame.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Cuboid {
    /// The half-extent of the cuboid along each local axis.
    pub half_extents: Vector,
}

impl Cuboid {
    /// Creates a new cuboid from its half-extents.
    pub fn new(half_extents: Vector) -> Self {
        Cuboid { half_extents }
    }
}

impl SupportMap for Cuboid {
    #[inline]
    fn local_support_point(&self, dir: &Vector) -> Point {
        dir.map(|e| e.signum())
            .component_mul(&self.half_extents)
            .into()
    }
}
