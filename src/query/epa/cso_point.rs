use crate::math::{Isometry, Point, UnitVector, Vector};
use crate::shape::SupportMap;
use std::ops::Sub;

/// A point of the Minkowski difference of two shapes.
///
/// Each point is the difference of two support points, one on each shape.
/// Both original (witness) points are kept so that contact points on the
/// shapes themselves can be reconstructed once the penetration direction is
/// known. A point is immutable once pushed into the polytope's vertex
/// buffer.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CsoPoint {
    /// The point of the Minkowski difference: `orig1 - orig2`.
    pub point: Point,
    /// The witness point on the first shape.
    pub orig1: Point,
    /// The witness point on the second shape, expressed in the first
    /// shape's local frame.
    pub orig2: Point,
}

impl CsoPoint {
    /// Initializes a Minkowski-difference point from its two witness points.
    pub fn new(orig1: Point, orig2: Point) -> Self {
        CsoPoint {
            point: Point::from(orig1 - orig2),
            orig1,
            orig2,
        }
    }

    /// The support point of the Minkowski difference of `g1` and `g2`
    /// toward the unit direction `dir`.
    ///
    /// `pos12` is the pose of the second shape in the first shape's local
    /// frame.
    pub fn from_shapes_toward<G1, G2>(
        pos12: &Isometry,
        g1: &G1,
        g2: &G2,
        dir: &UnitVector,
    ) -> Self
    where
        G1: ?Sized + SupportMap,
        G2: ?Sized + SupportMap,
    {
        let sp1 = g1.local_support_point_toward(dir);
        let sp2 = g2.support_point_toward(pos12, &-*dir);

        CsoPoint::new(sp1, sp2)
    }

    /// Same as [`CsoPoint::from_shapes_toward`] with a direction that is
    /// not necessarily normalized.
    pub fn from_shapes<G1, G2>(pos12: &Isometry, g1: &G1, g2: &G2, dir: &Vector) -> Self
    where
        G1: ?Sized + SupportMap,
        G2: ?Sized + SupportMap,
    {
        let sp1 = g1.local_support_point(dir);
        let sp2 = g2.support_point(pos12, &-*dir);

        CsoPoint::new(sp1, sp2)
    }
}

impl Sub<CsoPoint> for CsoPoint {
    type Output = Vector;

    #[inline]
    fn sub(self, rhs: CsoPoint) -> Vector {
        self.point - rhs.point
    }
}
