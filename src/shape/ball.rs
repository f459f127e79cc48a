use crate::math::{Isometry, Point, Real, UnitVector, Vector};
use crate::shape::SupportMap;
use na::Unit;

/// A ball shape centered at its local-space origin.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Ball {
    /// The radius of the ball.
    pub radius: Real,
}

impl Ball {
    /// Creates a new ball with the given radius.
    pub fn new(radius: Real) -> Self {
        Ball { radius }
    }
}

impl SupportMap for Ball {
    #[inline]
    fn support_point(&self, m: &Isometry, dir: &Vector) -> Point {
        self.support_point_toward(m, &Unit::new_normalize(*dir))
    }

    #[inline]
    fn support_point_toward(&self, m: &Isometry, dir: &UnitVector) -> Point {
        Point::from(m.translation.vector) + **dir * self.radius
    }

    #[inline]
    fn local_support_point(&self, dir: &Vector) -> Point {
        self.local_support_point_toward(&Unit::new_normalize(*dir))
    }

    #[inline]
    fn local_support_point_toward(&self, dir: &UnitVector) -> Point {
        Point::origin() + **dir * self.radius
    }
}
