//! Traits for support mapping based shapes.

use crate::math::{Isometry, Point, UnitVector, Vector};
use na::Unit;

/// Trait of convex shapes representable by a support mapping function.
///
/// A support function associates a direction to the shape point which
/// maximizes their dot product.
pub trait SupportMap {
    /// Evaluates the support function of this shape in the given direction.
    fn local_support_point(&self, dir: &Vector) -> Point;

    /// Same as `self.local_support_point` except that `dir` is normalized.
    fn local_support_point_toward(&self, dir: &UnitVector) -> Point {
        self.local_support_point(dir.as_ref())
    }

    /// Evaluates the support function of this shape transformed by `transform`.
    fn support_point(&self, transform: &Isometry, dir: &Vector) -> Point {
        let local_dir = transform.inverse_transform_vector(dir);
        transform * self.local_support_point(&local_dir)
    }

    /// Same as `self.support_point` except that `dir` is normalized.
    fn support_point_toward(&self, transform: &Isometry, dir: &UnitVector) -> Point {
        let local_dir = Unit::new_unchecked(transform.inverse_transform_vector(dir));
        transform * self.local_support_point_toward(&local_dir)
    }
}
