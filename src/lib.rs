/*!
depth3d
========

**depth3d** is the narrow-phase penetration-depth stage of a 3D rigid-body
collision pipeline. Given two convex shapes already known to overlap, it
computes a separating-contact description (a unit normal, a penetration depth
and witness points on each shape) precise enough to drive a constraint
solver, using the Expanding Polytope Algorithm over a half-edge triangle
mesh. It also provides the arena-backed contact-point bookkeeping that
collects narrow-phase output per shape pair.

*/

#![deny(non_camel_case_types)]
#![deny(unused_parens)]
#![deny(non_upper_case_globals)]
#![deny(unused_results)]
#![warn(missing_docs)]
#![warn(unused_imports)]
#![allow(missing_copy_implementations)]

pub extern crate nalgebra as na;

pub mod query;
pub mod shape;
pub mod utils;

mod real {
    /// The scalar type used throughout this crate.
    #[cfg(feature = "f64")]
    pub use f64 as Real;

    /// The scalar type used throughout this crate.
    #[cfg(feature = "f32")]
    pub use f32 as Real;
}

/// Compilation flags dependent aliases for mathematical types.
pub mod math {
    pub use super::real::Real;
    pub use na::{Isometry3, Point3, Translation3, UnitVector3, Vector3};

    /// The default tolerance used for geometric operations.
    pub const DEFAULT_EPSILON: Real = Real::EPSILON;

    /// The dimension of the space.
    pub const DIM: usize = 3;

    /// The point type.
    pub type Point = Point3<Real>;

    /// The vector type.
    pub type Vector = Vector3<Real>;

    /// The unit vector type.
    pub type UnitVector = UnitVector3<Real>;

    /// The transformation type.
    pub type Isometry = Isometry3<Real>;
}
