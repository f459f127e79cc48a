//! The Expanding Polytope Algorithm over a growable half-edge triangle
//! mesh.

pub use self::cso_point::CsoPoint;
pub use self::epa3::{run_epa, ContactResult, Epa, EpaConfig};
pub use self::triangle::{half_link, link, EdgeEpa, TriangleEpa};
pub use self::triangle_store::{TriangleId, TriangleStore};

mod cso_point;
mod epa3;
mod triangle;
mod triangle_store;
