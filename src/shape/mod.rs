//! Support-mapped convex shapes usable with the penetration-depth queries.

pub use self::ball::Ball;
pub use self::cuboid::Cuboid;
pub use self::support_map::SupportMap;

mod ball;
mod cuboid;
mod support_map;
