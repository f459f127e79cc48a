//! Penetration-depth queries and narrow-phase contact bookkeeping.

pub use self::epa::{run_epa, ContactResult, Epa, EpaConfig};
pub use self::error::EpaError;
pub use self::narrow_phase::{
    ContactArena, ContactManifoldCollector, ContactPointId, ContactPointInfo, ContactPointIter,
    NarrowPhaseContactRecord, PairShape, ShapeArena, ShapeHandle,
};

pub mod epa;
mod error;
pub mod narrow_phase;
