//! Collision detection: broad-phase pair filter, vertex/edge narrow phase,
//! collision records, and their deduplication.

pub mod broadphase;
pub mod contact;
pub mod dedup;
pub mod narrowphase;

pub use broadphase::{possible_intersection, BroadPhase};
pub use contact::{Collision, Provenance};
pub use dedup::add_collision;
pub use narrowphase::{NarrowPhase, VertexOutcome};
