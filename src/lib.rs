//! Rigid Contact – collision detection and contact grouping for 2D rigid bodies.
//!
//! Bodies are closed polygons, curved outlines or open chains. Each
//! detection pass sweeps every vertex from its old pose to its current
//! one, records the edges it crossed or touches, merges near-duplicate
//! records, and leaves grouping of the result to [`dynamics::island`].

pub mod collision;
pub mod config;
pub mod core;
pub mod dynamics;
pub mod error;
pub mod utils;
pub mod world;

pub use glam::DVec2;

pub use collision::{
    broadphase::BroadPhase,
    contact::{Collision, Provenance},
    dedup::add_collision,
    narrowphase::NarrowPhase,
};
pub use config::{CollisionConfig, PenetrationPolicy};
pub use core::{
    body::{Body, EdgeRef, NonCollideSet},
    constraints::Joint,
    edge::{Edge, EdgeShape},
    types::Pose2,
};
pub use dynamics::island::{independent_group, joint_closure, partition_independent};
pub use error::{CollisionError, Result};
pub use utils::{
    allocator::{Arena, BodyId},
    profiling::DetectionMetrics,
};
pub use world::CollisionWorld;
