//! Configuration defaults and tunables for collision detection.

use serde::{Deserialize, Serialize};

/// Stand-in for the swept travel distance of a vertex when no previous pose
/// exists. Sized for simulations whose bodies are roughly unit scale.
pub const DEFAULT_UNKNOWN_TRAVEL_DISTANCE: f64 = 0.1;

/// Squared travel distance below which the square root is not taken.
pub const DEFAULT_SQRT_THRESHOLD: f64 = 0.01;

/// Detection times closer than this are considered simultaneous.
pub const DEFAULT_TIME_TOLERANCE: f64 = 1e-14;

/// Impact points closer than this may describe the same collision.
pub const DEFAULT_SIMILARITY_DISTANCE: f64 = 0.1;

/// Minimum cosine between normals of two similar collisions.
pub const DEFAULT_SIMILARITY_NORMAL_COS: f64 = 0.9;

/// Distance tolerance given to bodies built without an explicit one.
pub const DEFAULT_DISTANCE_TOL: f64 = 0.01;

/// What to do when a vertex is found inside a body although none of the
/// body's edges was crossed by the vertex's swept path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PenetrationPolicy {
    /// Accept the miss and only count it.
    Tolerate,
    /// Re-run the vertex test with verbose logging, then fail.
    Strict,
}

impl Default for PenetrationPolicy {
    fn default() -> Self {
        if cfg!(debug_assertions) {
            PenetrationPolicy::Strict
        } else {
            PenetrationPolicy::Tolerate
        }
    }
}

/// Tunables of the detection and deduplication passes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionConfig {
    pub unknown_travel_distance: f64,
    pub sqrt_threshold: f64,
    pub time_tolerance: f64,
    pub similarity_distance: f64,
    pub similarity_normal_cos: f64,
    pub default_distance_tol: f64,
    pub penetration_policy: PenetrationPolicy,
}

impl Default for CollisionConfig {
    fn default() -> Self {
        Self {
            unknown_travel_distance: DEFAULT_UNKNOWN_TRAVEL_DISTANCE,
            sqrt_threshold: DEFAULT_SQRT_THRESHOLD,
            time_tolerance: DEFAULT_TIME_TOLERANCE,
            similarity_distance: DEFAULT_SIMILARITY_DISTANCE,
            similarity_normal_cos: DEFAULT_SIMILARITY_NORMAL_COS,
            default_distance_tol: DEFAULT_DISTANCE_TOL,
            penetration_policy: PenetrationPolicy::default(),
        }
    }
}

impl CollisionConfig {
    pub fn with_penetration_policy(mut self, policy: PenetrationPolicy) -> Self {
        self.penetration_policy = policy;
        self
    }

    pub fn with_unknown_travel_distance(mut self, distance: f64) -> Self {
        self.unknown_travel_distance = distance;
        self
    }

    /// Travel bound used for vertices whose squared travel is at or below
    /// [`CollisionConfig::sqrt_threshold`].
    pub fn minimum_travel_bound(&self) -> f64 {
        self.unknown_travel_distance
            .max(self.sqrt_threshold.max(0.0).sqrt())
    }
}
