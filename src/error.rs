//! Error types for collision detection.
//!
//! Every variant is an invariant violation on the caller's side or inside
//! the detection pipeline. Ordinary outcomes such as a rejected pair or a
//! collision dropped by deduplication are not errors.

use thiserror::Error;

use crate::utils::allocator::BodyId;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CollisionError {
    #[error("collision between {primary} and {normal} has non-finite distance {distance}")]
    NonFiniteDistance {
        primary: BodyId,
        normal: BodyId,
        distance: f64,
    },

    #[error("body {with_old} has an old pose but body {without_old} does not")]
    MismatchedOldPose { with_old: BodyId, without_old: BodyId },

    #[error("vertex {vertex} of body {body} is inside body {host} but crossed no edge")]
    UndetectedPenetration {
        vertex: usize,
        body: BodyId,
        host: BodyId,
    },

    #[error("invalid shape: {0}")]
    InvalidShape(String),

    #[error("unknown body {0}")]
    UnknownBody(BodyId),

    #[error("seed collision {seed} out of range for {len} collisions")]
    SeedOutOfRange { seed: usize, len: usize },

    #[error("expected {expected} approach velocities, got {actual}")]
    VelocityCountMismatch { expected: usize, actual: usize },
}

pub type Result<T> = std::result::Result<T, CollisionError>;
