use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::body::Body;
use crate::{
    collision::contact::{Collision, Provenance},
    error::{CollisionError, Result},
    utils::allocator::{Arena, BodyId},
};

/// Rigid connection holding a point of `primary` against a point of
/// `normal_body` along one direction.
///
/// Each detection pass turns every joint into a joint collision record,
/// which deduplication never removes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Joint {
    pub primary: BodyId,
    pub normal_body: BodyId,
    /// Attachment point in `primary`'s body coordinates.
    pub attach_primary: DVec2,
    /// Attachment point in `normal_body`'s body coordinates.
    pub attach_normal: DVec2,
    /// Constrained direction in `normal_body`'s body coordinates.
    pub normal: DVec2,
}

impl Joint {
    pub fn new(
        primary: BodyId,
        attach_primary: DVec2,
        normal_body: BodyId,
        attach_normal: DVec2,
        normal: DVec2,
    ) -> Self {
        Self {
            primary,
            normal_body,
            attach_primary,
            attach_normal,
            normal: normal.normalize_or(DVec2::Y),
        }
    }

    /// Record describing the joint's current gap along its normal.
    pub fn to_collision(&self, bodies: &Arena<Body>, time: f64) -> Result<Collision> {
        let primary = bodies
            .get(self.primary)
            .ok_or(CollisionError::UnknownBody(self.primary))?;
        let normal_body = bodies
            .get(self.normal_body)
            .ok_or(CollisionError::UnknownBody(self.normal_body))?;

        let p = primary.pose.body_to_world(self.attach_primary);
        let q = normal_body.pose.body_to_world(self.attach_normal);
        let normal = normal_body.pose.rotate_body_to_world(self.normal);
        Ok(Collision {
            primary_body: self.primary,
            normal_body: self.normal_body,
            distance: (p - q).dot(normal),
            normal,
            impact_point: p,
            radius_of_curvature: f64::INFINITY,
            ball_normal: false,
            joint: true,
            contact: true,
            detected_time: time,
            provenance: Provenance::Joint,
        })
    }
}
