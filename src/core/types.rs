use glam::DVec2;
use serde::{Deserialize, Serialize};

/// Position and orientation of a body in world coordinates.
///
/// `position` is where the body-coordinate origin sits in the world and
/// `angle` is the counter-clockwise rotation of the body frame, in radians.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose2 {
    pub position: DVec2,
    pub angle: f64,
}

impl Default for Pose2 {
    fn default() -> Self {
        Self {
            position: DVec2::ZERO,
            angle: 0.0,
        }
    }
}

impl Pose2 {
    pub fn new(position: DVec2, angle: f64) -> Self {
        Self { position, angle }
    }

    pub fn from_position(position: DVec2) -> Self {
        Self::new(position, 0.0)
    }

    pub fn rotate_body_to_world(&self, v: DVec2) -> DVec2 {
        DVec2::from_angle(self.angle).rotate(v)
    }

    pub fn rotate_world_to_body(&self, v: DVec2) -> DVec2 {
        DVec2::from_angle(-self.angle).rotate(v)
    }

    pub fn body_to_world(&self, p: DVec2) -> DVec2 {
        self.position + self.rotate_body_to_world(p)
    }

    pub fn world_to_body(&self, p: DVec2) -> DVec2 {
        self.rotate_world_to_body(p - self.position)
    }

    /// Moves the pose by a world-space offset and a rotation increment.
    pub fn translated(&self, offset: DVec2, delta_angle: f64) -> Self {
        Self::new(self.position + offset, self.angle + delta_angle)
    }
}
