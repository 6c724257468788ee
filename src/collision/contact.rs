use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::{
    config::CollisionConfig,
    core::{
        body::{Body, Vertex},
        edge::{Edge, EdgeContact},
    },
    utils::allocator::BodyId,
};

/// Where a collision record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Provenance {
    /// A vertex of the primary body against an edge of the normal body.
    VertexEdge { vertex: usize, edge: usize },
    Joint,
    /// Built by the host application.
    External,
}

/// A collision (interpenetration needing an impulse) or a contact
/// (persistent near-touching needing a contact force) between two bodies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collision {
    /// Body whose vertex is involved.
    pub primary_body: BodyId,
    /// Body whose edge defines the normal.
    pub normal_body: BodyId,
    /// Signed gap; negative means overlap.
    pub distance: f64,
    /// World-space unit normal pointing out of the normal body.
    pub normal: DVec2,
    /// World-space point of impact.
    pub impact_point: DVec2,
    pub radius_of_curvature: f64,
    pub ball_normal: bool,
    pub joint: bool,
    pub contact: bool,
    pub detected_time: f64,
    pub provenance: Provenance,
}

impl Collision {
    /// Record for a host-built collision with a flat normal.
    pub fn new(
        primary_body: BodyId,
        normal_body: BodyId,
        impact_point: DVec2,
        normal: DVec2,
        distance: f64,
        detected_time: f64,
    ) -> Self {
        Self {
            primary_body,
            normal_body,
            distance,
            normal,
            impact_point,
            radius_of_curvature: f64::INFINITY,
            ball_normal: false,
            joint: false,
            contact: false,
            detected_time,
            provenance: Provenance::External,
        }
    }

    /// Builds the record for `vertex` of `primary` having crossed `edge` of
    /// `normal_body`.
    ///
    /// `intersection` is the crossing point and `now` the vertex's current
    /// location, both in the normal body's coordinates. The distance is
    /// measured from `now` and may come out slightly positive: the vertex
    /// can end the step inside the contact zone while moving too fast to
    /// stay there.
    pub fn from_vertex_edge(
        primary: &Body,
        vertex: &Vertex,
        normal_body: &Body,
        edge: &Edge,
        intersection: DVec2,
        now: DVec2,
        time: f64,
    ) -> Self {
        let radius_of_curvature = edge.radius_of_curvature_at(intersection);
        Self {
            primary_body: primary.id,
            normal_body: normal_body.id,
            distance: edge.distance_to_line(now),
            normal: normal_body
                .pose
                .rotate_body_to_world(edge.normal_at(intersection)),
            impact_point: normal_body.pose.body_to_world(now),
            radius_of_curvature,
            ball_normal: radius_of_curvature.is_finite(),
            joint: false,
            contact: false,
            detected_time: time,
            provenance: Provenance::VertexEdge {
                vertex: vertex.index,
                edge: edge.index,
            },
        }
    }

    /// Builds a contact record from a static proximity test.
    pub fn contact_from_vertex(
        primary: &Body,
        vertex: &Vertex,
        normal_body: &Body,
        edge: &Edge,
        found: EdgeContact,
        now: DVec2,
        time: f64,
    ) -> Self {
        Self {
            primary_body: primary.id,
            normal_body: normal_body.id,
            distance: found.distance,
            normal: normal_body.pose.rotate_body_to_world(found.normal),
            impact_point: normal_body.pose.body_to_world(now),
            radius_of_curvature: found.radius_of_curvature,
            ball_normal: found.radius_of_curvature.is_finite(),
            joint: false,
            contact: true,
            detected_time: time,
            provenance: Provenance::VertexEdge {
                vertex: vertex.index,
                edge: edge.index,
            },
        }
    }

    pub fn is_joint(&self) -> bool {
        self.joint
    }

    pub fn is_contact(&self) -> bool {
        self.contact
    }

    pub fn is_penetrating(&self) -> bool {
        self.distance < 0.0
    }

    pub fn has_body(&self, body: BodyId) -> bool {
        self.primary_body == body || self.normal_body == body
    }

    /// Whether both records are about the same pair of bodies (in either
    /// role) at nearby points with nearly parallel normals.
    ///
    /// The relation is not transitive: a chain of records each close to the
    /// next can span any distance.
    pub fn similar_to(&self, other: &Collision, config: &CollisionConfig) -> bool {
        if self.is_joint() || other.is_joint() {
            return false;
        }
        if !other.has_body(self.primary_body) || !other.has_body(self.normal_body) {
            return false;
        }
        if self.impact_point.distance(other.impact_point) > config.similarity_distance {
            return false;
        }
        self.normal.dot(other.normal).abs() >= config.similarity_normal_cos
    }
}
