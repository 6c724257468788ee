use std::collections::HashSet;
use std::f64::consts::{PI, TAU};

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::{edge::Edge, types::Pose2};
use crate::{
    config::DEFAULT_DISTANCE_TOL,
    error::{CollisionError, Result},
    utils::allocator::BodyId,
};

/// Direction of the ray used by [`Body::probably_point_inside`]. Slightly
/// off-axis so it rarely grazes the corners of axis-aligned shapes.
const INSIDE_RAY_ANGLE: f64 = 0.1234;

/// Points sampled per arc when estimating the area centroid.
const ARC_CENTROID_SAMPLES: usize = 8;

/// A corner or decoration point of a body's boundary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    pub index: usize,
    /// Location in body coordinates.
    pub location: DVec2,
    pub edge1: usize,
    /// Second adjoining edge, absent at the ends of an open chain.
    pub edge2: Option<usize>,
    /// `false` for decoration points in the middle of a curved edge.
    pub endpoint: bool,
}

impl Vertex {
    pub fn is_endpoint(&self) -> bool {
        self.endpoint
    }
}

/// Identifies one edge of one body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeRef {
    pub body: BodyId,
    pub edge: usize,
}

impl EdgeRef {
    pub fn new(body: BodyId, edge: usize) -> Self {
        Self { body, edge }
    }
}

/// Bodies and edges a body never collides with.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NonCollideSet {
    bodies: HashSet<BodyId>,
    edges: HashSet<EdgeRef>,
}

impl NonCollideSet {
    pub fn add_body(&mut self, body: BodyId) {
        self.bodies.insert(body);
    }

    pub fn add_edge(&mut self, edge: EdgeRef) {
        self.edges.insert(edge);
    }

    pub fn excludes_body(&self, body: BodyId) -> bool {
        self.bodies.contains(&body)
    }

    /// An edge is excluded on its own or through its whole body.
    pub fn excludes_edge(&self, body: BodyId, edge: usize) -> bool {
        self.bodies.contains(&body) || self.edges.contains(&EdgeRef::new(body, edge))
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty() && self.edges.is_empty()
    }
}

/// A rigid body as seen by collision detection.
///
/// Geometry is expressed in body coordinates; `pose` maps it into the
/// world. A body whose mass is infinite is fixed and never moves.
#[derive(Debug, Clone)]
pub struct Body {
    pub id: BodyId,
    pub name: String,
    pub mass: f64,
    pub pose: Pose2,
    old_pose: Option<Pose2>,
    vertices: Vec<Vertex>,
    edges: Vec<Edge>,
    centroid: DVec2,
    centroid_radius: f64,
    pub distance_tol: f64,
    explicit_tol: bool,
    special_normal: Option<DVec2>,
    special_extent: f64,
    pub non_collide: NonCollideSet,
    closed: bool,
}

impl Body {
    fn from_parts(name: &str, vertices: Vec<Vertex>, edges: Vec<Edge>, closed: bool) -> Self {
        let centroid = if closed {
            area_centroid(&edges)
        } else {
            mean_point(vertices.iter().map(|v| v.location))
        };
        let centroid_radius = edges
            .iter()
            .map(|e| e.max_distance_from(centroid))
            .fold(0.0, f64::max);
        Self {
            id: BodyId::default(),
            name: name.to_owned(),
            mass: 1.0,
            pose: Pose2::default(),
            old_pose: None,
            vertices,
            edges,
            centroid,
            centroid_radius,
            distance_tol: DEFAULT_DISTANCE_TOL,
            explicit_tol: false,
            special_normal: None,
            special_extent: 0.0,
            non_collide: NonCollideSet::default(),
            closed,
        }
    }

    /// Closed polygon with straight edges. Clockwise input is reversed.
    pub fn polygon(name: &str, points: &[DVec2]) -> Result<Self> {
        if points.len() < 3 {
            return Err(CollisionError::InvalidShape(format!(
                "polygon {name} needs at least 3 points, got {}",
                points.len()
            )));
        }
        if signed_area(points).abs() < 1e-12 {
            return Err(CollisionError::InvalidShape(format!(
                "polygon {name} has zero area"
            )));
        }
        Ok(Self::closed_polygon(name, points))
    }

    fn closed_polygon(name: &str, points: &[DVec2]) -> Self {
        let mut points = points.to_vec();
        if signed_area(&points) < 0.0 {
            points.reverse();
        }
        let n = points.len();
        let edges = (0..n)
            .map(|i| Edge::straight(i, points[i], points[(i + 1) % n]))
            .collect();
        let vertices = (0..n)
            .map(|i| Vertex {
                index: i,
                location: points[i],
                edge1: (i + n - 1) % n,
                edge2: Some(i),
                endpoint: true,
            })
            .collect();
        Self::from_parts(name, vertices, edges, true)
    }

    /// Axis-aligned rectangle centered on the body origin.
    pub fn rectangle(name: &str, width: f64, height: f64) -> Self {
        let (hw, hh) = (width * 0.5, height * 0.5);
        Self::closed_polygon(
            name,
            &[
                DVec2::new(-hw, -hh),
                DVec2::new(hw, -hh),
                DVec2::new(hw, hh),
                DVec2::new(-hw, hh),
            ],
        )
    }

    /// Long thin rectangle whose outside face points along `outward`, with
    /// `outward` recorded as the body's special normal.
    pub fn wall(name: &str, length: f64, thickness: f64, outward: DVec2) -> Self {
        let n = outward.normalize_or(DVec2::Y);
        let t = DVec2::new(n.y, -n.x);
        let (hl, ht) = (length * 0.5, thickness * 0.5);
        Self::closed_polygon(
            name,
            &[
                -t * hl - n * ht,
                t * hl - n * ht,
                t * hl + n * ht,
                -t * hl + n * ht,
            ],
        )
        .with_special_normal(n)
    }

    /// Circle made of two convex half arcs, each decorated with `midpoints`
    /// non-endpoint vertices.
    pub fn circle(name: &str, radius: f64, midpoints: usize) -> Self {
        let edges = vec![
            Edge::arc(0, DVec2::ZERO, radius, 0.0, PI, true),
            Edge::arc(1, DVec2::ZERO, radius, PI, PI, true),
        ];
        let mut vertices = vec![
            Vertex {
                index: 0,
                location: DVec2::new(radius, 0.0),
                edge1: 1,
                edge2: Some(0),
                endpoint: true,
            },
            Vertex {
                index: 1,
                location: DVec2::new(-radius, 0.0),
                edge1: 0,
                edge2: Some(1),
                endpoint: true,
            },
        ];
        for (arc, start) in [(0usize, 0.0), (1, PI)] {
            for k in 1..=midpoints {
                let angle = start + PI * k as f64 / (midpoints + 1) as f64;
                vertices.push(Vertex {
                    index: vertices.len(),
                    location: DVec2::from_angle(angle) * radius,
                    edge1: arc,
                    edge2: Some(arc),
                    endpoint: false,
                });
            }
        }
        Self::from_parts(name, vertices, edges, true)
    }

    /// Open polyline. Its two end vertices have a single adjoining edge.
    pub fn open_chain(name: &str, points: &[DVec2]) -> Result<Self> {
        if points.len() < 2 {
            return Err(CollisionError::InvalidShape(format!(
                "chain {name} needs at least 2 points, got {}",
                points.len()
            )));
        }
        let last_edge = points.len() - 2;
        let edges = points
            .windows(2)
            .enumerate()
            .map(|(i, w)| Edge::straight(i, w[0], w[1]))
            .collect();
        let vertices = points
            .iter()
            .enumerate()
            .map(|(i, &location)| {
                let (edge1, edge2) = match i {
                    0 => (0, None),
                    i if i == last_edge + 1 => (last_edge, None),
                    i => (i - 1, Some(i)),
                };
                Vertex {
                    index: i,
                    location,
                    edge1,
                    edge2,
                    endpoint: true,
                }
            })
            .collect();
        Ok(Self::from_parts(name, vertices, edges, false))
    }

    pub fn with_mass(mut self, mass: f64) -> Self {
        self.mass = mass;
        self
    }

    pub fn fixed(self) -> Self {
        self.with_mass(f64::INFINITY)
    }

    pub fn with_pose(mut self, pose: Pose2) -> Self {
        self.pose = pose;
        self
    }

    pub fn with_distance_tol(mut self, distance_tol: f64) -> Self {
        self.distance_tol = distance_tol;
        self.explicit_tol = true;
        self
    }

    /// Whether the tolerance was set with [`Body::with_distance_tol`]
    /// rather than left at the default.
    pub fn has_explicit_distance_tol(&self) -> bool {
        self.explicit_tol
    }

    /// Sets the special normal, given in body coordinates.
    pub fn with_special_normal(mut self, normal: DVec2) -> Self {
        let n = normal.normalize_or(DVec2::Y);
        self.special_normal = Some(n);
        self.special_extent = extent_along(&self.edges, self.centroid, n);
        self
    }

    pub fn with_non_collide_body(mut self, body: BodyId) -> Self {
        self.non_collide.add_body(body);
        self
    }

    pub fn with_non_collide_edge(mut self, edge: EdgeRef) -> Self {
        self.non_collide.add_edge(edge);
        self
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn is_moveable(&self) -> bool {
        self.mass.is_finite()
    }

    /// Centroid in body coordinates.
    pub fn centroid(&self) -> DVec2 {
        self.centroid
    }

    pub fn centroid_world(&self) -> DVec2 {
        self.pose.body_to_world(self.centroid)
    }

    pub fn centroid_radius(&self) -> f64 {
        self.centroid_radius
    }

    pub fn special_normal(&self) -> Option<DVec2> {
        self.special_normal
    }

    /// How far the body reaches past its centroid along the special
    /// normal. Zero without one.
    pub fn special_extent(&self) -> f64 {
        self.special_extent
    }

    pub fn special_normal_world(&self) -> Option<DVec2> {
        self.special_normal
            .map(|n| self.pose.rotate_body_to_world(n))
    }

    pub fn old_pose(&self) -> Option<&Pose2> {
        self.old_pose.as_ref()
    }

    /// Snapshots the current pose as the previous-timestep pose.
    pub fn save_old_pose(&mut self) {
        self.old_pose = Some(self.pose);
    }

    pub fn erase_old_pose(&mut self) {
        self.old_pose = None;
    }

    /// Upper bound on how far any point of the body moved since the old
    /// pose was saved; zero without an old pose.
    pub fn max_travel(&self) -> f64 {
        match self.old_pose {
            Some(old) => {
                let moved = self.centroid_world().distance(old.body_to_world(self.centroid));
                moved + (self.pose.angle - old.angle).abs() * self.centroid_radius
            }
            None => 0.0,
        }
    }

    /// Whether `p` (body coordinates) is inside this body, by counting
    /// crossings of a ray leaving the body. Open chains contain nothing.
    pub fn probably_point_inside(&self, p: DVec2) -> bool {
        if !self.closed {
            return false;
        }
        let reach = p.distance(self.centroid) + self.centroid_radius + 1.0;
        let far = p + DVec2::from_angle(INSIDE_RAY_ANGLE) * reach;
        let crossings: usize = self.edges.iter().map(|e| e.intersect(p, far).len()).sum();
        crossings % 2 == 1
    }
}

fn signed_area(points: &[DVec2]) -> f64 {
    let n = points.len();
    (0..n)
        .map(|i| points[i].perp_dot(points[(i + 1) % n]))
        .sum::<f64>()
        * 0.5
}

fn mean_point(points: impl Iterator<Item = DVec2>) -> DVec2 {
    let (sum, count) = points.fold((DVec2::ZERO, 0usize), |(s, c), p| (s + p, c + 1));
    if count == 0 {
        DVec2::ZERO
    } else {
        sum / count as f64
    }
}

fn boundary_samples(edges: &[Edge]) -> Vec<DVec2> {
    use super::edge::EdgeShape;

    let mut samples = Vec::new();
    for edge in edges {
        match edge.shape {
            EdgeShape::Straight { start, .. } => samples.push(start),
            EdgeShape::Arc {
                center,
                radius,
                start_angle,
                sweep,
                outward,
            } => {
                // concave arcs are walked clockwise along the boundary
                for k in 0..ARC_CENTROID_SAMPLES {
                    let f = k as f64 / ARC_CENTROID_SAMPLES as f64;
                    let angle = if outward {
                        start_angle + sweep * f
                    } else {
                        start_angle + sweep * (1.0 - f)
                    };
                    samples.push(center + DVec2::from_angle(angle % TAU) * radius);
                }
            }
        }
    }
    samples
}

/// Largest `(p - origin)·n` over the boundary. Arcs are bounded by their
/// full circle.
fn extent_along(edges: &[Edge], origin: DVec2, n: DVec2) -> f64 {
    use super::edge::EdgeShape;

    edges
        .iter()
        .map(|edge| match edge.shape {
            EdgeShape::Straight { start, end } => {
                (start - origin).dot(n).max((end - origin).dot(n))
            }
            EdgeShape::Arc { center, radius, .. } => (center - origin).dot(n) + radius,
        })
        .fold(f64::NEG_INFINITY, f64::max)
}

fn area_centroid(edges: &[Edge]) -> DVec2 {
    let points = boundary_samples(edges);
    let n = points.len();
    let mut area = 0.0;
    let mut weighted = DVec2::ZERO;
    for i in 0..n {
        let (a, b) = (points[i], points[(i + 1) % n]);
        let cross = a.perp_dot(b);
        area += cross;
        weighted += (a + b) * cross;
    }
    if area.abs() < 1e-12 {
        return mean_point(points.into_iter());
    }
    weighted / (3.0 * area)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn rectangle_has_centroid_at_origin_and_tight_radius() {
        let body = Body::rectangle("box", 2.0, 1.0);
        assert_relative_eq!(body.centroid().x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(body.centroid().y, 0.0, epsilon = 1e-12);
        let corner = DVec2::new(1.0, 0.5).length();
        assert_relative_eq!(body.centroid_radius(), corner, epsilon = 1e-12);
        assert_eq!(body.vertices().len(), 4);
        assert!(body.vertices().iter().all(|v| v.edge2.is_some()));
    }

    #[test]
    fn clockwise_polygon_is_reoriented() {
        let cw = [
            DVec2::new(0.0, 0.0),
            DVec2::new(0.0, 1.0),
            DVec2::new(1.0, 1.0),
            DVec2::new(1.0, 0.0),
        ];
        let body = Body::polygon("cw", &cw).unwrap();
        // every outward normal points away from the centroid
        for edge in body.edges() {
            let mid = edge.centroid();
            assert!(edge.normal_at(mid).dot(mid - body.centroid()) > 0.0);
        }
    }

    #[test]
    fn degenerate_shapes_are_rejected() {
        assert!(Body::polygon("two", &[DVec2::ZERO, DVec2::X]).is_err());
        assert!(Body::polygon("flat", &[DVec2::ZERO, DVec2::X, DVec2::X * 2.0]).is_err());
        assert!(Body::open_chain("one", &[DVec2::ZERO]).is_err());
    }

    #[test]
    fn open_chain_ends_have_single_edge() {
        let chain = Body::open_chain(
            "chain",
            &[DVec2::ZERO, DVec2::new(1.0, 0.0), DVec2::new(2.0, 1.0)],
        )
        .unwrap();
        let v = chain.vertices();
        assert_eq!(v[0].edge2, None);
        assert_eq!(v[1].edge1, 0);
        assert_eq!(v[1].edge2, Some(1));
        assert_eq!(v[2].edge1, 1);
        assert_eq!(v[2].edge2, None);
        assert!(!chain.is_closed());
        assert!(!chain.probably_point_inside(DVec2::new(1.0, 0.1)));
    }

    #[test]
    fn circle_has_decorated_midpoints() {
        let body = Body::circle("ball", 0.5, 3);
        assert_eq!(body.vertices().len(), 8);
        assert_eq!(body.vertices().iter().filter(|v| !v.endpoint).count(), 6);
        assert_relative_eq!(body.centroid().length(), 0.0, epsilon = 1e-9);
        assert!(body.centroid_radius() >= 0.5 - 1e-9);
    }

    #[test]
    fn point_inside_uses_crossings() {
        let square = Body::rectangle("sq", 1.0, 1.0);
        assert!(square.probably_point_inside(DVec2::new(0.1, 0.2)));
        assert!(!square.probably_point_inside(DVec2::new(0.8, 0.2)));

        let ball = Body::circle("ball", 1.0, 0);
        assert!(ball.probably_point_inside(DVec2::new(0.5, -0.5)));
        assert!(!ball.probably_point_inside(DVec2::new(0.9, 0.9)));
    }

    #[test]
    fn wall_carries_world_special_normal() {
        let wall = Body::wall("floor", 10.0, 1.0, DVec2::Y)
            .with_pose(Pose2::new(DVec2::ZERO, std::f64::consts::FRAC_PI_2));
        let n = wall.special_normal_world().unwrap();
        assert_relative_eq!(n.x, -1.0, epsilon = 1e-12);
        assert_relative_eq!(n.y, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn wall_extent_is_half_its_thickness() {
        let wall = Body::wall("floor", 100.0, 1.0, DVec2::Y);
        assert_relative_eq!(wall.special_extent(), 0.5, epsilon = 1e-12);
        assert!(wall.centroid_radius() > 50.0);

        let tilted = Body::wall("ramp", 10.0, 2.0, DVec2::new(1.0, 1.0));
        assert_relative_eq!(tilted.special_extent(), 1.0, epsilon = 1e-12);

        let ball = Body::circle("ball", 0.5, 0).with_special_normal(DVec2::X);
        assert_relative_eq!(ball.special_extent(), 0.5, epsilon = 1e-12);
        assert_eq!(Body::rectangle("box", 1.0, 1.0).special_extent(), 0.0);
    }

    #[test]
    fn max_travel_bounds_rotation_and_translation() {
        let mut body = Body::rectangle("box", 1.0, 1.0);
        assert_eq!(body.max_travel(), 0.0);
        body.save_old_pose();
        body.pose = body.pose.translated(DVec2::new(0.3, 0.4), 0.1);
        let expected = 0.5 + 0.1 * body.centroid_radius();
        assert_relative_eq!(body.max_travel(), expected, epsilon = 1e-12);
    }

    #[test]
    fn non_collide_body_excludes_all_its_edges() {
        let mut set = NonCollideSet::default();
        let other = BodyId::from_index(4);
        set.add_edge(EdgeRef::new(BodyId::from_index(2), 1));
        assert!(set.excludes_edge(BodyId::from_index(2), 1));
        assert!(!set.excludes_edge(BodyId::from_index(2), 0));
        set.add_body(other);
        assert!(set.excludes_edge(other, 7));
    }
}
