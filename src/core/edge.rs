use glam::DVec2;
use serde::{Deserialize, Serialize};
use std::f64::consts::{PI, TAU};

const PARALLEL_EPSILON: f64 = 1e-14;
const ANGLE_EPSILON: f64 = 1e-12;

/// Geometry of a single edge, in body coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EdgeShape {
    /// Line segment. The outside of the body is to the right when walking
    /// from `start` to `end`, which is the case for counter-clockwise
    /// polygons.
    Straight { start: DVec2, end: DVec2 },
    /// Circular arc covering `sweep` radians counter-clockwise from
    /// `start_angle`. When `outward` is set the body lies inside the
    /// circle (convex edge), otherwise outside of it (concave edge).
    Arc {
        center: DVec2,
        radius: f64,
        start_angle: f64,
        sweep: f64,
        outward: bool,
    },
}

/// A static proximity contact between a point and an edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeContact {
    /// Signed distance from the point to the edge, negative inside the body.
    pub distance: f64,
    /// Outward normal at the point, in body coordinates.
    pub normal: DVec2,
    pub radius_of_curvature: f64,
}

/// An edge of a body, with a cached bounding circle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub index: usize,
    pub shape: EdgeShape,
    centroid: DVec2,
    centroid_radius: f64,
}

impl Edge {
    pub fn new(index: usize, shape: EdgeShape) -> Self {
        let (centroid, centroid_radius) = bounding_circle(&shape);
        Self {
            index,
            shape,
            centroid,
            centroid_radius,
        }
    }

    pub fn straight(index: usize, start: DVec2, end: DVec2) -> Self {
        Self::new(index, EdgeShape::Straight { start, end })
    }

    pub fn arc(
        index: usize,
        center: DVec2,
        radius: f64,
        start_angle: f64,
        sweep: f64,
        outward: bool,
    ) -> Self {
        Self::new(
            index,
            EdgeShape::Arc {
                center,
                radius,
                start_angle,
                sweep,
                outward,
            },
        )
    }

    /// Center of the edge's bounding circle, in body coordinates.
    pub fn centroid(&self) -> DVec2 {
        self.centroid
    }

    pub fn centroid_radius(&self) -> f64 {
        self.centroid_radius
    }

    /// Largest distance from `p` to any point of the edge, or a bound on it
    /// for arcs.
    pub fn max_distance_from(&self, p: DVec2) -> f64 {
        match self.shape {
            EdgeShape::Straight { start, end } => p.distance(start).max(p.distance(end)),
            EdgeShape::Arc { .. } => p.distance(self.centroid) + self.centroid_radius,
        }
    }

    /// Signed distance from `p` to the line (or circle) carrying this edge.
    /// Positive is outside the body.
    pub fn distance_to_line(&self, p: DVec2) -> f64 {
        match self.shape {
            EdgeShape::Straight { start, end } => (p - start).dot(straight_normal(start, end)),
            EdgeShape::Arc {
                center,
                radius,
                outward,
                ..
            } => {
                let d = p.distance(center) - radius;
                if outward {
                    d
                } else {
                    -d
                }
            }
        }
    }

    /// Outward unit normal of the edge nearest to `p`, in body coordinates.
    pub fn normal_at(&self, p: DVec2) -> DVec2 {
        match self.shape {
            EdgeShape::Straight { start, end } => straight_normal(start, end),
            EdgeShape::Arc {
                center, outward, ..
            } => {
                let n = (p - center).normalize_or_zero();
                if outward {
                    n
                } else {
                    -n
                }
            }
        }
    }

    /// Radius of curvature at `p`: infinite for straight edges, positive for
    /// convex arcs and negative for concave arcs.
    pub fn radius_of_curvature_at(&self, _p: DVec2) -> f64 {
        match self.shape {
            EdgeShape::Straight { .. } => f64::INFINITY,
            EdgeShape::Arc {
                radius, outward, ..
            } => {
                if outward {
                    radius
                } else {
                    -radius
                }
            }
        }
    }

    /// Intersections of the segment `p1 -> p2` with this edge, ordered by
    /// distance from `p1`. A degenerate segment never intersects.
    pub fn intersect(&self, p1: DVec2, p2: DVec2) -> Vec<DVec2> {
        let mut points = Vec::new();
        let r = p2 - p1;
        if r.length_squared() <= PARALLEL_EPSILON {
            return points;
        }
        match self.shape {
            EdgeShape::Straight { start, end } => {
                let s = end - start;
                let denom = r.perp_dot(s);
                if denom.abs() < PARALLEL_EPSILON {
                    return points;
                }
                let q = start - p1;
                let t = q.perp_dot(s) / denom;
                let u = q.perp_dot(r) / denom;
                if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u) {
                    points.push(p1 + r * t);
                }
            }
            EdgeShape::Arc { center, radius, .. } => {
                let f = p1 - center;
                let a = r.length_squared();
                let b = 2.0 * f.dot(r);
                let c = f.length_squared() - radius * radius;
                let discriminant = b * b - 4.0 * a * c;
                if discriminant < 0.0 {
                    return points;
                }
                let root = discriminant.sqrt();
                let t1 = (-b - root) / (2.0 * a);
                let t2 = (-b + root) / (2.0 * a);
                for t in [t1, t2] {
                    if !(0.0..=1.0).contains(&t) {
                        continue;
                    }
                    let p = p1 + r * t;
                    if self.covers_angle_of(p) && points.last() != Some(&p) {
                        points.push(p);
                    }
                }
            }
        }
        points
    }

    /// Static proximity test: returns a contact when `p` lies within
    /// `distance_tol` of the edge, on either side, and alongside it.
    pub fn find_vertex_contact(&self, p: DVec2, distance_tol: f64) -> Option<EdgeContact> {
        let alongside = match self.shape {
            EdgeShape::Straight { start, end } => {
                let s = end - start;
                let len2 = s.length_squared();
                if len2 <= PARALLEL_EPSILON {
                    return None;
                }
                (0.0..=1.0).contains(&((p - start).dot(s) / len2))
            }
            EdgeShape::Arc { .. } => self.covers_angle_of(p),
        };
        if !alongside {
            return None;
        }
        let distance = self.distance_to_line(p);
        if distance.abs() > distance_tol {
            return None;
        }
        Some(EdgeContact {
            distance,
            normal: self.normal_at(p),
            radius_of_curvature: self.radius_of_curvature_at(p),
        })
    }

    fn covers_angle_of(&self, p: DVec2) -> bool {
        match self.shape {
            EdgeShape::Straight { .. } => true,
            EdgeShape::Arc {
                center,
                start_angle,
                sweep,
                ..
            } => {
                if sweep >= TAU - ANGLE_EPSILON {
                    return true;
                }
                let v = p - center;
                let offset = (v.y.atan2(v.x) - start_angle).rem_euclid(TAU);
                offset <= sweep + ANGLE_EPSILON || offset >= TAU - ANGLE_EPSILON
            }
        }
    }
}

fn straight_normal(start: DVec2, end: DVec2) -> DVec2 {
    let d = end - start;
    DVec2::new(d.y, -d.x).normalize_or_zero()
}

fn point_at_angle(center: DVec2, radius: f64, angle: f64) -> DVec2 {
    center + DVec2::from_angle(angle) * radius
}

fn bounding_circle(shape: &EdgeShape) -> (DVec2, f64) {
    match *shape {
        EdgeShape::Straight { start, end } => ((start + end) * 0.5, start.distance(end) * 0.5),
        EdgeShape::Arc {
            center,
            radius,
            start_angle,
            sweep,
            ..
        } => {
            if sweep > PI {
                return (center, radius);
            }
            let p0 = point_at_angle(center, radius, start_angle);
            let p1 = point_at_angle(center, radius, start_angle + sweep);
            let mid = point_at_angle(center, radius, start_angle + sweep * 0.5);
            let centroid = (p0 + p1) * 0.5;
            let r = centroid.distance(p0).max(centroid.distance(mid));
            (centroid, r)
        }
    }
}
