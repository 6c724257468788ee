use glam::DVec2;
use log::{log, warn, Level};

use super::{contact::Collision, dedup::add_collision};
use crate::{
    config::{CollisionConfig, PenetrationPolicy},
    core::{
        body::{Body, Vertex},
        edge::Edge,
        types::Pose2,
    },
    error::{CollisionError, Result},
    utils::profiling::DetectionMetrics,
};

/// How vertex paths are reconstructed for a pair of bodies.
#[derive(Debug, Clone, Copy)]
enum Sweep {
    /// Neither body has an old pose; vertices are tested where they are.
    Static,
    Swept { host_old: Pose2, body_old: Pose2 },
}

impl Sweep {
    fn between(host: &Body, body: &Body) -> Result<Self> {
        match (host.old_pose(), body.old_pose()) {
            (Some(&host_old), Some(&body_old)) => Ok(Sweep::Swept { host_old, body_old }),
            (None, None) => Ok(Sweep::Static),
            (Some(_), None) => Err(CollisionError::MismatchedOldPose {
                with_old: host.id,
                without_old: body.id,
            }),
            (None, Some(_)) => Err(CollisionError::MismatchedOldPose {
                with_old: body.id,
                without_old: host.id,
            }),
        }
    }
}

/// Result of testing one vertex against every edge of a host body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VertexOutcome {
    /// Excluded through the host's non-collide set.
    Skipped,
    /// Too far from the host to touch it.
    Distant,
    /// Near the host, but neither crossing nor touching an edge.
    Clear,
    /// At least one static contact was registered.
    Contact,
    /// The vertex crossed an edge and a collision was registered.
    Collision,
    /// The vertex is inside the host but crossed none of its edges.
    UndetectedPenetration,
}

/// Vertex/edge tester for one detection pass at a given simulation time.
pub struct NarrowPhase<'a> {
    config: &'a CollisionConfig,
    time: f64,
    minimum_travel: f64,
}

impl<'a> NarrowPhase<'a> {
    pub fn new(config: &'a CollisionConfig, time: f64) -> Self {
        Self {
            config,
            time,
            minimum_travel: config.minimum_travel_bound(),
        }
    }

    /// Tests the vertices of each body against the edges of the other.
    pub fn test_pair(
        &self,
        a: &Body,
        b: &Body,
        list: &mut Vec<Collision>,
        metrics: &mut DetectionMetrics,
    ) -> Result<()> {
        self.test_vertices(a, b, list, metrics)?;
        self.test_vertices(b, a, list, metrics)
    }

    /// Tests every vertex of `body` against the edges of `host`, adding the
    /// resulting collisions and contacts to `list`.
    pub fn test_vertices(
        &self,
        host: &Body,
        body: &Body,
        list: &mut Vec<Collision>,
        metrics: &mut DetectionMetrics,
    ) -> Result<()> {
        let sweep = Sweep::between(host, body)?;
        for vertex in body.vertices() {
            let outcome = self.test_vertex(host, body, vertex, sweep, Level::Trace, list, metrics)?;
            if outcome != VertexOutcome::UndetectedPenetration {
                continue;
            }
            match self.config.penetration_policy {
                PenetrationPolicy::Tolerate => {
                    metrics.undetected_penetrations += 1;
                    warn!(
                        "vertex {} of {} is inside {} without crossing an edge",
                        vertex.index, body.name, host.name
                    );
                }
                PenetrationPolicy::Strict => {
                    warn!(
                        "vertex {} of {} is inside {} without crossing an edge, re-running verbosely",
                        vertex.index, body.name, host.name
                    );
                    // the re-run is diagnostic only and stays out of the counters
                    let mut scratch = DetectionMetrics::default();
                    let rerun = self.test_vertex(
                        host,
                        body,
                        vertex,
                        sweep,
                        Level::Debug,
                        list,
                        &mut scratch,
                    )?;
                    if rerun == VertexOutcome::UndetectedPenetration {
                        metrics.undetected_penetrations += 1;
                        return Err(CollisionError::UndetectedPenetration {
                            vertex: vertex.index,
                            body: body.id,
                            host: host.id,
                        });
                    }
                }
            }
        }
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn test_vertex(
        &self,
        host: &Body,
        body: &Body,
        vertex: &Vertex,
        sweep: Sweep,
        level: Level,
        list: &mut Vec<Collision>,
        metrics: &mut DetectionMetrics,
    ) -> Result<VertexOutcome> {
        metrics.vertices_tested += 1;
        let excluded = |edge: usize| host.non_collide.excludes_edge(body.id, edge);
        if excluded(vertex.edge1) && vertex.edge2.map_or(true, excluded) {
            metrics.vertices_skipped_non_collide += 1;
            log!(level, "vertex {} of {}: adjoining edges excluded", vertex.index, body.name);
            return Ok(VertexOutcome::Skipped);
        }

        let now = host
            .pose
            .world_to_body(body.pose.body_to_world(vertex.location));
        let (old, travel) = match sweep {
            Sweep::Static => (now, self.config.unknown_travel_distance),
            Sweep::Swept { host_old, body_old } => {
                let old = host_old.world_to_body(body_old.body_to_world(vertex.location));
                let d2 = now.distance_squared(old);
                let travel = if d2 > self.config.sqrt_threshold {
                    metrics.square_roots += 1;
                    d2.sqrt()
                } else {
                    self.minimum_travel
                };
                (old, travel)
            }
        };
        let tol = host.distance_tol.max(body.distance_tol);

        if self.far_from_host(host, now, tol, travel) {
            metrics.vertices_rejected_proximity += 1;
            log!(level, "vertex {} of {}: far from {}", vertex.index, body.name, host.name);
            return Ok(VertexOutcome::Distant);
        }

        let mut first_crossing: Option<(f64, &Edge, DVec2)> = None;
        let mut touched = false;
        for edge in host.edges() {
            if body.non_collide.excludes_edge(host.id, edge.index) {
                continue;
            }
            let reach = edge.centroid_radius() + tol + travel;
            if now.distance_squared(edge.centroid()) > reach * reach {
                metrics.edges_rejected_proximity += 1;
                continue;
            }
            metrics.edge_intersection_tests += 1;
            let hits = edge.intersect(old, now);
            if hits.is_empty() {
                // a midpoint passing close to an edge is left to edge/edge contacts
                if !vertex.endpoint {
                    continue;
                }
                if let Some(found) = edge.find_vertex_contact(now, tol) {
                    log!(
                        level,
                        "vertex {} of {}: contact with edge {} of {} at distance {:.6}",
                        vertex.index,
                        body.name,
                        edge.index,
                        host.name,
                        found.distance
                    );
                    let contact =
                        Collision::contact_from_vertex(body, vertex, host, edge, found, now, self.time);
                    metrics.contacts_found += 1;
                    add_collision(list, contact, self.config, metrics)?;
                    touched = true;
                }
                continue;
            }
            // a fast vertex may cross several edges; the one nearest the old
            // position is crossed first
            for hit in hits {
                let d2 = hit.distance_squared(old);
                if first_crossing.map_or(true, |(best, _, _)| d2 < best) {
                    first_crossing = Some((d2, edge, hit));
                }
            }
        }

        if let Some((_, edge, hit)) = first_crossing {
            let collision = Collision::from_vertex_edge(body, vertex, host, edge, hit, now, self.time);
            log!(
                level,
                "vertex {} of {}: crossed edge {} of {}, distance {:.6}",
                vertex.index,
                body.name,
                edge.index,
                host.name,
                collision.distance
            );
            metrics.collisions_found += 1;
            add_collision(list, collision, self.config, metrics)?;
            return Ok(VertexOutcome::Collision);
        }

        // walls may overlap their neighbours, leaving vertices inside one wall
        // while the other reports the collision
        if !touched && host.special_normal().is_none() && host.probably_point_inside(now) {
            log!(
                level,
                "vertex {} of {}: inside {} at {:?} (old {:?}) with no crossing",
                vertex.index,
                body.name,
                host.name,
                now,
                old
            );
            return Ok(VertexOutcome::UndetectedPenetration);
        }
        Ok(if touched {
            VertexOutcome::Contact
        } else {
            VertexOutcome::Clear
        })
    }

    fn far_from_host(&self, host: &Body, now: DVec2, tol: f64, travel: f64) -> bool {
        let offset = now - host.centroid();
        match host.special_normal() {
            Some(n) => offset.dot(n) > host.special_extent() + tol,
            None => {
                let reach = host.centroid_radius() + tol + travel;
                offset.length_squared() > reach * reach
            }
        }
    }
}
