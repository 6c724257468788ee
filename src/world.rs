use std::time::Duration;

use log::{debug, trace};

use crate::{
    collision::{
        broadphase::BroadPhase, contact::Collision, dedup::add_collision,
        narrowphase::NarrowPhase,
    },
    config::CollisionConfig,
    core::{body::Body, constraints::Joint},
    dynamics::island::partition_independent,
    error::{CollisionError, Result},
    utils::{
        allocator::{Arena, BodyId},
        profiling::{DetectionMetrics, ScopedTimer},
    },
};

/// Bodies, joints and tunables for repeated collision detection passes.
///
/// The stepper moves bodies through `body_mut`, calls `save_old_poses`
/// before each trial step and `find_collisions` after it.
#[derive(Debug, Default)]
pub struct CollisionWorld {
    bodies: Arena<Body>,
    joints: Vec<Joint>,
    config: CollisionConfig,
    broadphase: BroadPhase,
    metrics: DetectionMetrics,
}

impl CollisionWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: CollisionConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &CollisionConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: CollisionConfig) {
        self.config = config;
    }

    /// Margin added to every broad-phase pair on top of tolerance and travel.
    pub fn set_broadphase_margin(&mut self, margin: f64) {
        self.broadphase.extra_margin = margin;
    }

    /// Stores a body and returns its id. Bodies without an explicit
    /// distance tolerance get the configured default.
    pub fn add_body(&mut self, mut body: Body) -> BodyId {
        body.id = self.bodies.next_id();
        if !body.has_explicit_distance_tol() {
            body.distance_tol = self.config.default_distance_tol;
        }
        let id = self.bodies.insert(body);
        debug!("added body {id}");
        id
    }

    /// Removes a body together with the joints attached to it.
    pub fn remove_body(&mut self, id: BodyId) -> Option<Body> {
        let removed = self.bodies.remove(id)?;
        self.joints.retain(|joint| joint.primary != id && joint.normal_body != id);
        Some(removed)
    }

    pub fn body(&self, id: BodyId) -> Option<&Body> {
        self.bodies.get(id)
    }

    pub fn body_mut(&mut self, id: BodyId) -> Option<&mut Body> {
        self.bodies.get_mut(id)
    }

    pub fn bodies(&self) -> &Arena<Body> {
        &self.bodies
    }

    pub fn add_joint(&mut self, joint: Joint) -> Result<()> {
        for id in [joint.primary, joint.normal_body] {
            if !self.bodies.contains(id) {
                return Err(CollisionError::UnknownBody(id));
            }
        }
        self.joints.push(joint);
        Ok(())
    }

    pub fn joints(&self) -> &[Joint] {
        &self.joints
    }

    /// Remembers every body's current pose as the start of the next sweep.
    pub fn save_old_poses(&mut self) {
        for (_, body) in self.bodies.iter_mut() {
            body.save_old_pose();
        }
    }

    /// Forgets all old poses; the next pass tests vertices statically.
    pub fn erase_old_poses(&mut self) {
        for (_, body) in self.bodies.iter_mut() {
            body.erase_old_pose();
        }
    }

    /// Runs one detection pass at `time`: joint records first, then the
    /// deduplicated vertex/edge records of every candidate pair.
    pub fn find_collisions(&mut self, time: f64) -> Result<Vec<Collision>> {
        let mut list = Vec::new();
        for joint in &self.joints {
            let record = joint.to_collision(&self.bodies, time)?;
            add_collision(&mut list, record, &self.config, &mut self.metrics)?;
        }

        let mut broad_time = Duration::ZERO;
        let pairs = {
            let _timer = ScopedTimer::new(&mut broad_time);
            self.broadphase
                .candidate_pairs(&self.bodies, &mut self.metrics)
        };
        self.metrics.broad_phase_time += broad_time;
        trace!("{} candidate pair(s) at t={time}", pairs.len());

        let narrow = NarrowPhase::new(&self.config, time);
        let mut narrow_time = Duration::ZERO;
        let outcome = {
            let _timer = ScopedTimer::new(&mut narrow_time);
            pairs.iter().try_for_each(|&(a, b)| {
                match (self.bodies.get(a), self.bodies.get(b)) {
                    (Some(a), Some(b)) => narrow.test_pair(a, b, &mut list, &mut self.metrics),
                    (None, _) => Err(CollisionError::UnknownBody(a)),
                    (_, None) => Err(CollisionError::UnknownBody(b)),
                }
            })
        };
        self.metrics.narrow_phase_time += narrow_time;
        outcome?;

        debug!("{} collision record(s) at t={time}", list.len());
        Ok(list)
    }

    /// Independent groups of `collisions`, linked through this world's
    /// moveable bodies.
    pub fn independent_groups(&self, collisions: &[Collision]) -> Vec<Vec<usize>> {
        partition_independent(collisions, &self.bodies)
    }

    pub fn metrics(&self) -> &DetectionMetrics {
        &self.metrics
    }

    pub fn reset_metrics(&mut self) {
        self.metrics.reset();
    }
}
