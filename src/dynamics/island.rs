//! Grouping of collisions into sets that must be resolved together.
//!
//! Both groupings are fixed-point flood fills over the collision list,
//! with bodies as the adjacency relation: every pass revisits all records
//! not yet in the group and stops once a pass adds nothing. Results are
//! indices into the superset, seed first, then in the order they joined.

use std::collections::HashSet;

use crate::{
    collision::contact::Collision,
    core::body::Body,
    error::{CollisionError, Result},
    utils::allocator::{Arena, BodyId},
};

/// Working state of one flood fill.
struct Fill {
    members: Vec<usize>,
    included: Vec<bool>,
    bodies: HashSet<BodyId>,
}

impl Fill {
    fn new(len: usize) -> Self {
        Self {
            members: Vec::new(),
            included: vec![false; len],
            bodies: HashSet::new(),
        }
    }

    fn take(&mut self, index: usize, collision: &Collision, links: &impl Fn(BodyId) -> bool) {
        self.included[index] = true;
        self.members.push(index);
        for body in [collision.primary_body, collision.normal_body] {
            if links(body) {
                self.bodies.insert(body);
            }
        }
    }

    fn touches(&self, collision: &Collision) -> bool {
        self.bodies.contains(&collision.primary_body) || self.bodies.contains(&collision.normal_body)
    }

    /// Pulls in every accepted record touching the body set until a pass
    /// adds nothing. Bodies of new members join the set when `links` says so.
    fn grow(
        &mut self,
        superset: &[Collision],
        accepts: impl Fn(&Collision) -> bool,
        links: impl Fn(BodyId) -> bool,
    ) {
        loop {
            let mut grew = false;
            for (index, collision) in superset.iter().enumerate() {
                if self.included[index] || !accepts(collision) || !self.touches(collision) {
                    continue;
                }
                self.take(index, collision, &links);
                grew = true;
            }
            if !grew {
                break;
            }
        }
    }
}

/// Collisions connected to the first one through moveable bodies.
///
/// Fixed bodies never link two collisions: everything resting on the same
/// floor is not one group.
pub fn independent_group(superset: &[Collision], bodies: &Arena<Body>) -> Vec<usize> {
    independent_group_by(superset, |id| moveable(bodies, id))
}

/// [`independent_group`] with an explicit moveability test.
pub fn independent_group_by(superset: &[Collision], is_moveable: impl Fn(BodyId) -> bool) -> Vec<usize> {
    let Some(first) = superset.first() else {
        return Vec::new();
    };
    let mut fill = Fill::new(superset.len());
    fill.take(0, first, &is_moveable);
    fill.grow(superset, |_| true, &is_moveable);
    fill.members
}

/// Splits the whole superset into independent groups, each found with
/// [`independent_group`] starting from the first unassigned collision.
pub fn partition_independent(superset: &[Collision], bodies: &Arena<Body>) -> Vec<Vec<usize>> {
    let is_moveable = |id| moveable(bodies, id);
    let mut assigned = vec![false; superset.len()];
    let mut groups = Vec::new();
    while let Some(seed) = assigned.iter().position(|done| !done) {
        let mut fill = Fill::new(superset.len());
        fill.included.clone_from(&assigned);
        fill.take(seed, &superset[seed], &is_moveable);
        fill.grow(superset, |_| true, &is_moveable);
        for &index in &fill.members {
            assigned[index] = true;
        }
        groups.push(fill.members);
    }
    groups
}

/// Collisions that must be solved together with `seed` because joints
/// connect them to its bodies.
///
/// With `hybrid` set, the non-joint collisions touching either seed body
/// whose approach velocity (`velocities[i]`, one entry per superset record)
/// is below `min_velocity` are pulled in first. They widen the result only:
/// their other bodies do not join the working set. Joints touching the
/// working set are then added until none remain.
pub fn joint_closure(
    superset: &[Collision],
    seed: usize,
    hybrid: bool,
    velocities: &[f64],
    min_velocity: f64,
) -> Result<Vec<usize>> {
    let Some(seed_collision) = superset.get(seed) else {
        return Err(CollisionError::SeedOutOfRange {
            seed,
            len: superset.len(),
        });
    };
    if hybrid && velocities.len() != superset.len() {
        return Err(CollisionError::VelocityCountMismatch {
            expected: superset.len(),
            actual: velocities.len(),
        });
    }

    let all = |_: BodyId| true;
    let mut fill = Fill::new(superset.len());
    fill.take(seed, seed_collision, &all);

    if hybrid {
        let none = |_: BodyId| false;
        let (p, n) = (seed_collision.primary_body, seed_collision.normal_body);
        for (index, collision) in superset.iter().enumerate() {
            if fill.included[index] || collision.is_joint() || velocities[index] >= min_velocity {
                continue;
            }
            if collision.has_body(p) || collision.has_body(n) {
                fill.take(index, collision, &none);
            }
        }
    }

    fill.grow(superset, Collision::is_joint, all);
    Ok(fill.members)
}

/// Copies the selected records out of the superset.
pub fn gather(superset: &[Collision], indices: &[usize]) -> Vec<Collision> {
    indices
        .iter()
        .filter_map(|&index| superset.get(index).cloned())
        .collect()
}

fn moveable(bodies: &Arena<Body>, id: BodyId) -> bool {
    bodies.get(id).is_some_and(Body::is_moveable)
}
