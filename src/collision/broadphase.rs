use crate::{
    core::body::Body,
    utils::{
        allocator::{Arena, BodyId},
        profiling::DetectionMetrics,
    },
};

/// Conservative test of whether two bodies might intersect once each is
/// grown by `swellage`.
///
/// `false` means an intersection is impossible; `true` only means it could
/// not be ruled out. When a body carries a special normal only the signed
/// separation of the centroids along that normal is compared against the
/// body's extent along it, so a long wall is not penalised for its length.
/// When both do, the first body's normal is used.
pub fn possible_intersection(a: &Body, b: &Body, swellage: f64) -> bool {
    if let Some(n) = a.special_normal_world() {
        let reach = a.special_extent() + b.centroid_radius() + swellage;
        return (b.centroid_world() - a.centroid_world()).dot(n) <= reach;
    }
    if let Some(n) = b.special_normal_world() {
        let reach = b.special_extent() + a.centroid_radius() + swellage;
        return (a.centroid_world() - b.centroid_world()).dot(n) <= reach;
    }
    let reach = a.centroid_radius() + b.centroid_radius() + swellage;
    a.centroid_world().distance_squared(b.centroid_world()) <= reach * reach
}

/// Margin added around a pair of bodies: the larger distance tolerance
/// plus how far either body can have moved since its old pose.
pub fn pair_swellage(a: &Body, b: &Body) -> f64 {
    a.distance_tol.max(b.distance_tol) + a.max_travel() + b.max_travel()
}

/// Whether the pair can be skipped before any geometry is looked at.
pub fn excluded_pair(a: &Body, b: &Body) -> bool {
    (!a.is_moveable() && !b.is_moveable())
        || a.non_collide.excludes_body(b.id)
        || b.non_collide.excludes_body(a.id)
}

/// Broad phase driver returning candidate body pairs.
#[derive(Debug, Default, Clone)]
pub struct BroadPhase {
    /// Added to every pair's swellage.
    pub extra_margin: f64,
}

impl BroadPhase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enumerates body pairs `(a, b)` with `a` before `b` in arena order,
    /// keeping those that might intersect. Output order only depends on the
    /// arena, with or without the `parallel` feature.
    pub fn candidate_pairs(
        &self,
        bodies: &Arena<Body>,
        metrics: &mut DetectionMetrics,
    ) -> Vec<(BodyId, BodyId)> {
        let list: Vec<&Body> = bodies.iter().map(|(_, body)| body).collect();
        let mut pairs = Vec::new();
        for (i, a) in list.iter().enumerate() {
            for b in &list[i + 1..] {
                pairs.push((*a, *b));
            }
        }
        metrics.pairs_considered += pairs.len();

        let kept = self.filter_pairs(&pairs);
        metrics.pairs_rejected += pairs.len() - kept.len();
        kept
    }

    #[cfg(not(feature = "parallel"))]
    fn filter_pairs(&self, pairs: &[(&Body, &Body)]) -> Vec<(BodyId, BodyId)> {
        pairs
            .iter()
            .filter(|(a, b)| self.keep_pair(a, b))
            .map(|(a, b)| (a.id, b.id))
            .collect()
    }

    #[cfg(feature = "parallel")]
    fn filter_pairs(&self, pairs: &[(&Body, &Body)]) -> Vec<(BodyId, BodyId)> {
        use rayon::prelude::*;

        pairs
            .par_iter()
            .filter(|(a, b)| self.keep_pair(a, b))
            .map(|(a, b)| (a.id, b.id))
            .collect()
    }

    fn keep_pair(&self, a: &Body, b: &Body) -> bool {
        !excluded_pair(a, b) && possible_intersection(a, b, pair_swellage(a, b) + self.extra_margin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Pose2;
    use glam::DVec2;

    fn square_at(x: f64, y: f64) -> Body {
        Body::rectangle("sq", 1.0, 1.0).with_pose(Pose2::from_position(DVec2::new(x, y)))
    }

    #[test]
    fn regular_policy_uses_bounding_circles() {
        let a = square_at(0.0, 0.0);
        let near = square_at(1.2, 0.0);
        let far = square_at(3.0, 0.0);
        assert!(possible_intersection(&a, &near, 0.0));
        assert!(!possible_intersection(&a, &far, 0.0));
        assert!(possible_intersection(&a, &far, 2.0));
    }

    #[test]
    fn special_normal_ignores_tangential_offset() {
        let floor = Body::wall("floor", 100.0, 1.0, DVec2::Y);
        // far along the wall but just above it
        let above = square_at(40.0, 1.0);
        assert!(possible_intersection(&floor, &above, 0.0));
        assert!(possible_intersection(&above, &floor, 0.0));

        let high = square_at(0.0, 60.0);
        assert!(!possible_intersection(&floor, &high, 0.0));
        assert!(!possible_intersection(&high, &floor, 0.0));
    }

    #[test]
    fn long_wall_rejects_bodies_well_above_it() {
        let floor = Body::wall("floor", 100.0, 1.0, DVec2::Y);
        let square = square_at(0.0, 20.0);
        assert!(!possible_intersection(&floor, &square, 0.0));
        assert!(!possible_intersection(&square, &floor, 0.0));
        // 0.5 face + 0.707 square circle
        assert!(possible_intersection(&floor, &square_at(3.0, 1.2), 0.0));
        assert!(!possible_intersection(&floor, &square_at(3.0, 1.3), 0.0));
        // below the face counts as touching
        assert!(possible_intersection(&floor, &square_at(3.0, -30.0), 0.0));
    }

    #[test]
    fn square_above_long_wall_is_rejected_in_pairs() {
        let mut bodies = Arena::new();
        let floor = bodies.insert(Body::wall("floor", 100.0, 1.0, DVec2::Y).fixed());
        let square = bodies.insert(square_at(0.0, 10.0));
        for (id, body) in bodies.iter_mut() {
            body.id = id;
        }
        let mut metrics = DetectionMetrics::default();
        let pairs = BroadPhase::new().candidate_pairs(&bodies, &mut metrics);
        assert!(!pairs.contains(&(floor, square)));
        assert_eq!(metrics.pairs_rejected, 1);
    }

    #[test]
    fn candidate_pairs_skip_fixed_and_excluded_pairs() {
        let mut bodies = Arena::new();
        let ground = bodies.insert(square_at(0.0, 0.0).fixed());
        let wall = bodies.insert(square_at(0.5, 0.0).fixed());
        let ball = bodies.insert(square_at(0.0, 0.9));
        let ghost = bodies.insert(square_at(0.2, 0.9).with_non_collide_body(ball));
        for (id, body) in bodies.iter_mut() {
            body.id = id;
        }

        let mut metrics = DetectionMetrics::default();
        let pairs = BroadPhase::new().candidate_pairs(&bodies, &mut metrics);
        assert!(!pairs.contains(&(ground, wall)));
        assert!(!pairs.contains(&(ball, ghost)));
        assert!(pairs.contains(&(ground, ball)));
        assert!(pairs.contains(&(wall, ghost)));
        assert_eq!(metrics.pairs_considered, 6);
        assert_eq!(metrics.pairs_rejected, 6 - pairs.len());

        let ordered: Vec<_> = pairs.iter().map(|(a, b)| (a.index(), b.index())).collect();
        let mut sorted = ordered.clone();
        sorted.sort();
        assert_eq!(ordered, sorted);
    }
}
