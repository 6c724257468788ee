use proptest::prelude::*;
use rigid_contact::collision::broadphase::{pair_swellage, possible_intersection};
use rigid_contact::*;
use std::f64::consts::TAU;

/// Star-shaped polygon around the origin: increasing angles keep it simple.
fn arb_polygon() -> impl Strategy<Value = Vec<DVec2>> {
    (3usize..9).prop_flat_map(|n| {
        prop::collection::vec((0.2f64..3.0, 0.0f64..0.5), n).prop_map(move |samples| {
            samples
                .iter()
                .enumerate()
                .map(|(k, &(radius, jitter))| {
                    let angle = (k as f64 + jitter) * TAU / n as f64;
                    DVec2::from_angle(angle) * radius
                })
                .collect()
        })
    })
}

fn arb_pose() -> impl Strategy<Value = Pose2> {
    (-20.0f64..20.0, -20.0f64..20.0, -TAU..TAU)
        .prop_map(|(x, y, angle)| Pose2::new(DVec2::new(x, y), angle))
}

/// Places `b` so its vertex `j` lands on vertex `i` of `a`.
fn touch_vertices(a: &Body, b: &mut Body, i: usize, j: usize, angle: f64) {
    let target = a.pose.body_to_world(a.vertices()[i].location);
    let offset = Pose2::new(DVec2::ZERO, angle).rotate_body_to_world(b.vertices()[j].location);
    b.pose = Pose2::new(target - offset, angle);
}

proptest! {
    #[test]
    fn touching_polygons_are_never_rejected(
        pa in arb_polygon(),
        pb in arb_polygon(),
        pose in arb_pose(),
        angle in -TAU..TAU,
        i in any::<prop::sample::Index>(),
        j in any::<prop::sample::Index>(),
    ) {
        let a = Body::polygon("a", &pa).unwrap().with_pose(pose);
        let mut b = Body::polygon("b", &pb).unwrap();
        touch_vertices(&a, &mut b, i.index(pa.len()), j.index(pb.len()), angle);

        prop_assert!(possible_intersection(&a, &b, pair_swellage(&a, &b)));
        prop_assert!(possible_intersection(&b, &a, pair_swellage(&b, &a)));
    }

    #[test]
    fn overlapping_centroids_are_never_rejected(
        pa in arb_polygon(),
        pb in arb_polygon(),
        pose in arb_pose(),
        angle in -TAU..TAU,
    ) {
        let a = Body::polygon("a", &pa).unwrap().with_pose(pose);
        let b_local = Body::polygon("b", &pb).unwrap();
        let shift = Pose2::new(DVec2::ZERO, angle).rotate_body_to_world(b_local.centroid());
        let b = b_local.with_pose(Pose2::new(a.centroid_world() - shift, angle));

        prop_assert!(possible_intersection(&a, &b, 0.0));
    }

    #[test]
    fn bodies_that_touched_at_the_old_pose_are_kept(
        pa in arb_polygon(),
        pb in arb_polygon(),
        pose in arb_pose(),
        angle in -TAU..TAU,
        i in any::<prop::sample::Index>(),
        j in any::<prop::sample::Index>(),
        dx in -5.0f64..5.0,
        dy in -5.0f64..5.0,
        spin in -1.0f64..1.0,
    ) {
        let mut a = Body::polygon("a", &pa).unwrap().with_pose(pose);
        let mut b = Body::polygon("b", &pb).unwrap();
        touch_vertices(&a, &mut b, i.index(pa.len()), j.index(pb.len()), angle);
        a.save_old_pose();
        b.save_old_pose();
        b.pose = b.pose.translated(DVec2::new(dx, dy), spin);

        prop_assert!(possible_intersection(&a, &b, pair_swellage(&a, &b)));
    }

    #[test]
    fn bodies_touching_a_wall_face_are_never_rejected(
        pb in arb_polygon(),
        along in -40.0f64..40.0,
        angle in -TAU..TAU,
        j in any::<prop::sample::Index>(),
    ) {
        let wall = Body::wall("floor", 100.0, 1.0, DVec2::Y).fixed();
        let mut b = Body::polygon("b", &pb).unwrap();
        let vertex = b.vertices()[j.index(pb.len())].location;
        let offset = Pose2::new(DVec2::ZERO, angle).rotate_body_to_world(vertex);
        b.pose = Pose2::new(DVec2::new(along, 0.5) - offset, angle);

        prop_assert!(possible_intersection(&wall, &b, pair_swellage(&wall, &b)));
        prop_assert!(possible_intersection(&b, &wall, pair_swellage(&b, &wall)));
    }
}
