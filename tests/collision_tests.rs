use approx::assert_relative_eq;
use rigid_contact::*;

fn unit_square(name: &str) -> Body {
    Body::rectangle(name, 1.0, 1.0)
}

/// Pose of a square rotated by `angle` whose lowest corner sits at `corner`.
fn pose_with_low_corner(angle: f64, corner: DVec2) -> Pose2 {
    let offset = Pose2::new(DVec2::ZERO, angle).rotate_body_to_world(DVec2::new(-0.5, -0.5));
    Pose2::new(corner - offset, angle)
}

#[test]
fn falling_corner_crosses_top_edge_once() {
    let mut world = CollisionWorld::new();
    let a = world.add_body(unit_square("A").fixed());
    let b = world.add_body(unit_square("B").with_pose(pose_with_low_corner(0.3, DVec2::new(0.0, 0.55))));
    world.save_old_poses();
    world.body_mut(b).unwrap().pose = pose_with_low_corner(0.3, DVec2::new(0.0, 0.45));

    let list = world.find_collisions(1.0).unwrap();
    assert_eq!(list.len(), 1, "unexpected records: {list:?}");
    let record = &list[0];
    assert_eq!(record.primary_body, b);
    assert_eq!(record.normal_body, a);
    assert!(!record.contact);
    assert!(record.is_penetrating());
    assert_relative_eq!(record.normal.x, 0.0, epsilon = 1e-12);
    assert_relative_eq!(record.normal.y, 1.0, epsilon = 1e-12);
    assert_relative_eq!(record.distance, -0.05, epsilon = 1e-12);
    assert_relative_eq!(record.impact_point.y, 0.45, epsilon = 1e-12);
    assert_eq!(record.detected_time, 1.0);
    assert_eq!(record.provenance, Provenance::VertexEdge { vertex: 0, edge: 2 });
}

#[test]
fn separated_squares_produce_nothing() {
    let mut world = CollisionWorld::new();
    world.add_body(unit_square("A").fixed());
    world.add_body(unit_square("B").with_pose(Pose2::from_position(DVec2::new(0.0, 3.0))));
    world.save_old_poses();

    let list = world.find_collisions(0.0).unwrap();
    assert!(list.is_empty());
    assert_eq!(world.metrics().pairs_considered, 1);
    assert_eq!(world.metrics().pairs_rejected, 1);
}

#[test]
fn only_one_side_having_an_old_pose_is_an_error() {
    let mut world = CollisionWorld::new();
    let a = world.add_body(unit_square("A").fixed());
    let b = world.add_body(unit_square("B").with_pose(Pose2::from_position(DVec2::new(0.0, 1.0))));
    world.body_mut(b).unwrap().save_old_pose();

    let err = world.find_collisions(0.0).unwrap_err();
    assert_eq!(
        err,
        CollisionError::MismatchedOldPose {
            with_old: b,
            without_old: a
        }
    );
}

#[test]
fn block_resting_on_wall_touches_at_both_corners() {
    let mut world = CollisionWorld::new();
    let floor = world.add_body(Body::wall("floor", 20.0, 1.0, DVec2::Y).fixed());
    let block = world.add_body(unit_square("block").with_pose(Pose2::from_position(DVec2::new(3.0, 1.004))));
    world.save_old_poses();

    let list = world.find_collisions(2.0).unwrap();
    assert_eq!(list.len(), 2);
    for record in &list {
        assert!(record.contact);
        assert_eq!(record.primary_body, block);
        assert_eq!(record.normal_body, floor);
        assert_relative_eq!(record.distance, 0.004, epsilon = 1e-12);
    }
}

#[test]
fn non_collide_bodies_are_never_tested() {
    let mut world = CollisionWorld::new();
    let a = world.add_body(unit_square("A").fixed());
    world.add_body(
        unit_square("B")
            .with_pose(Pose2::from_position(DVec2::new(0.2, 0.2)))
            .with_non_collide_body(a),
    );
    world.save_old_poses();

    assert!(world.find_collisions(0.0).unwrap().is_empty());
    assert_eq!(world.metrics().vertices_tested, 0);
}

#[test]
fn tolerated_penetration_is_counted_not_raised() {
    let config = CollisionConfig::default().with_penetration_policy(PenetrationPolicy::Tolerate);
    let mut world = CollisionWorld::with_config(config);
    world.add_body(unit_square("A").fixed());
    // B sits deep inside A with no motion, so no edge is crossed
    world.add_body(Body::rectangle("B", 0.2, 0.2));
    world.save_old_poses();

    let list = world.find_collisions(0.0).unwrap();
    assert!(list.is_empty());
    assert_eq!(world.metrics().undetected_penetrations, 4);
}

#[test]
fn strict_policy_reports_the_missed_vertex() {
    let config = CollisionConfig::default().with_penetration_policy(PenetrationPolicy::Strict);
    let mut world = CollisionWorld::with_config(config);
    let a = world.add_body(unit_square("A").fixed());
    let b = world.add_body(Body::rectangle("B", 0.2, 0.2));
    world.save_old_poses();

    let err = world.find_collisions(0.0).unwrap_err();
    assert_eq!(
        err,
        CollisionError::UndetectedPenetration {
            vertex: 0,
            body: b,
            host: a
        }
    );
}

#[test]
fn independent_groups_split_at_the_fixed_floor() {
    let mut world = CollisionWorld::new();
    let floor = world.add_body(Body::wall("floor", 20.0, 1.0, DVec2::Y).fixed());
    let left = world.add_body(unit_square("left").with_pose(Pose2::from_position(DVec2::new(-4.0, 1.004))));
    let right = world.add_body(unit_square("right").with_pose(Pose2::from_position(DVec2::new(4.0, 1.004))));
    world.save_old_poses();

    let list = world.find_collisions(0.0).unwrap();
    let groups = world.independent_groups(&list);
    assert_eq!(groups.len(), 2);
    for group in &groups {
        let bodies: Vec<_> = group.iter().map(|&i| list[i].primary_body).collect();
        assert!(bodies.iter().all(|&id| id == bodies[0]));
        assert!(bodies[0] == left || bodies[0] == right);
        assert!(group.iter().all(|&i| list[i].normal_body == floor));
    }
}
