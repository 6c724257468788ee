use rigid_contact::*;

const DT: f64 = 1.0 / 60.0;
const GRAVITY: f64 = -9.81;

fn main() -> Result<()> {
    let mut world = CollisionWorld::new();
    world.add_body(Body::wall("floor", 20.0, 1.0, DVec2::Y).fixed());
    let square = world.add_body(
        Body::rectangle("square", 1.0, 1.0).with_pose(Pose2::new(DVec2::new(0.0, 3.0), 0.3)),
    );

    let mut velocity = DVec2::ZERO;
    let mut time = 0.0;
    for step in 0..120 {
        world.save_old_poses();
        velocity.y += GRAVITY * DT;
        if let Some(body) = world.body_mut(square) {
            body.pose = body.pose.translated(velocity * DT, 0.0);
        }
        time += DT;

        let collisions = world.find_collisions(time)?;
        for c in collisions.iter().filter(|c| c.primary_body == square && c.is_penetrating()) {
            // push the square back out along the floor normal and stop it
            if let Some(body) = world.body_mut(square) {
                body.pose = body.pose.translated(-c.normal * c.distance, 0.0);
            }
            velocity = velocity.reject_from(c.normal);
            println!(
                "step {step}: vertex hit floor at {:.3?}, depth {:.4}",
                c.impact_point, -c.distance
            );
        }
    }

    let rest = world.body(square).map(|b| b.pose.position).unwrap_or_default();
    println!("square settled at {rest:.3?} after {time:.2} s");
    world.metrics().report();
    println!("{:?}", world.metrics());
    Ok(())
}
