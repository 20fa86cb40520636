use cgmath::{InnerSpace, Vector2, Zero};
use rayon::iter::{IntoParallelIterator, ParallelIterator};

use crate::{
    body::Body,
    constants::{GRAVITY_MIN_DISTANCE, PARALLEL_GRAVITY_CUTOFF},
};

/// Net acceleration on body `i` from every other body, in ascending index order.
#[inline]
fn acceleration_of(i: usize, bodies: &[Body], gravity: f32) -> Vector2<f32> {
    let body = &bodies[i];
    let mut force = Vector2::zero();
    for (j, other) in bodies.iter().enumerate() {
        if j == i {
            continue;
        }
        let rel = other.position - body.position;
        let distance = rel.magnitude();
        if distance < GRAVITY_MIN_DISTANCE || distance.is_nan() {
            continue;
        }
        let magnitude = gravity * body.mass() * other.mass() / (distance * distance);
        force += rel / distance * magnitude;
    }
    force / body.mass()
}

pub fn compute_accelerations_single_threaded(bodies: &[Body], gravity: f32) -> Vec<Vector2<f32>> {
    (0..bodies.len())
        .map(|i| acceleration_of(i, bodies, gravity))
        .collect()
}

pub fn compute_accelerations_parallel(bodies: &[Body], gravity: f32) -> Vec<Vector2<f32>> {
    (0..bodies.len())
        .into_par_iter()
        .map(|i| acceleration_of(i, bodies, gravity))
        .collect()
}

/// All accelerations are taken from the positions before this tick, so the
/// order bodies are advanced in is not observable.
pub fn compute_accelerations(bodies: &[Body], gravity: f32) -> Vec<Vector2<f32>> {
    if bodies.len() >= PARALLEL_GRAVITY_CUTOFF {
        compute_accelerations_parallel(bodies, gravity)
    } else {
        compute_accelerations_single_threaded(bodies, gravity)
    }
}

/// Semi-implicit Euler: velocity first, then position from the new velocity.
pub fn integrate(bodies: &mut [Body], accelerations: &[Vector2<f32>], time_step: f32) {
    debug_assert_eq!(bodies.len(), accelerations.len());
    for (body, acc) in bodies.iter_mut().zip(accelerations) {
        body.acceleration = *acc;
        body.velocity += *acc * time_step;
        let displacement = body.velocity * time_step;
        body.advance_by(displacement);
    }
}

/// One gravity pass over the whole world.
pub fn apply_gravity(bodies: &mut [Body], gravity: f32, time_step: f32) {
    let accelerations = compute_accelerations(bodies, gravity);
    integrate(bodies, &accelerations, time_step);
}

#[cfg(test)]
mod tests {
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use rand::{Rng, SeedableRng, rngs::StdRng};

    use super::*;
    use crate::sim::total_momentum;

    #[test]
    fn two_bodies_attract_along_x() {
        let mut bodies = vec![
            Body::new(10.0, 100.0),
            Body::new(5.0, 50.0).with_position(100.0, 0.0),
        ];

        apply_gravity(&mut bodies, 100.0, 1.0);

        // F = 100 * 100 * 50 / 100² = 50
        assert_relative_eq!(bodies[0].acceleration.x, 0.5);
        assert_relative_eq!(bodies[1].acceleration.x, -1.0);
        assert!(bodies[0].velocity.x > 0.0);
        assert!(bodies[1].velocity.x < 0.0);
        assert_eq!(bodies[0].velocity.y, 0.0);
        assert_eq!(bodies[1].velocity.y, 0.0);
        // Position is advanced with the updated velocity.
        assert_relative_eq!(bodies[0].position.x, 0.5);
        assert_relative_eq!(bodies[1].position.x, 99.0);
    }

    #[test]
    fn close_pairs_feel_no_gravity() {
        let mut bodies = vec![
            Body::new(10.0, 100.0),
            Body::new(5.0, 50.0).with_position(0.5, 0.5),
        ];

        apply_gravity(&mut bodies, 100.0, 1.0);

        for body in &bodies {
            assert_eq!(body.velocity, Vector2::zero());
            assert_eq!(body.acceleration, Vector2::zero());
        }
        assert_eq!(bodies[1].position.x, 0.5);
    }

    #[test]
    fn coincident_bodies_stay_finite() {
        let mut bodies = vec![Body::new(1.0, 1.0), Body::new(1.0, 1.0)];
        apply_gravity(&mut bodies, 1000.0, 0.1);
        for body in &bodies {
            assert!(body.position.x.is_finite() && body.position.y.is_finite());
            assert!(body.velocity.x.is_finite() && body.velocity.y.is_finite());
        }
    }

    #[test]
    fn zero_gravity_is_free_motion() {
        let mut bodies = vec![
            Body::new(1.0, 1.0).with_velocity(1.0, 2.0),
            Body::new(1.0, 1.0).with_position(10.0, 0.0),
        ];

        apply_gravity(&mut bodies, 0.0, 0.5);

        assert_relative_eq!(bodies[0].position.x, 0.5);
        assert_relative_eq!(bodies[0].position.y, 1.0);
        assert_eq!(bodies[1].position.x, 10.0);
    }

    #[test]
    fn parallel_pass_matches_single_threaded() {
        let mut rng = StdRng::seed_from_u64(7);
        let bodies: Vec<Body> = (0..300)
            .map(|_| {
                Body::new(rng.random_range(1.0..5.0), 0.0).with_position(
                    rng.random_range(-500.0..500.0),
                    rng.random_range(-500.0..500.0),
                )
            })
            .collect();

        let single = compute_accelerations_single_threaded(&bodies, 100.0);
        let parallel = compute_accelerations_parallel(&bodies, 100.0);

        assert_eq!(single, parallel);
    }

    #[test]
    fn gravity_conserves_momentum() {
        let mut bodies = vec![
            Body::new(5.0, 10.0).with_velocity(1.0, 0.0),
            Body::new(5.0, 20.0).with_position(100.0, 0.0),
            Body::new(5.0, 30.0)
                .with_position(50.0, 86.6)
                .with_velocity(0.0, -0.5),
        ];
        let before = total_momentum(&bodies);

        for _ in 0..50 {
            apply_gravity(&mut bodies, 100.0, 0.016);
        }

        let after = total_momentum(&bodies);
        assert_abs_diff_eq!(before.x, after.x, epsilon = 1e-2);
        assert_abs_diff_eq!(before.y, after.y, epsilon = 1e-2);
    }
}
