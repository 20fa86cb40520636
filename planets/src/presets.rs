use std::f32::consts::TAU;

use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::{body::Body, constants::DEFAULT_GRAVITY};

/// Two equal planets flying at each other along the x axis.
pub fn head_on_pair() -> Vec<Body> {
    vec![
        Body::new(20.0, 400.0)
            .with_position(200.0, 300.0)
            .with_velocity(40.0, 0.0)
            .with_color([255, 120, 0]),
        Body::new(20.0, 400.0)
            .with_position(600.0, 300.0)
            .with_velocity(-40.0, 0.0)
            .with_color([0, 160, 255]),
    ]
}

/// A heavy star with `satellites` small planets on roughly circular orbits
/// around it, assuming the default gravitational constant.
pub fn star_with_satellites(satellites: usize, seed: u64) -> Vec<Body> {
    const STAR_MASS: f32 = 10_000.0;
    let center = (400.0, 300.0);

    let mut rng = StdRng::seed_from_u64(seed);
    let mut bodies = Vec::with_capacity(satellites + 1);
    bodies.push(
        Body::new(30.0, STAR_MASS)
            .with_position(center.0, center.1)
            .with_color([255, 230, 120]),
    );

    for _ in 0..satellites {
        let distance: f32 = rng.random_range(80.0..600.0);
        let angle: f32 = rng.random_range(0.0..TAU);
        // v = sqrt(G * M / r)
        let speed = (DEFAULT_GRAVITY * STAR_MASS / distance).sqrt();
        let (sin, cos) = angle.sin_cos();

        let body = Body::new(rng.random_range(2.0..6.0), 0.0)
            .with_position(center.0 + cos * distance, center.1 + sin * distance)
            .with_velocity(-sin * speed, cos * speed)
            .with_color([
                rng.random_range(64..=255),
                rng.random_range(64..=255),
                rng.random_range(64..=255),
            ]);
        bodies.push(body);
    }
    bodies
}
