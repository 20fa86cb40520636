use cgmath::{EuclideanSpace, Point2, Vector2, Zero};

use crate::{
    body::Body,
    constants::{DEFAULT_GRAVITY, DEFAULT_TIME_STEP},
};

pub mod collision;
pub mod gravity;

pub use collision::{CollisionModel, resolve_collisions, resolve_pair};
pub use gravity::apply_gravity;

/// Inputs of one simulation tick. Read from the control surface once per
/// tick and passed by value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicsParams {
    /// Gravitational constant. Zero disables gravity.
    pub gravity: f32,
    pub time_step: f32,
    pub collisions: CollisionModel,
}

impl Default for PhysicsParams {
    fn default() -> Self {
        Self {
            gravity: DEFAULT_GRAVITY,
            time_step: DEFAULT_TIME_STEP,
            collisions: CollisionModel::default(),
        }
    }
}

/// Advance the world by one tick: gravity first, then collisions on the
/// moved bodies. Returns the number of resolved contacts.
pub fn step(bodies: &mut [Body], params: PhysicsParams) -> usize {
    apply_gravity(bodies, params.gravity, params.time_step);
    resolve_collisions(bodies, params.collisions)
}

pub fn total_momentum(bodies: &[Body]) -> Vector2<f32> {
    bodies
        .iter()
        .fold(Vector2::zero(), |acc, body| acc + body.momentum())
}

pub fn total_kinetic_energy(bodies: &[Body]) -> f32 {
    bodies.iter().map(Body::kinetic_energy).sum()
}

/// Mass-weighted mean position, or `None` for an empty world.
pub fn center_of_mass(bodies: &[Body]) -> Option<Point2<f32>> {
    let mut total_mass = 0.0;
    let mut weighted = Vector2::zero();
    for body in bodies {
        weighted += body.position.to_vec() * body.mass();
        total_mass += body.mass();
    }
    if total_mass > 0.0 {
        Some(Point2::from_vec(weighted / total_mass))
    } else {
        None
    }
}
