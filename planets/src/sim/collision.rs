use cgmath::{InnerSpace, Vector2};

use crate::{body::Body, constants::FRICTION_SPEED_THRESHOLD};

/// How a contact exchanges momentum.
///
/// `restitution` is applied along the contact normal only: `0.0` leaves both
/// bodies with the same normal velocity, `1.0` is a perfectly elastic bounce.
/// `friction` scales down the tangential velocity of both bodies when they
/// slide past each other; `0.0` leaves it untouched.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionModel {
    pub restitution: f32,
    pub friction: f32,
}

impl CollisionModel {
    pub const INELASTIC: CollisionModel = CollisionModel {
        restitution: 0.0,
        friction: 0.0,
    };
}

impl Default for CollisionModel {
    fn default() -> Self {
        Self::INELASTIC
    }
}

/// Push two overlapping bodies apart and exchange momentum along the contact
/// normal. Returns `false` if the centers coincide, in which case nothing is
/// changed.
pub fn resolve_pair(a: &mut Body, b: &mut Body, model: CollisionModel) -> bool {
    let delta = b.position - a.position;
    let distance = delta.magnitude();
    if distance <= 0.0 || distance.is_nan() {
        return false;
    }
    let normal = delta / distance;

    let (m1, m2) = (a.mass(), b.mass());
    let total_mass = m1 + m2;

    // Heavier body moves less.
    let overlap = (a.radius() + b.radius()) - distance;
    a.advance_by(-normal * (overlap * m2 / total_mass));
    b.advance_by(normal * (overlap * m1 / total_mass));

    let (v1, v2) = (a.velocity, b.velocity);
    let v1n = v1.dot(normal);
    let v2n = v2.dot(normal);

    let e = model.restitution;
    let u1n = ((m1 - e * m2) * v1n + (1.0 + e) * m2 * v2n) / total_mass;
    let u2n = ((m2 - e * m1) * v2n + (1.0 + e) * m1 * v1n) / total_mass;

    a.velocity = v1 + normal * (u1n - v1n);
    b.velocity = v2 + normal * (u2n - v2n);

    if model.friction > 0.0 {
        apply_friction(a, b, normal, model.friction);
    }
    true
}

fn apply_friction(a: &mut Body, b: &mut Body, normal: Vector2<f32>, friction: f32) {
    let tangent = Vector2::new(-normal.y, normal.x);
    let v1t = a.velocity.dot(tangent);
    let v2t = b.velocity.dot(tangent);
    if (v1t - v2t).abs() <= FRICTION_SPEED_THRESHOLD {
        return;
    }
    let keep = 1.0 - friction;
    a.velocity = normal * a.velocity.dot(normal) + tangent * (v1t * keep);
    b.velocity = normal * b.velocity.dot(normal) + tangent * (v2t * keep);
}

/// Resolve every overlapping pair in ascending `(i, j)` order.
///
/// Each pair sees the positions and velocities left by the pairs before it,
/// so with three or more bodies in contact the order changes the result.
/// Returns the number of pairs that were resolved.
pub fn resolve_collisions(bodies: &mut [Body], model: CollisionModel) -> usize {
    let mut resolved = 0;
    for i in 0..bodies.len() {
        let (head, tail) = bodies.split_at_mut(i + 1);
        let a = &mut head[i];
        for b in tail.iter_mut() {
            if a.is_colliding(b) && resolve_pair(a, b, model) {
                resolved += 1;
            }
        }
    }
    resolved
}
