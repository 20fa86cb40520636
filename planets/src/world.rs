use std::sync::{
    Mutex, MutexGuard, PoisonError,
    atomic::{AtomicU32, Ordering},
};

use crate::{
    body::Body,
    constants::{DEFAULT_GRAVITY, DEFAULT_TIME_STEP, GRAVITY_RANGE, TIME_STEP_RANGE},
    sim::{self, CollisionModel, PhysicsParams},
};

/// The body list shared between the simulation, the network and the renderer.
///
/// Every access holds the lock for the whole traversal, so readers never see
/// a half-replaced list.
#[derive(Debug, Default)]
pub struct World {
    bodies: Mutex<Vec<Body>>,
}

impl World {
    pub fn new(bodies: Vec<Body>) -> Self {
        Self {
            bodies: Mutex::new(bodies),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Body>> {
        // Poisoning is ignored: writers either mutate bodies in place or swap
        // the whole vector, so the list is never half-written.
        self.bodies.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Append a body, e.g. one created from the control surface.
    pub fn push(&self, body: Body) {
        self.lock().push(body);
    }

    /// Swap in a whole new body list, returning the old one.
    pub fn replace(&self, bodies: Vec<Body>) -> Vec<Body> {
        std::mem::replace(&mut *self.lock(), bodies)
    }

    /// Copy of every body, for drawing.
    pub fn snapshot(&self) -> Vec<Body> {
        self.lock().clone()
    }

    /// Run `f` over the bodies while holding the lock.
    pub fn with_bodies<T>(&self, f: impl FnOnce(&[Body]) -> T) -> T {
        let bodies = self.lock();
        f(bodies.as_slice())
    }

    /// One physics tick under the lock. Returns the number of resolved contacts.
    pub fn step(&self, params: PhysicsParams) -> usize {
        let mut bodies = self.lock();
        sim::step(bodies.as_mut_slice(), params)
    }
}

/// Tunable parameters written by the control surface and read by the
/// simulation once per tick. Stored as `f32` bit patterns.
///
/// Setters clamp to the instance's limits and ignore NaN and infinite values.
#[derive(Debug)]
pub struct Controls {
    limits: Limits,
    gravity: AtomicU32,
    time_step: AtomicU32,
    restitution: AtomicU32,
    friction: AtomicU32,
}

impl Default for Controls {
    fn default() -> Self {
        Self::new(PhysicsParams::default())
    }
}

#[derive(Debug, Clone, Copy)]
struct Limits {
    gravity: (f32, f32),
    time_step: (f32, f32),
}

impl Limits {
    const SLIDERS: Limits = Limits {
        gravity: GRAVITY_RANGE,
        time_step: TIME_STEP_RANGE,
    };

    // Any finite G, any positive step.
    const ENGINE: Limits = Limits {
        gravity: (f32::MIN, f32::MAX),
        time_step: (f32::MIN_POSITIVE, f32::MAX),
    };
}

fn clamp_finite(value: f32, (lo, hi): (f32, f32)) -> Option<f32> {
    value.is_finite().then(|| value.clamp(lo, hi))
}

impl Controls {
    /// Controls limited to the slider ranges: G in [0, 1000], Δt in
    /// [0.001, 0.1].
    pub fn new(params: PhysicsParams) -> Self {
        Self::with_limits(params, Limits::SLIDERS)
    }

    /// Controls accepting any finite G and any positive Δt.
    pub fn unclamped(params: PhysicsParams) -> Self {
        Self::with_limits(params, Limits::ENGINE)
    }

    fn with_limits(params: PhysicsParams, limits: Limits) -> Self {
        let controls = Self {
            limits,
            gravity: AtomicU32::new(DEFAULT_GRAVITY.to_bits()),
            time_step: AtomicU32::new(DEFAULT_TIME_STEP.to_bits()),
            restitution: AtomicU32::new(0.0f32.to_bits()),
            friction: AtomicU32::new(0.0f32.to_bits()),
        };
        controls.set_gravity(params.gravity);
        controls.set_time_step(params.time_step);
        controls.set_collisions(params.collisions);
        controls
    }

    pub fn gravity(&self) -> f32 {
        f32::from_bits(self.gravity.load(Ordering::Relaxed))
    }

    pub fn set_gravity(&self, gravity: f32) {
        if let Some(gravity) = clamp_finite(gravity, self.limits.gravity) {
            self.gravity.store(gravity.to_bits(), Ordering::Relaxed);
        }
    }

    pub fn time_step(&self) -> f32 {
        f32::from_bits(self.time_step.load(Ordering::Relaxed))
    }

    pub fn set_time_step(&self, time_step: f32) {
        if let Some(time_step) = clamp_finite(time_step, self.limits.time_step) {
            self.time_step.store(time_step.to_bits(), Ordering::Relaxed);
        }
    }

    pub fn collisions(&self) -> CollisionModel {
        CollisionModel {
            restitution: f32::from_bits(self.restitution.load(Ordering::Relaxed)),
            friction: f32::from_bits(self.friction.load(Ordering::Relaxed)),
        }
    }

    pub fn set_collisions(&self, model: CollisionModel) {
        if let Some(restitution) = clamp_finite(model.restitution, (0.0, 1.0)) {
            self.restitution
                .store(restitution.to_bits(), Ordering::Relaxed);
        }
        if let Some(friction) = clamp_finite(model.friction, (0.0, 1.0)) {
            self.friction.store(friction.to_bits(), Ordering::Relaxed);
        }
    }

    /// Value copy of the current settings.
    pub fn physics(&self) -> PhysicsParams {
        PhysicsParams {
            gravity: self.gravity(),
            time_step: self.time_step(),
            collisions: self.collisions(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, thread};

    use approx::assert_relative_eq;

    use super::*;

    fn bodies(n: usize, radius: f32) -> Vec<Body> {
        (0..n)
            .map(|i| Body::new(radius, 0.0).with_position(i as f32 * 10.0, 0.0))
            .collect()
    }

    #[test]
    fn push_and_replace() {
        let world = World::new(bodies(2, 1.0));
        world.push(Body::new(3.0, 0.0));
        assert_eq!(world.len(), 3);

        let old = world.replace(bodies(5, 2.0));
        assert_eq!(old.len(), 3);
        assert_eq!(world.len(), 5);
        assert!(world.snapshot().iter().all(|b| b.radius() == 2.0));
    }

    #[test]
    fn replacement_is_never_torn() {
        let world = Arc::new(World::new(bodies(8, 1.0)));
        let writer = {
            let world = world.clone();
            thread::spawn(move || {
                for i in 0..500 {
                    let radius = if i % 2 == 0 { 2.0 } else { 1.0 };
                    let len = if i % 2 == 0 { 16 } else { 8 };
                    world.replace(bodies(len, radius));
                }
            })
        };

        for _ in 0..500 {
            let snapshot = world.snapshot();
            let radius = snapshot[0].radius();
            let expected_len = if radius == 2.0 { 16 } else { 8 };
            assert_eq!(snapshot.len(), expected_len);
            assert!(snapshot.iter().all(|b| b.radius() == radius));
        }
        writer.join().unwrap();
    }

    #[test]
    fn step_mutates_in_place() {
        let world = World::new(vec![
            Body::new(1.0, 1.0).with_velocity(1.0, 0.0),
            Body::new(1.0, 1.0).with_position(50.0, 0.0),
        ]);
        let params = PhysicsParams {
            gravity: 0.0,
            time_step: 1.0,
            ..Default::default()
        };

        world.step(params);

        world.with_bodies(|b| {
            assert_relative_eq!(b[0].position.x, 1.0);
            assert_relative_eq!(b[1].position.x, 50.0);
        });
    }

    #[test]
    fn controls_round_trip_and_clamp() {
        let controls = Controls::default();
        assert_relative_eq!(controls.gravity(), DEFAULT_GRAVITY);
        assert_relative_eq!(controls.time_step(), DEFAULT_TIME_STEP);
        assert_eq!(controls.collisions(), CollisionModel::INELASTIC);

        controls.set_gravity(250.0);
        controls.set_time_step(0.05);
        assert_relative_eq!(controls.physics().gravity, 250.0);
        assert_relative_eq!(controls.physics().time_step, 0.05);

        controls.set_gravity(5000.0);
        controls.set_time_step(0.0);
        controls.set_collisions(CollisionModel {
            restitution: 2.0,
            friction: f32::NAN,
        });
        assert_relative_eq!(controls.gravity(), 1000.0);
        assert_relative_eq!(controls.time_step(), 0.001);
        assert_relative_eq!(controls.collisions().restitution, 1.0);
        assert_relative_eq!(controls.collisions().friction, 0.0);
    }

    #[test]
    fn unclamped_controls_accept_engine_values() {
        let controls = Controls::unclamped(PhysicsParams {
            gravity: -50.0,
            time_step: 0.5,
            ..Default::default()
        });
        assert_eq!(controls.gravity(), -50.0);
        assert_eq!(controls.time_step(), 0.5);

        controls.set_gravity(5000.0);
        assert_eq!(controls.gravity(), 5000.0);

        controls.set_time_step(0.0);
        assert!(controls.time_step() > 0.0);

        controls.set_gravity(f32::NAN);
        controls.set_time_step(f32::INFINITY);
        assert_eq!(controls.gravity(), 5000.0);
        assert!(controls.time_step() > 0.0 && controls.time_step().is_finite());
    }

    #[test]
    fn zero_gravity_is_allowed() {
        let controls = Controls::default();
        controls.set_gravity(0.0);
        assert_eq!(controls.gravity(), 0.0);
    }
}
