use cgmath::{InnerSpace, Point2, Vector2, Zero};

use crate::constants::{DEFAULT_COLOR, MIN_RADIUS};

/// RGB fill colour. Only used for drawing and on the wire.
pub type Color = [u8; 3];

/// A disc-shaped point mass.
///
/// Radius and mass are kept private so that both stay strictly positive:
/// a non-positive mass falls back to `radius²`, and a non-positive radius is
/// clamped to [`MIN_RADIUS`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Body {
    pub position: Point2<f32>,
    pub velocity: Vector2<f32>,
    /// Net acceleration from the last gravity pass.
    pub acceleration: Vector2<f32>,
    pub color: Color,
    radius: f32,
    mass: f32,
}

fn sanitize_radius(radius: f32) -> f32 {
    if radius.is_finite() && radius > MIN_RADIUS {
        radius
    } else {
        MIN_RADIUS
    }
}

impl Body {
    /// Create a body at rest at the origin. Pass `mass <= 0.0` to derive the
    /// mass from the radius.
    pub fn new(radius: f32, mass: f32) -> Self {
        let radius = sanitize_radius(radius);
        let mut body = Self {
            position: Point2::new(0.0, 0.0),
            velocity: Vector2::zero(),
            acceleration: Vector2::zero(),
            color: DEFAULT_COLOR,
            radius,
            mass: 0.0,
        };
        body.set_mass(mass);
        body
    }

    pub fn with_position(mut self, x: f32, y: f32) -> Self {
        self.position = Point2::new(x, y);
        self
    }

    pub fn with_velocity(mut self, vx: f32, vy: f32) -> Self {
        self.velocity = Vector2::new(vx, vy);
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn set_radius(&mut self, radius: f32) {
        self.radius = sanitize_radius(radius);
    }

    pub fn mass(&self) -> f32 {
        self.mass
    }

    pub fn set_mass(&mut self, mass: f32) {
        self.mass = if mass.is_finite() && mass > 0.0 {
            mass
        } else {
            self.radius * self.radius
        };
    }

    /// True when the discs overlap. Discs that exactly touch do not collide.
    pub fn is_colliding(&self, other: &Body) -> bool {
        let distance = (other.position - self.position).magnitude();
        distance < self.radius + other.radius
    }

    /// Translate the body without touching its velocity.
    pub fn advance_by(&mut self, delta: Vector2<f32>) {
        self.position += delta;
    }

    pub fn momentum(&self) -> Vector2<f32> {
        self.velocity * self.mass
    }

    pub fn kinetic_energy(&self) -> f32 {
        0.5 * self.mass * self.velocity.magnitude2()
    }
}
