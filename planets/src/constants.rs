use std::time::Duration;

use crate::body::Color;

// PHYSICAL
/// Default gravitational constant, scaled for screen-space units.
pub const DEFAULT_GRAVITY: f32 = 100.0;
/// Default seconds per simulation tick.
pub const DEFAULT_TIME_STEP: f32 = 0.016;
/// Pairs closer than this contribute no gravitational force.
pub const GRAVITY_MIN_DISTANCE: f32 = 1.0;
/// Smallest radius a body may have.
pub const MIN_RADIUS: f32 = 1e-3;
/// Relative tangential speed below which collision friction does not apply.
pub const FRICTION_SPEED_THRESHOLD: f32 = 0.1;
/// Fill colour of bodies created without one.
pub const DEFAULT_COLOR: Color = [0, 255, 255];

// CONTROL SURFACE
pub const GRAVITY_RANGE: (f32, f32) = (0.0, 1000.0);
pub const TIME_STEP_RANGE: (f32, f32) = (0.001, 0.1);

// SIMULATION
/// Use rayon for the acceleration pass above this many bodies.
pub const PARALLEL_GRAVITY_CUTOFF: usize = 256;
/// Points of trail kept per body.
pub const TRAIL_MAX_LENGTH: usize = 1000;

// WIRE
/// Largest payload of a single IPv4 UDP datagram.
pub const MAX_UDP_PAYLOAD: usize = 65507;
/// Body count prefix.
pub const HEADER_SIZE: usize = 4;
/// Six big-endian f32 fields followed by three colour bytes.
pub const RECORD_SIZE: usize = 6 * 4 + 3;
/// Whole body records that fit in one datagram.
pub const MAX_BODIES_PER_PACKET: usize = (MAX_UDP_PAYLOAD - HEADER_SIZE) / RECORD_SIZE;

// NETWORK
pub const DEFAULT_PORT: u16 = 8080;
/// Interval between two host snapshots.
pub const BROADCAST_PERIOD: Duration = Duration::from_millis(10);
/// Upper bound on a blocking receive, so shutdown is noticed without traffic.
pub const RECEIVE_TIMEOUT: Duration = Duration::from_secs(1);
