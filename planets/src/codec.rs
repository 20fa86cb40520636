//! Binary snapshot format shared by host and observers.
//!
//! ```text
//! u32 body_count
//! body_count × { f32 x, f32 y, f32 radius, f32 mass, f32 vx, f32 vy, u8 r, u8 g, u8 b }
//! ```
//!
//! All integers and floats are big-endian, floats as their IEEE-754 bit
//! pattern. A snapshot must fit in one UDP datagram; bodies that do not fit
//! are left out.

use log::debug;
use thiserror::Error;

use crate::{
    body::Body,
    constants::{HEADER_SIZE, MAX_UDP_PAYLOAD, RECORD_SIZE},
};

/// Errors that can occur while decoding a snapshot.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("packet of {received} bytes has no body count")]
    MissingHeader { received: usize },

    #[error("incomplete packet: received {received} bytes, expected {expected}")]
    Incomplete { received: usize, expected: usize },

    #[error("body {index} has an invalid {field}")]
    InvalidBody { index: usize, field: &'static str },
}

/// An encoded snapshot.
#[derive(Debug, Clone)]
pub struct Encoded {
    pub bytes: Vec<u8>,
    /// Bodies actually written.
    pub body_count: usize,
    /// Bodies left out because the payload limit was reached.
    pub dropped: usize,
}

impl Encoded {
    pub fn is_truncated(&self) -> bool {
        self.dropped > 0
    }
}

/// Size of a snapshot holding `body_count` bodies.
pub const fn encoded_len(body_count: usize) -> usize {
    HEADER_SIZE + body_count * RECORD_SIZE
}

/// Encode bodies for a single datagram.
pub fn encode(bodies: &[Body]) -> Encoded {
    encode_with_limit(bodies, MAX_UDP_PAYLOAD)
}

/// Encode as many whole bodies as fit in `max_payload` bytes.
pub fn encode_with_limit(bodies: &[Body], max_payload: usize) -> Encoded {
    let capacity = max_payload.saturating_sub(HEADER_SIZE) / RECORD_SIZE;
    let body_count = bodies.len().min(capacity).min(u32::MAX as usize);
    let dropped = bodies.len() - body_count;
    if dropped > 0 {
        debug!(
            "too many bodies ({}), truncating to {} (packet size: {} bytes)",
            bodies.len(),
            body_count,
            encoded_len(body_count)
        );
    }

    let mut bytes = Vec::with_capacity(encoded_len(body_count));
    bytes.extend_from_slice(&(body_count as u32).to_be_bytes());
    for body in &bodies[..body_count] {
        for value in [
            body.position.x,
            body.position.y,
            body.radius(),
            body.mass(),
            body.velocity.x,
            body.velocity.y,
        ] {
            bytes.extend_from_slice(&value.to_bits().to_be_bytes());
        }
        bytes.extend_from_slice(&body.color);
    }
    debug_assert_eq!(bytes.len(), encoded_len(body_count));

    Encoded {
        bytes,
        body_count,
        dropped,
    }
}

fn read_f32(record: &[u8], field: usize) -> f32 {
    let start = field * 4;
    let mut raw = [0u8; 4];
    raw.copy_from_slice(&record[start..start + 4]);
    f32::from_bits(u32::from_be_bytes(raw))
}

fn decode_body(index: usize, record: &[u8]) -> Result<Body, CodecError> {
    let [x, y, radius, mass, vx, vy] = std::array::from_fn(|field| read_f32(record, field));
    let invalid = |field| CodecError::InvalidBody { index, field };

    if !(x.is_finite() && y.is_finite()) {
        return Err(invalid("position"));
    }
    if !(vx.is_finite() && vy.is_finite()) {
        return Err(invalid("velocity"));
    }
    if !radius.is_finite() {
        return Err(invalid("radius"));
    }
    if !mass.is_finite() {
        return Err(invalid("mass"));
    }

    // Non-positive radius and mass are sanitized the same way as locally
    // created bodies.
    Ok(Body::new(radius, mass)
        .with_position(x, y)
        .with_velocity(vx, vy)
        .with_color([record[24], record[25], record[26]]))
}

/// Decode a snapshot. Trailing bytes past the declared bodies are ignored.
///
/// Records holding NaN or infinite values reject the whole snapshot.
pub fn decode(packet: &[u8]) -> Result<Vec<Body>, CodecError> {
    let Some((header, payload)) = packet.split_first_chunk::<HEADER_SIZE>() else {
        return Err(CodecError::MissingHeader {
            received: packet.len(),
        });
    };
    let body_count = u32::from_be_bytes(*header) as usize;
    let expected = body_count
        .checked_mul(RECORD_SIZE)
        .and_then(|len| len.checked_add(HEADER_SIZE))
        .unwrap_or(usize::MAX);
    if packet.len() < expected {
        return Err(CodecError::Incomplete {
            received: packet.len(),
            expected,
        });
    }

    payload
        .chunks_exact(RECORD_SIZE)
        .take(body_count)
        .enumerate()
        .map(|(index, record)| decode_body(index, record))
        .collect()
}
