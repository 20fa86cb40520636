use std::collections::VecDeque;

use cgmath::Point2;

use crate::{
    body::{Body, Color},
    constants::TRAIL_MAX_LENGTH,
};

/// Recent positions of one body, oldest first.
#[derive(Debug, Clone, Default)]
pub struct Trail {
    pub color: Color,
    points: VecDeque<Point2<f32>>,
}

impl Trail {
    pub fn points(&self) -> impl ExactSizeIterator<Item = &Point2<f32>> {
        self.points.iter()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    fn push(&mut self, point: Point2<f32>, max_len: usize) {
        if self.points.len() == max_len {
            self.points.pop_front();
        }
        self.points.push_back(point);
    }
}

/// Per-body trajectory trails, matched to bodies by index.
#[derive(Debug, Clone)]
pub struct Trails {
    trails: Vec<Trail>,
    max_len: usize,
}

impl Default for Trails {
    fn default() -> Self {
        Self::new(TRAIL_MAX_LENGTH)
    }
}

impl Trails {
    pub fn new(max_len: usize) -> Self {
        Self {
            trails: Vec::new(),
            max_len: max_len.max(1),
        }
    }

    /// Record the current position of every body. New bodies start with an
    /// empty trail, trails of bodies that disappeared are dropped.
    pub fn record(&mut self, bodies: &[Body]) {
        self.trails.resize_with(bodies.len(), Trail::default);
        for (trail, body) in self.trails.iter_mut().zip(bodies) {
            trail.color = body.color;
            trail.push(body.position, self.max_len);
        }
    }

    pub fn clear(&mut self) {
        for trail in &mut self.trails {
            trail.points.clear();
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Trail> {
        self.trails.iter()
    }

    pub fn len(&self) -> usize {
        self.trails.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trails.is_empty()
    }
}
