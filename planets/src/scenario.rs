//! Initial body definitions loaded from JSON.
//!
//! ```json
//! {
//!   "Planets": [
//!     { "radius": 10.5, "mass": 100.0, "x": 100.0, "y": 200.0,
//!       "velocity": [5.0, -3.0], "color": [255, 0, 0] }
//!   ]
//! }
//! ```
//!
//! `mass`, `velocity` and `color` may be left out.

use std::{fs::File, io::BufReader, path::Path};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::body::{Body, Color};

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("cannot read scenario: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed scenario: {0}")]
    Json(#[from] serde_json::Error),

    #[error("planet {index}: {reason}")]
    InvalidBody { index: usize, reason: &'static str },
}

/// One fully specified body of an initial scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyDefinition {
    pub radius: f32,
    /// Non-positive or missing means `radius²`.
    #[serde(default)]
    pub mass: f32,
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub velocity: [f32; 2],
    #[serde(default)]
    pub color: Option<Color>,
}

impl BodyDefinition {
    fn validate(&self, index: usize) -> Result<(), ScenarioError> {
        let invalid = |reason| Err(ScenarioError::InvalidBody { index, reason });
        if !self.radius.is_finite() || self.radius <= 0.0 {
            return invalid("radius must be positive");
        }
        if !self.mass.is_finite() {
            return invalid("mass must be finite");
        }
        if !(self.x.is_finite() && self.y.is_finite()) {
            return invalid("position must be finite");
        }
        if !self.velocity.iter().all(|v| v.is_finite()) {
            return invalid("velocity must be finite");
        }
        Ok(())
    }

    pub fn to_body(&self) -> Body {
        let body = Body::new(self.radius, self.mass)
            .with_position(self.x, self.y)
            .with_velocity(self.velocity[0], self.velocity[1]);
        match self.color {
            Some(color) => body.with_color(color),
            None => body,
        }
    }
}

impl From<&Body> for BodyDefinition {
    fn from(body: &Body) -> Self {
        Self {
            radius: body.radius(),
            mass: body.mass(),
            x: body.position.x,
            y: body.position.y,
            velocity: [body.velocity.x, body.velocity.y],
            color: Some(body.color),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(rename = "Planets")]
    pub planets: Vec<BodyDefinition>,
}

impl Scenario {
    pub fn from_json(json: &str) -> Result<Self, ScenarioError> {
        let scenario: Scenario = serde_json::from_str(json)?;
        scenario.validate()?;
        Ok(scenario)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ScenarioError> {
        let reader = BufReader::new(File::open(path)?);
        let scenario: Scenario = serde_json::from_reader(reader)?;
        scenario.validate()?;
        Ok(scenario)
    }

    pub fn from_bodies(bodies: &[Body]) -> Self {
        Self {
            planets: bodies.iter().map(BodyDefinition::from).collect(),
        }
    }

    fn validate(&self) -> Result<(), ScenarioError> {
        self.planets
            .iter()
            .enumerate()
            .try_for_each(|(index, def)| def.validate(index))
    }

    pub fn to_json(&self) -> Result<String, ScenarioError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Bodies in definition order.
    pub fn bodies(&self) -> Vec<Body> {
        self.planets.iter().map(BodyDefinition::to_body).collect()
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::constants::DEFAULT_COLOR;

    #[test]
    fn parses_full_definitions() {
        let scenario = Scenario::from_json(
            r#"{
                "Planets": [
                    { "radius": 10.5, "mass": 100.0, "x": 100.0, "y": 200.0,
                      "velocity": [5.0, -3.0], "color": [255, 0, 0] },
                    { "radius": 5.0, "mass": 50.0, "x": 300.0, "y": 400.0,
                      "velocity": [-2.0, 1.0], "color": [0, 255, 0] }
                ]
            }"#,
        )
        .unwrap();

        let bodies = scenario.bodies();
        assert_eq!(bodies.len(), 2);
        assert_relative_eq!(bodies[0].radius(), 10.5);
        assert_relative_eq!(bodies[0].mass(), 100.0);
        assert_relative_eq!(bodies[0].position.y, 200.0);
        assert_relative_eq!(bodies[0].velocity.y, -3.0);
        assert_eq!(bodies[0].color, [255, 0, 0]);
        assert_eq!(bodies[1].color, [0, 255, 0]);
    }

    #[test]
    fn optional_fields_fall_back() {
        let scenario =
            Scenario::from_json(r#"{ "Planets": [ { "radius": 4.0, "x": 1.0, "y": 2.0 } ] }"#)
                .unwrap();

        let body = scenario.bodies()[0];
        assert_relative_eq!(body.mass(), 16.0);
        assert_relative_eq!(body.velocity.x, 0.0);
        assert_eq!(body.color, DEFAULT_COLOR);
    }

    #[test]
    fn empty_list_is_an_empty_world() {
        let scenario = Scenario::from_json(r#"{ "Planets": [] }"#).unwrap();
        assert!(scenario.bodies().is_empty());
    }

    #[test]
    fn syntax_errors_are_reported() {
        let err = Scenario::from_json(r#"{ "Planets": [ { "radius": 1.0, "velocity": [5.0 "#)
            .unwrap_err();
        assert!(matches!(err, ScenarioError::Json(_)));
    }

    #[test]
    fn missing_required_field_is_an_error() {
        let err = Scenario::from_json(r#"{ "Planets": [ { "radius": 1.0, "x": 1.0 } ] }"#)
            .unwrap_err();
        assert!(matches!(err, ScenarioError::Json(_)));
    }

    #[test]
    fn non_positive_radius_is_rejected() {
        let err = Scenario::from_json(
            r#"{ "Planets": [ { "radius": 1.0, "x": 0.0, "y": 0.0 },
                              { "radius": 0.0, "x": 5.0, "y": 0.0 } ] }"#,
        )
        .unwrap_err();
        assert!(matches!(err, ScenarioError::InvalidBody { index: 1, .. }));
    }

    #[test]
    fn bodies_survive_a_json_roundtrip() {
        let bodies = vec![
            Body::new(3.0, 7.0)
                .with_position(1.0, 2.0)
                .with_velocity(0.5, -0.5)
                .with_color([1, 2, 3]),
        ];
        let json = Scenario::from_bodies(&bodies).to_json().unwrap();
        assert_eq!(Scenario::from_json(&json).unwrap().bodies(), bodies);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = Scenario::load("does/not/exist.json").unwrap_err();
        assert!(matches!(err, ScenarioError::Io(_)));
    }
}
