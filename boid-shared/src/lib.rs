use serde::{Deserialize, Serialize};
use std::fmt;

/// Represents a 2D position in world coordinates
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

/// What presentation needs to draw one agent
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentState {
    pub position: Position,
    /// Radians, `atan2(vy, vx)`.
    pub heading: f32,
    pub speed: f32,
    pub color: Rgba,
}

/// The whole flock as it stood between two ticks
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FlockSnapshot {
    pub tick: u64,
    pub agents: Vec<AgentState>,
}

/// Status report emitted by the driver
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatusReport {
    pub boid_count: usize,
    pub tick: u64,
    /// Ticks per second over the last full measurement window.
    pub tps: f64,
}

/// Construction-time configuration of a simulation run.
///
/// Missing JSON fields fall back to [`SimulationSettings::default`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimulationSettings {
    pub world_width: f32,
    pub world_height: f32,
    pub boid_count: usize,
    /// Ticks per second; `0` runs unpaced.
    pub tick_rate: f64,
    /// Seed for the initial population. `None` draws one from entropy.
    pub seed: Option<u64>,
    /// Fixed attractor point. `None` uses the world center.
    pub attractor: Option<Position>,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            world_width: 640.0,
            world_height: 480.0,
            boid_count: 50,
            tick_rate: 60.0,
            seed: None,
            attractor: None,
        }
    }
}

impl SimulationSettings {
    pub fn from_json_str(json: &str) -> Result<Self, SettingsError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_json_string(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn attractor_or_center(&self) -> Position {
        self.attractor
            .unwrap_or_else(|| Position::new(self.world_width / 2.0, self.world_height / 2.0))
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        let valid_extent = |v: f32| v.is_finite() && v > 0.0;
        if !valid_extent(self.world_width) || !valid_extent(self.world_height) {
            return Err(SettingsError::InvalidBounds {
                width: self.world_width,
                height: self.world_height,
            });
        }

        if self.boid_count < 2 {
            return Err(SettingsError::PopulationTooSmall {
                count: self.boid_count,
            });
        }

        if !self.tick_rate.is_finite() || self.tick_rate < 0.0 {
            return Err(SettingsError::InvalidTickRate(self.tick_rate));
        }

        if let Some(attractor) = self.attractor {
            if !attractor.x.is_finite() || !attractor.y.is_finite() {
                return Err(SettingsError::InvalidAttractor(attractor));
            }
        }

        Ok(())
    }
}

/// Errors that can occur while loading or validating settings.
#[derive(Debug)]
pub enum SettingsError {
    InvalidBounds { width: f32, height: f32 },
    /// A tick needs at least two agents.
    PopulationTooSmall { count: usize },
    InvalidTickRate(f64),
    InvalidAttractor(Position),
    Json(serde_json::Error),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::InvalidBounds { width, height } => write!(
                f,
                "world bounds must be positive and finite, got {} x {}",
                width, height
            ),
            SettingsError::PopulationTooSmall { count } => {
                write!(f, "at least 2 boids are required, got {}", count)
            }
            SettingsError::InvalidTickRate(rate) => {
                write!(f, "tick rate must be finite and not negative, got {}", rate)
            }
            SettingsError::InvalidAttractor(p) => {
                write!(f, "attractor must be finite, got ({}, {})", p.x, p.y)
            }
            SettingsError::Json(e) => write!(f, "invalid settings JSON: {}", e),
        }
    }
}

impl std::error::Error for SettingsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SettingsError::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for SettingsError {
    fn from(e: serde_json::Error) -> Self {
        SettingsError::Json(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_are_valid() {
        let settings = SimulationSettings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.attractor_or_center(), Position::new(320.0, 240.0));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings =
            SimulationSettings::from_json_str(r#"{"boid_count": 120, "seed": 9}"#).unwrap();
        assert_eq!(settings.boid_count, 120);
        assert_eq!(settings.seed, Some(9));
        assert_eq!(settings.world_width, 640.0);
        assert_eq!(settings.tick_rate, 60.0);
    }

    #[test]
    fn test_settings_json_round_trip() {
        let settings = SimulationSettings {
            attractor: Some(Position::new(10.0, 20.0)),
            ..SimulationSettings::default()
        };
        let json = settings.to_json_string().unwrap();
        assert_eq!(SimulationSettings::from_json_str(&json).unwrap(), settings);
    }

    #[test]
    fn test_rejects_single_boid() {
        let settings = SimulationSettings {
            boid_count: 1,
            ..SimulationSettings::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(SettingsError::PopulationTooSmall { count: 1 })
        ));
    }

    #[test]
    fn test_rejects_bad_bounds_and_tick_rate() {
        let zero_width = SimulationSettings {
            world_width: 0.0,
            ..SimulationSettings::default()
        };
        assert!(matches!(
            zero_width.validate(),
            Err(SettingsError::InvalidBounds { .. })
        ));

        let negative_rate = SimulationSettings {
            tick_rate: -1.0,
            ..SimulationSettings::default()
        };
        assert!(matches!(
            negative_rate.validate(),
            Err(SettingsError::InvalidTickRate(_))
        ));
    }

    #[test]
    fn test_malformed_json_is_reported() {
        let err = SimulationSettings::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, SettingsError::Json(_)));
        assert!(err.to_string().starts_with("invalid settings JSON"));
    }
}
