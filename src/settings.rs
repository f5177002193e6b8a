//! Engine settings
//!
//! Loaded from a JSON file at setup. Missing fields keep their defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{EngineError, Result};
use crate::render::Color;

/// Engine settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    // === Simulation ===
    /// Fixed simulation step in seconds
    pub fixed_time_step: f64,
    /// Physics sub-iterations per fixed tick
    pub physics_iterations: u32,
    /// Apply the resting-contact penetration correction after each sweep.
    /// Off by default: the correction is computed and discarded.
    pub resolve_resting_penetration: bool,
    /// Seed for the engine RNG
    pub seed: u64,

    // === Presentation ===
    /// Interpolate visual boxes between fixed ticks
    pub interpolation: bool,
    pub screen_width: u32,
    pub screen_height: u32,
    /// Background color the presenter clears to
    pub clear_color: Color,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            fixed_time_step: FIXED_TIME_STEP,
            physics_iterations: PHYSICS_ITERATIONS,
            resolve_resting_penetration: false,
            seed: 0,

            interpolation: true,
            screen_width: SCREEN_WIDTH,
            screen_height: SCREEN_HEIGHT,
            clear_color: Color::new(8, 11, 15, 255),
        }
    }
}

impl EngineSettings {
    /// Parse settings from a JSON string and validate them
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load settings from a JSON file
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| EngineError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::from_json(&json)?;
        log::info!(
            "Loaded settings from {}: step={:.5}s, iterations={}, interpolation={}",
            path.display(),
            settings.fixed_time_step,
            settings.physics_iterations,
            settings.interpolation
        );
        Ok(settings)
    }

    /// Reject values the loop cannot run with
    pub fn validate(&self) -> Result<()> {
        if !(self.fixed_time_step.is_finite() && self.fixed_time_step > 0.0) {
            return Err(EngineError::InvalidSettings(format!(
                "fixed_time_step must be positive, got {}",
                self.fixed_time_step
            )));
        }
        if self.physics_iterations == 0 {
            return Err(EngineError::InvalidSettings(
                "physics_iterations must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_consts() {
        let settings = EngineSettings::default();
        assert_eq!(settings.fixed_time_step, FIXED_TIME_STEP);
        assert_eq!(settings.physics_iterations, 4);
        assert!(settings.interpolation);
        assert!(!settings.resolve_resting_penetration);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let settings = EngineSettings::from_json(r#"{ "physics_iterations": 8 }"#).unwrap();
        assert_eq!(settings.physics_iterations, 8);
        assert_eq!(settings.fixed_time_step, FIXED_TIME_STEP);
    }

    #[test]
    fn test_json_round_trip() {
        let mut settings = EngineSettings::default();
        settings.seed = 42;
        let json = settings.to_json().unwrap();
        assert_eq!(EngineSettings::from_json(&json).unwrap(), settings);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            EngineSettings::from_json(r#"{ "physics_iterations": 0 }"#),
            Err(EngineError::InvalidSettings(_))
        ));
        assert!(matches!(
            EngineSettings::from_json(r#"{ "fixed_time_step": -1.0 }"#),
            Err(EngineError::InvalidSettings(_))
        ));
        assert!(matches!(
            EngineSettings::from_json("{ not json"),
            Err(EngineError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = EngineSettings::load_from_file("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, EngineError::Io { .. }));
    }
}
