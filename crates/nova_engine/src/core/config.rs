//! # Unified Configuration System
//!
//! Settings for the scene core and its drivers. Strong typing with
//! defaults; TOML is the on-disk format.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from loading a settings file
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("failed to read settings file: {0}")]
    Io(#[from] std::io::Error),

    /// File contents are not valid settings TOML
    #[error("failed to parse settings file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Per-scene behavior settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneSettings {
    /// Whether attached renderers default to casting shadows
    pub cast_shadows: bool,

    /// Initial time scale applied to tick deltas
    pub time_scale: f32,

    /// Fixed timestep the driver should feed `fixed_tick`, in seconds
    pub fixed_timestep: f32,
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self {
            cast_shadows: true,
            time_scale: 1.0,
            fixed_timestep: 1.0 / 60.0,
        }
    }
}

/// Top-level engine settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Scene behavior
    pub scene: SceneSettings,

    /// Log filter string handed to the logging system
    pub log_filter: String,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            scene: SceneSettings::default(),
            log_filter: String::from("info"),
        }
    }
}

impl EngineSettings {
    /// Parse settings from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Load settings from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = EngineSettings::default();
        assert!(settings.scene.cast_shadows);
        assert!((settings.scene.time_scale - 1.0).abs() < f32::EPSILON);
        assert_eq!(settings.log_filter, "info");
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let settings = EngineSettings::from_toml_str(
            r#"
            log_filter = "debug"

            [scene]
            time_scale = 0.5
            "#,
        )
        .unwrap();

        assert_eq!(settings.log_filter, "debug");
        assert!((settings.scene.time_scale - 0.5).abs() < f32::EPSILON);
        assert!(settings.scene.cast_shadows);
    }

    #[test]
    fn test_malformed_toml_is_a_parse_error() {
        let result = EngineSettings::from_toml_str("scene = 12");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }
}
