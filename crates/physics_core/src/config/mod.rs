//! Configuration system
//!
//! World-wide physics constants live in [`PhysicsConfig`]. They are shared by
//! every rigidbody of a [`PhysicsWorld`](crate::physics::PhysicsWorld) rather
//! than stored per instance.

pub use serde::{Deserialize, Serialize};

use crate::foundation::math::Vec3;

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let parse: fn(&str) -> Result<Self, ConfigError> = if path.ends_with(".toml") {
            Self::from_toml_str
        } else if path.ends_with(".ron") {
            Self::from_ron_str
        } else {
            return Err(ConfigError::UnsupportedFormat(path.to_string()));
        };

        let contents = std::fs::read_to_string(path)?;
        parse(&contents)
    }

    /// Save configuration to file
    fn save_to_file(&self, path: &str) -> Result<(), ConfigError> {
        let contents = if path.ends_with(".toml") {
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else if path.ends_with(".ron") {
            ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else {
            return Err(ConfigError::UnsupportedFormat(path.to_string()));
        };

        std::fs::write(path, contents).map_err(ConfigError::Io)
    }

    /// Parse configuration from a TOML document
    fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Parse configuration from a RON document
    fn from_ron_str(contents: &str) -> Result<Self, ConfigError> {
        ron::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// A value is outside its allowed range
    #[error("Invalid value for `{field}`: {reason}")]
    Invalid {
        /// Name of the offending field
        field: &'static str,
        /// Why the value was rejected
        reason: String,
    },
}

/// World-wide simulation constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Gravity applied as an acceleration to every rigidbody using gravity
    pub gravity: Vec3,
    /// Friction coefficient applied along contact tangents
    pub friction: f32,
    /// Number of sub-steps per tick in continuous collision mode
    pub continuous_collision_steps: u8,
    /// Sleep threshold given to newly created rigidbodies
    pub default_sleep_threshold: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: Vec3::new(0.0, -9.8, 0.0),
            friction: 0.4,
            continuous_collision_steps: 8,
            default_sleep_threshold: 0.005,
        }
    }
}

impl Config for PhysicsConfig {}

impl PhysicsConfig {
    /// Builder pattern: set gravity
    pub fn with_gravity(mut self, gravity: Vec3) -> Self {
        self.gravity = gravity;
        self
    }

    /// Builder pattern: set the friction coefficient
    pub fn with_friction(mut self, friction: f32) -> Self {
        self.friction = friction;
        self
    }

    /// Builder pattern: set the continuous collision sub-step count
    pub fn with_continuous_collision_steps(mut self, steps: u8) -> Self {
        self.continuous_collision_steps = steps;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.gravity.iter().all(|c| c.is_finite()) {
            return Err(ConfigError::Invalid {
                field: "gravity",
                reason: "components must be finite".to_string(),
            });
        }

        if !self.friction.is_finite() || self.friction < 0.0 {
            return Err(ConfigError::Invalid {
                field: "friction",
                reason: format!("must be a non-negative number, got {}", self.friction),
            });
        }

        if self.continuous_collision_steps == 0 {
            return Err(ConfigError::Invalid {
                field: "continuous_collision_steps",
                reason: "must be at least 1".to_string(),
            });
        }

        if !self.default_sleep_threshold.is_finite() || self.default_sleep_threshold < 0.0 {
            return Err(ConfigError::Invalid {
                field: "default_sleep_threshold",
                reason: format!("must be a non-negative number, got {}", self.default_sleep_threshold),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = PhysicsConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.continuous_collision_steps, 8);
        assert_eq!(config.friction, 0.4);
    }

    #[test]
    fn test_toml_partial_document_keeps_defaults() {
        let config = PhysicsConfig::from_toml_str("friction = 0.25\n").unwrap();
        assert_eq!(config.friction, 0.25);
        assert_eq!(config.gravity, Vec3::new(0.0, -9.8, 0.0));
    }

    #[test]
    fn test_ron_round_trip() {
        let config = PhysicsConfig::default().with_continuous_collision_steps(4);
        let text = ron::ser::to_string(&config).unwrap();
        let parsed = PhysicsConfig::from_ron_str(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_validate_rejects_zero_steps() {
        let config = PhysicsConfig::default().with_continuous_collision_steps(0);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "continuous_collision_steps", .. })
        ));
    }

    #[test]
    fn test_unsupported_extension() {
        assert!(matches!(
            PhysicsConfig::load_from_file("physics.json"),
            Err(ConfigError::UnsupportedFormat(_))
        ));
        assert!(matches!(PhysicsConfig::load_from_file("missing.toml"), Err(ConfigError::Io(_))));
    }
}
