//! Configuration of the log-normal shadowing model.

use anyhow::Context;
use serde::{Deserialize, Deserializer};
use std::path::{Path, PathBuf};

use super::random::RandomVariableSpec;

/// Default path loss exponent.
pub const DEFAULT_EXPONENT: f64 = 3.0;
/// Default reference distance in meters.
pub const DEFAULT_REFERENCE_DISTANCE: f64 = 1.0;
/// Friis loss at 1 m for 5.15 GHz, in dB.
pub const DEFAULT_REFERENCE_LOSS: f64 = 46.6777;

/// Error type for configuration and parameter validation failures.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    FileReadError(String),
    ParseError(String),
    InvalidParameter(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::FileReadError(msg) => write!(f, "Failed to read file: {}", msg),
            ConfigError::ParseError(msg) => write!(f, "Failed to parse configuration: {}", msg),
            ConfigError::InvalidParameter(msg) => write!(f, "Invalid parameter: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Parameters of the log-distance model with additive shadowing.
///
/// Every field has a default, so an empty table is a valid configuration.
/// The PascalCase option names (`Exponent`, `ReferenceDistance`,
/// `ReferenceLoss`, `RandomVariable`) are accepted as aliases.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LogNormalConfig {
    /// Path loss exponent (n).
    ///
    /// - n = 2.0: free space
    /// - n = 2.7 to 3.5: urban areas
    /// - n = 3.0 to 5.0: indoor obstructed environments
    #[serde(alias = "Exponent")]
    pub exponent: f64,

    /// Distance d₀ in meters at which `reference_loss` applies. Must be positive.
    #[serde(alias = "ReferenceDistance")]
    pub reference_distance: f64,

    /// Path loss at d₀ in dB.
    #[serde(alias = "ReferenceLoss")]
    pub reference_loss: f64,

    /// Distribution of the shadowing term, as a table or an attribute string.
    #[serde(alias = "RandomVariable", deserialize_with = "deserialize_random_variable")]
    pub random_variable: RandomVariableSpec,
}

impl Default for LogNormalConfig {
    fn default() -> Self {
        Self {
            exponent: DEFAULT_EXPONENT,
            reference_distance: DEFAULT_REFERENCE_DISTANCE,
            reference_loss: DEFAULT_REFERENCE_LOSS,
            random_variable: RandomVariableSpec::default(),
        }
    }
}

fn deserialize_random_variable<'de, D>(deserializer: D) -> Result<RandomVariableSpec, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Text(String),
        Table(RandomVariableSpec),
    }

    match Repr::deserialize(deserializer)? {
        Repr::Text(text) => text.parse().map_err(serde::de::Error::custom),
        Repr::Table(spec) => Ok(spec),
    }
}

/// Check the reference distance invariant (finite and strictly positive).
pub(crate) fn validate_reference_distance(distance: f64) -> Result<(), ConfigError> {
    if !distance.is_finite() || distance <= 0.0 {
        return Err(ConfigError::InvalidParameter(format!(
            "reference_distance must be finite and positive, got {}",
            distance
        )));
    }
    Ok(())
}

impl LogNormalConfig {
    /// Validate numeric sanity of all fields.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.exponent.is_finite() {
            return Err(ConfigError::InvalidParameter(format!("exponent must be finite, got {}", self.exponent)));
        }
        validate_reference_distance(self.reference_distance)?;
        if !self.reference_loss.is_finite() {
            return Err(ConfigError::InvalidParameter(format!(
                "reference_loss must be finite, got {}",
                self.reference_loss
            )));
        }
        Ok(())
    }

    /// Parse and validate a configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: LogNormalConfig = toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Arguments
    /// * `config_path` - Path to the config.toml file
    ///
    /// # Returns
    /// * `Ok(LogNormalConfig)` if the file was read, parsed and validated
    /// * `Err(ConfigError)` with a descriptive message otherwise
    pub fn load(config_path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(config_path)
            .with_context(|| format!("{}", config_path.display()))
            .map_err(|e| ConfigError::FileReadError(format!("{:#}", e)))?;

        let config = Self::from_toml_str(&content)?;
        log::info!("Loaded propagation configuration: {:?}", config_path);
        Ok(config)
    }

    /// Derive the config path from a scene file path.
    ///
    /// Replaces the scene filename with "config.toml" in the same directory.
    pub fn config_path_from_scene(scene_path: &Path) -> PathBuf {
        scene_path.parent().unwrap_or(Path::new(".")).join("config.toml")
    }
}
