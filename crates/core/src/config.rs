//! Tunables for zooming and result formatting.
//!
//! Configuration can be created programmatically, overlaid from environment
//! variables, or parsed from a JSON settings blob handed over by the host.

use serde::{Deserialize, Serialize};

/// Environment variable for the wheel zoom step
pub const ENV_ZOOM_INTENSITY: &str = "PLAN_AREA_ZOOM_INTENSITY";
/// Environment variable for the lower scale clamp
pub const ENV_MIN_SCALE: &str = "PLAN_AREA_MIN_SCALE";
/// Environment variable for the upper scale clamp
pub const ENV_MAX_SCALE: &str = "PLAN_AREA_MAX_SCALE";
/// Environment variable for the toolbar zoom multiplier
pub const ENV_BUTTON_ZOOM_FACTOR: &str = "PLAN_AREA_BUTTON_ZOOM_FACTOR";
/// Environment variable for the area label precision
pub const ENV_AREA_DIGITS: &str = "PLAN_AREA_AREA_DIGITS";

/// Configuration for the measurement engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeasureConfig {
    /// Relative scale change per wheel notch (`scale * (1 ± k)`)
    pub zoom_intensity: f64,
    /// Smallest allowed view scale
    pub min_scale: f64,
    /// Largest allowed view scale
    pub max_scale: f64,
    /// Multiplier applied by the zoom in / zoom out buttons
    pub button_zoom_factor: f64,
    /// Maximum fraction digits shown in the area label
    pub area_fraction_digits: usize,
}

impl Default for MeasureConfig {
    fn default() -> Self {
        Self {
            zoom_intensity: 0.1,
            min_scale: 0.1,
            max_scale: 20.0,
            button_zoom_factor: 1.2,
            area_fraction_digits: 2,
        }
    }
}

impl MeasureConfig {
    /// Sets the wheel zoom step.
    pub fn with_zoom_intensity(mut self, intensity: f64) -> Self {
        self.zoom_intensity = intensity;
        self
    }

    /// Sets the allowed scale range.
    pub fn with_scale_range(mut self, min_scale: f64, max_scale: f64) -> Self {
        self.min_scale = min_scale;
        self.max_scale = max_scale;
        self
    }

    /// Sets the toolbar zoom multiplier.
    pub fn with_button_zoom_factor(mut self, factor: f64) -> Self {
        self.button_zoom_factor = factor;
        self
    }

    /// Sets the area label precision.
    pub fn with_area_fraction_digits(mut self, digits: usize) -> Self {
        self.area_fraction_digits = digits;
        self
    }

    /// Clamps a scale into the configured range.
    pub fn clamp_scale(&self, scale: f64) -> f64 {
        scale.clamp(self.min_scale, self.max_scale)
    }

    /// Loads configuration from environment variables on top of the defaults.
    ///
    /// Environment variables:
    /// - `PLAN_AREA_ZOOM_INTENSITY` (default: 0.1)
    /// - `PLAN_AREA_MIN_SCALE` (default: 0.1)
    /// - `PLAN_AREA_MAX_SCALE` (default: 20.0)
    /// - `PLAN_AREA_BUTTON_ZOOM_FACTOR` (default: 1.2)
    /// - `PLAN_AREA_AREA_DIGITS` (default: 2)
    ///
    /// # Errors
    /// Returns an error if any variable is unparsable or the result fails
    /// [`MeasureConfig::validate`].
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(value) = env_value::<f64>(ENV_ZOOM_INTENSITY)? {
            config.zoom_intensity = value;
        }
        if let Some(value) = env_value::<f64>(ENV_MIN_SCALE)? {
            config.min_scale = value;
        }
        if let Some(value) = env_value::<f64>(ENV_MAX_SCALE)? {
            config.max_scale = value;
        }
        if let Some(value) = env_value::<f64>(ENV_BUTTON_ZOOM_FACTOR)? {
            config.button_zoom_factor = value;
        }
        if let Some(value) = env_value::<usize>(ENV_AREA_DIGITS)? {
            config.area_fraction_digits = value;
        }

        config.validate()?;
        Ok(config)
    }

    /// Parses configuration from a JSON settings blob. Missing keys keep
    /// their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that the values describe a usable zoom range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.min_scale.is_finite() && self.min_scale > 0.0) {
            return Err(ConfigError::OutOfRange("min_scale"));
        }
        if !(self.max_scale.is_finite() && self.max_scale >= self.min_scale) {
            return Err(ConfigError::OutOfRange("max_scale"));
        }
        if !(self.zoom_intensity > 0.0 && self.zoom_intensity < 1.0) {
            return Err(ConfigError::OutOfRange("zoom_intensity"));
        }
        if !(self.button_zoom_factor.is_finite() && self.button_zoom_factor > 1.0) {
            return Err(ConfigError::OutOfRange("button_zoom_factor"));
        }
        Ok(())
    }
}

fn env_value<T: std::str::FromStr>(key: &str) -> Result<Option<T>, ConfigError> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue(key.to_string())),
        Err(_) => Ok(None),
    }
}

/// Errors that can occur while building a configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Unparsable value for a configuration key
    #[error("invalid value for configuration key: {0}")]
    InvalidValue(String),
    /// Value parsed but outside its allowed range
    #[error("configuration value out of range: {0}")]
    OutOfRange(&'static str),
    /// Malformed JSON settings
    #[error("invalid settings JSON: {0}")]
    Json(#[from] serde_json::Error),
}
