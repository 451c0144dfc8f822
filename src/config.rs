//! Configuration loaded from `irrigator.toml`.
//!
//! [`IrrigatorConfig`] contains every tunable parameter. Values missing from
//! the file fall back to sensible defaults, and the `IRRIGATOR_MAX_ATTEMPTS`
//! environment variable takes precedence over the file. Configuration
//! problems are rejected here, before any decision run starts.

use std::path::Path;

use serde::Deserialize;

use crate::directory::FieldProfile;
use crate::error::IrrigatorError;
use crate::sensor::SimulationParams;
use crate::workflow::RetryPolicy;

/// Top-level configuration loaded from `irrigator.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct IrrigatorConfig {
    /// Maximum sensor attempts per decision run.
    #[serde(default = "default_max_attempts")]
    pub max_sensor_attempts: u32,

    /// Base delay in milliseconds for exponential back-off between attempts.
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,

    /// Optional total deadline per run, in milliseconds.
    #[serde(default)]
    pub deadline_ms: Option<u64>,

    /// Failure-injection tuning for the simulated sensor network.
    #[serde(default)]
    pub sensor: SimulationParams,

    /// Extra field profiles merged into the built-in directory.
    #[serde(default)]
    pub fields: Vec<FieldProfile>,
}

// Default sensor attempt bound: 3.
fn default_max_attempts() -> u32 {
    3
}

// Default back-off base: 200ms.
fn default_base_delay_ms() -> u64 {
    200
}

impl Default for IrrigatorConfig {
    fn default() -> Self {
        Self {
            max_sensor_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
            deadline_ms: None,
            sensor: SimulationParams::default(),
            fields: Vec::new(),
        }
    }
}

impl IrrigatorConfig {
    /// Load the configuration from `irrigator.toml` in the current directory,
    /// using defaults if the file does not exist.
    pub fn load() -> Result<Self, IrrigatorError> {
        Self::load_from(Path::new("irrigator.toml"))
    }

    /// Load the configuration from the given path.
    pub fn load_from(path: &Path) -> Result<Self, IrrigatorError> {
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            toml::from_str::<IrrigatorConfig>(&contents)?
        } else {
            Self::default()
        };

        // The environment variable has precedence over the config file.
        if let Ok(raw) = std::env::var("IRRIGATOR_MAX_ATTEMPTS")
            && !raw.is_empty()
        {
            config.max_sensor_attempts = raw.parse().map_err(|_| {
                IrrigatorError::Config(format!(
                    "IRRIGATOR_MAX_ATTEMPTS must be an integer, got {raw:?}"
                ))
            })?;
        }

        Ok(config)
    }

    /// Reject unusable configurations before any run starts.
    pub fn validate(&self) -> Result<(), IrrigatorError> {
        if self.max_sensor_attempts < 1 {
            return Err(IrrigatorError::Config(
                "max_sensor_attempts must be at least 1".to_string(),
            ));
        }
        for (name, rate) in [
            ("sensor.timeout_rate", self.sensor.timeout_rate),
            ("sensor.fault_rate", self.sensor.fault_rate),
        ] {
            if !(0.0..=1.0).contains(&rate) {
                return Err(IrrigatorError::Config(format!(
                    "{name} must be within [0, 1], got {rate}"
                )));
            }
        }
        if self.sensor.jitter < 0.0 {
            return Err(IrrigatorError::Config(format!(
                "sensor.jitter must not be negative, got {}",
                self.sensor.jitter
            )));
        }
        for profile in &self.fields {
            profile.validate()?;
        }
        Ok(())
    }

    /// The retry policy this configuration describes.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_sensor_attempts,
            base_delay_ms: self.base_delay_ms,
            deadline_ms: self.deadline_ms,
        }
    }
}
