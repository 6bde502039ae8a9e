//! Configuration for the modsynth synthesizer.
//!
//! Settings live in a TOML file. Every field is optional; missing fields take
//! their defaults.
//!
//! ```toml
//! sample_rate = 44100
//! period_size = 512
//! device = "USB"
//!
//! [pacing]
//! ahead_tolerance_ms = 20
//! behind_limit_ms = 250
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use modsynth_config::{SynthConfig, default_config_path};
//!
//! let config = SynthConfig::load_or_default(None).unwrap();
//! println!("{} Hz, {} samples per period", config.sample_rate, config.period_size);
//!
//! let mut config = config;
//! config.device = Some("USB".to_string());
//! config.save(default_config_path()).unwrap();
//! ```

mod error;

/// Platform-specific configuration paths.
pub mod paths;

/// Configuration value checks.
pub mod validation;

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub use error::ConfigError;
pub use paths::{default_config_path, user_config_dir};
pub use validation::{ValidationError, validate_config};

/// Drift thresholds for the real-time scheduler, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PacingConfig {
    /// Lead allowed before the scheduler sleeps.
    pub ahead_tolerance_ms: u64,
    /// Lag allowed before synthesis is declared desynchronized.
    pub behind_limit_ms: u64,
}

impl PacingConfig {
    /// Ahead tolerance as a duration.
    pub fn ahead_tolerance(&self) -> Duration {
        Duration::from_millis(self.ahead_tolerance_ms)
    }

    /// Behind limit as a duration.
    pub fn behind_limit(&self) -> Duration {
        Duration::from_millis(self.behind_limit_ms)
    }
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            ahead_tolerance_ms: 20,
            behind_limit_ms: 250,
        }
    }
}

/// Synthesizer settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthConfig {
    /// Requested sample rate in Hz.
    pub sample_rate: u32,
    /// Preferred period size in samples.
    pub period_size: usize,
    /// Output device: index, name, or case-insensitive substring.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
    /// Scheduler pacing.
    pub pacing: PacingConfig,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            period_size: 512,
            device: None,
            pacing: PacingConfig::default(),
        }
    }
}

impl SynthConfig {
    /// Load and validate a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        Self::from_toml(&content)
    }

    /// Parse and validate a configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: SynthConfig = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` if given, otherwise the default config file if it exists,
    /// otherwise the defaults.
    ///
    /// An explicit path that does not exist is an error.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = path {
            return Self::load(path);
        }
        let default = default_config_path();
        if default.is_file() {
            Self::load(default)
        } else {
            Ok(Self::default())
        }
    }

    /// Save to a TOML file, creating parent directories as needed.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }
        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))?;
        Ok(())
    }

    /// Serialize to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_config(self)
    }
}
