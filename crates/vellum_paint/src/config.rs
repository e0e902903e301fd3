//! Device configuration (vellum.toml)

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;
use vellum_core::{Dpi, TextAntialiasMode};

/// Configuration loading errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse device config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid device config: {0}")]
    Invalid(String),
}

/// Initial state for a [`ResourceDevice`](crate::ResourceDevice) and its sessions
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct DeviceConfig {
    /// DPI the device starts with
    #[serde(default)]
    pub dpi: Dpi,
    /// Antialiasing for new sessions
    #[serde(default = "default_true")]
    pub antialias: bool,
    /// Text antialiasing for new sessions
    #[serde(default)]
    pub text_antialias: TextAntialiasMode,
    /// Flattening tolerance used by geometry hit-testing
    #[serde(default = "default_tolerance")]
    pub hit_test_tolerance: f32,
}

fn default_true() -> bool {
    true
}

fn default_tolerance() -> f32 {
    0.25
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            dpi: Dpi::default(),
            antialias: true,
            text_antialias: TextAntialiasMode::default(),
            hit_test_tolerance: default_tolerance(),
        }
    }
}

impl DeviceConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: DeviceConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file, or from `vellum.toml` inside a directory.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let config_path = if path.is_dir() {
            path.join("vellum.toml")
        } else {
            path.to_path_buf()
        };

        let content = fs::read_to_string(&config_path).map_err(|source| ConfigError::Read {
            path: config_path.display().to_string(),
            source,
        })?;

        Self::from_toml_str(&content)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(self.hit_test_tolerance.is_finite() && self.hit_test_tolerance > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "hit_test_tolerance must be positive, got {}",
                self.hit_test_tolerance
            )));
        }
        if !(self.dpi.x > 0.0 && self.dpi.y > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "dpi must be positive, got {}x{}",
                self.dpi.x, self.dpi.y
            )));
        }
        Ok(())
    }

    /// Serialize to a TOML string
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
