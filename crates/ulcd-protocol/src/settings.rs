//! Display connection configuration

use crate::baud::BaudRate;
use crate::error::UlcdError;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Prefix for environment overrides (`ULCD_DEVICE`, `ULCD_BAUD_CODE`)
pub const ENV_PREFIX: &str = "ULCD";

/// Where and how fast to talk to the display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Serial device path (e.g., "/dev/ttyUSB0")
    pub device: String,
    /// Device baud-select code (see [`BAUD_TABLE`](crate::BAUD_TABLE))
    pub baud_code: u8,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            device: "/dev/ttyUSB0".to_string(),
            baud_code: 13, // 115200
        }
    }
}

impl DisplayConfig {
    pub fn new(device: impl Into<String>, baud_code: u8) -> Self {
        Self {
            device: device.into(),
            baud_code,
        }
    }

    /// Load configuration from defaults, an optional file, and the environment
    ///
    /// Later sources override earlier ones. The file format is picked from
    /// its extension (TOML, YAML, JSON, ...).
    pub fn load(path: Option<&Path>) -> Result<Self, UlcdError> {
        let defaults = Self::default();
        let mut builder = Config::builder()
            .set_default("device", defaults.device)?
            .set_default("baud_code", i64::from(defaults.baud_code))?;

        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }

        let config: Self = builder
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Check the device path and baud code
    pub fn validate(&self) -> Result<(), UlcdError> {
        if self.device.is_empty() {
            return Err(UlcdError::Config("device path is empty".to_string()));
        }
        self.baud_rate().map(|_| ())
    }

    /// Resolve the baud code through the baud rate table
    pub fn baud_rate(&self) -> Result<BaudRate, UlcdError> {
        BaudRate::from_code(self.baud_code)
    }
}
