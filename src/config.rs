//! Configuration for the UrjaMon daemon
//!
//! Loads configuration from TOML file with the minimal parameters needed
//! to poll one INA219 and decide when to power off.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Top-level application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    pub hardware: HardwareConfig,
    pub monitor: MonitorConfig,
    pub logging: LoggingConfig,
}

/// Hardware configuration (I2C bus)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HardwareConfig {
    /// I2C bus device path
    pub i2c_bus: String,
    /// INA219 7-bit device address (the Pi UPS hat uses 0x42, not the
    /// datasheet default 0x40)
    pub device_address: u8,
}

/// Battery monitor configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MonitorConfig {
    /// Seconds between polls
    pub poll_interval_secs: u64,
    /// Bus voltage below which a poll counts toward the shutdown streak
    pub trip_voltage: f64,
    /// Bus voltage mapped to 0% charge
    pub empty_voltage: f64,
    /// Bus voltage mapped to 100% charge
    pub full_voltage: f64,
    /// Consecutive low polls before shutdown fires
    pub trip_cycles: u32,
    /// Command run when shutdown fires
    pub poweroff_command: String,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl AppConfig {
    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        config.monitor.validate()?;
        Ok(config)
    }

    /// Default configuration for the Pi UPS hat
    ///
    /// Suitable for testing and development. Production deployments
    /// should use a proper TOML configuration file.
    pub fn ups_hat_defaults() -> Self {
        Self {
            hardware: HardwareConfig {
                i2c_bus: "/dev/i2c-1".to_string(),
                device_address: 0x42,
            },
            monitor: MonitorConfig::default(),
            logging: LoggingConfig {
                level: "info".to_string(),
            },
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::ups_hat_defaults()
    }
}

impl MonitorConfig {
    /// Check that the configured ranges are usable
    pub fn validate(&self) -> Result<()> {
        if self.full_voltage <= self.empty_voltage {
            return Err(Error::InvalidParameter(format!(
                "full_voltage ({}) must be above empty_voltage ({})",
                self.full_voltage, self.empty_voltage
            )));
        }
        if self.trip_cycles == 0 {
            return Err(Error::InvalidParameter(
                "trip_cycles must be at least 1".to_string(),
            ));
        }
        if self.poll_interval_secs == 0 {
            return Err(Error::InvalidParameter(
                "poll_interval_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 2,
            trip_voltage: 6.0,
            empty_voltage: 6.0,
            full_voltage: 8.4,
            trip_cycles: 30,
            poweroff_command: "poweroff".to_string(),
        }
    }
}
