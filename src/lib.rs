//! UrjaMon - Battery monitor daemon for INA219-based UPS hats
//!
//! This library provides the core components: a register-bus transport
//! abstraction, the INA219 sensor driver, and the low-voltage shutdown
//! monitor. The `urja-mon` binary wires them into a polling daemon.

pub mod config;
pub mod driver;
pub mod error;
pub mod monitor;
pub mod transport;
pub mod types;

// Re-export commonly used types
pub use config::AppConfig;
pub use driver::{CalibrationTarget, Ina219};
pub use error::{Error, Result};
pub use monitor::{BatteryMonitor, MonitorState, PoweroffHandler};
pub use types::BatteryReading;
