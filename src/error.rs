//! Error types for UrjaMon

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// UrjaMon error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Linux I2C bus error
    #[error("I2C error: {0}")]
    I2c(#[from] i2cdev::linux::LinuxI2CError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Register transport failure (device absent, bus busy, NACK)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Configuration file error
    #[error("Config error: {0}")]
    Config(String),

    /// Configuration parse error
    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Invalid parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}
