//! Linux I2C transport implementation

use super::RegisterBus;
use crate::error::Result;
use i2cdev::core::I2CDevice;
use i2cdev::linux::LinuxI2CDevice;

/// I2C transport over a Linux `/dev/i2c-*` character device
///
/// Uses SMBus word transfers. SMBus sends the low byte first, while the
/// INA219 (like most register-based sensors) transmits registers MSB
/// first, so every word is byte-swapped at this boundary.
pub struct I2cBus {
    dev: LinuxI2CDevice,
    /// Slave address the kernel device handle is currently bound to
    bound_address: u8,
}

impl I2cBus {
    /// Open an I2C bus device
    ///
    /// # Arguments
    /// * `path` - Bus device path (e.g., "/dev/i2c-1")
    /// * `address` - Initial 7-bit slave address
    pub fn open(path: &str, address: u8) -> Result<Self> {
        let dev = LinuxI2CDevice::new(path, u16::from(address))?;

        log::info!("Opened I2C bus {} (device {:#04x})", path, address);

        Ok(I2cBus {
            dev,
            bound_address: address,
        })
    }

    /// Rebind the kernel handle if the caller targets a different device
    fn bind(&mut self, address: u8) -> Result<()> {
        if address != self.bound_address {
            self.dev.set_slave_address(u16::from(address))?;
            self.bound_address = address;
        }
        Ok(())
    }
}

impl RegisterBus for I2cBus {
    fn read_register(&mut self, address: u8, register: u8) -> Result<u16> {
        self.bind(address)?;
        let word = self.dev.smbus_read_word_data(register)?;
        Ok(word.swap_bytes())
    }

    fn write_register(&mut self, address: u8, register: u8, value: u16) -> Result<()> {
        self.bind(address)?;
        self.dev.smbus_write_word_data(register, value.swap_bytes())?;
        Ok(())
    }
}
