//! Transport layer for register bus abstraction

use crate::error::Result;

mod i2c;
pub use i2c::I2cBus;

pub mod mock;
pub use mock::MockBus;

/// Register bus trait for device communication
///
/// Models a bus where each device exposes a window of 16-bit registers,
/// addressed by a 7-bit device address and an 8-bit register offset.
pub trait RegisterBus: Send {
    /// Read a 16-bit register from a device
    fn read_register(&mut self, address: u8, register: u8) -> Result<u16>;

    /// Write a 16-bit register on a device
    fn write_register(&mut self, address: u8, register: u8, value: u16) -> Result<()>;
}
