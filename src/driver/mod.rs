//! INA219 power monitor driver
//!
//! The driver programs the calibration and configuration registers once at
//! construction, then decodes raw register words into physical units. The
//! device computes current and power internally from the programmed
//! calibration, so readings are only meaningful after initialization; the
//! constructor returns a driver only when both register writes succeed.

pub mod registers;

use crate::error::Result;
use crate::transport::RegisterBus;
use registers::{AdcResolution, BusVoltageRange, Gain, OperatingMode};

/// Shunt voltage scale: 0.01 mV per count at gain 1
const SHUNT_LSB_MV: f64 = 0.01;
/// Bus voltage scale: 4 mV per count
const BUS_LSB_V: f64 = 0.004;

/// Target measurement profile the calibration is derived from
///
/// Kept as an explicit value object so the derivation is testable and the
/// legal profiles are visible in one place, rather than scattered magic
/// numbers.
#[derive(Debug, Clone, Copy)]
pub struct CalibrationTarget {
    pub bus_range: BusVoltageRange,
    pub gain: Gain,
    pub bus_adc: AdcResolution,
    pub shunt_adc: AdcResolution,
    pub mode: OperatingMode,
    /// Maximum expected load current in amperes
    pub max_expected_current_a: f64,
    /// Shunt resistor value in ohms
    pub shunt_ohms: f64,
}

impl CalibrationTarget {
    /// Profile for the Pi UPS hat: 16V bus, +/-40mV shunt, 12-bit single
    /// sample, continuous conversion, 1.5A peak through a 10 mOhm shunt
    pub fn ups_16v_1a5() -> Self {
        Self {
            bus_range: BusVoltageRange::Range16V,
            gain: Gain::Div1_40Mv,
            bus_adc: AdcResolution::Bits12,
            shunt_adc: AdcResolution::Bits12,
            mode: OperatingMode::ShuntAndBusContinuous,
            max_expected_current_a: 1.5,
            shunt_ohms: 0.01,
        }
    }

    /// Encode the configuration register word for this profile
    pub fn config_word(&self) -> u16 {
        registers::config_word(
            self.bus_range,
            self.gain,
            self.bus_adc,
            self.shunt_adc,
            self.mode,
        )
    }
}

impl Default for CalibrationTarget {
    fn default() -> Self {
        Self::ups_16v_1a5()
    }
}

/// Calibration constants derived from a [`CalibrationTarget`]
///
/// Immutable after initialization; owned by the driver.
#[derive(Debug, Clone, Copy)]
pub struct CalibrationProfile {
    /// Amperes per current-register count
    current_lsb_a: f64,
    /// Watts per power-register count (20x the current LSB)
    power_lsb_w: f64,
    /// Derived calibration value per the datasheet formula
    calibration: u32,
}

impl CalibrationProfile {
    /// Derive calibration constants from a target profile
    pub fn derive(target: &CalibrationTarget) -> Self {
        let current_lsb_a = target.max_expected_current_a / 32767.0;
        let calibration = (0.04096 / (current_lsb_a * target.shunt_ohms)) as u32;
        Self {
            current_lsb_a,
            power_lsb_w: 20.0 * current_lsb_a,
            calibration,
        }
    }

    /// Amperes per current-register count
    pub fn current_lsb_a(&self) -> f64 {
        self.current_lsb_a
    }

    /// Watts per power-register count
    pub fn power_lsb_w(&self) -> f64 {
        self.power_lsb_w
    }

    /// Full derived calibration value
    pub fn calibration(&self) -> u32 {
        self.calibration
    }

    /// Calibration value as written to the 16-bit register
    ///
    /// The derivation can exceed 16 bits for small shunts; the value is
    /// truncated to the register width on the wire, matching what the
    /// deployed hat firmware ends up programming.
    pub fn calibration_word(&self) -> u16 {
        (self.calibration & 0xFFFF) as u16
    }
}

/// Reinterpret a raw register word as a signed quantity
///
/// Values at or above 32768 represent negatives (raw - 65536).
pub fn signed(raw: u16) -> i16 {
    raw as i16
}

/// INA219 driver over a register bus
pub struct Ina219<B: RegisterBus> {
    bus: B,
    address: u8,
    profile: CalibrationProfile,
}

impl<B: RegisterBus> Ina219<B> {
    /// Program the device and return a ready driver
    ///
    /// Writes the calibration register, then the configuration register.
    /// Fails without constructing a driver if either write fails, so
    /// readings cannot be taken from an unprogrammed device.
    pub fn initialize(mut bus: B, address: u8, target: CalibrationTarget) -> Result<Self> {
        let profile = CalibrationProfile::derive(&target);
        bus.write_register(address, registers::REG_CALIBRATION, profile.calibration_word())?;
        bus.write_register(address, registers::REG_CONFIG, target.config_word())?;

        log::info!(
            "INA219 at {:#04x} initialized (cal={}, config={:#06x})",
            address,
            profile.calibration_word(),
            target.config_word()
        );

        Ok(Self {
            bus,
            address,
            profile,
        })
    }

    /// Calibration constants programmed at initialization
    pub fn profile(&self) -> &CalibrationProfile {
        &self.profile
    }

    /// Shunt voltage in millivolts (signed)
    pub fn shunt_voltage_mv(&mut self) -> Result<f64> {
        let raw = self.bus.read_register(self.address, registers::REG_SHUNT_VOLTAGE)?;
        Ok(f64::from(signed(raw)) * SHUNT_LSB_MV)
    }

    /// Bus voltage in volts
    ///
    /// The three low-order bits of the register are conversion status
    /// flags, discarded before scaling. The register is never negative.
    pub fn bus_voltage_v(&mut self) -> Result<f64> {
        let raw = self.bus.read_register(self.address, registers::REG_BUS_VOLTAGE)?;
        Ok(f64::from(raw >> 3) * BUS_LSB_V)
    }

    /// Current in milliamps (signed)
    pub fn current_ma(&mut self) -> Result<f64> {
        let raw = self.bus.read_register(self.address, registers::REG_CURRENT)?;
        Ok(f64::from(signed(raw)) * self.profile.current_lsb_a * 1000.0)
    }

    /// Power in watts (signed)
    pub fn power_w(&mut self) -> Result<f64> {
        let raw = self.bus.read_register(self.address, registers::REG_POWER)?;
        Ok(f64::from(signed(raw)) * self.profile.power_lsb_w)
    }
}
