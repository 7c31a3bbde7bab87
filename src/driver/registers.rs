//! INA219 register map and configuration field encodings
//!
//! Register offsets and field values follow the TI INA219 datasheet
//! (SBOS448). The configuration word layout is fixed by hardware:
//!
//! ```text
//! bit 15    RST   (unused here)
//! bit 13    BRNG  bus voltage range
//! bits 12:11 PG   shunt gain
//! bits 10:7 BADC  bus ADC resolution/averaging
//! bits 6:3  SADC  shunt ADC resolution/averaging
//! bits 2:0  MODE  operating mode
//! ```

/// Configuration register
pub const REG_CONFIG: u8 = 0x00;
/// Shunt voltage register (signed, 10 uV/LSB at gain 1)
pub const REG_SHUNT_VOLTAGE: u8 = 0x01;
/// Bus voltage register (unsigned, status flags in bits 2:0)
pub const REG_BUS_VOLTAGE: u8 = 0x02;
/// Power register (scaled by the programmed calibration)
pub const REG_POWER: u8 = 0x03;
/// Current register (scaled by the programmed calibration)
pub const REG_CURRENT: u8 = 0x04;
/// Calibration register
pub const REG_CALIBRATION: u8 = 0x05;

const BRNG_SHIFT: u16 = 13;
const PG_SHIFT: u16 = 11;
const BADC_SHIFT: u16 = 7;
const SADC_SHIFT: u16 = 3;

/// Bus voltage full-scale range (BRNG)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusVoltageRange {
    /// 16V range
    Range16V = 0x00,
    /// 32V range (device default)
    Range32V = 0x01,
}

/// Shunt voltage gain (PG)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gain {
    /// Gain 1, +/-40mV range
    Div1_40Mv = 0x00,
    /// Gain 2, +/-80mV range
    Div2_80Mv = 0x01,
    /// Gain 4, +/-160mV range
    Div4_160Mv = 0x02,
    /// Gain 8, +/-320mV range (device default)
    Div8_320Mv = 0x03,
}

/// ADC resolution/averaging (BADC and SADC share this encoding)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdcResolution {
    /// 9-bit, 1 sample
    Bits9 = 0x00,
    /// 10-bit, 1 sample
    Bits10 = 0x01,
    /// 11-bit, 1 sample
    Bits11 = 0x02,
    /// 12-bit, 1 sample
    Bits12 = 0x03,
}

/// Operating mode (MODE)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatingMode {
    /// Power-down
    PowerDown = 0x00,
    /// Shunt and bus, triggered
    ShuntAndBusTriggered = 0x03,
    /// ADC off
    AdcOff = 0x04,
    /// Continuous shunt and bus conversion
    ShuntAndBusContinuous = 0x07,
}

/// Assemble a configuration word from its fields
pub fn config_word(
    range: BusVoltageRange,
    gain: Gain,
    bus_adc: AdcResolution,
    shunt_adc: AdcResolution,
    mode: OperatingMode,
) -> u16 {
    ((range as u16) << BRNG_SHIFT)
        | ((gain as u16) << PG_SHIFT)
        | ((bus_adc as u16) << BADC_SHIFT)
        | ((shunt_adc as u16) << SADC_SHIFT)
        | (mode as u16)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_word_16v_40mv_12bit_continuous() {
        // BRNG=0, PG=0, BADC=0x3<<7, SADC=0x3<<3, MODE=0x7
        let word = config_word(
            BusVoltageRange::Range16V,
            Gain::Div1_40Mv,
            AdcResolution::Bits12,
            AdcResolution::Bits12,
            OperatingMode::ShuntAndBusContinuous,
        );
        assert_eq!(word, 0x019F);
    }

    #[test]
    fn test_config_word_32v_320mv() {
        // BRNG=1<<13, PG=3<<11
        let word = config_word(
            BusVoltageRange::Range32V,
            Gain::Div8_320Mv,
            AdcResolution::Bits12,
            AdcResolution::Bits12,
            OperatingMode::ShuntAndBusContinuous,
        );
        assert_eq!(word, 0x399F);
    }

    #[test]
    fn test_fields_do_not_overlap() {
        let brng = config_word(
            BusVoltageRange::Range32V,
            Gain::Div1_40Mv,
            AdcResolution::Bits9,
            AdcResolution::Bits9,
            OperatingMode::PowerDown,
        );
        let pg = config_word(
            BusVoltageRange::Range16V,
            Gain::Div8_320Mv,
            AdcResolution::Bits9,
            AdcResolution::Bits9,
            OperatingMode::PowerDown,
        );
        let mode = config_word(
            BusVoltageRange::Range16V,
            Gain::Div1_40Mv,
            AdcResolution::Bits9,
            AdcResolution::Bits9,
            OperatingMode::ShuntAndBusContinuous,
        );
        assert_eq!(brng & pg, 0);
        assert_eq!(brng & mode, 0);
        assert_eq!(pg & mode, 0);
    }
}
