//! Battery reading types

/// One decoded battery reading
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatteryReading {
    /// Bus (load-side) voltage in volts
    pub voltage: f64,
    /// Load current in milliamps (positive when discharging)
    pub current_ma: f64,
    /// Power in watts
    pub power_w: f64,
    /// Charge level (0-100%)
    pub percent: f64,
}

impl BatteryReading {
    /// Create new battery reading
    pub fn new(voltage: f64, current_ma: f64, power_w: f64, percent: f64) -> Self {
        Self {
            voltage,
            current_ma,
            power_w,
            percent,
        }
    }

    /// Check if battery is low (< 20%)
    pub fn is_low(&self) -> bool {
        self.percent < 20.0
    }

    /// Check if battery is critical (< 10%)
    pub fn is_critical(&self) -> bool {
        self.percent < 10.0
    }
}

impl Default for BatteryReading {
    fn default() -> Self {
        Self {
            voltage: 0.0,
            current_ma: 0.0,
            power_w: 0.0,
            percent: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_low_and_critical_thresholds() {
        let mut reading = BatteryReading::new(7.2, 120.0, 0.9, 50.0);
        assert!(!reading.is_low());

        reading.percent = 15.0;
        assert!(reading.is_low());
        assert!(!reading.is_critical());

        reading.percent = 5.0;
        assert!(reading.is_critical());
    }
}
