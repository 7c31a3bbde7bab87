//! State-of-charge estimation from bus voltage

/// Map a bus voltage to a charge percentage by linear interpolation
/// between `empty_v` (0%) and `full_v` (100%), clamped to [0, 100]
pub fn charge_percent(voltage: f64, empty_v: f64, full_v: f64) -> f64 {
    let percent = (voltage - empty_v) / (full_v - empty_v) * 100.0;
    percent.clamp(0.0, 100.0)
}
