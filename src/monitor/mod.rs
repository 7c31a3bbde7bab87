//! Battery monitor with low-voltage shutdown debounce
//!
//! Converts bus-voltage readings into state-of-charge and runs a debounce
//! state machine: a single reading below the trip voltage only starts a
//! warning streak; the shutdown handler fires after the configured number
//! of consecutive low readings. One good reading clears the streak.

pub mod soc;

use crate::config::MonitorConfig;
use crate::driver::Ina219;
use crate::error::Result;
use crate::transport::RegisterBus;
use crate::types::BatteryReading;

/// Monitor state after a poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    /// Voltage at or above the trip threshold; streak is zero
    Normal,
    /// Consecutive low readings observed (count), shutdown not yet due
    Warning(u32),
    /// Shutdown handler has fired; terminal for the process lifetime
    ShutdownTriggered,
}

/// Shutdown collaborator invoked when the low-voltage streak trips
///
/// Fire-and-forget; the monitor calls it at most once per process
/// lifetime.
pub trait ShutdownHandler: Send {
    /// Request an orderly system shutdown
    fn trigger_shutdown(&mut self);
}

/// Shutdown handler that runs a poweroff command
pub struct PoweroffHandler {
    command: String,
}

impl PoweroffHandler {
    /// Create a handler running the given shell command (e.g. "poweroff")
    pub fn new(command: &str) -> Self {
        Self {
            command: command.to_string(),
        }
    }
}

impl ShutdownHandler for PoweroffHandler {
    fn trigger_shutdown(&mut self) {
        log::error!("Low battery: running '{}'", self.command);
        match std::process::Command::new("sh")
            .arg("-c")
            .arg(&self.command)
            .spawn()
        {
            Ok(_) => {}
            Err(e) => log::error!("Failed to run '{}': {}", self.command, e),
        }
    }
}

/// Outcome of one poll cycle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PollOutcome {
    /// Decoded reading taken this cycle
    pub reading: BatteryReading,
    /// Monitor state after the transition
    pub state: MonitorState,
}

/// Battery monitor owning the low-voltage debounce state
///
/// State is mutated only by [`observe_voltage`](Self::observe_voltage)
/// (via [`poll_once`](Self::poll_once)); a failed read leaves it
/// untouched.
pub struct BatteryMonitor<S: ShutdownHandler> {
    config: MonitorConfig,
    shutdown: S,
    /// Consecutive polls below the trip voltage
    streak: u32,
    state: MonitorState,
}

impl<S: ShutdownHandler> BatteryMonitor<S> {
    /// Create a monitor in the Normal state
    pub fn new(config: MonitorConfig, shutdown: S) -> Self {
        Self {
            config,
            shutdown,
            streak: 0,
            state: MonitorState::Normal,
        }
    }

    /// Current monitor state
    pub fn state(&self) -> MonitorState {
        self.state
    }

    /// Current low-voltage streak count
    pub fn streak(&self) -> u32 {
        self.streak
    }

    /// Take one full reading from the sensor
    ///
    /// All register reads happen before any state is derived, so a
    /// transport failure surfaces without a partial reading.
    pub fn battery_reading<B: RegisterBus>(
        &self,
        sensor: &mut Ina219<B>,
    ) -> Result<BatteryReading> {
        let voltage = sensor.bus_voltage_v()?;
        // The hat wires the shunt load-negative; report load current positive
        let current_ma = -sensor.current_ma()?;
        let power_w = sensor.power_w()?;
        let percent = soc::charge_percent(
            voltage,
            self.config.empty_voltage,
            self.config.full_voltage,
        );
        Ok(BatteryReading::new(voltage, current_ma, power_w, percent))
    }

    /// Run one poll cycle: read the sensor, then apply the state transition
    ///
    /// A failed read propagates before the streak is touched; retry and
    /// backoff policy belong to the caller.
    pub fn poll_once<B: RegisterBus>(&mut self, sensor: &mut Ina219<B>) -> Result<PollOutcome> {
        let reading = self.battery_reading(sensor)?;
        let state = self.observe_voltage(reading.voltage);
        Ok(PollOutcome { reading, state })
    }

    /// Apply the debounce transition for one observed bus voltage
    ///
    /// Pure with respect to I/O, which keeps the state machine testable
    /// without hardware or real delays.
    pub fn observe_voltage(&mut self, voltage: f64) -> MonitorState {
        if self.state == MonitorState::ShutdownTriggered {
            // Terminal: the handler is expected to take the process down
            return self.state;
        }

        if voltage >= self.config.trip_voltage {
            if self.streak > 0 {
                log::info!("Bus voltage recovered to {:.3} V, streak cleared", voltage);
            }
            self.streak = 0;
            self.state = MonitorState::Normal;
        } else {
            self.streak += 1;
            if self.streak >= self.config.trip_cycles {
                self.state = MonitorState::ShutdownTriggered;
                log::error!(
                    "Bus voltage {:.3} V below {:.1} V for {} cycles, triggering shutdown",
                    voltage,
                    self.config.trip_voltage,
                    self.streak
                );
                self.shutdown.trigger_shutdown();
            } else {
                self.state = MonitorState::Warning(self.streak);
                log::warn!(
                    "Bus voltage low ({:.3} V), shutdown in {} s",
                    voltage,
                    self.seconds_until_shutdown()
                );
            }
        }
        self.state
    }

    /// Estimated seconds until shutdown at the configured poll cadence
    ///
    /// Derived from the actual cadence rather than a fixed constant, so
    /// the advisory stays honest for any deployment interval.
    pub fn seconds_until_shutdown(&self) -> u64 {
        u64::from(self.config.trip_cycles.saturating_sub(self.streak))
            * self.config.poll_interval_secs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::{registers, CalibrationTarget, Ina219};
    use crate::transport::MockBus;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    const ADDR: u8 = 0x42;

    /// Counts shutdown invocations
    struct CountingHandler {
        count: Arc<AtomicU32>,
    }

    impl ShutdownHandler for CountingHandler {
        fn trigger_shutdown(&mut self) {
            self.count.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn monitor() -> (BatteryMonitor<CountingHandler>, Arc<AtomicU32>) {
        let count = Arc::new(AtomicU32::new(0));
        let handler = CountingHandler {
            count: Arc::clone(&count),
        };
        (BatteryMonitor::new(MonitorConfig::default(), handler), count)
    }

    /// Encode a bus voltage into the raw register format (counts << 3)
    fn bus_raw(volts: f64) -> u16 {
        ((volts / 0.004).round() as u16) << 3
    }

    #[test]
    fn test_good_voltage_stays_normal() {
        let (mut mon, count) = monitor();
        for _ in 0..100 {
            assert_eq!(mon.observe_voltage(7.5), MonitorState::Normal);
        }
        assert_eq!(mon.streak(), 0);
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_streak_resets_on_single_good_reading() {
        let (mut mon, count) = monitor();
        for i in 1..=29 {
            assert_eq!(mon.observe_voltage(5.0), MonitorState::Warning(i));
        }
        assert_eq!(mon.observe_voltage(6.1), MonitorState::Normal);
        assert_eq!(mon.streak(), 0);
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_shutdown_fires_exactly_once() {
        let (mut mon, count) = monitor();
        for _ in 0..30 {
            mon.observe_voltage(5.0);
        }
        assert_eq!(mon.state(), MonitorState::ShutdownTriggered);
        assert_eq!(count.load(Ordering::SeqCst), 1);

        // A 31st low reading must not re-trigger
        assert_eq!(mon.observe_voltage(5.0), MonitorState::ShutdownTriggered);
        assert_eq!(count.load(Ordering::SeqCst), 1);

        // Terminal even if voltage recovers
        assert_eq!(mon.observe_voltage(8.0), MonitorState::ShutdownTriggered);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_threshold_boundary_is_inclusive() {
        let (mut mon, _) = monitor();
        // Exactly at the trip voltage counts as good
        assert_eq!(mon.observe_voltage(6.0), MonitorState::Normal);
        assert_eq!(mon.observe_voltage(5.999), MonitorState::Warning(1));
    }

    #[test]
    fn test_countdown_tracks_configured_cadence() {
        let config = MonitorConfig {
            poll_interval_secs: 60,
            ..MonitorConfig::default()
        };
        let count = Arc::new(AtomicU32::new(0));
        let mut mon = BatteryMonitor::new(config, CountingHandler { count });

        mon.observe_voltage(5.0);
        // 29 cycles to go at 60s each
        assert_eq!(mon.seconds_until_shutdown(), 1740);
        mon.observe_voltage(5.0);
        assert_eq!(mon.seconds_until_shutdown(), 1680);

        // The 2s default cadence reproduces the original's countdown numbers
        let count = Arc::new(AtomicU32::new(0));
        let mut mon = BatteryMonitor::new(MonitorConfig::default(), CountingHandler { count });
        mon.observe_voltage(5.0);
        assert_eq!(mon.seconds_until_shutdown(), 58);
    }

    #[test]
    fn test_failed_read_leaves_streak_unchanged() {
        let bus = MockBus::new();
        let mut sensor =
            Ina219::initialize(bus.clone(), ADDR, CalibrationTarget::default()).unwrap();
        let (mut mon, count) = monitor();

        bus.set_register(ADDR, registers::REG_BUS_VOLTAGE, bus_raw(5.0));
        mon.poll_once(&mut sensor).unwrap();
        mon.poll_once(&mut sensor).unwrap();
        assert_eq!(mon.streak(), 2);

        bus.fail_reads(true);
        assert!(mon.poll_once(&mut sensor).is_err());
        assert_eq!(mon.streak(), 2);
        assert_eq!(mon.state(), MonitorState::Warning(2));

        bus.fail_reads(false);
        mon.poll_once(&mut sensor).unwrap();
        assert_eq!(mon.streak(), 3);
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_end_to_end_scenario() {
        let bus = MockBus::new();
        let mut sensor =
            Ina219::initialize(bus.clone(), ADDR, CalibrationTarget::default()).unwrap();
        let (mut mon, count) = monitor();

        // Two healthy polls
        for volts in [8.0, 7.0] {
            bus.set_register(ADDR, registers::REG_BUS_VOLTAGE, bus_raw(volts));
            let outcome = mon.poll_once(&mut sensor).unwrap();
            assert_eq!(outcome.state, MonitorState::Normal);
        }

        // 30 consecutive sub-6V polls: 29 warnings then shutdown
        bus.set_register(ADDR, registers::REG_BUS_VOLTAGE, bus_raw(5.9));
        for i in 1..=29 {
            let outcome = mon.poll_once(&mut sensor).unwrap();
            assert_eq!(outcome.state, MonitorState::Warning(i));
            assert_eq!(count.load(Ordering::SeqCst), 0);
        }
        let outcome = mon.poll_once(&mut sensor).unwrap();
        assert_eq!(outcome.state, MonitorState::ShutdownTriggered);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_reading_fields_and_current_sign() {
        let bus = MockBus::new();
        let mut sensor =
            Ina219::initialize(bus.clone(), ADDR, CalibrationTarget::default()).unwrap();
        let (mon, _) = monitor();

        bus.set_register(ADDR, registers::REG_BUS_VOLTAGE, bus_raw(7.2));
        // Raw current -1000 counts: discharge, reported positive
        bus.set_register(ADDR, registers::REG_CURRENT, (-1000i16) as u16);
        bus.set_register(ADDR, registers::REG_POWER, 500);

        let reading = mon.battery_reading(&mut sensor).unwrap();
        let lsb = sensor.profile().current_lsb_a();
        assert!((reading.voltage - 7.2).abs() < 1e-9);
        assert!((reading.current_ma - 1000.0 * lsb * 1000.0).abs() < 1e-9);
        assert!((reading.power_w - 500.0 * 20.0 * lsb).abs() < 1e-9);
        assert!((reading.percent - 50.0).abs() < 1e-9);
    }
}
