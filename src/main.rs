//! UrjaMon - Battery monitor daemon for INA219-based UPS hats
//!
//! Polls the INA219 at a fixed cadence, logs voltage/current/charge, and
//! powers the system off after a sustained low-voltage condition.

use std::env;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use urja_mon::config::AppConfig;
use urja_mon::driver::{CalibrationTarget, Ina219};
use urja_mon::error::{Error, Result};
use urja_mon::monitor::{BatteryMonitor, MonitorState, PoweroffHandler};
use urja_mon::transport::I2cBus;

/// Parse config path from command line arguments.
///
/// Supports:
/// - `urja-mon <path>` (positional)
/// - `urja-mon --config <path>` (flag-based)
/// - `urja-mon -c <path>` (short flag)
///
/// Defaults to `/etc/urja-mon.toml` if not specified.
fn parse_config_path() -> String {
    let args: Vec<String> = env::args().collect();

    // Look for --config or -c flag
    for i in 1..args.len() {
        if (args[i] == "--config" || args[i] == "-c") && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }

    // Fall back to first positional argument (if it doesn't start with -)
    if args.len() > 1 && !args[1].starts_with('-') {
        return args[1].clone();
    }

    // Default path
    "/etc/urja-mon.toml".to_string()
}

fn main() -> Result<()> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("UrjaMon v0.2.0 starting...");

    // Load configuration, falling back to the built-in UPS hat defaults
    let config_path = parse_config_path();
    let config = if Path::new(&config_path).exists() {
        log::info!("Using config: {}", config_path);
        AppConfig::from_file(&config_path)?
    } else {
        log::warn!("Config {} not found, using defaults", config_path);
        AppConfig::default()
    };

    // Program the sensor; readings are meaningless until this succeeds
    let bus = I2cBus::open(&config.hardware.i2c_bus, config.hardware.device_address)?;
    let mut sensor = Ina219::initialize(
        bus,
        config.hardware.device_address,
        CalibrationTarget::ups_16v_1a5(),
    )?;

    let poll_interval = Duration::from_secs(config.monitor.poll_interval_secs);
    let poweroff = PoweroffHandler::new(&config.monitor.poweroff_command);
    let mut monitor = BatteryMonitor::new(config.monitor.clone(), poweroff);

    // Set up shutdown signal handler
    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);

    ctrlc::set_handler(move || {
        log::info!("Received shutdown signal");
        r.store(false, Ordering::Relaxed);
    })
    .map_err(|e| Error::Config(format!("Error setting Ctrl-C handler: {}", e)))?;

    log::info!(
        "Polling every {} s (trip below {:.1} V for {} cycles)",
        config.monitor.poll_interval_secs,
        config.monitor.trip_voltage,
        config.monitor.trip_cycles
    );

    while running.load(Ordering::Relaxed) {
        match monitor.poll_once(&mut sensor) {
            Ok(outcome) => {
                let summary = format!(
                    "Battery: {:.3} V, {:.3} mA, {:.3} W, {:.1}%",
                    outcome.reading.voltage,
                    outcome.reading.current_ma,
                    outcome.reading.power_w,
                    outcome.reading.percent
                );
                if outcome.reading.is_low() {
                    log::warn!("{}", summary);
                } else {
                    log::info!("{}", summary);
                }

                if outcome.state == MonitorState::ShutdownTriggered {
                    // The poweroff command takes the process down; stop polling
                    break;
                }
            }
            Err(e) => {
                // Poll is atomic: nothing mutated, retry next tick
                log::error!("Poll failed: {}", e);
            }
        }

        thread::sleep(poll_interval);
    }

    log::info!("UrjaMon stopped");
    Ok(())
}
