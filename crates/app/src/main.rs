//! Headless drive demo.
//!
//! Runs a scripted pull-away / cruise / coast throttle trace through the
//! powertrain and logs speed, rpm, gear, and load once per simulated second.
//! Pass a JSON file path to override the stock configuration.

use log::{LevelFilter, info};
use powertrain::{PowertrainConfig, PowertrainUnit};
use simcore::ManualClock;
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};
use std::fs;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    TermLogger::init(
        LevelFilter::Debug,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )?;

    let config: PowertrainConfig = match std::env::args().nth(1) {
        Some(path) => serde_json::from_str(&fs::read_to_string(&path)?)?,
        None => PowertrainConfig::default(),
    };

    // A headless run outpaces real time, so the shift debounce clock is
    // driven from simulation time instead of the wall clock.
    let clock = ManualClock::new();
    let mut unit = PowertrainUnit::with_clock(config, Box::new(clock.clone()))?;

    let dt = 0.1;
    let steps = 600;

    for step in 0..steps {
        let t = step as f64 * dt;
        // Full throttle off the line, settle into a cruise, then lift.
        let throttle = if t < 20.0 {
            1.0
        } else if t < 40.0 {
            0.3
        } else {
            0.0
        };

        clock.advance(dt);
        unit.apply_throttle(throttle, dt)?;

        if step % 10 == 0 {
            info!(
                "t={:5.1}s throttle={:.1} speed={:6.1} km/h rpm={:5.0} gear={} load={:3.0}%",
                t,
                throttle,
                unit.speed_kph(),
                unit.rpm(),
                unit.gear(),
                unit.load() * 100.0
            );
        }
    }

    info!(
        "done: {:.1} km/h in gear {} after {:.0} s",
        unit.speed_kph(),
        unit.gear(),
        unit.elapsed()
    );
    Ok(())
}
