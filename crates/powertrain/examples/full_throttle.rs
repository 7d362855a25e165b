use powertrain::{PowertrainConfig, PowertrainUnit};
use simcore::ManualClock;
use std::fs::File;
use std::io::Write;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Standing-start acceleration run at wide-open throttle. The shift
    // debounce clock follows simulation time since this runs faster than
    // real time.
    let clock = ManualClock::new();
    let mut unit = PowertrainUnit::with_clock(PowertrainConfig::default(), Box::new(clock.clone()))?;

    let dt = 0.1;
    let t_end = 60.0;

    let mut csv = File::create("full_throttle.csv")?;
    writeln!(csv, "t,speed_kph,rpm,gear,torque_nm,load")?;

    let mut t = 0.0;
    while t <= t_end {
        clock.advance(dt);
        unit.apply_throttle(1.0, dt)?;

        writeln!(
            csv,
            "{:.2},{:.2},{:.0},{},{:.1},{:.3}",
            t,
            unit.speed_kph(),
            unit.rpm(),
            unit.gear(),
            unit.torque_nm(),
            unit.load()
        )?;
        t += dt;
    }

    println!("Wrote full_throttle.csv");
    Ok(())
}
