use chassis::{ChassisConfig, VehicleDynamics};
use simcore::SimContext;
use std::fs::File;
use std::io::Write;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Coast-down sweep: release from speed and let the road loads bleed it
    // off. Useful for eyeballing the rolling/drag split against real
    // coast-down charts.
    let mut model = VehicleDynamics::new(ChassisConfig::default())?;
    model.set_speed(33.0); // ~120 km/h

    let dt = 0.1;
    let t_end = 180.0;

    let mut csv = File::create("coast_down.csv")?;
    writeln!(csv, "t,speed_mps,rolling_n,drag_n")?;

    let mut t = 0.0;
    while t <= t_end {
        writeln!(
            csv,
            "{:.2},{:.4},{:.2},{:.2}",
            t,
            model.speed(),
            model.rolling_resistance(),
            model.aerodynamic_drag()
        )?;

        // Closed throttle, gear held in 4th; the gearing only matters for
        // the rpm read-back, not the force balance.
        model.integrate(SimContext { dt, t }, 0.0, 0.0, 4)?;
        t += dt;
    }

    println!("Wrote coast_down.csv");
    Ok(())
}
