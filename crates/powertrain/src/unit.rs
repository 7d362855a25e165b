//! The owning aggregate that steps the whole powertrain.

use log::info;

use chassis::VehicleDynamics;
use engine::EngineModel;
use simcore::{Clock, Model, SensorBus, SensorUpdate, SimContext, TripComputer, WallClock};
use transmission::{ShiftEvent, ShiftInputs, TransmissionController};

use crate::{PowertrainConfig, PowertrainError};

/// One simulated powertrain.
///
/// Sub-components never reference each other; every cross-component read and
/// write flows through this unit, once per tick. The caller owns pacing: the
/// simulation advances exactly one `dt` per [`PowertrainUnit::apply_throttle`]
/// call.
pub struct PowertrainUnit {
    engine: EngineModel,
    transmission: TransmissionController,
    dynamics: VehicleDynamics,
    sensors: SensorBus,
    trip: TripComputer,
    clock: Box<dyn Clock>,
    elapsed: f64,
}

impl PowertrainUnit {
    /// Build a unit debouncing shifts against the wall clock.
    pub fn new(config: PowertrainConfig) -> Result<Self, PowertrainError> {
        Self::with_clock(config, Box::new(WallClock::new()))
    }

    /// Build a unit with an injected time source.
    pub fn with_clock(
        config: PowertrainConfig,
        clock: Box<dyn Clock>,
    ) -> Result<Self, PowertrainError> {
        let gears = config.transmission.gear_count;
        let ratios = config.chassis.gear_ratios.len();
        if gears as usize != ratios {
            return Err(PowertrainError::InvalidGearConfig { gears, ratios });
        }

        Ok(PowertrainUnit {
            engine: EngineModel::new(config.engine)?,
            transmission: TransmissionController::new(config.transmission)?,
            dynamics: VehicleDynamics::new(config.chassis)?,
            sensors: SensorBus::default(),
            trip: TripComputer::default(),
            clock,
            elapsed: 0.0,
        })
    }

    /// Advance the simulation one tick.
    ///
    /// Order matters: the dynamics integrate before shift evaluation so the
    /// controller sees this tick's post-integration speed and throttle.
    /// Returns the shift event if one committed.
    pub fn apply_throttle(
        &mut self,
        throttle: f64,
        dt: f64,
    ) -> Result<Option<ShiftEvent>, PowertrainError> {
        if !dt.is_finite() || dt <= 0.0 {
            return Err(PowertrainError::InvalidTimeStep(dt));
        }

        let previous_throttle = self.engine.throttle_position();
        self.engine.set_throttle(throttle);

        // Drive force comes from the pre-integration rpm: the engine pulls
        // at its current operating point; the speed it produces only feeds
        // back next tick.
        let gear = self.transmission.current_gear();
        let drive_force = self.engine.wheel_force(
            self.dynamics.gear_ratio(gear)?,
            self.dynamics.final_drive_ratio(),
            self.dynamics.tire_radius_m(),
        );

        let ctx = SimContext {
            dt,
            t: self.elapsed,
        };
        let rpm = self
            .dynamics
            .integrate(ctx, self.engine.throttle_position(), drive_force, gear)?;
        self.engine.set_rpm(rpm);
        self.elapsed += dt;

        let throttle_rate = (self.engine.throttle_position() - previous_throttle) / dt;
        let event = self.transmission.update(
            ShiftInputs {
                throttle: self.engine.throttle_position(),
                throttle_rate,
                speed_kph: self.dynamics.speed_kph(),
                load: self.engine.load(),
            },
            self.clock.now(),
        );
        if let Some(shift) = &event {
            info!(
                "{:?} {} -> {} at {:.1} km/h",
                shift.reason, shift.from_gear, shift.to_gear, shift.speed_kph
            );
        }

        self.sensors.apply(
            &SensorUpdate::new()
                .with_throttle_position(self.engine.throttle_position())
                .with_engine_rpm(self.engine.rpm())
                .with_vehicle_speed(self.dynamics.speed())
                .with_current_gear(self.transmission.current_gear()),
        );
        self.trip.recalculate(&self.sensors);

        Ok(event)
    }

    /// Road speed, m/s.
    pub fn speed_mps(&self) -> f64 {
        self.dynamics.speed()
    }

    /// Road speed, km/h.
    pub fn speed_kph(&self) -> f64 {
        self.dynamics.speed_kph()
    }

    /// Crankshaft speed, rpm.
    pub fn rpm(&self) -> f64 {
        self.engine.rpm()
    }

    /// Engaged gear, 1..N.
    pub fn gear(&self) -> u8 {
        self.transmission.current_gear()
    }

    /// Instantaneous engine output torque, N·m.
    pub fn torque_nm(&self) -> f64 {
        self.engine.torque()
    }

    /// Engine load, 0..1.
    pub fn load(&self) -> f64 {
        self.engine.load()
    }

    /// Accumulated simulation time, seconds.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn sensors(&self) -> &SensorBus {
        &self.sensors
    }

    pub fn trip(&self) -> &TripComputer {
        &self.trip
    }

    pub fn engine(&self) -> &EngineModel {
        &self.engine
    }

    pub fn transmission(&self) -> &TransmissionController {
        &self.transmission
    }

    pub fn dynamics(&self) -> &VehicleDynamics {
        &self.dynamics
    }
}

impl Model for PowertrainUnit {
    fn reset(&mut self) {
        self.engine.reset();
        self.transmission.reset();
        self.dynamics.reset();
        self.sensors.reset();
        self.trip.reset();
        self.elapsed = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use simcore::ManualClock;
    use transmission::ShiftReason;

    /// Unit wired to a hand-driven clock; the returned handle advances it.
    fn sim_unit() -> (PowertrainUnit, ManualClock) {
        let clock = ManualClock::new();
        let unit =
            PowertrainUnit::with_clock(PowertrainConfig::default(), Box::new(clock.clone()))
                .unwrap();
        (unit, clock)
    }

    #[test]
    fn test_zero_throttle_from_standstill_is_fixed_point() {
        let (mut unit, clock) = sim_unit();

        for _ in 0..100 {
            clock.advance(0.1);
            unit.apply_throttle(0.0, 0.1).unwrap();
            assert_eq!(unit.speed_mps(), 0.0);
            assert_eq!(unit.gear(), 1);
        }
        // Idle-clamped, not stalled.
        assert_eq!(unit.rpm(), 700.0);
    }

    #[test]
    fn test_full_throttle_launch() {
        let (mut unit, clock) = sim_unit();
        let mut shifts = Vec::new();
        let mut prev_speed = 0.0;

        for tick in 0..50 {
            clock.advance(0.1);
            if let Some(event) = unit.apply_throttle(1.0, 0.1).unwrap() {
                shifts.push(event);
            }
            // Tick 0 runs at the cold-start rpm of zero, so the engine has
            // no torque to give yet; the climb starts one tick later.
            if (1..=20).contains(&tick) {
                assert!(
                    unit.speed_mps() > prev_speed,
                    "speed stalled at tick {tick}"
                );
                prev_speed = unit.speed_mps();
            }
        }

        assert!(!shifts.is_empty(), "expected at least one upshift");
        assert!(shifts.iter().any(|s| s.reason == ShiftReason::Upshift));
        assert!(unit.rpm() >= 700.0);
        assert!(unit.gear() >= 2);
    }

    #[test]
    fn test_lift_off_coasts_down_without_reversing() {
        let (mut unit, clock) = sim_unit();

        for _ in 0..100 {
            clock.advance(0.1);
            unit.apply_throttle(1.0, 0.1).unwrap();
        }
        let peak = unit.speed_mps();
        assert!(peak > 10.0);

        let mut prev = peak;
        for _ in 0..2000 {
            clock.advance(0.1);
            unit.apply_throttle(0.0, 0.1).unwrap();
            assert!(unit.speed_mps() <= prev);
            assert!(unit.speed_mps() >= 0.0);
            prev = unit.speed_mps();
        }
        assert!(unit.speed_mps() < 1.0);
    }

    #[test]
    fn test_shift_events_respect_min_interval() {
        let (mut unit, clock) = sim_unit();
        let min_interval = unit.transmission().config().min_shift_interval;
        let mut commits = Vec::new();

        // Hard launch, then a lift, then back on the pedal.
        for tick in 0..600 {
            clock.advance(0.05);
            let throttle = match tick {
                0..=250 => 1.0,
                251..=400 => 0.1,
                _ => 0.8,
            };
            if let Some(event) = unit.apply_throttle(throttle, 0.05).unwrap() {
                commits.push(event.time);
            }
        }

        assert!(commits.len() >= 2);
        for pair in commits.windows(2) {
            assert!(pair[1] - pair[0] >= min_interval - 1e-9);
        }
    }

    #[test]
    fn test_gear_never_leaves_range() {
        let (mut unit, clock) = sim_unit();
        let gear_count = unit.transmission().config().gear_count;

        for tick in 0..1000 {
            clock.advance(0.1);
            let throttle = ((tick as f64) * 0.13).sin().abs();
            unit.apply_throttle(throttle, 0.1).unwrap();
            let gear = unit.gear();
            assert!(gear >= 1 && gear <= gear_count);
        }
    }

    #[test]
    fn test_sensor_bus_mirrors_outputs() {
        let (mut unit, clock) = sim_unit();
        for _ in 0..30 {
            clock.advance(0.1);
            unit.apply_throttle(0.7, 0.1).unwrap();
        }

        let sensors = unit.sensors();
        assert_eq!(sensors.throttle_position, 0.7);
        assert_eq!(sensors.engine_rpm, unit.rpm());
        assert_eq!(sensors.vehicle_speed, unit.speed_mps());
        assert_eq!(sensors.current_gear, unit.gear());
    }

    #[test]
    fn test_trip_channels_stay_zero() {
        let (mut unit, clock) = sim_unit();
        for _ in 0..50 {
            clock.advance(0.1);
            unit.apply_throttle(1.0, 0.1).unwrap();
        }

        assert_eq!(unit.trip().distance_traveled, 0.0);
        assert_eq!(unit.trip().average_fuel_consumption, 0.0);
        assert_eq!(unit.trip().instant_fuel_consumption, 0.0);
    }

    #[test]
    fn test_bad_dt_rejected() {
        let (mut unit, _clock) = sim_unit();

        assert!(matches!(
            unit.apply_throttle(0.5, 0.0),
            Err(PowertrainError::InvalidTimeStep(_))
        ));
        assert!(matches!(
            unit.apply_throttle(0.5, -0.1),
            Err(PowertrainError::InvalidTimeStep(_))
        ));
        assert!(matches!(
            unit.apply_throttle(0.5, f64::NAN),
            Err(PowertrainError::InvalidTimeStep(_))
        ));
    }

    #[test]
    fn test_out_of_range_throttle_clamped_not_rejected() {
        let (mut unit, clock) = sim_unit();

        clock.advance(0.1);
        unit.apply_throttle(3.0, 0.1).unwrap();
        assert_eq!(unit.engine().throttle_position(), 1.0);

        clock.advance(0.1);
        unit.apply_throttle(-2.0, 0.1).unwrap();
        assert_eq!(unit.engine().throttle_position(), 0.0);
    }

    #[test]
    fn test_mismatched_gearing_rejected() {
        let mut config = PowertrainConfig::default();
        config.chassis.gear_ratios.pop();

        assert!(matches!(
            PowertrainUnit::new(config),
            Err(PowertrainError::InvalidGearConfig { gears: 6, ratios: 5 })
        ));
    }

    #[test]
    fn test_reset_returns_to_standstill() {
        let (mut unit, clock) = sim_unit();
        for _ in 0..40 {
            clock.advance(0.1);
            unit.apply_throttle(1.0, 0.1).unwrap();
        }
        assert!(unit.speed_mps() > 0.0);

        unit.reset();
        assert_eq!(unit.speed_mps(), 0.0);
        assert_eq!(unit.gear(), 1);
        assert_eq!(unit.rpm(), 0.0);
        assert_eq!(unit.elapsed(), 0.0);
        assert_eq!(unit.sensors().current_gear, 1);
    }

    #[test]
    fn test_torque_accessor_tracks_rpm() {
        let (mut unit, clock) = sim_unit();
        clock.advance(0.1);
        unit.apply_throttle(0.0, 0.1).unwrap();

        // Idle-clamped rpm of 700 sits on the ramp below the first curve
        // sample: 130 N·m · 700 / 1000.
        assert_relative_eq!(unit.torque_nm(), 91.0, epsilon = 1e-9);
    }
}
