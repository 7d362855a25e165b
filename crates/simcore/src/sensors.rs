//! Typed sensor channels shared between the powertrain components.

use serde::{Deserialize, Serialize};

use crate::Model;

/// Snapshot of every sensor channel the control units can read.
///
/// Each channel is a named field; there is no dynamic key space, so an update
/// can only ever touch a channel that actually exists.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SensorBus {
    /// Measured throttle position, 0..1.
    pub throttle_position: f64,
    /// Crankshaft speed in rpm.
    pub engine_rpm: f64,
    /// Vehicle speed in m/s.
    pub vehicle_speed: f64,
    /// Engaged gear, 1..N.
    pub current_gear: u8,
    /// MAF sensor reading. Feeds the fuel stubs only.
    pub maf_airflow: f64,
    /// Fuel pressure at the rail. Feeds the fuel stubs only.
    pub fuel_pressure: f64,
}

impl Default for SensorBus {
    fn default() -> Self {
        SensorBus {
            throttle_position: 0.0,
            engine_rpm: 0.0,
            vehicle_speed: 0.0,
            // Gear numbering starts at 1; there is no neutral.
            current_gear: 1,
            maf_airflow: 0.0,
            fuel_pressure: 0.0,
        }
    }
}

impl SensorBus {
    /// Apply an update, touching only the channels it names.
    pub fn apply(&mut self, update: &SensorUpdate) {
        if let Some(v) = update.throttle_position {
            self.throttle_position = v;
        }
        if let Some(v) = update.engine_rpm {
            self.engine_rpm = v;
        }
        if let Some(v) = update.vehicle_speed {
            self.vehicle_speed = v;
        }
        if let Some(v) = update.current_gear {
            self.current_gear = v;
        }
        if let Some(v) = update.maf_airflow {
            self.maf_airflow = v;
        }
        if let Some(v) = update.fuel_pressure {
            self.fuel_pressure = v;
        }
    }
}

impl Model for SensorBus {
    fn reset(&mut self) {
        *self = SensorBus::default();
    }
}

/// Builder enumerating the sensor channels an update may legally carry.
#[derive(Debug, Clone, Copy, Default)]
pub struct SensorUpdate {
    pub throttle_position: Option<f64>,
    pub engine_rpm: Option<f64>,
    pub vehicle_speed: Option<f64>,
    pub current_gear: Option<u8>,
    pub maf_airflow: Option<f64>,
    pub fuel_pressure: Option<f64>,
}

impl SensorUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_throttle_position(mut self, value: f64) -> Self {
        self.throttle_position = Some(value);
        self
    }

    pub fn with_engine_rpm(mut self, value: f64) -> Self {
        self.engine_rpm = Some(value);
        self
    }

    pub fn with_vehicle_speed(mut self, value: f64) -> Self {
        self.vehicle_speed = Some(value);
        self
    }

    pub fn with_current_gear(mut self, value: u8) -> Self {
        self.current_gear = Some(value);
        self
    }

    pub fn with_maf_airflow(mut self, value: f64) -> Self {
        self.maf_airflow = Some(value);
        self
    }

    pub fn with_fuel_pressure(mut self, value: f64) -> Self {
        self.fuel_pressure = Some(value);
        self
    }
}

/// Drive-cycle accumulators.
///
/// Fuel metering is not modeled; every recalculation writes zero until a
/// fuel-flow model exists, matching the reference behavior.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct TripComputer {
    pub average_fuel_consumption: f64,
    pub instant_fuel_consumption: f64,
    pub distance_traveled: f64,
}

impl TripComputer {
    pub fn recalculate(&mut self, _sensors: &SensorBus) {
        self.average_fuel_consumption = 0.0;
        self.instant_fuel_consumption = 0.0;
        self.distance_traveled = 0.0;
    }
}

impl Model for TripComputer {
    fn reset(&mut self) {
        *self = TripComputer::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_touches_only_named_channels() {
        let mut bus = SensorBus::default();
        bus.maf_airflow = 4.2;

        bus.apply(
            &SensorUpdate::new()
                .with_engine_rpm(3000.0)
                .with_vehicle_speed(12.0),
        );

        assert_eq!(bus.engine_rpm, 3000.0);
        assert_eq!(bus.vehicle_speed, 12.0);
        assert_eq!(bus.maf_airflow, 4.2);
        assert_eq!(bus.current_gear, 1);
    }

    #[test]
    fn test_default_gear_is_first() {
        assert_eq!(SensorBus::default().current_gear, 1);
    }

    #[test]
    fn test_trip_channels_always_zero() {
        let mut trip = TripComputer::default();
        trip.distance_traveled = 99.0;

        let mut bus = SensorBus::default();
        bus.vehicle_speed = 30.0;
        bus.maf_airflow = 8.0;
        trip.recalculate(&bus);

        assert_eq!(trip.average_fuel_consumption, 0.0);
        assert_eq!(trip.instant_fuel_consumption, 0.0);
        assert_eq!(trip.distance_traveled, 0.0);
    }
}
