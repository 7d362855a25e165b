//! Engine state: throttle, crankshaft speed, and load.

use serde::{Deserialize, Serialize};
use simcore::Model;

use crate::{EngineError, TorqueCurve};

/// Static engine parameters.
///
/// Cylinder count, displacement, and the rated power samples are
/// informational; nothing in the force path reads them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    pub max_rpm: f64,
    pub cylinder_count: u32,
    pub displacement_cc: f64,
    /// Torque samples, (rpm, N·m).
    pub torque_curve: Vec<(f64, f64)>,
    /// Rated power samples, (rpm, hp).
    pub power_curve: Vec<(f64, f64)>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        // Stock 2.4 L naturally aspirated four.
        EngineConfig {
            max_rpm: 6700.0,
            cylinder_count: 4,
            displacement_cc: 2398.0,
            torque_curve: vec![
                (1000.0, 130.0),
                (2000.0, 180.0),
                (3000.0, 210.0),
                (4000.0, 230.0),
                (5000.0, 220.0),
                (6000.0, 200.0),
                (6700.0, 180.0),
            ],
            power_curve: vec![
                (1000.0, 40.0),
                (2000.0, 80.0),
                (3000.0, 120.0),
                (4000.0, 160.0),
                (5000.0, 200.0),
                (6000.0, 220.0),
                (6700.0, 210.0),
            ],
        }
    }
}

/// Engine model: torque lookup, throttle latch, and load calculation.
///
/// RPM is not self-computed; the vehicle dynamics derive it from road speed
/// and write it back through [`EngineModel::set_rpm`] once per tick.
#[derive(Debug, Clone)]
pub struct EngineModel {
    config: EngineConfig,
    curve: TorqueCurve,
    throttle_command: f64,
    throttle_position: f64,
    rpm: f64,
    load: f64,
}

impl EngineModel {
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        let curve = TorqueCurve::new(config.torque_curve.clone())?;
        Ok(EngineModel {
            config,
            curve,
            throttle_command: 0.0,
            throttle_position: 0.0,
            rpm: 0.0,
            load: 0.0,
        })
    }

    /// Clamp and latch the throttle. Position tracks the command directly;
    /// actuator lag is not modeled.
    pub fn set_throttle(&mut self, value: f64) {
        let value = value.clamp(0.0, 1.0);
        self.throttle_command = value;
        self.throttle_position = value;
        self.recompute_load();
    }

    /// Write back the externally derived crankshaft speed.
    pub fn set_rpm(&mut self, rpm: f64) {
        self.rpm = rpm;
        self.recompute_load();
    }

    /// Tractive force at the contact patch for the given gearing, in N.
    /// Full-throttle figure; the caller scales it by throttle position.
    pub fn wheel_force(&self, gear_ratio: f64, final_drive: f64, tire_radius_m: f64) -> f64 {
        let engine_torque = self.curve.torque_at(self.rpm);
        let wheel_torque = engine_torque * gear_ratio * final_drive;
        wheel_torque / tire_radius_m
    }

    fn recompute_load(&mut self) {
        self.load = self.throttle_position * self.rpm / self.config.max_rpm;
    }

    /// Instantaneous output torque at the current rpm, N·m.
    pub fn torque(&self) -> f64 {
        self.curve.torque_at(self.rpm)
    }

    pub fn rpm(&self) -> f64 {
        self.rpm
    }

    /// Dimensionless load, throttle × rpm / max rpm.
    pub fn load(&self) -> f64 {
        self.load
    }

    pub fn throttle_position(&self) -> f64 {
        self.throttle_position
    }

    pub fn throttle_command(&self) -> f64 {
        self.throttle_command
    }

    pub fn torque_curve(&self) -> &TorqueCurve {
        &self.curve
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

impl Model for EngineModel {
    fn reset(&mut self) {
        self.throttle_command = 0.0;
        self.throttle_position = 0.0;
        self.rpm = 0.0;
        self.load = 0.0;
    }
}
