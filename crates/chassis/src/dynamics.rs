//! Force balance and speed integration for straight-line travel.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};
use simcore::{Model, SimContext};
use thiserror::Error;

const INCHES_TO_METERS: f64 = 0.0254;

#[derive(Debug, Error, PartialEq)]
pub enum ChassisError {
    #[error("invalid gear configuration: {0}")]
    InvalidGearConfig(String),
}

/// Vehicle body, tire, and driveline parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChassisConfig {
    pub mass_kg: f64,
    /// Tire section width in mm. Informational.
    pub tire_width_mm: f64,
    /// Tire outer diameter in inches; sets the rolling circumference.
    pub tire_diameter_in: f64,
    /// Transmission ratios indexed by gear 1..N.
    pub gear_ratios: Vec<f64>,
    pub final_drive_ratio: f64,
    /// Base rolling resistance coefficient.
    pub rolling_base: f64,
    /// Speed-proportional rolling resistance coefficient, per m/s.
    pub rolling_speed: f64,
    pub drag_coefficient: f64,
    pub frontal_area_m2: f64,
    pub air_density: f64,
    pub gravity: f64,
    /// Crankshaft speed is never reported below this, rpm. There is no
    /// neutral, so the engine would otherwise stall at standstill.
    pub idle_rpm: f64,
    /// Integration floor for speed, m/s. Reverse travel is not modeled.
    pub min_speed_mps: f64,
}

impl Default for ChassisConfig {
    fn default() -> Self {
        // Stock mid-size sedan.
        ChassisConfig {
            mass_kg: 1450.0,
            tire_width_mm: 245.0,
            tire_diameter_in: 18.0,
            gear_ratios: vec![3.5, 2.2, 1.5, 1.0, 0.8, 0.6],
            final_drive_ratio: 3.5,
            rolling_base: 0.015,
            rolling_speed: 0.0003,
            drag_coefficient: 0.29,
            frontal_area_m2: 2.2,
            air_density: 1.225,
            gravity: 9.81,
            idle_rpm: 700.0,
            min_speed_mps: 0.0,
        }
    }
}

/// Longitudinal dynamics model. Speed is the only dynamic state; everything
/// else is derived per tick.
#[derive(Debug, Clone)]
pub struct VehicleDynamics {
    config: ChassisConfig,
    speed: f64,
}

impl VehicleDynamics {
    pub fn new(config: ChassisConfig) -> Result<Self, ChassisError> {
        if config.gear_ratios.is_empty() {
            return Err(ChassisError::InvalidGearConfig(
                "gear ratio table is empty".into(),
            ));
        }
        Ok(VehicleDynamics { config, speed: 0.0 })
    }

    /// Ratio for `gear`, bounds-checked. Gear 0 never indexes the table.
    pub fn gear_ratio(&self, gear: u8) -> Result<f64, ChassisError> {
        let count = self.config.gear_ratios.len();
        if gear == 0 || gear as usize > count {
            return Err(ChassisError::InvalidGearConfig(format!(
                "gear {gear} outside the {count}-entry ratio table"
            )));
        }
        Ok(self.config.gear_ratios[gear as usize - 1])
    }

    pub fn tire_radius_m(&self) -> f64 {
        self.config.tire_diameter_in * INCHES_TO_METERS / 2.0
    }

    pub fn tire_circumference_m(&self) -> f64 {
        PI * self.config.tire_diameter_in * INCHES_TO_METERS
    }

    pub fn final_drive_ratio(&self) -> f64 {
        self.config.final_drive_ratio
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn speed_kph(&self) -> f64 {
        self.speed * 3.6
    }

    /// Warm-start the model at a given road speed (clamped to the floor).
    pub fn set_speed(&mut self, speed_mps: f64) {
        self.speed = speed_mps.max(self.config.min_speed_mps);
    }

    pub fn config(&self) -> &ChassisConfig {
        &self.config
    }

    /// One integration step.
    ///
    /// `drive_force` is the full-throttle tractive force from the engine at
    /// the current gearing; it is scaled by `throttle_position` here so the
    /// road loads always apply in full. Returns the re-derived engine rpm,
    /// clamped to the idle floor.
    pub fn integrate(
        &mut self,
        ctx: SimContext,
        throttle_position: f64,
        drive_force: f64,
        gear: u8,
    ) -> Result<f64, ChassisError> {
        let ratio = self.gear_ratio(gear)?;

        let net_force =
            throttle_position * drive_force - self.rolling_resistance() - self.aerodynamic_drag();
        let acceleration = net_force / self.config.mass_kg;
        self.speed += acceleration * ctx.dt;
        if self.speed < self.config.min_speed_mps {
            self.speed = self.config.min_speed_mps;
        }

        let circumference = self.tire_circumference_m();
        let wheel_rpm = if circumference > 0.0 {
            self.speed / circumference * 60.0
        } else {
            0.0
        };
        let engine_rpm = wheel_rpm * ratio * self.config.final_drive_ratio;
        Ok(engine_rpm.max(self.config.idle_rpm))
    }

    /// `(c1 + c2·v)·m·g`, zero at or below standstill.
    pub fn rolling_resistance(&self) -> f64 {
        if self.speed <= 0.0 {
            return 0.0;
        }
        (self.config.rolling_base + self.config.rolling_speed * self.speed)
            * self.config.mass_kg
            * self.config.gravity
    }

    /// Quadratic body drag, `½·Cd·A·ρ·v²`. The sign is kept for v < 0
    /// since reverse travel is not modeled.
    pub fn aerodynamic_drag(&self) -> f64 {
        0.5 * self.config.drag_coefficient
            * self.config.frontal_area_m2
            * self.config.air_density
            * self.speed
            * self.speed
    }
}

impl Model for VehicleDynamics {
    fn reset(&mut self) {
        self.speed = 0.0;
    }
}
