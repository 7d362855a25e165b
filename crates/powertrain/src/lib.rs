//! Powertrain composition root
//!
//! One [`PowertrainUnit`] owns an engine, a transmission controller, and a
//! vehicle dynamics model, and advances them together one tick per
//! [`PowertrainUnit::apply_throttle`] call.

pub mod unit;

pub use unit::*;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use chassis::{ChassisConfig, ChassisError};
use engine::{EngineConfig, EngineError};
use transmission::{TransmissionConfig, TransmissionError};

/// Aggregate configuration; the defaults describe the stock sedan.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PowertrainConfig {
    pub engine: EngineConfig,
    pub transmission: TransmissionConfig,
    pub chassis: ChassisConfig,
}

#[derive(Debug, Error)]
pub enum PowertrainError {
    /// `apply_throttle` requires a positive, finite time step.
    #[error("invalid time step: {0}")]
    InvalidTimeStep(f64),
    #[error("invalid gear configuration: {gears} gears declared but the ratio table has {ratios}")]
    InvalidGearConfig { gears: u8, ratios: usize },
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error(transparent)]
    Transmission(#[from] TransmissionError),
    #[error(transparent)]
    Chassis(#[from] ChassisError),
}
