//! Automatic transmission control
//!
//! This crate provides:
//! - An ordered shift schedule mapping (throttle, speed) bands to gears
//! - A timed gear-selection state machine with kick-down and hysteresis

pub mod controller;
pub mod shift_map;

pub use controller::*;
pub use shift_map::*;

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum TransmissionError {
    #[error("invalid shift map: {0}")]
    InvalidShiftMap(&'static str),
    #[error("invalid gear configuration: {0}")]
    InvalidGearConfig(&'static str),
}
