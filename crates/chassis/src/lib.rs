//! Longitudinal vehicle dynamics: road loads, speed integration, and
//! engine-speed derivation.

pub mod dynamics;

pub use dynamics::*;
