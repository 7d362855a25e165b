//! Engine torque production: curve interpolation, throttle, and load.

pub mod curve;
pub mod model;

pub use curve::*;
pub use model::*;
