//! Engine output torque as a function of crankshaft speed.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum EngineError {
    #[error("invalid torque curve: {0}")]
    InvalidCurve(&'static str),
}

/// Piecewise-linear torque curve.
///
/// Samples are `(rpm, N·m)` pairs with strictly positive, strictly
/// increasing rpm keys. Below the lowest sample, torque ramps linearly from
/// a virtual (0 rpm, 0 N·m) anchor; at or above the highest sample it holds
/// flat. Immutable after construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TorqueCurve {
    samples: Vec<(f64, f64)>,
}

impl TorqueCurve {
    pub fn new(samples: Vec<(f64, f64)>) -> Result<Self, EngineError> {
        if samples.len() < 2 {
            return Err(EngineError::InvalidCurve(
                "needs at least two sample points",
            ));
        }
        if samples[0].0 <= 0.0 {
            return Err(EngineError::InvalidCurve(
                "rpm keys must be strictly positive",
            ));
        }
        if samples.windows(2).any(|pair| pair[1].0 <= pair[0].0) {
            return Err(EngineError::InvalidCurve(
                "rpm keys must be strictly increasing",
            ));
        }
        Ok(TorqueCurve { samples })
    }

    /// Interpolated torque at `rpm`. Accepts any real input; out-of-range
    /// values extrapolate per the anchor/flat rules above.
    pub fn torque_at(&self, rpm: f64) -> f64 {
        let (first_rpm, first_torque) = self.samples[0];
        if rpm <= first_rpm {
            return first_torque * rpm / first_rpm;
        }

        let (last_rpm, last_torque) = self.samples[self.samples.len() - 1];
        if rpm >= last_rpm {
            return last_torque;
        }

        for pair in self.samples.windows(2) {
            let (rpm_low, torque_low) = pair[0];
            let (rpm_high, torque_high) = pair[1];
            if rpm < rpm_high {
                return torque_low
                    + (torque_high - torque_low) * (rpm - rpm_low) / (rpm_high - rpm_low);
            }
        }

        last_torque
    }

    pub fn samples(&self) -> &[(f64, f64)] {
        &self.samples
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn stock_curve() -> TorqueCurve {
        TorqueCurve::new(vec![
            (1000.0, 130.0),
            (2000.0, 180.0),
            (3000.0, 210.0),
            (4000.0, 230.0),
            (5000.0, 220.0),
            (6000.0, 200.0),
            (6700.0, 180.0),
        ])
        .unwrap()
    }

    #[test]
    fn test_zero_rpm_gives_zero_torque() {
        assert_eq!(stock_curve().torque_at(0.0), 0.0);
    }

    #[test]
    fn test_ramp_below_first_sample() {
        // Linear from the (0, 0) anchor to (1000, 130).
        assert_relative_eq!(stock_curve().torque_at(500.0), 65.0);
        assert_relative_eq!(stock_curve().torque_at(700.0), 91.0);
    }

    #[test]
    fn test_exact_samples_returned() {
        let curve = stock_curve();
        assert_relative_eq!(curve.torque_at(1000.0), 130.0);
        assert_relative_eq!(curve.torque_at(4000.0), 230.0);
        assert_relative_eq!(curve.torque_at(6700.0), 180.0);
    }

    #[test]
    fn test_midpoint_interpolation() {
        let curve = stock_curve();
        assert_relative_eq!(curve.torque_at(1500.0), 155.0);
        assert_relative_eq!(curve.torque_at(5500.0), 210.0);
    }

    #[test]
    fn test_flat_above_last_sample() {
        let curve = stock_curve();
        assert_relative_eq!(curve.torque_at(7000.0), 180.0);
        assert_relative_eq!(curve.torque_at(20_000.0), 180.0);
    }

    #[test]
    fn test_monotone_between_rising_samples() {
        let curve = stock_curve();
        let mut prev = curve.torque_at(1000.0);
        // 1000..4000 rpm is a rising stretch of the stock table.
        for rpm in (1100..=4000).step_by(100) {
            let torque = curve.torque_at(rpm as f64);
            assert!(torque >= prev, "torque fell at {rpm} rpm");
            prev = torque;
        }
    }

    #[test]
    fn test_too_few_samples_rejected() {
        assert!(TorqueCurve::new(vec![]).is_err());
        assert!(TorqueCurve::new(vec![(1000.0, 130.0)]).is_err());
    }

    #[test]
    fn test_non_increasing_rpm_rejected() {
        let err = TorqueCurve::new(vec![(2000.0, 180.0), (2000.0, 200.0)]);
        assert!(matches!(err, Err(EngineError::InvalidCurve(_))));
    }

    #[test]
    fn test_non_positive_rpm_rejected() {
        assert!(TorqueCurve::new(vec![(0.0, 0.0), (1000.0, 130.0)]).is_err());
    }
}
