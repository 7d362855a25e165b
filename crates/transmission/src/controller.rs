//! Gear selection state machine.
//!
//! Once per tick the controller picks a target gear from the shift schedule,
//! lets a kick-down request override it, then debounces the commit against
//! the minimum shift interval. Shift timing runs on wall-clock seconds from
//! the owning unit's [`simcore::Clock`], not on simulation time.

use log::debug;
use serde::{Deserialize, Serialize};
use simcore::Model;

use crate::{ShiftMap, TransmissionError, stock_shift_map};

/// Which rule committed a shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShiftReason {
    /// Raw schedule suggestion, committed without a hysteresis gate.
    Map,
    /// Forced downshift on aggressive throttle input.
    KickDown,
    Upshift,
    Downshift,
}

/// Record emitted when a gear change commits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ShiftEvent {
    pub reason: ShiftReason,
    pub from_gear: u8,
    pub to_gear: u8,
    pub speed_kph: f64,
    pub throttle_pct: f64,
    /// Throttle position change per second at commit time.
    pub throttle_rate: f64,
    pub load_pct: f64,
    /// Wall-clock commit time, seconds.
    pub time: f64,
}

/// Per-tick observations fed to the controller.
#[derive(Debug, Clone, Copy)]
pub struct ShiftInputs {
    /// Throttle position, 0..1.
    pub throttle: f64,
    /// Throttle position change per second.
    pub throttle_rate: f64,
    pub speed_kph: f64,
    /// Engine load, 0..1.
    pub load: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransmissionConfig {
    /// Number of forward gears, N. Gears are numbered 1..N; no neutral.
    pub gear_count: u8,
    pub shift_map: ShiftMap,
    /// Throttle percent at or above which kick-down is requested. The stock
    /// value sits past the full-pedal detent, like a mechanical kick-down
    /// switch, so a held wide-open pedal does not re-trigger every tick and
    /// the rate trigger is the practical path.
    pub kickdown_throttle_pct: f64,
    /// Throttle rate magnitude (pedal travel per second) that also requests
    /// kick-down.
    pub kickdown_rate_threshold: f64,
    /// Minimum wall-clock spacing between committed shifts, seconds.
    pub min_shift_interval: f64,
    /// Speed buffer around schedule boundaries, km/h.
    pub hysteresis_kph: f64,
}

impl Default for TransmissionConfig {
    fn default() -> Self {
        TransmissionConfig {
            gear_count: 6,
            shift_map: stock_shift_map(),
            kickdown_throttle_pct: 105.0,
            kickdown_rate_threshold: 4.0,
            min_shift_interval: 1.0,
            hysteresis_kph: 2.0,
        }
    }
}

/// Timed gear-selection state machine. Gear starts at 1 and never leaves
/// `1..=gear_count`.
#[derive(Debug, Clone)]
pub struct TransmissionController {
    config: TransmissionConfig,
    current_gear: u8,
    last_shift_time: f64,
}

impl TransmissionController {
    pub fn new(config: TransmissionConfig) -> Result<Self, TransmissionError> {
        if config.gear_count == 0 {
            return Err(TransmissionError::InvalidGearConfig(
                "gear count must be at least 1",
            ));
        }
        if config.shift_map.max_gear() > config.gear_count {
            return Err(TransmissionError::InvalidGearConfig(
                "shift map recommends a gear beyond the gear count",
            ));
        }
        Ok(TransmissionController {
            config,
            current_gear: 1,
            // No shift has happened yet, so the first commit is never
            // blocked by the interval.
            last_shift_time: f64::NEG_INFINITY,
        })
    }

    pub fn current_gear(&self) -> u8 {
        self.current_gear
    }

    pub fn config(&self) -> &TransmissionConfig {
        &self.config
    }

    /// Evaluate the shift rules against this tick's observations and commit
    /// at most one gear change. `now` is wall-clock seconds.
    pub fn update(&mut self, inputs: ShiftInputs, now: f64) -> Option<ShiftEvent> {
        let cfg = &self.config;
        let throttle_pct = inputs.throttle * 100.0;
        let elapsed = now - self.last_shift_time;

        let map_gear = cfg
            .shift_map
            .lookup(throttle_pct, inputs.speed_kph)
            .unwrap_or(self.current_gear);

        let mut target = map_gear;
        let mut reason = ShiftReason::Map;

        let kickdown_requested = throttle_pct >= cfg.kickdown_throttle_pct
            || inputs.throttle_rate.abs() >= cfg.kickdown_rate_threshold;

        if kickdown_requested {
            // A kick-down request claims the whole tick: if it fires while
            // the gear state makes it ineligible, no other rule may shift.
            let eligible = self.current_gear == map_gear
                && self.current_gear > 1
                && elapsed >= cfg.min_shift_interval;
            if eligible {
                target = self.current_gear - 1;
                reason = ShiftReason::KickDown;
            } else {
                target = self.current_gear;
            }
        } else if map_gear > self.current_gear {
            if let Some(entry) = cfg.shift_map.entry_for(map_gear, throttle_pct) {
                if inputs.speed_kph >= entry.speed.min + cfg.hysteresis_kph {
                    reason = ShiftReason::Upshift;
                } else {
                    target = self.current_gear;
                }
            }
        } else if map_gear < self.current_gear {
            if let Some(entry) = cfg.shift_map.entry_for(map_gear, throttle_pct) {
                if inputs.speed_kph <= entry.speed.max - cfg.hysteresis_kph {
                    reason = ShiftReason::Downshift;
                } else {
                    target = self.current_gear;
                }
            }
        }

        if target == self.current_gear || elapsed < cfg.min_shift_interval {
            return None;
        }

        let event = ShiftEvent {
            reason,
            from_gear: self.current_gear,
            to_gear: target,
            speed_kph: inputs.speed_kph,
            throttle_pct,
            throttle_rate: inputs.throttle_rate,
            load_pct: inputs.load * 100.0,
            time: now,
        };
        self.current_gear = target;
        self.last_shift_time = now;
        debug!(
            "{:?} {} -> {} at {:.1} km/h, {:.0}% throttle",
            event.reason, event.from_gear, event.to_gear, event.speed_kph, event.throttle_pct
        );
        Some(event)
    }
}

impl Model for TransmissionController {
    fn reset(&mut self) {
        self.current_gear = 1;
        self.last_shift_time = f64::NEG_INFINITY;
    }
}
