//! Shift schedule: ordered (throttle band, speed band) → gear records.

use serde::{Deserialize, Serialize};

use crate::TransmissionError;

/// Half-open `[min, max)` interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub min: f64,
    pub max: f64,
}

impl Band {
    pub fn new(min: f64, max: f64) -> Self {
        Band { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value < self.max
    }
}

/// One schedule record: throttle band (percent) × speed band (km/h) → gear.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ShiftMapEntry {
    pub throttle: Band,
    pub speed: Band,
    pub gear: u8,
}

impl ShiftMapEntry {
    pub fn new(throttle: (f64, f64), speed: (f64, f64), gear: u8) -> Self {
        ShiftMapEntry {
            throttle: Band::new(throttle.0, throttle.1),
            speed: Band::new(speed.0, speed.1),
            gear,
        }
    }
}

/// Ordered shift schedule, static after construction.
///
/// Lookup scans records in insertion order and returns the first whose
/// throttle and speed bands both contain the inputs, so overlapping bands
/// resolve the same way every time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShiftMap {
    entries: Vec<ShiftMapEntry>,
}

impl ShiftMap {
    pub fn new(entries: Vec<ShiftMapEntry>) -> Result<Self, TransmissionError> {
        if entries.is_empty() {
            return Err(TransmissionError::InvalidShiftMap("no entries"));
        }
        for entry in &entries {
            if entry.gear == 0 {
                return Err(TransmissionError::InvalidShiftMap(
                    "gear numbering starts at 1",
                ));
            }
            if entry.throttle.min >= entry.throttle.max || entry.speed.min >= entry.speed.max {
                return Err(TransmissionError::InvalidShiftMap(
                    "band min must lie below band max",
                ));
            }
        }
        Ok(ShiftMap { entries })
    }

    /// Recommended gear for the given throttle percent and speed, if any
    /// record contains both.
    pub fn lookup(&self, throttle_pct: f64, speed_kph: f64) -> Option<u8> {
        self.entries
            .iter()
            .find(|e| e.throttle.contains(throttle_pct) && e.speed.contains(speed_kph))
            .map(|e| e.gear)
    }

    /// First record recommending `gear` whose throttle band contains the
    /// input. Used to fetch the speed bounds for hysteresis checks.
    pub fn entry_for(&self, gear: u8, throttle_pct: f64) -> Option<&ShiftMapEntry> {
        self.entries
            .iter()
            .find(|e| e.gear == gear && e.throttle.contains(throttle_pct))
    }

    /// Highest gear any record recommends.
    pub fn max_gear(&self) -> u8 {
        self.entries.iter().map(|e| e.gear).max().unwrap_or(0)
    }

    pub fn entries(&self) -> &[ShiftMapEntry] {
        &self.entries
    }
}

/// Stock six-speed schedule: four throttle bands, each holding lower gears
/// to higher road speeds as the pedal goes down.
pub fn stock_shift_map() -> ShiftMap {
    let rows: [((f64, f64), [(f64, f64); 6]); 4] = [
        (
            (0.0, 20.0),
            [
                (0.0, 15.0),
                (15.0, 30.0),
                (30.0, 45.0),
                (45.0, 60.0),
                (60.0, 80.0),
                (80.0, 240.0),
            ],
        ),
        (
            (20.0, 50.0),
            [
                (0.0, 20.0),
                (20.0, 40.0),
                (40.0, 60.0),
                (60.0, 80.0),
                (80.0, 110.0),
                (110.0, 240.0),
            ],
        ),
        (
            (50.0, 80.0),
            [
                (0.0, 25.0),
                (25.0, 45.0),
                (45.0, 60.0),
                (60.0, 80.0),
                (80.0, 120.0),
                (120.0, 240.0),
            ],
        ),
        (
            (80.0, 101.0),
            [
                (0.0, 30.0),
                (30.0, 55.0),
                (55.0, 85.0),
                (85.0, 125.0),
                (125.0, 170.0),
                (170.0, 240.0),
            ],
        ),
    ];

    let mut entries = Vec::with_capacity(24);
    for (throttle, speeds) in rows {
        for (gear, speed) in speeds.into_iter().enumerate() {
            entries.push(ShiftMapEntry::new(throttle, speed, gear as u8 + 1));
        }
    }

    // The stock table is well-formed by construction.
    ShiftMap { entries }
}
