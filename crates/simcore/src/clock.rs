//! Time sources for shift-interval debouncing.
//!
//! The transmission debounces gear changes against wall-clock time, not
//! simulation time. The source is injected so the state machine stays
//! deterministic under test.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

/// Monotonic time source. Returns seconds since an arbitrary fixed origin.
pub trait Clock {
    fn now(&self) -> f64;
}

/// Wall clock backed by `Instant`, anchored at construction.
#[derive(Debug, Clone)]
pub struct WallClock {
    start: Instant,
}

impl WallClock {
    pub fn new() -> Self {
        WallClock {
            start: Instant::now(),
        }
    }
}

impl Default for WallClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for WallClock {
    fn now(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }
}

/// Hand-driven clock. Clones share the same underlying time value, so a test
/// can keep one handle and give another to the component under test.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    time: Rc<Cell<f64>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, dt: f64) {
        self.time.set(self.time.get() + dt);
    }

    pub fn set(&self, t: f64) {
        self.time.set(t);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f64 {
        self.time.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_starts_at_zero() {
        let clock = ManualClock::new();
        assert_eq!(clock.now(), 0.0);
    }

    #[test]
    fn test_manual_clock_clones_share_time() {
        let clock = ManualClock::new();
        let handle = clock.clone();

        handle.advance(2.5);
        assert_eq!(clock.now(), 2.5);

        clock.set(10.0);
        assert_eq!(handle.now(), 10.0);
    }

    #[test]
    fn test_wall_clock_is_monotonic() {
        let clock = WallClock::new();
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }
}
