
/// Timing information for one simulation tick.
///
/// `dt` is the caller-supplied step length and `t` is accumulated simulation
/// time. The simulation has no internal clock; time only advances through
/// these values.
#[derive(Debug, Clone, Copy)]
pub struct SimContext {
    pub dt: f64,
    pub t: f64,
}

/// Anything with per-run state that can be returned to its initial condition.
pub trait Model {
    fn reset(&mut self);
}
