//! # Canonical system
//!
//! The phase variable shared by every dimension of a primitive set. It
//! decays from 1 at the start of execution to 0.01 at `t = tau`, which makes
//! the primitives invariant to the time scale they are replayed at.

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Decay rate of the phase, chosen so that the phase is 0.01 at `t = tau`.
pub fn alpha() -> f64 {
    -(0.01f64.ln())
}

/// Calculate the phase at time `curr_time_s` for the time scaling constant `tau`.
///
/// `tau` must be positive.
pub fn calc_phase(curr_time_s: f64, tau: f64) -> f64 {
    (-(alpha() / tau) * curr_time_s).exp()
}
