//! # DMP library.
//!
//! Learning of dynamic movement primitives from demonstrations and planning
//! with them. The executable wraps this library, and the benches use it
//! directly.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Canonical system - the phase variable driving every primitive
pub mod canonical;

/// Function approximators for the forcing term
pub mod fn_approx;

/// Learning a primitive set from a demonstrated trajectory
pub mod learn;

/// Obstacle avoidance coupling term
pub mod coupling;

/// Trajectory planning with a learned primitive set
pub mod plan;

/// Request server holding the active primitive set
pub mod server;

/// Executable parameters
pub mod params;

/// Demonstration CSV loading
pub mod demo;
