//! DMP server module
//!
//! Dispatches learn, plan and active set requests to the core. The active
//! primitive set is owned by the server value rather than being global, so
//! callers decide how it is shared.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use state::*;

use crate::{learn::LearnError, plan::PlanError};

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur while processing a request.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("No primitive set is active and the plan request didn't provide one")]
    NoActiveDmp,

    #[error("Learning failed: {0}")]
    Learn(#[from] LearnError),

    #[error("Planning failed: {0}")]
    Plan(#[from] PlanError),
}
