//! # Function approximators
//!
//! A function approximator fits a scalar target signal over a 1-D domain
//! and evaluates the fit at new domain values. Learning uses it to capture
//! the forcing term of each primitive, planning rehydrates it from the
//! stored primitive without refitting.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod fourier;
mod linear;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

pub use fourier::FourierApprox;
pub use linear::LinearApprox;

use comms_if::dmp::{DmpData, FnApproxKind};

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// Least-squares fitting and evaluation of a scalar function.
pub trait FnApprox {
    /// Fit the approximator to `targets` sampled at `domain`.
    ///
    /// The two slices must be the same length.
    fn fit(&mut self, domain: &[f64], targets: &[f64]) -> Result<(), FnApproxError>;

    /// Evaluate the approximator at `x`.
    fn eval_at(&self, x: f64) -> f64;

    /// The coefficients describing the current fit.
    fn weights(&self) -> Vec<f64>;
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum FnApproxError {
    #[error("Domain has {domain} samples but there are {targets} targets")]
    LengthMismatch { domain: usize, targets: usize },

    #[error("Cannot fit an approximator with no samples")]
    NoSamples,

    #[error("Least squares solution failed: {0}")]
    SolveFailed(&'static str),

    #[error("Fit samples contain a non-finite value")]
    NonFinite,
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Create an untrained approximator of the given kind.
///
/// `num_bases` is only used by kinds with a fixed basis.
pub fn new_untrained(kind: FnApproxKind, num_bases: usize) -> Box<dyn FnApprox> {
    match kind {
        FnApproxKind::Fourier => Box::new(FourierApprox::new(num_bases)),
        FnApproxKind::Linear => Box::new(LinearApprox::default()),
    }
}

/// Rehydrate the approximator a stored primitive was learned with.
pub fn from_dmp(dmp: &DmpData) -> Result<Box<dyn FnApprox>, FnApproxError> {
    Ok(match dmp.approx {
        FnApproxKind::Fourier => Box::new(FourierApprox::from_weights(dmp.weights.clone())),
        FnApproxKind::Linear => {
            Box::new(LinearApprox::from_samples(&dmp.f_domain, &dmp.f_targets)?)
        }
    })
}

/// Check a pair of fit slices describe the same samples.
pub(crate) fn check_samples(domain: &[f64], targets: &[f64]) -> Result<(), FnApproxError> {
    if domain.len() != targets.len() {
        return Err(FnApproxError::LengthMismatch {
            domain: domain.len(),
            targets: targets.len(),
        });
    }

    if domain.is_empty() {
        return Err(FnApproxError::NoSamples);
    }

    if domain.iter().chain(targets.iter()).any(|v| !v.is_finite()) {
        return Err(FnApproxError::NonFinite);
    }

    Ok(())
}
