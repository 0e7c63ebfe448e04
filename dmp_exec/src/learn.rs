//! # Learning from demonstration
//!
//! Converts a single demonstration into one primitive per dimension. Each
//! dimension is treated independently, all of them share the canonical phase
//! defined by the demonstration's duration.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::debug;

// Internal
use crate::{
    canonical::calc_phase,
    fn_approx::{self, FnApproxError},
};
use comms_if::dmp::{DmpData, DmpTraj, FnApproxKind};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The result of learning from a demonstration.
#[derive(Debug, Clone)]
pub struct LearnOutput {
    /// One primitive per dimension of the demonstration
    pub dmp_list: Vec<DmpData>,

    /// Duration of the demonstration, the nominal time scaling constant
    pub tau: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum LearnError {
    #[error("Cannot learn from an empty demonstration")]
    EmptyInput,

    #[error("Expected {expected} {what} but found {found}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("The number of basis functions must be at least 1")]
    InvalidNumBases,

    #[error("Demonstration times must be strictly increasing (at index {0})")]
    NonIncreasingTime(usize),

    #[error("The demonstration must last a positive time, found {0} s")]
    NonPositiveDuration(f64),

    #[error("Could not fit the forcing term: {0}")]
    FnApprox(#[from] FnApproxError),
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Learn a multi-dimensional primitive set from a demonstration.
///
/// The demonstration's velocity and acceleration are estimated by first
/// differences, then the forcing term needed to reproduce the demonstration
/// with the given gains is fitted in each dimension.
///
/// Either every dimension is learned or an error is returned, partial
/// primitive sets are never produced.
pub fn learn_from_demo(
    demo: &DmpTraj,
    k_gains: &[f64],
    d_gains: &[f64],
    num_bases: usize,
    approx_kind: FnApproxKind,
) -> Result<LearnOutput, LearnError> {
    let dims = validate_demo(demo, k_gains, d_gains, num_bases)?;
    let n_pts = demo.len();
    let times = &demo.times;

    // Validation guarantees there is at least one time
    let tau = times[n_pts - 1];

    let phases: Vec<f64> = times.iter().map(|&t| calc_phase(t, tau)).collect();

    // Scaled time is better spaced than the phase for fitting
    let f_domain: Vec<f64> = times.iter().map(|&t| t / tau).collect();

    let mut dmp_list = Vec::with_capacity(dims);
    let mut x = vec![0f64; n_pts];
    let mut v = vec![0f64; n_pts];
    let mut v_dot = vec![0f64; n_pts];

    for d in 0..dims {
        let k_gain = k_gains[d];
        let d_gain = d_gains[d];

        for (i, point) in demo.points.iter().enumerate() {
            x[i] = point.positions[d];
        }

        let x_0 = x[0];
        let goal = x[n_pts - 1];

        // First differences, the first sample is assumed to be at rest
        for i in 1..n_pts {
            let dt = times[i] - times[i - 1];
            v[i] = (x[i] - x[i - 1]) / dt;
            v_dot[i] = (v[i] - v[i - 1]) / dt;
        }

        // Forcing term implied by the transformation system at each sample,
        // with the phase envelope divided out so the approximator fits a
        // phase-independent shape
        let f_targets: Vec<f64> = (0..n_pts)
            .map(|i| {
                let s = phases[i];
                let f = (tau * tau * v_dot[i] + d_gain * tau * v[i]) / k_gain - (goal - x[i])
                    + (goal - x_0) * s;
                f / s
            })
            .collect();

        let mut approx = fn_approx::new_untrained(approx_kind, num_bases);
        approx.fit(&f_domain, &f_targets)?;

        dmp_list.push(DmpData {
            weights: approx.weights(),
            k_gain,
            d_gain,
            f_domain: f_domain.clone(),
            f_targets,
            approx: approx_kind,
        });
    }

    debug!(
        "Learned {} dimensional DMP from {} points (tau = {:.3} s, {} bases, {:?})",
        dims, n_pts, tau, num_bases, approx_kind
    );

    Ok(LearnOutput { dmp_list, tau })
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Check the demonstration and gains are consistent, returning the number of
/// dimensions.
fn validate_demo(
    demo: &DmpTraj,
    k_gains: &[f64],
    d_gains: &[f64],
    num_bases: usize,
) -> Result<usize, LearnError> {
    let dims = demo.dims().ok_or(LearnError::EmptyInput)?;

    if demo.times.len() != demo.len() {
        return Err(LearnError::DimensionMismatch {
            what: "timestamps",
            expected: demo.len(),
            found: demo.times.len(),
        });
    }

    if let Some(p) = demo.points.iter().find(|p| p.positions.len() != dims) {
        return Err(LearnError::DimensionMismatch {
            what: "position dimensions",
            expected: dims,
            found: p.positions.len(),
        });
    }

    if k_gains.len() != dims {
        return Err(LearnError::DimensionMismatch {
            what: "k gains",
            expected: dims,
            found: k_gains.len(),
        });
    }

    if d_gains.len() != dims {
        return Err(LearnError::DimensionMismatch {
            what: "d gains",
            expected: dims,
            found: d_gains.len(),
        });
    }

    if num_bases == 0 {
        return Err(LearnError::InvalidNumBases);
    }

    if let Some(i) = (1..demo.times.len()).find(|&i| demo.times[i] <= demo.times[i - 1]) {
        return Err(LearnError::NonIncreasingTime(i));
    }

    let tau = demo.times[demo.times.len() - 1];
    if !(tau > 0.0) {
        return Err(LearnError::NonPositiveDuration(tau));
    }

    Ok(dims)
}
