//! # Fourier series approximator
//!
//! Truncated cosine series `f(x) = sum_i w_i cos(pi i x)`, `i = 0..N`, fitted
//! over the scaled time domain `t / tau` in `[0, 1]`.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::trace;
use nalgebra::{DMatrix, DVector};
use std::f64::consts::PI;

use super::{check_samples, FnApprox, FnApproxError};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Singular values smaller than this fraction of the largest are treated as
/// zero when solving, giving the minimum norm solution for rank deficient fits.
const SVD_REL_EPS: f64 = 1e-12;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct FourierApprox {
    weights: Vec<f64>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl FourierApprox {
    /// Create an untrained approximator with `order` basis functions.
    pub fn new(order: usize) -> Self {
        Self {
            weights: vec![0.0; order],
        }
    }

    /// Create an approximator from previously fitted weights.
    pub fn from_weights(weights: Vec<f64>) -> Self {
        Self { weights }
    }

    /// Number of basis functions
    pub fn order(&self) -> usize {
        self.weights.len()
    }

    fn feature(i: usize, x: f64) -> f64 {
        (PI * i as f64 * x).cos()
    }
}

impl FnApprox for FourierApprox {
    /// Solve for the weights minimising the squared residual over all samples.
    ///
    /// With fewer samples than basis functions the minimum norm solution is
    /// used.
    fn fit(&mut self, domain: &[f64], targets: &[f64]) -> Result<(), FnApproxError> {
        check_samples(domain, targets)?;

        let order = self.order();
        if order == 0 {
            return Ok(());
        }

        let features = DMatrix::from_fn(domain.len(), order, |r, c| Self::feature(c, domain[r]));
        let targets = DVector::from_column_slice(targets);

        let svd = features.svd(true, true);
        let eps = svd.singular_values.iter().copied().fold(0.0, f64::max) * SVD_REL_EPS;
        let weights = svd.solve(&targets, eps).map_err(FnApproxError::SolveFailed)?;

        trace!(
            "Fitted {} Fourier weights to {} samples",
            order,
            domain.len()
        );

        self.weights = weights.iter().copied().collect();

        Ok(())
    }

    fn eval_at(&self, x: f64) -> f64 {
        self.weights
            .iter()
            .enumerate()
            .map(|(i, w)| w * Self::feature(i, x))
            .sum()
    }

    fn weights(&self) -> Vec<f64> {
        self.weights.clone()
    }
}
