//! # Piecewise-linear approximator
//!
//! Interpolates directly between the fit samples. It needs the fit samples
//! for replay rather than a compact weight vector, so primitives learned with
//! it carry their `f_domain`/`f_targets`.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use util::maths::lin_map;

use super::{check_samples, FnApprox, FnApproxError};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Samples sorted by domain value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinearApprox {
    domain: Vec<f64>,
    targets: Vec<f64>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl LinearApprox {
    /// Build an approximator from a set of samples.
    pub fn from_samples(domain: &[f64], targets: &[f64]) -> Result<Self, FnApproxError> {
        let mut approx = Self::default();
        approx.fit(domain, targets)?;
        Ok(approx)
    }
}

impl FnApprox for LinearApprox {
    fn fit(&mut self, domain: &[f64], targets: &[f64]) -> Result<(), FnApproxError> {
        check_samples(domain, targets)?;

        let mut samples: Vec<(f64, f64)> = domain
            .iter()
            .copied()
            .zip(targets.iter().copied())
            .collect();

        // Values are known to be finite so the comparison can't fail
        samples.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

        let (domain, targets) = samples.into_iter().unzip();
        self.domain = domain;
        self.targets = targets;

        Ok(())
    }

    /// Interpolate at `x`, holding the end values outside the sampled range.
    fn eval_at(&self, x: f64) -> f64 {
        let n = self.domain.len();
        if n == 0 {
            return 0.0;
        }

        if x <= self.domain[0] {
            return self.targets[0];
        }
        if x >= self.domain[n - 1] {
            return self.targets[n - 1];
        }

        // First sample strictly beyond x, guaranteed to be in 1..n
        let upper = self.domain.partition_point(|&d| d <= x);
        let lower = upper - 1;

        // Repeated domain values would give a zero width segment
        if self.domain[upper] == self.domain[lower] {
            return self.targets[lower];
        }

        lin_map(
            (self.domain[lower], self.domain[upper]),
            (self.targets[lower], self.targets[upper]),
            x,
        )
    }

    fn weights(&self) -> Vec<f64> {
        self.targets.clone()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_interpolation() {
        let approx = LinearApprox::from_samples(&[1.0, 0.0, 0.5], &[4.0, 0.0, 1.0]).unwrap();

        // Samples come back sorted
        assert_eq!(approx.weights(), vec![0.0, 1.0, 4.0]);

        assert_eq!(approx.eval_at(0.0), 0.0);
        assert_eq!(approx.eval_at(0.25), 0.5);
        assert_eq!(approx.eval_at(0.5), 1.0);
        assert_eq!(approx.eval_at(0.75), 2.5);
    }

    #[test]
    fn test_clamped_outside_range() {
        let approx = LinearApprox::from_samples(&[0.0, 1.0], &[2.0, 3.0]).unwrap();

        assert_eq!(approx.eval_at(-1.0), 2.0);
        assert_eq!(approx.eval_at(7.0), 3.0);
        assert_eq!(LinearApprox::default().eval_at(0.5), 0.0);
    }
}
