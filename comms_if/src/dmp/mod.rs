//! # Movement primitive data types
//!
//! These types are the data model shared by learning and planning. They are
//! plain serialisable data, all numerical work happens in `dmp_exec`.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod srv;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

pub use srv::*;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A single point of a trajectory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DmpPoint {
    /// Position in each dimension
    pub positions: Vec<f64>,

    /// Velocity in each dimension.
    ///
    /// Demonstrations may leave this empty, plans always fill it.
    #[serde(default)]
    pub velocities: Vec<f64>,
}

/// A timestamped trajectory.
///
/// `times[i]` is the time in seconds of `points[i]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DmpTraj {
    pub points: Vec<DmpPoint>,
    pub times: Vec<f64>,
}

/// A fitted primitive for a single dimension.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DmpData {
    /// Coefficients of the forcing term function approximator
    pub weights: Vec<f64>,

    /// Spring (proportional) gain of the transformation system
    pub k_gain: f64,

    /// Damper (differential) gain of the transformation system
    pub d_gain: f64,

    /// Scaled times the forcing term was fitted at
    #[serde(default)]
    pub f_domain: Vec<f64>,

    /// Forcing term values the approximator was fitted against
    #[serde(default)]
    pub f_targets: Vec<f64>,

    /// The approximator the forcing term was learned with, which is also the
    /// one it must be replayed with
    #[serde(default)]
    pub approx: FnApproxKind,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// The function approximator used to represent the forcing term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FnApproxKind {
    /// Truncated cosine series, replayed from the stored weights.
    Fourier,

    /// Piecewise-linear interpolation, replayed from the stored fit samples.
    Linear,
}

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl Default for FnApproxKind {
    fn default() -> Self {
        FnApproxKind::Fourier
    }
}

impl DmpPoint {
    /// Create a point with positions only.
    pub fn from_positions(positions: Vec<f64>) -> Self {
        Self {
            positions,
            velocities: Vec::new(),
        }
    }
}

impl DmpTraj {
    /// Build a trajectory from a list of times and the positions at each time.
    pub fn from_positions(times: Vec<f64>, positions: Vec<Vec<f64>>) -> Self {
        Self {
            points: positions.into_iter().map(DmpPoint::from_positions).collect(),
            times,
        }
    }

    /// Number of points in the trajectory
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Dimensionality of the trajectory, taken from the first point.
    ///
    /// `None` if the trajectory is empty.
    pub fn dims(&self) -> Option<usize> {
        self.points.first().map(|p| p.positions.len())
    }

    /// The final point of the trajectory, if any.
    pub fn last_point(&self) -> Option<&DmpPoint> {
        self.points.last()
    }

    /// Duration of the trajectory, i.e. the last timestamp.
    pub fn duration(&self) -> Option<f64> {
        self.times.last().copied()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_traj_from_positions() {
        let traj = DmpTraj::from_positions(vec![0.0, 1.0], vec![vec![0.0, 1.0], vec![2.0, 3.0]]);

        assert_eq!(traj.len(), 2);
        assert_eq!(traj.dims(), Some(2));
        assert_eq!(traj.duration(), Some(1.0));
        assert_eq!(traj.last_point().unwrap().positions, vec![2.0, 3.0]);
        assert!(traj.points[0].velocities.is_empty());

        assert_eq!(DmpTraj::default().dims(), None);
    }

    #[test]
    fn test_dmp_data_defaults() {
        // Fit diagnostics are optional on the wire
        let data: DmpData =
            serde_json::from_str(r#"{"weights": [1.0, 2.0], "k_gain": 25.0, "d_gain": 10.0}"#)
                .unwrap();

        assert_eq!(data.weights, vec![1.0, 2.0]);
        assert!(data.f_domain.is_empty());
        assert!(data.f_targets.is_empty());
        assert_eq!(data.approx, FnApproxKind::Fourier);

        let data: DmpData = serde_json::from_str(
            r#"{"weights": [], "k_gain": 25.0, "d_gain": 10.0, "approx": "Linear"}"#,
        )
        .unwrap();
        assert_eq!(data.approx, FnApproxKind::Linear);
    }
}
