//! # Trajectory planning
//!
//! Integrates a primitive set forward in time from an initial state toward a
//! goal. Each dimension follows the transformation system
//!
//! ```text
//! tau * v_dot = k * ((g - x) - (g - x_0) * s + f(s)) - d * v + c
//! tau * x_dot = v
//! ```
//!
//! where `s` is the canonical phase, `f` the learned forcing term and `c`
//! the obstacle coupling term.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, warn};
use nalgebra::Vector3;
use serde::Serialize;

// Internal
use crate::{
    canonical::calc_phase,
    coupling::{apf_coupling, CouplingGains, Obstacle},
    fn_approx::{self, FnApprox, FnApproxError},
};
use comms_if::dmp::{
    DmpData, DmpPoint, DmpTraj, FnApproxKind, GetDmpPlanRequest, GetDmpPlanResponse,
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Default hard limit on the length of a plan, guarding against plans that
/// oscillate around the goal forever.
///
/// Units: seconds
pub const MAX_PLAN_LENGTH_S: f64 = 1000.0;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A generated plan along with how planning ended.
#[derive(Debug, Clone)]
pub struct PlanOutput {
    pub plan: DmpTraj,

    /// True if the final point is within the goal threshold after at least
    /// `tau` seconds
    pub at_goal: bool,

    pub stop_reason: PlanStop,

    /// True if an obstacle coupling term was applied
    pub coupling_active: bool,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The reason planning stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PlanStop {
    /// The nominal duration elapsed and the goal threshold was met
    Converged,

    /// The requested segment length was exceeded
    SegmentEnd,

    /// The maximum plan length was reached without converging
    MaxLength,
}

#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    #[error("Cannot plan with an empty primitive set")]
    EmptyPrimitiveSet,

    #[error("Expected {expected} values in {what} but found {found}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("Invalid plan parameter: {0}")]
    InvalidParameter(String),

    #[error("Requested the {requested:?} approximator but dimension {dim} uses {learned:?}")]
    ApproxMismatch {
        dim: usize,
        requested: FnApproxKind,
        learned: FnApproxKind,
    },

    #[error("Could not rehydrate the forcing term: {0}")]
    FnApprox(#[from] FnApproxError),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PlanOutput {
    pub fn into_response(self) -> GetDmpPlanResponse {
        GetDmpPlanResponse {
            plan: self.plan,
            at_goal: self.at_goal,
        }
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Generate a plan from `req.x_0` toward `req.goal` using `dmp_list`.
///
/// The plan covers at least `tau - t_0` seconds, then continues until every
/// dimension with a positive threshold is within it of the goal. Planning is
/// cut short by a positive `seg_length`, or by `max_plan_length_s`.
///
/// Each forcing term is replayed with the approximator its primitive was
/// learned with. If `req.approx` is set it must name that same approximator.
/// `req.dmp_list` is ignored, the primitives are always passed in explicitly.
pub fn generate_plan(
    dmp_list: &[DmpData],
    req: &GetDmpPlanRequest,
    max_plan_length_s: f64,
) -> Result<PlanOutput, PlanError> {
    let dims = validate_request(dmp_list, req, max_plan_length_s)?;

    let tau = req.tau;
    let t_0 = req.t_0;
    let sub_dt = req.dt / req.integrate_iter as f64;

    // Rehydrate the forcing terms, never refit
    let f_approxs = dmp_list
        .iter()
        .map(fn_approx::from_dmp)
        .collect::<Result<Vec<Box<dyn FnApprox>>, _>>()?;

    let obstacle = Obstacle::from_flat(&req.obstacle);
    let gains = CouplingGains::normalised(&req.beta, &req.gamma, &req.k, req.scale_m, req.scale_n);
    let coupling_active = !obstacle.is_none() && (dims == 3 || dims == 6);

    if !obstacle.is_none() && !coupling_active {
        warn!(
            "Obstacle coupling needs a 3 or 6 dimensional primitive set, ignoring the obstacle \
            for this {} dimensional plan",
            dims
        );
    }

    // Current state, v is the time-scaled velocity (tau * x_dot)
    let mut x = req.x_0.clone();
    let mut v = req.x_dot_0.clone();

    let mut x_vecs: Vec<Vec<f64>> = vec![Vec::new(); dims];
    let mut x_dot_vecs: Vec<Vec<f64>> = vec![Vec::new(); dims];
    let mut t_vec: Vec<f64> = Vec::new();

    let mut t = 0f64;
    let mut n_pts = 0usize;
    let mut at_goal = false;

    let stop_reason = loop {
        // Plan for at least tau, then until the goal is reached or the plan
        // gets too long
        if !((t + t_0) < tau || (!at_goal && t < max_plan_length_s)) {
            break if at_goal {
                PlanStop::Converged
            } else {
                PlanStop::MaxLength
            };
        }

        if req.seg_length > 0.0 && t > req.seg_length {
            break PlanStop::SegmentEnd;
        }

        let coupling = if coupling_active {
            coupling_vector(dims, &x, &v, &obstacle, &gains)
        } else {
            vec![0f64; dims]
        };

        // The forcing term is only defined over the nominal duration
        let scaled_t = (t + t_0) / tau;

        for d in 0..dims {
            let dmp = &dmp_list[d];
            let goal = req.goal[d];
            let x_0 = req.x_0[d];

            for iter in 0..req.integrate_iter {
                let s = calc_phase(t + t_0 + sub_dt * iter as f64, tau);
                let f_eval = if scaled_t >= 1.0 {
                    0.0
                } else {
                    f_approxs[d].eval_at(scaled_t) * s
                };

                let v_dot = (dmp.k_gain * ((goal - x[d]) - (goal - x_0) * s + f_eval)
                    - dmp.d_gain * v[d]
                    + coupling[d])
                    / tau;
                let x_dot = v[d] / tau;

                v[d] += v_dot * sub_dt;
                x[d] += x_dot * sub_dt;
            }

            x_vecs[d].push(x[d]);
            x_dot_vecs[d].push(v[d] / tau);
        }

        n_pts += 1;
        t = n_pts as f64 * req.dt;
        t_vec.push(t);

        if (t + t_0) >= tau {
            at_goal = (0..dims).all(|d| {
                req.goal_thresh[d] <= 0.0 || (x[d] - req.goal[d]).abs() <= req.goal_thresh[d]
            });
        }
    };

    debug!(
        "Planned {} points over {:.3} s ({:?}, at goal: {}, coupling: {})",
        n_pts, t, stop_reason, at_goal, coupling_active
    );

    let points = (0..n_pts)
        .map(|j| DmpPoint {
            positions: x_vecs.iter().map(|xs| xs[j]).collect(),
            velocities: x_dot_vecs.iter().map(|vs| vs[j]).collect(),
        })
        .collect();

    Ok(PlanOutput {
        plan: DmpTraj {
            points,
            times: t_vec,
        },
        at_goal,
        stop_reason,
        coupling_active,
    })
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Check the request is consistent with the primitive set, returning the
/// number of dimensions.
fn validate_request(
    dmp_list: &[DmpData],
    req: &GetDmpPlanRequest,
    max_plan_length_s: f64,
) -> Result<usize, PlanError> {
    let dims = dmp_list.len();
    if dims == 0 {
        return Err(PlanError::EmptyPrimitiveSet);
    }

    let vectors: [(&'static str, usize); 4] = [
        ("x_0", req.x_0.len()),
        ("x_dot_0", req.x_dot_0.len()),
        ("goal", req.goal.len()),
        ("goal_thresh", req.goal_thresh.len()),
    ];

    if let Some(&(what, found)) = vectors.iter().find(|(_, len)| *len != dims) {
        return Err(PlanError::DimensionMismatch {
            what,
            expected: dims,
            found,
        });
    }

    if let Some(requested) = req.approx {
        if let Some((dim, d)) = dmp_list
            .iter()
            .enumerate()
            .find(|(_, d)| d.approx != requested)
        {
            return Err(PlanError::ApproxMismatch {
                dim,
                requested,
                learned: d.approx,
            });
        }
    }

    if !(req.tau > 0.0 && req.tau.is_finite()) {
        return Err(PlanError::InvalidParameter(format!(
            "tau must be positive, found {}",
            req.tau
        )));
    }

    if !(req.dt > 0.0 && req.dt.is_finite()) {
        return Err(PlanError::InvalidParameter(format!(
            "dt must be positive, found {}",
            req.dt
        )));
    }

    if req.integrate_iter == 0 {
        return Err(PlanError::InvalidParameter(
            "integrate_iter must be at least 1".into(),
        ));
    }

    if !(req.t_0 >= 0.0) {
        return Err(PlanError::InvalidParameter(format!(
            "t_0 must not be negative, found {}",
            req.t_0
        )));
    }

    if !(max_plan_length_s > 0.0) {
        return Err(PlanError::InvalidParameter(format!(
            "the maximum plan length must be positive, found {}",
            max_plan_length_s
        )));
    }

    Ok(dims)
}

/// Coupling acceleration for each dimension.
///
/// Only the first three dimensions (position) are coupled, the rest are zero.
fn coupling_vector(
    dims: usize,
    x: &[f64],
    v: &[f64],
    obstacle: &Obstacle,
    gains: &CouplingGains,
) -> Vec<f64> {
    let mut coupling = vec![0f64; dims];

    match apf_coupling(
        &Vector3::new(x[0], x[1], x[2]),
        &Vector3::new(v[0], v[1], v[2]),
        obstacle,
        gains,
    ) {
        Ok(c) => coupling[..3].copy_from_slice(c.as_slice()),
        Err(e) => warn!("Obstacle coupling disabled for this step: {}", e),
    }

    coupling
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::learn::learn_from_demo;
    use approx::assert_abs_diff_eq;

    fn zero_dmp(dims: usize) -> Vec<DmpData> {
        vec![
            DmpData {
                weights: vec![0.0; 4],
                k_gain: 25.0,
                d_gain: 10.0,
                ..Default::default()
            };
            dims
        ]
    }

    fn request(x_0: Vec<f64>, goal: Vec<f64>, tau: f64) -> GetDmpPlanRequest {
        let dims = x_0.len();
        GetDmpPlanRequest {
            x_dot_0: vec![0.0; dims],
            x_0,
            t_0: 0.0,
            goal,
            goal_thresh: vec![0.01; dims],
            seg_length: -1.0,
            tau,
            dt: 0.1,
            integrate_iter: 10,
            obstacle: Vec::new(),
            beta: Vec::new(),
            gamma: Vec::new(),
            k: Vec::new(),
            scale_m: 0.0,
            scale_n: 1.0,
            approx: None,
            dmp_list: None,
        }
    }

    fn assert_constant_step(plan: &DmpTraj, dt: f64) {
        for (i, w) in plan.times.windows(2).enumerate() {
            assert!(w[1] > w[0], "times not increasing at {}", i);
            assert_abs_diff_eq!(w[1] - w[0], dt, epsilon = 1e-9);
        }
        assert_abs_diff_eq!(plan.times[0], dt, epsilon = 1e-12);
    }

    #[test]
    fn test_learn_then_plan() {
        let demo = DmpTraj::from_positions(vec![0.0, 2.0], vec![vec![0.0], vec![10.0]]);
        let learned = learn_from_demo(&demo, &[25.0], &[10.0], 4, FnApproxKind::Fourier).unwrap();

        let req = request(vec![0.0], vec![10.0], learned.tau);
        let out = generate_plan(&learned.dmp_list, &req, MAX_PLAN_LENGTH_S).unwrap();

        assert!(out.at_goal);
        assert_eq!(out.stop_reason, PlanStop::Converged);
        assert!(!out.coupling_active);

        let last = out.plan.last_point().unwrap();
        assert!((last.positions[0] - 10.0).abs() <= 0.01);
        assert_eq!(last.velocities.len(), 1);
        assert!(*out.plan.times.last().unwrap() >= 2.0);
        assert_eq!(out.plan.times.len(), out.plan.points.len());
        assert_constant_step(&out.plan, 0.1);
    }

    #[test]
    fn test_at_goal_after_tau() {
        // Starting on the goal at rest with no forcing the state never moves,
        // so the goal is reached on the first step at or after tau
        let req = request(vec![1.0, -2.0], vec![1.0, -2.0], 1.0);
        let out = generate_plan(&zero_dmp(2), &req, MAX_PLAN_LENGTH_S).unwrap();

        assert!(out.at_goal);
        assert_eq!(out.plan.len(), 10);
        assert_abs_diff_eq!(*out.plan.times.last().unwrap(), 1.0, epsilon = 1e-12);
        for p in &out.plan.points {
            assert_eq!(p.positions, vec![1.0, -2.0]);
            assert_eq!(p.velocities, vec![0.0, 0.0]);
        }
    }

    #[test]
    fn test_max_plan_length() {
        // Undamped, the system oscillates about the goal forever
        let mut dmp = zero_dmp(1);
        dmp[0].d_gain = 0.0;

        let mut req = request(vec![0.0], vec![1.0], 1.0);
        req.goal_thresh = vec![1e-9];

        let max_len = 5.0;
        let out = generate_plan(&dmp, &req, max_len).unwrap();

        assert!(!out.at_goal);
        assert_eq!(out.stop_reason, PlanStop::MaxLength);
        assert!(out.plan.len() as f64 <= max_len / req.dt + 1.0);
        assert_constant_step(&out.plan, req.dt);
    }

    #[test]
    fn test_segment_length() {
        let mut req = request(vec![0.0], vec![1.0], 2.0);
        req.seg_length = 0.5;

        let out = generate_plan(&zero_dmp(1), &req, MAX_PLAN_LENGTH_S).unwrap();

        assert_eq!(out.stop_reason, PlanStop::SegmentEnd);
        assert!(!out.at_goal);
        assert_eq!(out.plan.len(), 6);
    }

    #[test]
    fn test_zero_threshold_disables_check() {
        let mut req = request(vec![0.0, 0.0], vec![1.0, 5.0], 1.0);
        req.goal_thresh = vec![0.01, 0.0];

        let out = generate_plan(&zero_dmp(2), &req, MAX_PLAN_LENGTH_S).unwrap();

        assert!(out.at_goal);
        let last = out.plan.last_point().unwrap();
        assert!((last.positions[0] - 1.0).abs() <= 0.01);
    }

    #[test]
    fn test_obstacle_only_couples_position() {
        let mut req = request(vec![0.0; 6], vec![1.0, 1.0, 0.0, 0.5, 0.5, 0.5], 1.0);
        let free = generate_plan(&zero_dmp(6), &req, MAX_PLAN_LENGTH_S).unwrap();

        req.obstacle = vec![0.5, 0.6, 0.0];
        req.gamma = vec![50.0];
        req.beta = vec![1.0];
        req.k = vec![1.0];
        let avoid = generate_plan(&zero_dmp(6), &req, MAX_PLAN_LENGTH_S).unwrap();

        assert!(avoid.coupling_active);

        let n = free.plan.len().min(avoid.plan.len());
        let differs = (0..n).any(|j| {
            (0..3).any(|d| {
                (free.plan.points[j].positions[d] - avoid.plan.points[j].positions[d]).abs() > 1e-6
            })
        });
        assert!(differs);

        for j in 0..n {
            for d in 3..6 {
                assert_eq!(
                    free.plan.points[j].positions[d],
                    avoid.plan.points[j].positions[d]
                );
            }
        }
    }

    #[test]
    fn test_obstacle_ignored_for_other_dims() {
        let mut req = request(vec![0.0, 0.0], vec![1.0, 1.0], 1.0);
        let free = generate_plan(&zero_dmp(2), &req, MAX_PLAN_LENGTH_S).unwrap();

        req.obstacle = vec![0.5, 0.6, 0.0];
        req.gamma = vec![50.0];
        let with_obstacle = generate_plan(&zero_dmp(2), &req, MAX_PLAN_LENGTH_S).unwrap();

        assert!(!with_obstacle.coupling_active);
        assert_eq!(free.plan, with_obstacle.plan);
    }

    #[test]
    fn test_invalid_requests() {
        let req = request(vec![0.0, 0.0], vec![1.0, 1.0], 1.0);

        assert!(matches!(
            generate_plan(&[], &req, MAX_PLAN_LENGTH_S),
            Err(PlanError::EmptyPrimitiveSet)
        ));
        assert!(matches!(
            generate_plan(&zero_dmp(3), &req, MAX_PLAN_LENGTH_S),
            Err(PlanError::DimensionMismatch { what: "x_0", expected: 3, found: 2 })
        ));

        let mut bad = req.clone();
        bad.goal_thresh = vec![0.1];
        assert!(matches!(
            generate_plan(&zero_dmp(2), &bad, MAX_PLAN_LENGTH_S),
            Err(PlanError::DimensionMismatch { what: "goal_thresh", .. })
        ));

        let mut bad = req.clone();
        bad.tau = 0.0;
        assert!(matches!(
            generate_plan(&zero_dmp(2), &bad, MAX_PLAN_LENGTH_S),
            Err(PlanError::InvalidParameter(_))
        ));

        let mut bad = req.clone();
        bad.integrate_iter = 0;
        assert!(matches!(
            generate_plan(&zero_dmp(2), &bad, MAX_PLAN_LENGTH_S),
            Err(PlanError::InvalidParameter(_))
        ));

        let mut bad = req.clone();
        bad.approx = Some(FnApproxKind::Linear);
        assert!(matches!(
            generate_plan(&zero_dmp(2), &bad, MAX_PLAN_LENGTH_S),
            Err(PlanError::ApproxMismatch {
                dim: 0,
                requested: FnApproxKind::Linear,
                learned: FnApproxKind::Fourier,
            })
        ));

        let mut bad = req;
        bad.dt = -0.1;
        assert!(matches!(
            generate_plan(&zero_dmp(2), &bad, MAX_PLAN_LENGTH_S),
            Err(PlanError::InvalidParameter(_))
        ));
    }
}
