//! # DMP service messages
//!
//! Request/response pairs for the three DMP operations: learning from a
//! demonstration, planning, and managing the active primitive set.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{DmpData, DmpTraj, FnApproxKind};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Learn one primitive per dimension from a demonstration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LearnDmpFromDemoRequest {
    /// The demonstration to learn from
    pub demo: DmpTraj,

    /// Spring gain for each dimension
    pub k_gains: Vec<f64>,

    /// Damper gain for each dimension
    pub d_gains: Vec<f64>,

    /// Number of basis functions in the forcing term approximator
    pub num_bases: usize,

    /// Approximator to fit, the server's default if `None`
    #[serde(default)]
    pub approx: Option<FnApproxKind>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LearnDmpFromDemoResponse {
    /// The learned primitives, empty if learning failed
    pub dmp_list: Vec<DmpData>,

    /// Time scaling constant of the demonstration (its duration in seconds)
    pub tau: f64,
}

/// Plan a trajectory toward a goal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetDmpPlanRequest {
    /// Starting position
    pub x_0: Vec<f64>,

    /// Starting velocity
    pub x_dot_0: Vec<f64>,

    /// Time offset into the primitive at which this plan segment starts.
    ///
    /// Units: seconds
    #[serde(default)]
    pub t_0: f64,

    pub goal: Vec<f64>,

    /// Per-dimension convergence tolerance, zero disables the check for that dimension
    pub goal_thresh: Vec<f64>,

    /// Length of the plan segment, a non-positive value plans until the goal is reached.
    ///
    /// Units: seconds
    #[serde(default = "default_seg_length")]
    pub seg_length: f64,

    /// Time scaling constant, the desired duration of the full execution.
    ///
    /// Units: seconds
    pub tau: f64,

    /// Time resolution of the plan.
    ///
    /// Units: seconds
    pub dt: f64,

    /// Number of integration sub-steps per plan step
    pub integrate_iter: usize,

    /// Flat obstacle description, either empty, a point (3 values), or a
    /// vertex list (a multiple of 3 values)
    #[serde(default)]
    pub obstacle: Vec<f64>,

    /// Angle coefficients of the coupling term
    #[serde(default)]
    pub beta: Vec<f64>,

    /// Amplitudes of the coupling term
    #[serde(default)]
    pub gamma: Vec<f64>,

    /// Distance coefficients of the coupling term
    #[serde(default)]
    pub k: Vec<f64>,

    /// Coupling scale per meter of obstacle extent
    #[serde(default)]
    pub scale_m: f64,

    /// Constant coupling scale
    #[serde(default = "default_scale_n")]
    pub scale_n: f64,

    /// Expected approximator of the primitives. If set, planning fails when
    /// any primitive was learned with a different one.
    #[serde(default)]
    pub approx: Option<FnApproxKind>,

    /// Primitives to plan with. If `None` the active set is used.
    #[serde(default)]
    pub dmp_list: Option<Vec<DmpData>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GetDmpPlanResponse {
    pub plan: DmpTraj,

    /// True if the plan ends within the goal threshold after at least `tau` seconds
    pub at_goal: bool,
}

/// Replace the active primitive set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetActiveDmpRequest {
    pub dmp_list: Vec<DmpData>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SetActiveDmpResponse {
    pub success: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GetActiveDmpResponse {
    /// The active primitive set, `None` if no set has been made active
    pub dmp_list: Option<Vec<DmpData>>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Any request the DMP server can handle.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DmpRequest {
    LearnFromDemo(LearnDmpFromDemoRequest),
    GetPlan(GetDmpPlanRequest),
    SetActive(SetActiveDmpRequest),
    GetActive,
}

/// The response to a [`DmpRequest`], with a variant per request type.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DmpResponse {
    LearnFromDemo(LearnDmpFromDemoResponse),
    GetPlan(GetDmpPlanResponse),
    SetActive(SetActiveDmpResponse),
    GetActive(GetActiveDmpResponse),
}

/// Possible parsing errors.
#[derive(Debug, Error)]
pub enum RequestParseError {
    #[error("Request contains invalid JSON: {0}")]
    InvalidJson(serde_json::Error),
}

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl DmpRequest {
    /// Parse a request from a JSON packet
    pub fn from_json(json_str: &str) -> Result<Self, RequestParseError> {
        serde_json::from_str(json_str).map_err(RequestParseError::InvalidJson)
    }

    /// Short human readable name of the request type
    pub fn name(&self) -> &'static str {
        match self {
            DmpRequest::LearnFromDemo(_) => "LearnFromDemo",
            DmpRequest::GetPlan(_) => "GetPlan",
            DmpRequest::SetActive(_) => "SetActive",
            DmpRequest::GetActive => "GetActive",
        }
    }
}

// ------------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ------------------------------------------------------------------------------------------------

fn default_seg_length() -> f64 {
    -1.0
}

fn default_scale_n() -> f64 {
    1.0
}
